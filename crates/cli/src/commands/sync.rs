//! Sync command.
//!
//! Loads the local seed files, writes the merged rows for the requested
//! range, then keeps the table fresh from the configured source until
//! interrupted.

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::Args;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;

use cpa_sync_collector::{HttpStatsSource, RetryingSource, StatsSource, StubStatsSource};
use cpa_sync_core::{ConfigLoader, FetchConfig};
use cpa_sync_data::{
    merge_raw_stats, parse_date, DatabaseClient, DateRange, JsonStorage, MergedStat, StatsStore,
};
use cpa_sync_scheduler::{RefreshOrchestrator, RefreshScheduler};

/// Arguments for the sync command.
#[derive(Args, Debug, Clone)]
pub struct SyncArgs {
    /// Spend seed file (JSON array of {date, campaign_id, spend})
    #[arg(long, default_value = "spend.json")]
    pub spend_file: PathBuf,

    /// Conversions seed file (JSON array of {date, campaign_id, conversions})
    #[arg(long, default_value = "conv.json")]
    pub conv_file: PathBuf,

    /// First day of the seed range (YYYY-MM-DD)
    #[arg(long, value_parser = parse_date_arg)]
    pub start_date: NaiveDate,

    /// Last day of the seed range, inclusive (YYYY-MM-DD)
    #[arg(long, value_parser = parse_date_arg)]
    pub end_date: NaiveDate,

    /// Config file path
    #[arg(short, long, default_value = "config/Config.toml", env = "CPA_SYNC_CONFIG")]
    pub config: PathBuf,

    /// Load the seed files and exit without starting the scheduler
    #[arg(long, default_value = "false")]
    pub once: bool,
}

fn parse_date_arg(value: &str) -> Result<NaiveDate, String> {
    parse_date(value).map_err(|e| e.to_string())
}

/// Runs the sync command.
///
/// # Errors
/// Returns an error if the date range or config is invalid, a seed file
/// cannot be read or parsed, or the database is unreachable.
pub async fn run_sync(args: SyncArgs) -> Result<()> {
    let range = DateRange::new(args.start_date, args.end_date)?;

    let config = ConfigLoader::load(&args.config)
        .with_context(|| format!("Failed to load config from {}", args.config.display()))?;
    let interval = config.scheduler.interval()?;

    info!(
        start = %range.start(),
        end = %range.end(),
        interval_minutes = interval.as_secs_f64() / 60.0,
        "Starting cpa-sync"
    );

    let seed = load_seed(&args.spend_file, &args.conv_file, &range)?;

    let db = DatabaseClient::connect(&config.database).await?;
    let store = Arc::new(db.daily_stats());
    store.init_schema().await?;

    if seed.is_empty() {
        info!("No seed rows in range, skipping initial write");
    } else {
        let written = store.upsert_stats(&seed).await?;
        info!(rows = written, "Upserted seed rows");
    }

    if args.once {
        info!("--once given, not starting scheduler");
    } else {
        let source = build_source(&config.fetch)?;
        let orchestrator = RefreshOrchestrator::new(source, store);
        RefreshScheduler::new(orchestrator, interval)
            .run_until(shutdown_signal())
            .await;
    }

    db.close().await;
    info!("cpa-sync stopped");
    Ok(())
}

/// Reads both seed files and merges them over `range`.
fn load_seed(spend_file: &Path, conv_file: &Path, range: &DateRange) -> Result<Vec<MergedStat>> {
    let spend = JsonStorage::read_spend(spend_file)?;
    let conversions = JsonStorage::read_conversions(conv_file)?;
    info!(
        spend = spend.len(),
        conversions = conversions.len(),
        "Loaded seed files"
    );

    let merged = merge_raw_stats(&spend, &conversions, range)?;
    Ok(merged)
}

/// Picks the HTTP source when an API base URL is configured, else the stub.
fn build_source(fetch: &FetchConfig) -> Result<Arc<dyn StatsSource>> {
    let policy = fetch.retry_policy();
    let source: Arc<dyn StatsSource> = match &fetch.api_base_url {
        Some(url) => {
            info!(url = %url, "Fetching stats over HTTP");
            let http = HttpStatsSource::new(url.as_str(), fetch.timeout())?;
            Arc::new(RetryingSource::new(http, policy))
        }
        None => {
            info!("No api_base_url configured, using stub source");
            Arc::new(RetryingSource::new(StubStatsSource::new(), policy))
        }
    };
    Ok(source)
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Received Ctrl+C, shutting down after the current cycle"),
        Err(e) => tracing::error!("Failed to listen for Ctrl+C: {}", e),
    }
}
