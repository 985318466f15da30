//! Database repositories for campaign stats.
//!
//! [`StatsStore`] is the write contract the refresh cycle depends on;
//! [`DailyStatsRepository`] implements it on top of `PostgreSQL`.

pub mod daily_stats_repo;

pub use daily_stats_repo::DailyStatsRepository;

use async_trait::async_trait;

use crate::error::PersistenceError;
use crate::models::MergedStat;

/// Durable keyed storage for merged stats.
#[async_trait]
pub trait StatsStore: Send + Sync {
    /// Ensures the backing table exists. Safe to call on every startup.
    async fn init_schema(&self) -> Result<(), PersistenceError>;

    /// Inserts or overwrites every row by (date, campaign_id) as one atomic
    /// batch. An empty slice is a no-op.
    async fn upsert_stats(&self, rows: &[MergedStat]) -> Result<u64, PersistenceError>;
}
