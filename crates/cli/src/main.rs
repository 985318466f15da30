use clap::Parser;

mod commands;

use commands::SyncArgs;

#[derive(Parser)]
#[command(name = "cpa-sync")]
#[command(about = "Merge campaign spend and conversions into a CPA table and keep it fresh", long_about = None)]
struct Cli {
    #[command(flatten)]
    sync: SyncArgs,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if it exists
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    commands::run_sync(cli.sync).await?;

    Ok(())
}
