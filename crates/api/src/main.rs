//! PhishGuard Scan Service - Main Entry Point

use anyhow::Context;
use api::{init_logging, run_server, AppConfig};
use clap::Parser;
use tracing::info;

#[derive(Debug, Parser)]
#[command(name = "phishguard-server", version, about = "Phishing URL scan service")]
struct Args {
    /// Configuration file (defaults to config/default.toml when present)
    #[arg(short, long)]
    config: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let config = AppConfig::load(args.config.as_deref()).context("loading configuration")?;

    init_logging(&config.logging);
    info!("=== PhishGuard v{} ===", env!("CARGO_PKG_VERSION"));
    info!("Scoring artifacts: {:?}", config.model);

    run_server(config).await
}
