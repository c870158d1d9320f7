//! Feature table preprocessing for labeled URL datasets

use anyhow::{Context, Result};
use clap::Parser;
use dataset::{preprocess, PreprocessOptions, PreprocessSettings, ScalerSource};
use feature_engine::FeatureExtractor;
use lookup_client::LookupClient;
use page_fetcher::PageFetcher;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// How many defaulted URLs to list in the summary
const LISTED_DEFAULTS: usize = 20;

#[derive(Parser, Debug)]
#[command(author, version, about = "Extract phishing features from a url,label CSV")]
struct Args {
    /// Input CSV with `url` and `label` columns
    #[arg(long)]
    input: PathBuf,

    /// Raw feature table output
    #[arg(long)]
    output: PathBuf,

    /// Fit scaling parameters on this dataset and save them here
    #[arg(long, conflicts_with = "scaler")]
    fit_scaler: Option<PathBuf>,

    /// Previously fitted scaling parameters
    #[arg(long)]
    scaler: Option<PathBuf>,

    /// Normalized feature table output
    #[arg(long)]
    normalized_output: Option<PathBuf>,

    /// Configuration file (defaults to config/default.toml when present)
    #[arg(long)]
    config: Option<String>,

    /// URLs extracted concurrently, overriding `extractor.batch_concurrency`
    #[arg(long)]
    concurrency: Option<usize>,

    /// Per-URL extraction deadline in milliseconds, overriding `extractor.deadline_ms`
    #[arg(long)]
    deadline_ms: Option<u64>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    let mut settings =
        PreprocessSettings::load(args.config.as_deref()).context("loading configuration")?;
    if let Some(concurrency) = args.concurrency {
        settings.extractor.batch_concurrency = concurrency;
    }
    if let Some(deadline_ms) = args.deadline_ms {
        settings.extractor.deadline_ms = deadline_ms;
    }

    let scaler = match (args.fit_scaler, args.scaler) {
        (Some(path), _) => ScalerSource::Fit(path),
        (None, Some(path)) => ScalerSource::Load(path),
        (None, None) => ScalerSource::None,
    };
    let options = PreprocessOptions {
        input: args.input,
        output: args.output,
        scaler,
        normalized_output: args.normalized_output,
        concurrency: settings.extractor.batch_concurrency,
    };

    let lookups = Arc::new(LookupClient::new(&settings.lookup));
    let pages =
        Arc::new(PageFetcher::new(&settings.fetch).context("building page fetcher")?);
    let extractor = FeatureExtractor::new(lookups, pages, settings.extractor);

    info!("Preprocessing {}", options.input.display());
    let summary = preprocess(&extractor, &options)
        .await
        .with_context(|| format!("preprocessing {}", options.input.display()))?;

    println!("Rows written:       {}", summary.rows);
    if let Some(normalized) = summary.normalized_rows {
        println!("Normalized rows:    {}", normalized);
    }
    println!(
        "Defaulted rows:     {} ({:.1}%)",
        summary.defaulted.len(),
        summary.defaulted_share() * 100.0
    );
    for row in summary.defaulted.iter().take(LISTED_DEFAULTS) {
        println!("  #{:<6} {} ({})", row.index, row.url, row.reason);
    }
    if summary.defaulted.len() > LISTED_DEFAULTS {
        println!("  ... {} more", summary.defaulted.len() - LISTED_DEFAULTS);
    }

    Ok(())
}
