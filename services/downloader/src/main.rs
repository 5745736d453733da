//! Weather data downloader service.
//!
//! Downloads the GFS grid files of the latest available cycle and publishes
//! them atomically into the output directory. Runs continuously by default,
//! polling for new cycles; `--once` fetches a single cycle and exits.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use downloader::{DownloadConfig, DownloadManager, FetchOrchestrator, ModelConfig, Scheduler};

#[derive(Parser, Debug)]
#[command(name = "downloader")]
#[command(about = "GFS grid file downloader with atomic publishing")]
struct Args {
    /// Run once and exit (vs continuous polling)
    #[arg(long)]
    once: bool,

    /// Published directory read by the forecast API
    #[arg(long, env = "FORECAST_DATA_DIR", default_value = "./gfs_data")]
    output_dir: PathBuf,

    /// Maximum concurrent downloads
    #[arg(long, default_value = "4")]
    max_concurrent: usize,

    /// Maximum attempts per file
    #[arg(long, default_value = "3")]
    max_retries: u32,

    /// Seconds between attempts
    #[arg(long, default_value = "5")]
    retry_delay_secs: u64,

    /// Files must be larger than this many bytes
    #[arg(long, default_value = "1048576")]
    min_file_size: u64,

    /// Whole-transfer HTTP timeout
    #[arg(long, default_value = "1800")]
    request_timeout_secs: u64,

    /// Overrides the model definition's polling interval
    #[arg(long)]
    poll_interval_secs: Option<u64>,

    /// Model definition YAML
    #[arg(long, env = "MODEL_CONFIG", default_value = "config/models/gfs.yaml")]
    config: PathBuf,

    /// Log level
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment from .env file if present
    dotenvy::dotenv().ok();

    let args = Args::parse();

    let level = match args.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(true)
        .with_thread_ids(true)
        .json()
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    info!("Starting GFS downloader");

    let model = ModelConfig::load_or_default(&args.config)?;
    let poll_interval = Duration::from_secs(
        args.poll_interval_secs
            .unwrap_or(model.schedule.poll_interval_secs),
    );

    let download_config = DownloadConfig {
        max_retries: args.max_retries,
        retry_delay: Duration::from_secs(args.retry_delay_secs),
        request_timeout: Duration::from_secs(args.request_timeout_secs),
        min_file_size: args.min_file_size,
        ..DownloadConfig::default()
    };
    let manager = Arc::new(DownloadManager::new(download_config)?);
    let orchestrator =
        FetchOrchestrator::new(manager, model, args.output_dir.clone(), args.max_concurrent);
    let scheduler = Scheduler::new(orchestrator, poll_interval);

    // Ctrl+C stops new jobs and retries; transfers in flight run to completion
    let cancel = CancellationToken::new();
    let signal_token = cancel.clone();
    tokio::spawn(async move {
        tokio::signal::ctrl_c().await.ok();
        info!("Received shutdown signal");
        signal_token.cancel();
    });

    if args.once {
        let report = scheduler.run_once(&cancel).await?;
        info!(
            cycle = %report.cycle,
            published = %report.published.display(),
            downloaded = report.downloaded,
            reused = report.reused,
            "Download session complete"
        );
    } else {
        info!(
            output_dir = %args.output_dir.display(),
            poll_interval_secs = poll_interval.as_secs(),
            "Starting continuous polling"
        );
        scheduler.run_forever(cancel).await;
    }

    Ok(())
}
