//! Command line and environment configuration.

use std::path::PathBuf;

use clap::Parser;
use forecast_common::filename;
use point_extract::EngineConfig;

/// Forecast API Server
#[derive(Parser, Debug, Clone)]
#[command(name = "forecast-api")]
#[command(about = "Point forecast server over published GFS grid files")]
pub struct ApiConfig {
    /// Listen address
    #[arg(short, long, default_value = "0.0.0.0:8080", env = "FORECAST_LISTEN_ADDR")]
    pub listen: String,

    /// Published directory written by the downloader
    #[arg(long, default_value = "./gfs_data", env = "FORECAST_DATA_DIR")]
    pub data_dir: PathBuf,

    /// wgrib2 executable
    #[arg(long, default_value = "wgrib2", env = "WGRIB2_PATH")]
    pub wgrib2: PathBuf,

    /// Concurrent decoder processes per query
    #[arg(long, default_value = "4", env = "FORECAST_MAX_WORKERS")]
    pub max_workers: usize,

    /// Daily model run hours (UTC)
    #[arg(long, value_delimiter = ',', default_value = "0,6,12,18", env = "FORECAST_CYCLES")]
    pub cycles: Vec<u32>,

    /// Hours after a run starts before the downloader publishes it
    #[arg(long, default_value = "5", env = "FORECAST_DELAY_HOURS")]
    pub delay_hours: u32,

    /// Number of worker threads
    #[arg(long, env = "FORECAST_WORKER_THREADS")]
    pub worker_threads: Option<usize>,

    /// Log level
    #[arg(long, default_value = "info", env = "RUST_LOG")]
    pub log_level: String,
}

impl ApiConfig {
    pub fn engine_config(&self) -> EngineConfig {
        EngineConfig {
            data_dir: self.data_dir.clone(),
            resolution: filename::DEFAULT_RESOLUTION.to_string(),
            max_workers: self.max_workers,
            cycles: self.cycles.clone(),
            delay_hours: self.delay_hours,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ApiConfig::parse_from(["forecast-api"]);
        assert_eq!(config.max_workers, 4);
        let engine = config.engine_config();
        assert_eq!(engine.data_dir, PathBuf::from("./gfs_data"));
        assert_eq!(engine.cycles, EngineConfig::default().cycles);
        assert_eq!(engine.delay_hours, EngineConfig::default().delay_hours);
    }

    #[test]
    fn test_overrides() {
        let config = ApiConfig::parse_from([
            "forecast-api",
            "--data-dir",
            "/srv/gfs",
            "--max-workers",
            "8",
            "--wgrib2",
            "/opt/wgrib2/bin/wgrib2",
            "--cycles",
            "0,12",
            "--delay-hours",
            "3",
        ]);
        let engine = config.engine_config();
        assert_eq!(engine.max_workers, 8);
        assert_eq!(engine.data_dir, PathBuf::from("/srv/gfs"));
        assert_eq!(engine.cycles, vec![0, 12]);
        assert_eq!(engine.delay_hours, 3);
        assert_eq!(config.wgrib2, PathBuf::from("/opt/wgrib2/bin/wgrib2"));
    }
}
