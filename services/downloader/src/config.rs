//! Model download configuration.
//!
//! Loaded from a YAML model definition (`config/models/gfs.yaml`). When the
//! file is absent the built-in GFS definition is used.

use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use forecast_common::{cycle, filename, Cycle};
use serde::Deserialize;
use tracing::{debug, info};

/// Root configuration loaded from a model YAML file.
#[derive(Debug, Clone, Deserialize)]
pub struct ModelConfig {
    pub model: ModelInfo,
    pub source: SourceConfig,
    pub schedule: ScheduleConfig,
}

/// Basic model identification.
#[derive(Debug, Clone, Deserialize)]
pub struct ModelInfo {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
}

/// Remote source layout.
#[derive(Debug, Clone, Deserialize)]
pub struct SourceConfig {
    /// Root of the HTTP file tree
    pub base_url: String,
    /// Directory of one cycle below `base_url`, with `{date}` and `{cycle}`
    /// placeholders
    #[serde(default = "default_prefix_template")]
    pub prefix_template: String,
    /// Grid resolution token, e.g. `0p25`
    #[serde(default = "default_resolution")]
    pub resolution: String,
}

fn default_prefix_template() -> String {
    "gfs.{date}/{cycle}/atmos".to_string()
}

fn default_resolution() -> String {
    filename::DEFAULT_RESOLUTION.to_string()
}

/// Schedule configuration for downloads.
#[derive(Debug, Clone, Deserialize)]
pub struct ScheduleConfig {
    /// Daily cycle hours, e.g. `[0, 6, 12, 18]`
    #[serde(default = "default_cycles")]
    pub cycles: Vec<u32>,
    /// Hours after cycle time that data becomes available
    #[serde(default = "default_delay_hours")]
    pub delay_hours: u32,
    pub forecast_hours: ForecastHoursConfig,
    /// Polling interval in seconds
    #[serde(default = "default_poll_interval")]
    pub poll_interval_secs: u64,
}

fn default_cycles() -> Vec<u32> {
    cycle::GFS_CYCLES.to_vec()
}

fn default_delay_hours() -> u32 {
    cycle::GFS_AVAILABILITY_DELAY_HOURS
}

fn default_poll_interval() -> u64 {
    600
}

#[derive(Debug, Clone, Deserialize)]
pub struct ForecastHoursConfig {
    pub start: u32,
    pub end: u32,
    pub step: u32,
}

impl ForecastHoursConfig {
    /// Generate the list of forecast hours.
    pub fn hours(&self) -> Vec<u32> {
        (self.start..=self.end)
            .step_by(self.step.max(1) as usize)
            .collect()
    }
}

impl ModelConfig {
    /// Built-in GFS 0.25 degree definition: 00..=24 hourly from NOMADS.
    pub fn gfs_default() -> Self {
        Self {
            model: ModelInfo {
                id: "gfs".to_string(),
                name: "GFS - Global Forecast System".to_string(),
                description: String::new(),
            },
            source: SourceConfig {
                base_url: "https://nomads.ncep.noaa.gov/pub/data/nccf/com/gfs/prod".to_string(),
                prefix_template: default_prefix_template(),
                resolution: default_resolution(),
            },
            schedule: ScheduleConfig {
                cycles: default_cycles(),
                delay_hours: default_delay_hours(),
                forecast_hours: ForecastHoursConfig {
                    start: 0,
                    end: 24,
                    step: 1,
                },
                poll_interval_secs: default_poll_interval(),
            },
        }
    }

    /// Load a model configuration from a YAML file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: ModelConfig = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        debug!(model = %config.model.id, path = %path.display(), "Loaded model config");
        Ok(config)
    }

    /// Load `path` if it exists, otherwise fall back to [`ModelConfig::gfs_default`].
    ///
    /// A file that exists but does not parse is an error.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            return Self::load(path);
        }
        info!(path = %path.display(), "Model config not found, using built-in GFS definition");
        Ok(Self::gfs_default())
    }

    pub fn forecast_hours(&self) -> Vec<u32> {
        self.schedule.forecast_hours.hours()
    }

    /// Most recent cycle expected to be published at `now`.
    pub fn resolve_cycle(&self, now: DateTime<Utc>) -> Cycle {
        Cycle::resolve(now, &self.schedule.cycles, self.schedule.delay_hours)
    }

    /// Local and remote name of one forecast hour's file.
    pub fn file_name(&self, cycle: &Cycle, forecast_hour: u32) -> String {
        filename::encode(cycle.hour, &self.source.resolution, forecast_hour)
    }

    /// Remote URL of one forecast hour's file.
    pub fn remote_url(&self, cycle: &Cycle, forecast_hour: u32) -> String {
        let prefix = self
            .source
            .prefix_template
            .replace("{date}", &cycle.date_string())
            .replace("{cycle}", &cycle.hour_string());
        format!(
            "{}/{}/{}",
            self.source.base_url.trim_end_matches('/'),
            prefix.trim_matches('/'),
            self.file_name(cycle, forecast_hour)
        )
    }
}
