//! Published grid files.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};

use crate::cycle::Cycle;
use crate::filename;

/// One published forecast product for a (cycle, forecast hour) pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GridFile {
    pub cycle: Cycle,
    pub forecast_hour: u32,
    /// Cycle reference time plus forecast offset
    pub valid_time: DateTime<Utc>,
    pub path: PathBuf,
}

impl GridFile {
    /// Decode a published file path, `None` if its name is malformed or its
    /// valid time is out of range.
    ///
    /// File names carry only the run hour. The run date is that of the most
    /// recent run at that hour not after `latest`.
    pub fn from_path(path: impl AsRef<Path>, latest: &Cycle) -> Option<Self> {
        let path = path.as_ref();
        let name = path.file_name()?.to_str()?;
        let forecast_hour = filename::forecast_hour(name)?;
        let cycle = latest.latest_run_at(filename::cycle_hour(name)?);
        let valid_time = cycle.valid_time(forecast_hour)?;
        Some(Self {
            cycle,
            forecast_hour,
            valid_time,
            path: path.to_path_buf(),
        })
    }

    pub fn file_name(&self) -> &str {
        self.path
            .file_name()
            .and_then(|s| s.to_str())
            .unwrap_or_default()
    }
}
