//! Model run cycles and their valid times.

use std::fmt;

use chrono::{DateTime, Duration, NaiveDate, NaiveTime, TimeZone, Timelike, Utc};
use serde::{Deserialize, Serialize};

/// Daily GFS run hours (UTC).
pub const GFS_CYCLES: [u32; 4] = [0, 6, 12, 18];

/// Hours after a GFS run starts before its files are reliably published.
pub const GFS_AVAILABILITY_DELAY_HOURS: u32 = 5;

/// A single model run, identified by its date and start hour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Cycle {
    /// Run date (UTC)
    pub date: NaiveDate,
    /// Run start hour (UTC), e.g. 0, 6, 12, 18
    pub hour: u32,
}

impl Cycle {
    pub fn new(date: NaiveDate, hour: u32) -> Self {
        Self { date, hour }
    }

    /// Pick the most recent run whose output should be available at `now`.
    ///
    /// `now` is shifted back by `delay_hours`, then the latest run hour not
    /// after the shifted hour of day is selected. When no run qualifies the
    /// previous day's last run is used.
    pub fn resolve(now: DateTime<Utc>, cycles: &[u32], delay_hours: u32) -> Self {
        let shifted = now - Duration::hours(delay_hours as i64);
        let date = shifted.date_naive();
        let current_hour = shifted.hour();

        match cycles.iter().filter(|&&c| c <= current_hour).max() {
            Some(&hour) => Self { date, hour },
            None => Self {
                date: date.pred_opt().unwrap_or(date),
                hour: cycles.iter().max().copied().unwrap_or(0),
            },
        }
    }

    /// Model run/reference time.
    pub fn reference_time(&self) -> DateTime<Utc> {
        let midnight = self.date.and_time(NaiveTime::default());
        Utc.from_utc_datetime(&midnight) + Duration::hours(self.hour as i64)
    }

    /// Valid time of a forecast hour within this run, `None` when it falls
    /// outside the representable date range.
    pub fn valid_time(&self, forecast_hour: u32) -> Option<DateTime<Utc>> {
        self.reference_time()
            .checked_add_signed(Duration::hours(forecast_hour as i64))
    }

    /// The run at `hour` most recently started at or before this one.
    ///
    /// Published files carry only their run hour. Dated against the latest
    /// resolved run, an hour later in the day than that run belongs to the
    /// previous day.
    pub fn latest_run_at(&self, hour: u32) -> Self {
        let date = if hour > self.hour {
            self.date.pred_opt().unwrap_or(self.date)
        } else {
            self.date
        };
        Self { date, hour }
    }

    /// Date as used in remote paths, e.g. `20240501`.
    pub fn date_string(&self) -> String {
        self.date.format("%Y%m%d").to_string()
    }

    /// Run hour as used in file names, e.g. `06`.
    pub fn hour_string(&self) -> String {
        format!("{:02}", self.hour)
    }
}

impl fmt::Display for Cycle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {:02}Z", self.date_string(), self.hour)
    }
}
