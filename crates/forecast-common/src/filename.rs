//! Grid file naming.
//!
//! Published files follow `<product>.t<HH>z.<tier>.<resolution>.f<FFF>`, e.g.
//! `gfs.t06z.pgrb2.0p25.f003`. Everything here is purely syntactic and
//! total: malformed names decode to `None` rather than panicking.

use std::path::Path;

use chrono::{DateTime, NaiveDate, Utc};

use crate::cycle::Cycle;

/// Model product prefix.
pub const PRODUCT: &str = "gfs";

/// Product tier (pressure-level GRIB2 files).
pub const TIER: &str = "pgrb2";

/// Default horizontal resolution (0.25 degree).
pub const DEFAULT_RESOLUTION: &str = "0p25";

/// Build the published file name for a run hour and forecast hour.
pub fn encode(cycle_hour: u32, resolution: &str, forecast_hour: u32) -> String {
    format!(
        "{}.t{:02}z.{}.{}.f{:03}",
        PRODUCT, cycle_hour, TIER, resolution, forecast_hour
    )
}

/// Glob pattern matching every published file of a resolution.
pub fn glob_pattern(resolution: &str) -> String {
    format!("{}.t*z.{}.{}.f*", PRODUCT, TIER, resolution)
}

/// Forecast hour encoded in a file name or path, `None` if malformed.
pub fn forecast_hour(name: &str) -> Option<u32> {
    let [_, _, _, _, offset] = fields(name)?;
    parse_digits(offset.strip_prefix('f')?)
}

/// Run hour encoded in a file name or path, `None` if malformed.
pub fn cycle_hour(name: &str) -> Option<u32> {
    let [_, run, _, _, _] = fields(name)?;
    let hour = parse_digits(run.strip_prefix('t')?.strip_suffix('z')?)?;
    (hour < 24).then_some(hour)
}

/// Valid time of a forecast hour in the run starting at `cycle_date` + `cycle_hour`,
/// `None` when it falls outside the representable date range.
pub fn cycle_timestamp(
    cycle_date: NaiveDate,
    cycle_hour: u32,
    forecast_hour: u32,
) -> Option<DateTime<Utc>> {
    Cycle::new(cycle_date, cycle_hour).valid_time(forecast_hour)
}

fn fields(name: &str) -> Option<[&str; 5]> {
    let base = Path::new(name)
        .file_name()
        .and_then(|s| s.to_str())
        .unwrap_or(name);

    let mut parts = base.split('.');
    let fields = [
        parts.next()?,
        parts.next()?,
        parts.next()?,
        parts.next()?,
        parts.next()?,
    ];
    // Extra segments (e.g. a `.tmp` suffix) are not published files.
    if parts.next().is_some() {
        return None;
    }
    Some(fields)
}

fn parse_digits(s: &str) -> Option<u32> {
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    s.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_encode() {
        assert_eq!(encode(0, "0p25", 3), "gfs.t00z.pgrb2.0p25.f003");
        assert_eq!(encode(18, "0p50", 120), "gfs.t18z.pgrb2.0p50.f120");
    }

    #[test]
    fn test_decode_path() {
        assert_eq!(forecast_hour("./gfs_data/gfs.t06z.pgrb2.0p25.f012"), Some(12));
        assert_eq!(cycle_hour("/data/gfs.t06z.pgrb2.0p25.f012"), Some(6));
    }

    #[test]
    fn test_malformed_names() {
        for name in [
            "",
            "gfs",
            "gfs.t00z.pgrb2.0p25",
            "gfs.t00z.pgrb2.0p25.003",
            "gfs.t00z.pgrb2.0p25.f",
            "gfs.t00z.pgrb2.0p25.fabc",
            "gfs.t00z.pgrb2.0p25.f-01",
            "gfs.t00z.pgrb2.0p25.f003.tmp",
            "gfs.t00z.pgrb2.0p25.f99999999999",
        ] {
            assert_eq!(forecast_hour(name), None, "{:?}", name);
        }
        assert_eq!(cycle_hour("gfs.t25z.pgrb2.0p25.f000"), None);
        assert_eq!(cycle_hour("gfs.00z.pgrb2.0p25.f000"), None);
    }

    #[test]
    fn test_cycle_timestamp() {
        let date = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
        assert_eq!(
            cycle_timestamp(date, 18, 7),
            Some(Utc.with_ymd_and_hms(2024, 5, 2, 1, 0, 0).unwrap())
        );
    }

    #[test]
    fn test_glob_pattern() {
        assert_eq!(glob_pattern("0p25"), "gfs.t*z.pgrb2.0p25.f*");
    }
}
