//! Common fixtures for point forecast tests.

use chrono::NaiveDate;
use forecast_common::{Coordinate, Cycle, FieldSample};

/// Run date used by the reference scenario.
pub fn cycle_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 5, 1).expect("valid fixture date")
}

/// 2024-05-01 00Z.
pub fn reference_cycle() -> Cycle {
    Cycle::new(cycle_date(), 0)
}

/// 2024-05-01 18Z, the latest run of the reference day.
pub fn latest_cycle() -> Cycle {
    Cycle::new(cycle_date(), 18)
}

/// Oklahoma City, in 0..360 longitude convention.
pub fn test_coordinate() -> Coordinate {
    Coordinate::new(262.5, 35.25).expect("valid fixture coordinate")
}

/// gust 5.0 m/s, 293.15 K, u 2.0 m/s, v -2.0 m/s.
pub const REFERENCE_SAMPLE: FieldSample = FieldSample {
    temperature_k: 293.15,
    u_wind_ms: 2.0,
    v_wind_ms: -2.0,
    gust_ms: 5.0,
};

/// A sample whose temperature encodes `marker` (in degrees Celsius).
pub fn marked_sample(marker: f64) -> FieldSample {
    FieldSample {
        temperature_k: 273.15 + marker,
        ..REFERENCE_SAMPLE
    }
}
