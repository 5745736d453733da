//! Point forecast records: raw decoded samples and derived forecast points.

use chrono::{DateTime, Timelike, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{ForecastError, ForecastResult};
use crate::units;

/// Timestamp format used for forecast output (minute resolution).
pub const TIME_FORMAT: &str = "%Y-%m-%d %H:%M";

/// A validated longitude/latitude pair in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub lon: f64,
    pub lat: f64,
}

impl Coordinate {
    /// Longitudes are accepted in either -180..180 or 0..360 convention.
    pub fn new(lon: f64, lat: f64) -> ForecastResult<Self> {
        if !lon.is_finite() || !(-180.0..=360.0).contains(&lon) {
            return Err(ForecastError::invalid(
                "lon",
                format!("{} is outside [-180, 360]", lon),
            ));
        }
        if !lat.is_finite() || !(-90.0..=90.0).contains(&lat) {
            return Err(ForecastError::invalid(
                "lat",
                format!("{} is outside [-90, 90]", lat),
            ));
        }
        Ok(Self { lon, lat })
    }

    /// Parse raw query-string values.
    pub fn parse(lon: Option<&str>, lat: Option<&str>) -> ForecastResult<Self> {
        let lon = parse_degrees("lon", lon)?;
        let lat = parse_degrees("lat", lat)?;
        Self::new(lon, lat)
    }
}

fn parse_degrees(param: &str, value: Option<&str>) -> ForecastResult<f64> {
    let value = match value.map(str::trim) {
        Some(v) if !v.is_empty() => v,
        _ => return Err(ForecastError::MissingParameter(param.to_string())),
    };
    value
        .parse::<f64>()
        .map_err(|e| ForecastError::invalid(param, format!("{:?}: {}", value, e)))
}

/// Raw values decoded from one grid file at one coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FieldSample {
    /// 2 m temperature (K)
    pub temperature_k: f64,
    /// 10 m eastward wind (m/s)
    pub u_wind_ms: f64,
    /// 10 m northward wind (m/s)
    pub v_wind_ms: f64,
    /// Surface wind gust (m/s)
    pub gust_ms: f64,
}

impl FieldSample {
    pub fn is_finite(&self) -> bool {
        [self.temperature_k, self.u_wind_ms, self.v_wind_ms, self.gust_ms]
            .iter()
            .all(|v| v.is_finite())
    }
}

/// A user-facing forecast for one valid time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastPoint {
    #[serde(rename = "time", with = "minute_format")]
    pub valid_time: DateTime<Utc>,
    pub temp_c: f64,
    pub wind_kt: f64,
    pub gust_kt: f64,
    pub direction: String,
}

impl ForecastPoint {
    /// Derive forecast units from a raw sample.
    ///
    /// The valid time is truncated to the minute.
    pub fn from_sample(valid_time: DateTime<Utc>, sample: &FieldSample) -> Self {
        let degrees = units::wind_direction_from(sample.u_wind_ms, sample.v_wind_ms);
        Self {
            valid_time: truncate_to_minute(valid_time),
            temp_c: units::celsius(sample.temperature_k),
            wind_kt: units::knots(units::wind_speed(sample.u_wind_ms, sample.v_wind_ms)),
            gust_kt: units::knots(sample.gust_ms),
            direction: units::cardinal(degrees).to_string(),
        }
    }

    /// Formatted valid time, e.g. `2024-05-01 06:00`.
    pub fn time_label(&self) -> String {
        self.valid_time.format(TIME_FORMAT).to_string()
    }

    pub fn table_row(&self) -> String {
        format!(
            "{}\t{:.1}\t\t{:.1}\t\t{:.1}\t\t{}",
            self.time_label(),
            self.temp_c,
            self.wind_kt,
            self.gust_kt,
            self.direction
        )
    }
}

/// Render a forecast as a tab separated table with a header line.
pub fn render_table(coord: &Coordinate, points: &[ForecastPoint]) -> String {
    let mut out = format!("Coordinates: {} {}\n", coord.lon, coord.lat);
    out.push_str("Timestamp\tTempC\tWindKt\tGustKt\tDirection\n");
    for point in points {
        out.push_str(&point.table_row());
        out.push('\n');
    }
    out
}

fn truncate_to_minute(t: DateTime<Utc>) -> DateTime<Utc> {
    t.with_second(0)
        .and_then(|t| t.with_nanosecond(0))
        .unwrap_or(t)
}

mod minute_format {
    use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    use super::TIME_FORMAT;

    pub fn serialize<S: Serializer>(t: &DateTime<Utc>, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&t.format(TIME_FORMAT).to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(d)?;
        NaiveDateTime::parse_from_str(&raw, TIME_FORMAT)
            .map(|naive| Utc.from_utc_datetime(&naive))
            .map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_coordinate_parse() {
        let coord = Coordinate::parse(Some("-97.5"), Some(" 35.25 ")).unwrap();
        assert_eq!(coord, Coordinate { lon: -97.5, lat: 35.25 });
    }

    #[test]
    fn test_coordinate_rejects_bad_input() {
        assert!(matches!(
            Coordinate::parse(None, Some("1")),
            Err(ForecastError::MissingParameter(p)) if p == "lon"
        ));
        assert!(Coordinate::parse(Some("abc"), Some("1")).unwrap_err().is_client_error());
        assert!(Coordinate::parse(Some("1"), Some("91")).is_err());
        assert!(Coordinate::parse(Some("NaN"), Some("1")).is_err());
        assert!(Coordinate::parse(Some("361"), Some("1")).is_err());
    }

    #[test]
    fn test_point_serialization() {
        let point = ForecastPoint {
            valid_time: Utc.with_ymd_and_hms(2024, 5, 1, 6, 0, 0).unwrap(),
            temp_c: 20.0,
            wind_kt: 5.5,
            gust_kt: 9.7,
            direction: "NW".to_string(),
        };
        let json = serde_json::to_value(&point).unwrap();
        assert_eq!(json["time"], "2024-05-01 06:00");
        assert_eq!(json["direction"], "NW");

        let back: ForecastPoint = serde_json::from_value(json).unwrap();
        assert_eq!(back, point);
    }

    #[test]
    fn test_from_sample_truncates_to_minute() {
        let sample = FieldSample {
            temperature_k: 273.15,
            u_wind_ms: 0.0,
            v_wind_ms: -1.0,
            gust_ms: 1.0,
        };
        let point =
            ForecastPoint::from_sample(Utc.with_ymd_and_hms(2024, 5, 1, 6, 0, 42).unwrap(), &sample);
        assert_eq!(point.time_label(), "2024-05-01 06:00");
        assert_eq!(point.valid_time.second(), 0);
        assert_eq!(point.direction, "N");
        assert!(point.temp_c.abs() < 1e-9);
    }

    #[test]
    fn test_render_table() {
        let coord = Coordinate::new(-97.5, 35.25).unwrap();
        let sample = FieldSample {
            temperature_k: 293.15,
            u_wind_ms: 0.0,
            v_wind_ms: 0.0,
            gust_ms: 0.0,
        };
        let point =
            ForecastPoint::from_sample(Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap(), &sample);
        let table = render_table(&coord, &[point]);
        let lines: Vec<_> = table.lines().collect();
        assert_eq!(lines[0], "Coordinates: -97.5 35.25");
        assert!(lines[2].starts_with("2024-05-01 00:00\t20.0"));
    }
}
