//! Grid decoder adapter.
//!
//! Point values are read by running `wgrib2` against a grid file:
//!
//! ```text
//! wgrib2 gfs.t00z.pgrb2.0p25.f003 -match '<expr>' -lon 262.500 35.250
//! ```
//!
//! which prints one record per matching field, e.g.
//!
//! ```text
//! 1:0:d=2024050100:GUST:surface:3 hour fcst:lon=262.5,lat=35.25,val=5.0
//! ```
//!
//! Records are keyed by their `name:level` pair, so the order in which the
//! decoder emits them does not matter.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::process::Command;

use forecast_common::{Coordinate, FieldSample};
use tracing::debug;

use crate::error::DecodeError;

/// Extracts the forecast fields of one grid file at one coordinate.
///
/// Implementations block; the engine runs them on the blocking pool.
pub trait PointDecoder: Send + Sync + 'static {
    fn extract(&self, path: &Path, coord: Coordinate) -> Result<FieldSample, DecodeError>;
}

/// Fields requested from every grid file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Temperature2m,
    UWind10m,
    VWind10m,
    GustSurface,
}

impl Field {
    pub const ALL: [Field; 4] = [
        Field::Temperature2m,
        Field::UWind10m,
        Field::VWind10m,
        Field::GustSurface,
    ];

    /// GRIB2 short name.
    pub fn name(&self) -> &'static str {
        match self {
            Field::Temperature2m => "TMP",
            Field::UWind10m => "UGRD",
            Field::VWind10m => "VGRD",
            Field::GustSurface => "GUST",
        }
    }

    /// GRIB2 level description.
    pub fn level(&self) -> &'static str {
        match self {
            Field::Temperature2m => "2 m above ground",
            Field::UWind10m | Field::VWind10m => "10 m above ground",
            Field::GustSurface => "surface",
        }
    }

    fn label(&self) -> &'static str {
        match self {
            Field::Temperature2m => "2 m temperature",
            Field::UWind10m => "10 m U wind",
            Field::VWind10m => "10 m V wind",
            Field::GustSurface => "surface gust",
        }
    }

    fn lookup(name: &str, level: &str) -> Option<Field> {
        Field::ALL
            .into_iter()
            .find(|f| f.name() == name && f.level() == level)
    }
}

/// Field-match expression selecting every field in [`Field::ALL`].
pub fn match_expression() -> String {
    let alternatives: Vec<String> = Field::ALL
        .iter()
        .map(|f| format!("{}:{}", f.name(), f.level()))
        .collect();
    format!(":({}):", alternatives.join("|"))
}

/// Parse decoder stdout into a sample.
pub fn parse_output(stdout: &str) -> Result<FieldSample, DecodeError> {
    let records: Vec<&str> = stdout
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect();

    if records.len() < Field::ALL.len() {
        return Err(DecodeError::InsufficientOutput {
            expected: Field::ALL.len(),
            found: records.len(),
        });
    }

    let mut values: HashMap<Field, f64> = HashMap::new();
    for record in records {
        let (name, level, raw) = split_record(record)?;
        let Some(field) = Field::lookup(name, level) else {
            debug!(record = record, "Ignoring unrequested decoder record");
            continue;
        };
        let value = raw
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
            .ok_or_else(|| DecodeError::InvalidValue {
                field: field.label(),
                raw: raw.to_string(),
            })?;
        values.entry(field).or_insert(value);
    }

    let get = |field: Field| {
        values
            .get(&field)
            .copied()
            .ok_or(DecodeError::MissingField(field.label()))
    };

    Ok(FieldSample {
        temperature_k: get(Field::Temperature2m)?,
        u_wind_ms: get(Field::UWind10m)?,
        v_wind_ms: get(Field::VWind10m)?,
        gust_ms: get(Field::GustSurface)?,
    })
}

/// Split `n:offset:date:NAME:LEVEL:...:...,val=X` into (NAME, LEVEL, X).
fn split_record(record: &str) -> Result<(&str, &str, &str), DecodeError> {
    let malformed = || DecodeError::MalformedRecord(record.to_string());

    let mut parts = record.splitn(6, ':');
    let name = parts.nth(3).ok_or_else(malformed)?;
    let level = parts.next().ok_or_else(malformed)?;

    let (_, tail) = record.rsplit_once("val=").ok_or_else(malformed)?;
    let raw = tail.split(',').next().unwrap_or(tail).trim();

    Ok((name, level, raw))
}

/// Decoder backed by the `wgrib2` command line tool.
#[derive(Debug, Clone)]
pub struct Wgrib2Decoder {
    binary: PathBuf,
}

impl Default for Wgrib2Decoder {
    fn default() -> Self {
        Self::new("wgrib2")
    }
}

impl Wgrib2Decoder {
    pub fn new(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
        }
    }

    pub fn binary(&self) -> &Path {
        &self.binary
    }

    /// Verify the decoder binary can be started.
    pub fn check_available(&self) -> Result<(), DecodeError> {
        Command::new(&self.binary)
            .arg("-version")
            .output()
            .map(|_| ())
            .map_err(|source| DecodeError::Spawn {
                binary: self.binary.display().to_string(),
                source,
            })
    }
}

impl PointDecoder for Wgrib2Decoder {
    fn extract(&self, path: &Path, coord: Coordinate) -> Result<FieldSample, DecodeError> {
        let output = Command::new(&self.binary)
            .arg(path)
            .arg("-match")
            .arg(match_expression())
            .arg("-lon")
            .arg(format!("{:.3}", coord.lon))
            .arg(format!("{:.3}", coord.lat))
            .output()
            .map_err(|source| DecodeError::Spawn {
                binary: self.binary.display().to_string(),
                source,
            })?;

        if !output.status.success() {
            return Err(DecodeError::Exit {
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        parse_output(&String::from_utf8_lossy(&output.stdout))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const OUTPUT: &str = "\
1:0:d=2024050100:GUST:surface:anl:lon=262.500000,lat=35.250000,val=5
2:1:d=2024050100:TMP:2 m above ground:anl:lon=262.500000,lat=35.250000,val=293.15
3:2:d=2024050100:UGRD:10 m above ground:anl:lon=262.500000,lat=35.250000,val=2
4:3:d=2024050100:VGRD:10 m above ground:anl:lon=262.500000,lat=35.250000,val=-2
";

    #[test]
    fn test_match_expression() {
        assert_eq!(
            match_expression(),
            ":(TMP:2 m above ground|UGRD:10 m above ground|VGRD:10 m above ground|GUST:surface):"
        );
    }

    #[test]
    fn test_parse_output() {
        let sample = parse_output(OUTPUT).unwrap();
        assert_eq!(sample.gust_ms, 5.0);
        assert_eq!(sample.temperature_k, 293.15);
        assert_eq!(sample.u_wind_ms, 2.0);
        assert_eq!(sample.v_wind_ms, -2.0);
    }

    #[test]
    fn test_parse_output_any_order() {
        let reversed: String = OUTPUT.lines().rev().map(|l| format!("{}\n", l)).collect();
        assert_eq!(parse_output(&reversed).unwrap(), parse_output(OUTPUT).unwrap());
    }

    #[test]
    fn test_parse_output_insufficient() {
        let three: String = OUTPUT.lines().take(3).map(|l| format!("{}\n", l)).collect();
        assert!(matches!(
            parse_output(&three),
            Err(DecodeError::InsufficientOutput { expected: 4, found: 3 })
        ));
        assert!(matches!(
            parse_output(""),
            Err(DecodeError::InsufficientOutput { found: 0, .. })
        ));
    }

    #[test]
    fn test_parse_output_non_finite() {
        let bad = OUTPUT.replace("val=293.15", "val=nan");
        assert!(matches!(
            parse_output(&bad),
            Err(DecodeError::InvalidValue { field: "2 m temperature", .. })
        ));
        let bad = OUTPUT.replace("val=293.15", "val=9.999e20x");
        assert!(matches!(parse_output(&bad), Err(DecodeError::InvalidValue { .. })));
    }

    #[test]
    fn test_parse_output_missing_field() {
        let dup = OUTPUT.replace("VGRD", "UGRD");
        assert!(matches!(
            parse_output(&dup),
            Err(DecodeError::MissingField("10 m V wind"))
        ));
    }

    #[test]
    fn test_parse_output_malformed() {
        let bad = OUTPUT.replace("val=5", "value 5");
        assert!(matches!(parse_output(&bad), Err(DecodeError::MalformedRecord(_))));
    }

    #[test]
    fn test_missing_binary() {
        let decoder = Wgrib2Decoder::new("/nonexistent/wgrib2");
        assert!(matches!(
            decoder.check_available(),
            Err(DecodeError::Spawn { .. })
        ));
        let coord = Coordinate::new(0.0, 0.0).unwrap();
        assert!(matches!(
            decoder.extract(Path::new("x"), coord),
            Err(DecodeError::Spawn { .. })
        ));
    }
}
