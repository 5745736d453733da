//! Generators for synthetic published directories and decoder output.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use forecast_common::{filename, FieldSample};

/// Deterministic payload of `len` bytes; different seeds give different bytes.
pub fn payload(len: usize, seed: u8) -> Vec<u8> {
    (0..len)
        .map(|i| (i as u8).wrapping_mul(31).wrapping_add(seed))
        .collect()
}

/// Write one file per forecast hour into `dir`, named as the downloader
/// publishes them. Each file holds `size` bytes seeded by its hour.
pub fn write_grid_files(
    dir: &Path,
    cycle_hour: u32,
    forecast_hours: &[u32],
    size: usize,
) -> io::Result<Vec<PathBuf>> {
    fs::create_dir_all(dir)?;
    forecast_hours
        .iter()
        .map(|&hour| {
            let path = dir.join(filename::encode(
                cycle_hour,
                filename::DEFAULT_RESOLUTION,
                hour,
            ));
            fs::write(&path, payload(size, hour as u8))?;
            Ok(path)
        })
        .collect()
}

/// Read every regular file in `dir` into a sorted (name, bytes) listing.
pub fn snapshot_dir(dir: &Path) -> io::Result<Vec<(String, Vec<u8>)>> {
    let mut entries = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        if entry.file_type()?.is_file() {
            entries.push((
                entry.file_name().to_string_lossy().into_owned(),
                fs::read(entry.path())?,
            ));
        }
    }
    entries.sort();
    Ok(entries)
}

/// One wgrib2 `-lon` record.
pub fn wgrib2_record(index: usize, name: &str, level: &str, value: &str) -> String {
    format!(
        "{}:{}:d=2024050100:{}:{}:anl:lon=262.500000,lat=35.250000,val={}",
        index + 1,
        index * 1000,
        name,
        level,
        value
    )
}

/// wgrib2 output for a sample, in the order wgrib2 emits GFS fields.
pub fn wgrib2_output(sample: &FieldSample) -> String {
    let records = [
        ("GUST", "surface", sample.gust_ms),
        ("TMP", "2 m above ground", sample.temperature_k),
        ("UGRD", "10 m above ground", sample.u_wind_ms),
        ("VGRD", "10 m above ground", sample.v_wind_ms),
    ];
    records
        .iter()
        .enumerate()
        .map(|(i, (name, level, value))| wgrib2_record(i, name, level, &value.to_string()) + "\n")
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::REFERENCE_SAMPLE;

    #[test]
    fn test_payload_is_deterministic() {
        assert_eq!(payload(64, 1), payload(64, 1));
        assert_ne!(payload(64, 1), payload(64, 2));
    }

    #[test]
    fn test_write_grid_files() {
        let tmp = tempfile::TempDir::new().unwrap();
        let paths = write_grid_files(tmp.path(), 6, &[0, 3], 16).unwrap();
        assert_eq!(paths.len(), 2);
        assert!(paths[1].ends_with("gfs.t06z.pgrb2.0p25.f003"));

        let snapshot = snapshot_dir(tmp.path()).unwrap();
        assert_eq!(snapshot[0].0, "gfs.t06z.pgrb2.0p25.f000");
        assert_eq!(snapshot[0].1.len(), 16);
    }

    #[test]
    fn test_wgrib2_output() {
        let out = wgrib2_output(&REFERENCE_SAMPLE);
        let lines: Vec<_> = out.lines().collect();
        assert_eq!(lines.len(), 4);
        assert!(lines[0].contains(":GUST:surface:"));
        assert!(lines[1].ends_with("val=293.15"));
    }
}
