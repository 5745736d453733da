//! Round-trip and robustness tests for grid file names.

use forecast_common::filename::{self, cycle_hour, encode, forecast_hour};

#[test]
fn test_encode_decode_round_trip() {
    for cycle in [0, 6, 12, 18] {
        for offset in 0..=384 {
            let name = encode(cycle, filename::DEFAULT_RESOLUTION, offset);
            assert_eq!(forecast_hour(&name), Some(offset), "{}", name);
            assert_eq!(cycle_hour(&name), Some(cycle), "{}", name);
        }
    }
}

#[test]
fn test_decoding_never_panics() {
    let inputs = [
        "....",
        ".....",
        "a.b.c.d.e",
        "gfs.t00z.pgrb2.0p25.f",
        "gfs.tz.pgrb2.0p25.f001",
        "gfs.t00z.pgrb2.0p25.f+01",
        "gfs.t00z.pgrb2.0p25.f٣",
        "/",
        "\u{0}",
    ];
    for input in inputs {
        assert_eq!(forecast_hour(input), None, "{:?}", input);
    }
    assert_eq!(cycle_hour("gfs.tz.pgrb2.0p25.f001"), None);
}

#[test]
fn test_glob_matches_encoded_names() {
    let pattern = glob::Pattern::new(&filename::glob_pattern("0p25")).unwrap();
    assert!(pattern.matches(&encode(6, "0p25", 24)));
    assert!(!pattern.matches(&encode(6, "0p50", 24)));
}

#[test]
fn test_oversized_offset_has_no_valid_time() {
    let date = chrono::NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
    let name = "gfs.t00z.pgrb2.0p25.f4000000000";

    let offset = forecast_hour(name).unwrap();
    assert_eq!(filename::cycle_timestamp(date, 0, offset), None);
    assert!(filename::cycle_timestamp(date, 18, 384).is_some());
}
