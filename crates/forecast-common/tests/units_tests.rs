//! Property-style tests for unit conversions and compass mapping.

use forecast_common::units::{cardinal, celsius, kelvin, knots, wind_direction_from, CARDINALS};

// ============================================================================
// Direction tests
// ============================================================================

#[test]
fn test_cardinal_is_cyclic() {
    let mut deg = -1080.0;
    while deg <= 1080.0 {
        assert_eq!(cardinal(deg), cardinal(deg + 360.0), "deg = {}", deg);
        assert_eq!(cardinal(deg), cardinal(deg - 720.0), "deg = {}", deg);
        deg += 0.37;
    }
}

#[test]
fn test_cardinal_is_total() {
    for deg in [f64::MIN, -1e12, -0.0, 0.0, 1e12, f64::MAX, f64::INFINITY, f64::NEG_INFINITY] {
        assert!(CARDINALS.contains(&cardinal(deg)));
    }
}

#[test]
fn test_sector_centres() {
    for (i, label) in CARDINALS.iter().enumerate() {
        assert_eq!(cardinal(i as f64 * 22.5), *label);
    }
}

#[test]
fn test_direction_from_components() {
    // u=2, v=-2 blows toward the south-east, i.e. from the north-west
    let deg = wind_direction_from(2.0, -2.0);
    assert!((deg - 315.0).abs() < 1e-9);
    assert_eq!(cardinal(deg), "NW");

    let deg = wind_direction_from(-2.0, 2.0);
    assert!((deg - 135.0).abs() < 1e-9);
    assert_eq!(cardinal(deg), "SE");
}

// ============================================================================
// Speed and temperature tests
// ============================================================================

#[test]
fn test_knots_is_linear() {
    for x in [0.0, 0.5, 1.0, 2.828, 10.0, 45.5, 1000.0] {
        assert_eq!(knots(x), 1.94384 * x);
    }
}

#[test]
fn test_celsius_round_trip() {
    for k in [0.0, 173.2, 273.15, 293.15, 310.0, 330.55] {
        assert_eq!(celsius(k), k - 273.15);
        assert!((kelvin(celsius(k)) - k).abs() < 1e-9);
    }
}
