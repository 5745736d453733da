//! Unit conversions and derived wind quantities.

/// Knots per metre per second.
pub const KNOTS_PER_MS: f64 = 1.94384;

/// Offset between kelvin and degrees Celsius.
pub const KELVIN_OFFSET: f64 = 273.15;

/// 16-point compass labels, clockwise from north.
pub const CARDINALS: [&str; 16] = [
    "N", "NNE", "NE", "ENE", "E", "ESE", "SE", "SSE", "S", "SSW", "SW", "WSW", "W", "WNW", "NW",
    "NNW",
];

pub fn celsius(kelvin: f64) -> f64 {
    kelvin - KELVIN_OFFSET
}

pub fn kelvin(celsius: f64) -> f64 {
    celsius + KELVIN_OFFSET
}

pub fn knots(ms: f64) -> f64 {
    ms * KNOTS_PER_MS
}

/// Wind speed magnitude (m/s) from U and V components.
pub fn wind_speed(u: f64, v: f64) -> f64 {
    (u * u + v * v).sqrt()
}

/// Direction the wind blows FROM, in degrees within [0, 360).
///
/// Meteorological convention: 0 = from north, 90 = from east. U is the
/// eastward component, V the northward one.
pub fn wind_direction_from(u: f64, v: f64) -> f64 {
    normalize_degrees((-u).atan2(-v).to_degrees())
}

/// Wrap any finite angle into [0, 360).
pub fn normalize_degrees(degrees: f64) -> f64 {
    let wrapped = degrees.rem_euclid(360.0);
    // rem_euclid can round up to exactly 360 for tiny negative inputs
    if wrapped >= 360.0 { 0.0 } else { wrapped }
}

/// Compass label for a direction in degrees.
///
/// Total over all inputs; non-finite angles map to "N".
pub fn cardinal(degrees: f64) -> &'static str {
    if !degrees.is_finite() {
        return CARDINALS[0];
    }
    let sector = ((normalize_degrees(degrees) + 11.25) / 22.5).floor() as usize;
    CARDINALS[sector % 16]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wind_direction_from() {
        // Wind from the north blows southward: V negative
        assert!((wind_direction_from(0.0, -10.0) - 0.0).abs() < 1e-9);
        assert!((wind_direction_from(-10.0, 0.0) - 90.0).abs() < 1e-9);
        assert!((wind_direction_from(0.0, 10.0) - 180.0).abs() < 1e-9);
        assert!((wind_direction_from(10.0, 0.0) - 270.0).abs() < 1e-9);
    }

    #[test]
    fn test_cardinal_sector_edges() {
        assert_eq!(cardinal(0.0), "N");
        assert_eq!(cardinal(11.24), "N");
        assert_eq!(cardinal(11.25), "NNE");
        assert_eq!(cardinal(348.74), "NNW");
        assert_eq!(cardinal(348.75), "N");
        assert_eq!(cardinal(359.99), "N");
        assert_eq!(cardinal(135.0), "SE");
        assert_eq!(cardinal(315.0), "NW");
    }

    #[test]
    fn test_cardinal_negative_and_large() {
        assert_eq!(cardinal(-90.0), "W");
        assert_eq!(cardinal(450.0), "E");
        assert_eq!(cardinal(f64::NAN), "N");
    }

    #[test]
    fn test_normalize_degrees() {
        assert_eq!(normalize_degrees(-45.0), 315.0);
        assert_eq!(normalize_degrees(720.0), 0.0);
        assert!(normalize_degrees(-1e-18) < 360.0);
    }
}
