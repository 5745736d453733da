//! Timestamp-keyed merge of forecast points.

use std::collections::btree_map::{BTreeMap, Entry};

use chrono::{DateTime, Utc};
use forecast_common::ForecastPoint;

/// Collects forecast points, keeping one per valid time.
///
/// When two points share a valid time the one derived from the larger
/// forecast-hour offset wins. Equal offsets resolve to the later insertion.
#[derive(Debug, Default)]
pub struct ForecastMerger {
    entries: BTreeMap<DateTime<Utc>, (u32, ForecastPoint)>,
}

impl ForecastMerger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a point; returns false if an existing point was kept instead.
    pub fn insert(&mut self, forecast_hour: u32, point: ForecastPoint) -> bool {
        match self.entries.entry(point.valid_time) {
            Entry::Vacant(slot) => {
                slot.insert((forecast_hour, point));
                true
            }
            Entry::Occupied(mut slot) => {
                if forecast_hour >= slot.get().0 {
                    slot.insert((forecast_hour, point));
                    true
                } else {
                    false
                }
            }
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Points in ascending valid-time order.
    pub fn into_points(self) -> Vec<ForecastPoint> {
        self.entries.into_values().map(|(_, point)| point).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn point(hour: u32, temp_c: f64) -> ForecastPoint {
        ForecastPoint {
            valid_time: Utc.with_ymd_and_hms(2024, 5, 1, hour, 0, 0).unwrap(),
            temp_c,
            wind_kt: 0.0,
            gust_kt: 0.0,
            direction: "N".to_string(),
        }
    }

    #[test]
    fn test_larger_offset_wins_regardless_of_order() {
        let mut merger = ForecastMerger::new();
        assert!(merger.insert(7, point(12, 2.0)));
        assert!(!merger.insert(1, point(12, 1.0)));
        assert_eq!(merger.len(), 1);
        assert_eq!(merger.into_points()[0].temp_c, 2.0);
    }

    #[test]
    fn test_equal_offsets_last_write_wins() {
        let mut merger = ForecastMerger::new();
        merger.insert(3, point(3, 1.0));
        merger.insert(3, point(3, 5.0));
        assert_eq!(merger.into_points()[0].temp_c, 5.0);
    }

    #[test]
    fn test_output_ascending() {
        let mut merger = ForecastMerger::new();
        for hour in [5, 1, 3, 0, 2] {
            merger.insert(hour, point(hour, hour as f64));
        }
        let times: Vec<_> = merger.into_points().iter().map(|p| p.valid_time).collect();
        assert!(times.windows(2).all(|w| w[0] < w[1]));
        assert_eq!(times.len(), 5);
    }
}
