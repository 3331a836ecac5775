//! Phenological season estimate for observers in Europe.
//!
//! Spring is modelled as a front spreading from south-western Iberia and fall
//! as one spreading from southern Finland. The front's travel along the
//! great circle to the observer, at fixed empirical speeds, decides the
//! stage reached since the configured early spring / early fall dates.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::config::{AnchorDate, GeoLocation};
use crate::services::seasons::MeteoSeason;
use crate::time::DateContext;

/// Mean earth radius in kilometres.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Origin of the early spring front (latitude, longitude).
pub const SPRING_ORIGIN: (f64, f64) = (37.136633, -8.817837);

/// Origin of the early fall front (latitude, longitude).
pub const FALL_ORIGIN: (f64, f64) = (60.161880, 24.939573);

const LATITUDE_RANGE: (f64, f64) = (35.0, 71.0);
const LONGITUDE_RANGE: (f64, f64) = (-11.0, 25.0);

// Front speeds in km/day
const SPRING_EARLY_SPEED: f64 = 37.5;
const SPRING_FIRST_SPEED: f64 = 31.0;
const SPRING_FULL_SPEED: f64 = 37.5;
const FALL_EARLY_SPEED: f64 = 35.0;
const FALL_FULL_SPEED: f64 = 29.5;
const FALL_LATE_SPEED: f64 = 45.0;

const STAGES: [&str; 9] = [
    "Early Spring",
    "First Spring",
    "Full Spring",
    "Early Summer",
    "Midsummer",
    "Late Summer",
    "Early Fall",
    "Full Fall",
    "Late Fall",
];

/// Estimated phenological stage, 0 (winter) to 9 (late fall).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhenoSeason {
    pub index: u8,
}

impl PhenoSeason {
    pub fn new(index: u8) -> Self {
        Self { index: index.min(9) }
    }

    /// Stage name; winter comes from the meteorological season labels.
    pub fn name(&self) -> &'static str {
        match self.index {
            0 => MeteoSeason::Winter.name(),
            i => STAGES[(i as usize - 1).min(STAGES.len() - 1)],
        }
    }
}

impl fmt::Display for PhenoSeason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Whether the estimator covers `location`.
pub fn in_region(location: &GeoLocation) -> bool {
    (LATITUDE_RANGE.0..=LATITUDE_RANGE.1).contains(&location.latitude)
        && (LONGITUDE_RANGE.0..=LONGITUDE_RANGE.1).contains(&location.longitude)
}

/// Haversine distance in kilometres between two (latitude, longitude) points.
pub fn great_circle_km(from: (f64, f64), to: (f64, f64)) -> f64 {
    let (lat1, lon1) = (from.0.to_radians(), from.1.to_radians());
    let (lat2, lon2) = (to.0.to_radians(), to.1.to_radians());
    let dlat = lat2 - lat1;
    let dlon = lon2 - lon1;
    let a = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_KM * a.sqrt().min(1.0).asin()
}

/// Estimate the phenological season of `ctx` at `location`.
///
/// # Arguments
/// * `ctx` - Day to classify
/// * `location` - Observer position
/// * `early_spring` - Date the spring front leaves its origin
/// * `early_fall` - Date the fall front leaves its origin
///
/// # Returns
/// * `Some(PhenoSeason)` for observers within latitude 35..71 N and
///   longitude -11..25 E
/// * `None` outside that region
pub fn estimate(
    ctx: &DateContext,
    location: &GeoLocation,
    early_spring: AnchorDate,
    early_fall: AnchorDate,
) -> Option<PhenoSeason> {
    if !in_region(location) {
        return None;
    }

    let observer = (location.latitude, location.longitude);
    let path = great_circle_km(SPRING_ORIGIN, FALL_ORIGIN);
    let date = ctx.date();
    let days_since = |anchor: AnchorDate| {
        anchor
            .in_year(ctx.year)
            .map(|start| (date - start).num_days() as f64)
    };

    // Branches run in month order; a later branch overrides an earlier one.
    let mut index = match ctx.month {
        6..=8 => ctx.month as u8 - 2,
        9..=11 => 6,
        _ => 0,
    };

    if ctx.month < 6 {
        if let Some(days) = days_since(early_spring) {
            let d = great_circle_km(SPRING_ORIGIN, observer);
            index = if days < 0.0 {
                0
            } else if d - days * SPRING_EARLY_SPEED > 0.4 * d {
                1
            } else if d - days * SPRING_FIRST_SPEED > 0.0 {
                2
            } else if days * SPRING_FULL_SPEED < path {
                3
            } else {
                4
            };
        }
    }

    if (8..=11).contains(&ctx.month) {
        if let Some(days) = days_since(early_fall).filter(|d| *d >= 0.0) {
            let d = great_circle_km(FALL_ORIGIN, observer);
            index = if d - days * FALL_EARLY_SPEED > 0.4 * d {
                7
            } else if d - days * FALL_FULL_SPEED > 0.0 {
                8
            } else if days * FALL_LATE_SPEED < path {
                9
            } else {
                0
            };
        }
    }

    log::trace!(
        "Phenological season for {} at ({:.3}, {:.3}): {}",
        date,
        location.latitude,
        location.longitude,
        index
    );
    Some(PhenoSeason::new(index))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono_tz::Tz;

    // ==================== Helper Functions ====================

    fn ctx(year: i32, month: u32, day: u32) -> DateContext {
        let ts = chrono::NaiveDate::from_ymd_opt(year, month, day)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap()
            .and_utc()
            .timestamp();
        DateContext::build(ts, Tz::UTC, 0).unwrap()
    }

    fn frankfurt() -> GeoLocation {
        GeoLocation::new(50.0, 8.0, 100.0)
    }

    fn estimate_at(location: &GeoLocation, year: i32, month: u32, day: u32) -> Option<u8> {
        estimate(
            &ctx(year, month, day),
            location,
            AnchorDate::EARLY_SPRING,
            AnchorDate::EARLY_FALL,
        )
        .map(|p| p.index)
    }

    // ==================== Tests ====================

    #[test]
    fn test_great_circle_distance() {
        // Paris to London is about 344 km
        let d = great_circle_km((48.8566, 2.3522), (51.5074, -0.1278));
        assert!((d - 343.5).abs() < 2.0, "got {}", d);
        assert_eq!(great_circle_km(SPRING_ORIGIN, SPRING_ORIGIN), 0.0);
    }

    #[test]
    fn test_spring_begun_after_anchor() {
        let index = estimate_at(&frankfurt(), 2024, 3, 5).unwrap();
        assert!(index >= 1);
        assert_eq!(index, 1);
    }

    #[test]
    fn test_winter_before_spring_anchor() {
        assert_eq!(estimate_at(&frankfurt(), 2024, 2, 1), Some(0));
        assert_eq!(estimate_at(&frankfurt(), 2024, 12, 15), Some(0));
    }

    #[test]
    fn test_summer_months_follow_calendar() {
        assert_eq!(estimate_at(&frankfurt(), 2023, 6, 15), Some(4));
        assert_eq!(estimate_at(&frankfurt(), 2023, 7, 15), Some(5));
        assert_eq!(estimate_at(&frankfurt(), 2023, 8, 10), Some(6));
    }

    #[test]
    fn test_fall_front_overrides_august() {
        // Helsinki sits on the fall origin, fall starts on the anchor date
        let helsinki = GeoLocation::new(60.17, 24.94, 0.0);
        assert_eq!(estimate_at(&helsinki, 2023, 8, 25), Some(9));
        assert_eq!(estimate_at(&helsinki, 2023, 11, 30), Some(0));
    }

    #[test]
    fn test_outside_region() {
        let nyc = GeoLocation::new(40.7, -74.0, 10.0);
        for month in 1..=12 {
            assert_eq!(estimate_at(&nyc, 2024, month, 10), None);
        }
    }

    #[test]
    fn test_winter_label_source() {
        assert_eq!(PhenoSeason::new(0).name(), "Winter");
        assert_eq!(PhenoSeason::new(5).name(), "Midsummer");
        assert_eq!(PhenoSeason::new(9).name(), "Late Fall");
    }
}
