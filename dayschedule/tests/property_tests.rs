//! Property tests for the partitioner, the phenological estimator and the
//! change markers.

mod support;

use std::sync::Arc;

use chrono::{Duration, NaiveDate, TimeZone};
use chrono_tz::Tz;
use proptest::prelude::*;

use dayschedule::astro::{keys, AstronomyRecord, LocalAstronomy};
use dayschedule::config::{AnchorDate, GeoLocation, SeasonalHourConfig};
use dayschedule::models::{ChangeAttribute, ChangeMarker};
use dayschedule::services::phenology;
use dayschedule::services::{partition, PartitionInput, SunDay};
use dayschedule::time::{DateContext, DEFAULT_WINDOW};
use dayschedule::ScheduleComputer;

use support::{berlin_settings, SOLSTICE_NOON};

const SIGNS: [&str; 3] = ["Aries", "Taurus", "Gemini"];

fn sun_day(sunrise: f64, visible: f64) -> SunDay {
    SunDay {
        sunrise: Some(sunrise),
        sunset: Some(sunrise + visible),
        visible,
        invisible: 24.0 - visible,
    }
}

fn noon_context(day_of_year: i64) -> DateContext {
    let date = NaiveDate::from_ymd_opt(2023, 1, 1).unwrap() + Duration::days(day_of_year);
    let ts = Tz::UTC
        .from_utc_datetime(&date.and_hms_opt(12, 0, 0).unwrap())
        .timestamp();
    DateContext::build(ts, Tz::UTC, 0).unwrap()
}

/// Provider for 2024-06-19..=2024-06-24 with one moon sign per day.
fn moon_sign_provider(signs: &[usize]) -> LocalAstronomy {
    let provider = LocalAstronomy::new();
    let start = NaiveDate::from_ymd_opt(2024, 6, 19).unwrap();
    for (i, sign) in signs.iter().enumerate() {
        let record = AstronomyRecord::new()
            .with(keys::SUN_RISE, "04:43")
            .with(keys::SUN_SET, "21:33")
            .with(keys::MOON_SIGN, SIGNS[*sign]);
        provider.insert(start + Duration::days(i as i64), record);
    }
    provider
}

proptest! {
    #[test]
    fn prop_index_within_partition_range(
        parts in 1u8..=24,
        sunrise in 2.0..8.0f64,
        visible in 6.0..15.0f64,
        time in 0.0..24.0f64,
    ) {
        let config = SeasonalHourConfig { day_parts: parts, night_parts: parts, roman: false };
        let input = PartitionInput {
            time,
            today: sun_day(sunrise, visible),
            tomorrow: None,
            sun_altitude: None,
        };
        let p = partition(&input, &config);
        let n = parts as i32;
        prop_assert!(p.index != 0);
        prop_assert!((1..=n).contains(&p.index) || (-n..=-1).contains(&p.index));
        prop_assert_eq!(p.index > 0, time >= sunrise && time < sunrise + visible);
    }

    #[test]
    fn prop_index_nonzero_for_degenerate_days(
        day_parts in 1u8..=24,
        night_parts in 1u8..=24,
        sunrise in proptest::option::of(0.0..24.0f64),
        sunset in proptest::option::of(0.0..24.0f64),
        visible in 0.0..=24.0f64,
        altitude in proptest::option::of(-30.0..30.0f64),
        time in 0.0..24.0f64,
    ) {
        let config = SeasonalHourConfig { day_parts, night_parts, roman: false };
        let input = PartitionInput {
            time,
            today: SunDay { sunrise, sunset, visible, invisible: 24.0 - visible },
            tomorrow: None,
            sun_altitude: altitude,
        };
        let index = partition(&input, &config).index;
        prop_assert!((1..=day_parts as i32).contains(&index)
            || (-(night_parts as i32)..=-1).contains(&index));
    }

    #[test]
    fn prop_boundaries_increase(
        parts in 1u8..=24,
        sunrise in 2.0..8.0f64,
        visible in 6.0..15.0f64,
        time in 0.0..24.0f64,
    ) {
        let config = SeasonalHourConfig { day_parts: parts, night_parts: parts, roman: false };
        let today = sun_day(sunrise, visible);
        let input = PartitionInput { time, today, tomorrow: Some(today), sun_altitude: None };
        let p = partition(&input, &config);

        let day: Vec<f64> = p.boundaries.iter().filter(|b| b.index > 0).filter_map(|b| b.begin).collect();
        let night: Vec<f64> = p.boundaries.iter().filter(|b| b.index < 0).filter_map(|b| b.begin).collect();
        prop_assert_eq!(day.len(), parts as usize);
        prop_assert_eq!(night.len(), parts as usize);
        prop_assert!(day.windows(2).all(|w| w[0] < w[1]));
        prop_assert!(night.windows(2).all(|w| w[0] < w[1]));

        // Every boundary is upcoming once tomorrow is known
        prop_assert!(p.boundaries.iter().all(|b| b.upcoming.map_or(false, |u| u >= time)));
    }

    #[test]
    fn prop_next_boundary_within_one_part(
        parts in 1u8..=24,
        sunrise in 2.0..8.0f64,
        visible in 6.0..15.0f64,
        time in 0.0..24.0f64,
    ) {
        let config = SeasonalHourConfig { day_parts: parts, night_parts: parts, roman: false };
        let today = sun_day(sunrise, visible);
        let input = PartitionInput { time, today, tomorrow: Some(today), sun_altitude: None };
        let p = partition(&input, &config);

        let next = p.next.and_then(|b| b.upcoming);
        prop_assert!(next.is_some());
        let wait = next.unwrap_or(f64::INFINITY) - time;
        prop_assert!(wait >= 0.0);
        prop_assert!(wait <= p.daypart_len.max(p.nightpart_len) + 1e-9);
    }

    #[test]
    fn prop_pheno_index_in_range(
        latitude in 35.0..=71.0f64,
        longitude in -11.0..=25.0f64,
        day in 0i64..365,
    ) {
        let season = phenology::estimate(
            &noon_context(day),
            &GeoLocation::new(latitude, longitude, 0.0),
            AnchorDate::EARLY_SPRING,
            AnchorDate::EARLY_FALL,
        );
        prop_assert!(matches!(season, Some(s) if s.index <= 9));
    }

    #[test]
    fn prop_pheno_outside_region(
        latitude in -90.0..34.9f64,
        longitude in -180.0..180.0f64,
        day in 0i64..365,
    ) {
        let season = phenology::estimate(
            &noon_context(day),
            &GeoLocation::new(latitude, longitude, 0.0),
            AnchorDate::EARLY_SPRING,
            AnchorDate::EARLY_FALL,
        );
        prop_assert!(season.is_none());
    }

    #[test]
    fn prop_change_markers_pair_in_one_direction(
        signs in proptest::collection::vec(0usize..SIGNS.len(), 6),
    ) {
        let computer = ScheduleComputer::new(berlin_settings(), Arc::new(moon_sign_provider(&signs)));
        let anchor = DateContext::build(SOLSTICE_NOON, Tz::Europe__Berlin, DEFAULT_WINDOW).unwrap();
        let window = computer.compute(&anchor).unwrap();
        let marker = |offset: i32| {
            window.get(offset).and_then(|r| r.marker(ChangeAttribute::MoonSign))
        };

        for offset in -2..=2 {
            match marker(offset) {
                Some(ChangeMarker::ChangesTomorrow) => {
                    prop_assert_eq!(marker(offset + 1), Some(ChangeMarker::ChangedToday));
                    // Offset k is day index k + 2 of the provider
                    let day = (offset + 2) as usize;
                    prop_assert_ne!(signs[day], signs[day + 1]);
                }
                Some(ChangeMarker::ChangedToday) => {
                    prop_assert_eq!(marker(offset - 1), Some(ChangeMarker::ChangesTomorrow));
                }
                None => {}
            }
        }

        // With tomorrow still unmarked, the anchor's forward change wins
        // over its backward one
        if signs[2] != signs[3] && signs[3] == signs[4] {
            prop_assert_ne!(marker(-1), Some(ChangeMarker::ChangesTomorrow));
            prop_assert_eq!(marker(0), Some(ChangeMarker::ChangesTomorrow));
        }
    }
}
