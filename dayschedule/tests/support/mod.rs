#![allow(dead_code)]

use chrono::{Duration, NaiveDate};
use chrono_tz::Tz;

use dayschedule::astro::{AstronomyRecord, LocalAstronomy};
use dayschedule::config::{GeoLocation, ScheduleSettings};

/// 2024-06-21 10:00:00 UTC, noon in Berlin.
pub const SOLSTICE_NOON: i64 = 1_718_964_000;

/// Astronomy records for Berlin, 2024-06-18 to 2024-06-24.
pub const BERLIN_JUNE: &str = include_str!("../../data/berlin-2024-06.json");

pub fn berlin() -> GeoLocation {
    GeoLocation::new(52.52, 13.405, 34.0)
}

pub fn berlin_provider() -> LocalAstronomy {
    LocalAstronomy::from_json_str(BERLIN_JUNE).expect("bundled Berlin records parse")
}

pub fn berlin_settings() -> ScheduleSettings {
    ScheduleSettings::new(berlin(), Tz::Europe__Berlin)
}

/// Provider returning the same record for `days` consecutive dates.
pub fn uniform_provider(start: NaiveDate, days: i64, record: AstronomyRecord) -> LocalAstronomy {
    let provider = LocalAstronomy::new();
    for i in 0..days {
        provider.insert(start + Duration::days(i), record.clone());
    }
    provider
}

/// Unix timestamp of a local wall-clock time.
pub fn local_timestamp(tz: Tz, year: i32, month: u32, day: u32, hour: u32) -> i64 {
    use chrono::TimeZone;
    tz.with_ymd_and_hms(year, month, day, hour, 0, 0)
        .single()
        .expect("unambiguous local time")
        .timestamp()
}
