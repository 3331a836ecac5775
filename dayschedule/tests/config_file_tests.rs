//! Loading configuration and astronomy records from files.

mod support;

use std::io::Write;
use std::sync::Arc;

use chrono_tz::Tz;
use tempfile::NamedTempFile;

use dayschedule::astro::LocalAstronomy;
use dayschedule::config::{ScheduleConfig, SeasonalHourConfig};
use dayschedule::models::EventKind;
use dayschedule::{DaySchedule, ScheduleError};

use support::*;

fn write_temp(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file
}

#[test]
fn test_bundled_config_loads() {
    let path = concat!(env!("CARGO_MANIFEST_DIR"), "/data/berlin.toml");
    let settings = ScheduleConfig::from_file(path).unwrap().validate().unwrap();
    assert_eq!(settings.timezone, Tz::Europe__Berlin);
    assert_eq!(settings.horizon.morning, -0.833);
    assert!(settings.schema.contains(EventKind::SeasonalHr));
    assert!(!settings.schema.contains(EventKind::AstroTwilight));
}

#[test]
fn test_roman_config_from_file() {
    let file = write_temp(
        r#"
latitude = 52.52
longitude = 13.405
seasonal_hrs = "4"
timezone = "Europe/Berlin"
"#,
    );
    let settings = ScheduleConfig::from_file(file.path())
        .unwrap()
        .validate()
        .unwrap();
    assert_eq!(settings.seasonal_hours, SeasonalHourConfig::ROMAN);

    let schedule = DaySchedule::new(settings, Arc::new(berlin_provider()));
    let record = schedule.update(SOLSTICE_NOON).unwrap();
    assert_eq!(record.seasonal_hours.night_parts, 4);
    assert!(record.daytime.starts_with("Hora "));
    assert_eq!(record.daytime_index, None);
}

#[test]
fn test_invalid_anchor_date_rejected() {
    let file = write_temp("latitude = 50.0\nlongitude = 8.0\nearly_spring = \"04-01\"\n");
    let err = ScheduleConfig::from_file(file.path())
        .unwrap()
        .validate()
        .unwrap_err();
    assert!(matches!(err, ScheduleError::Configuration(_)));
}

#[test]
fn test_missing_config_file() {
    let err = ScheduleConfig::from_file("/nonexistent/dayschedule.toml").unwrap_err();
    assert!(err.to_string().contains("Failed to read config file"));
}

#[test]
fn test_malformed_toml() {
    let file = write_temp("latitude = \n");
    let err = ScheduleConfig::from_file(file.path()).unwrap_err();
    assert!(matches!(err, ScheduleError::Configuration(_)));
}

#[test]
fn test_astronomy_records_from_file() {
    let file = write_temp(BERLIN_JUNE);
    let provider = LocalAstronomy::from_file(file.path()).unwrap();
    assert_eq!(provider.len(), 7);

    let file = write_temp("{ not json");
    assert!(matches!(
        LocalAstronomy::from_file(file.path()),
        Err(ScheduleError::Parse(_))
    ));
}
