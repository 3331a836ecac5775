//! Schedule configuration.
//!
//! [`ScheduleConfig`] is the raw, serde-deserializable form read from a TOML
//! file or supplied by a host. [`ScheduleConfig::validate`] turns it into the
//! typed [`ScheduleSettings`] the computation consumes; the computation itself
//! never re-validates.

use std::fs;
use std::path::Path;

use chrono::NaiveDate;
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::error::{ScheduleError, ScheduleResult};
use crate::models::{EventKind, ScheduleSchema};
use crate::time::{days_in_month, is_leap_year, parse_timezone};

/// Raw schedule configuration.
///
/// ```toml
/// latitude = 52.52
/// longitude = 13.405
/// altitude = 34.0
/// horizon = "-0.833:-0.833"
/// seasonal_hrs = "12"
/// early_spring = "02-22"
/// early_fall = "08-20"
/// schedule = ["SunRise", "SunSet", "SeasonalHr"]
/// timezone = "Europe/Berlin"
/// language = "DE"
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleConfig {
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default)]
    pub altitude: f64,
    /// Horizon angle in degrees, `"H"` or `"MORNING:EVENING"`.
    #[serde(default = "default_horizon")]
    pub horizon: String,
    /// Seasonal hour partitioning, `"N"`, `"DAY:NIGHT"` or `"4"` for roman mode.
    #[serde(default = "default_seasonal_hrs")]
    pub seasonal_hrs: String,
    #[serde(default = "default_early_spring")]
    pub early_spring: String,
    #[serde(default = "default_early_fall")]
    pub early_fall: String,
    #[serde(default = "default_schedule")]
    pub schedule: Vec<EventKind>,
    #[serde(default = "default_timezone")]
    pub timezone: String,
    #[serde(default = "default_language")]
    pub language: String,
}

fn default_horizon() -> String {
    "0".to_string()
}

fn default_seasonal_hrs() -> String {
    "12".to_string()
}

fn default_early_spring() -> String {
    "02-22".to_string()
}

fn default_early_fall() -> String {
    "08-20".to_string()
}

fn default_schedule() -> Vec<EventKind> {
    EventKind::ALL.to_vec()
}

fn default_timezone() -> String {
    "UTC".to_string()
}

fn default_language() -> String {
    "EN".to_string()
}

/// Observer location.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoLocation {
    /// Latitude in degrees, north positive.
    pub latitude: f64,
    /// Longitude in degrees, east positive.
    pub longitude: f64,
    /// Altitude above sea level in meters.
    pub altitude: f64,
}

impl GeoLocation {
    pub fn new(latitude: f64, longitude: f64, altitude: f64) -> Self {
        Self {
            latitude,
            longitude,
            altitude,
        }
    }

    pub fn is_southern(&self) -> bool {
        self.latitude < 0.0
    }
}

/// Horizon dip angles for morning and evening events.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Horizon {
    pub morning: f64,
    pub evening: f64,
}

impl Horizon {
    /// Parse `"H"` or `"MORNING:EVENING"`, each within `[-45, 45]` degrees.
    pub fn parse(s: &str) -> ScheduleResult<Self> {
        let parse_angle = |part: &str| -> ScheduleResult<f64> {
            let angle: f64 = part.trim().parse().map_err(|_| {
                ScheduleError::Configuration(format!("Invalid horizon angle: {}", part))
            })?;
            if !(-45.0..=45.0).contains(&angle) {
                return Err(ScheduleError::Configuration(format!(
                    "Horizon angle {} out of range [-45, 45]",
                    angle
                )));
            }
            Ok(angle)
        };

        match s.split_once(':') {
            Some((morning, evening)) => Ok(Self {
                morning: parse_angle(morning)?,
                evening: parse_angle(evening)?,
            }),
            None => {
                let angle = parse_angle(s)?;
                Ok(Self {
                    morning: angle,
                    evening: angle,
                })
            }
        }
    }
}

/// Seasonal hour partitioning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeasonalHourConfig {
    pub day_parts: u8,
    pub night_parts: u8,
    /// Roman mode: 12 day hours and 4 night watches with Latin labels.
    pub roman: bool,
}

impl Default for SeasonalHourConfig {
    fn default() -> Self {
        Self {
            day_parts: 12,
            night_parts: 12,
            roman: false,
        }
    }
}

impl SeasonalHourConfig {
    /// Roman day: twelve horae and four vigiliae.
    pub const ROMAN: SeasonalHourConfig = SeasonalHourConfig {
        day_parts: 12,
        night_parts: 4,
        roman: true,
    };

    /// Parse `"N"`, `"DAY:NIGHT"` (each 1..=24) or the literal `"4"` for
    /// roman mode.
    pub fn parse(s: &str) -> ScheduleResult<Self> {
        let parse_parts = |part: &str| -> ScheduleResult<u8> {
            let n: u8 = part.trim().parse().map_err(|_| {
                ScheduleError::Configuration(format!("Invalid seasonal hours: {}", s))
            })?;
            if !(1..=24).contains(&n) {
                return Err(ScheduleError::Configuration(format!(
                    "Seasonal hours {} out of range [1, 24]",
                    n
                )));
            }
            Ok(n)
        };

        match s.split_once(':') {
            Some((day, night)) => Ok(Self {
                day_parts: parse_parts(day)?,
                night_parts: parse_parts(night)?,
                roman: false,
            }),
            None if s.trim() == "4" => Ok(Self::ROMAN),
            None => {
                let n = parse_parts(s)?;
                Ok(Self {
                    day_parts: n,
                    night_parts: n,
                    roman: false,
                })
            }
        }
    }
}

/// Month and day of a yearly phenological anchor date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnchorDate {
    pub month: u32,
    pub day: u32,
}

impl AnchorDate {
    pub const EARLY_SPRING: AnchorDate = AnchorDate { month: 2, day: 22 };
    pub const EARLY_FALL: AnchorDate = AnchorDate { month: 8, day: 20 };

    /// Parse `MM-DD`, restricting the month to `allowed_months`.
    pub fn parse(s: &str, allowed_months: &[u32]) -> ScheduleResult<Self> {
        let invalid = || ScheduleError::Configuration(format!("Invalid anchor date: {}", s));
        let (m, d) = s.trim().split_once('-').ok_or_else(invalid)?;
        if m.len() != 2 || d.len() != 2 {
            return Err(invalid());
        }
        let month: u32 = m.parse().map_err(|_| invalid())?;
        let day: u32 = d.parse().map_err(|_| invalid())?;

        if !allowed_months.contains(&month) {
            return Err(ScheduleError::Configuration(format!(
                "Anchor date {} must fall in months {:?}",
                s, allowed_months
            )));
        }
        // Validated against a common year so the date exists every year
        if day == 0 || day > days_in_month(2001, month) {
            return Err(invalid());
        }
        Ok(Self { month, day })
    }

    /// Concrete date in `year`.
    ///
    /// In leap years an anchor after February 28 moves one day earlier so it
    /// keeps the same day of year as in common years.
    pub fn in_year(&self, year: i32) -> Option<NaiveDate> {
        let date = NaiveDate::from_ymd_opt(year, self.month, self.day)?;
        if is_leap_year(year) && self.month > 2 {
            date.pred_opt()
        } else {
            Some(date)
        }
    }
}

/// Validated settings consumed by the schedule computer.
#[derive(Debug, Clone, PartialEq)]
pub struct ScheduleSettings {
    pub location: GeoLocation,
    pub horizon: Horizon,
    pub seasonal_hours: SeasonalHourConfig,
    pub early_spring: AnchorDate,
    pub early_fall: AnchorDate,
    pub schema: ScheduleSchema,
    pub timezone: Tz,
    pub language: String,
}

impl ScheduleSettings {
    /// Settings with defaults for everything but the location.
    pub fn new(location: GeoLocation, timezone: Tz) -> Self {
        Self {
            location,
            horizon: Horizon::default(),
            seasonal_hours: SeasonalHourConfig::default(),
            early_spring: AnchorDate::EARLY_SPRING,
            early_fall: AnchorDate::EARLY_FALL,
            schema: ScheduleSchema::all(),
            timezone,
            language: default_language(),
        }
    }

    pub fn with_schema(mut self, schema: ScheduleSchema) -> Self {
        self.schema = schema;
        self
    }

    pub fn with_seasonal_hours(mut self, seasonal_hours: SeasonalHourConfig) -> Self {
        self.seasonal_hours = seasonal_hours;
        self
    }
}

impl ScheduleConfig {
    /// Configuration with defaults for everything but the location.
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
            altitude: 0.0,
            horizon: default_horizon(),
            seasonal_hrs: default_seasonal_hrs(),
            early_spring: default_early_spring(),
            early_fall: default_early_fall(),
            schedule: default_schedule(),
            timezone: default_timezone(),
            language: default_language(),
        }
    }

    /// Load configuration from a TOML file.
    ///
    /// # Arguments
    /// * `path` - Path to the configuration file
    ///
    /// # Returns
    /// * `Ok(ScheduleConfig)` if successful
    /// * `Err(ScheduleError)` if file cannot be read or parsed
    pub fn from_file<P: AsRef<Path>>(path: P) -> ScheduleResult<Self> {
        let content = fs::read_to_string(path.as_ref()).map_err(|e| {
            ScheduleError::Configuration(format!(
                "Failed to read config file {}: {}",
                path.as_ref().display(),
                e
            ))
        })?;
        Self::from_toml_str(&content)
    }

    /// Parse configuration from TOML text.
    pub fn from_toml_str(content: &str) -> ScheduleResult<Self> {
        let config: ScheduleConfig = toml::from_str(content)?;
        Ok(config)
    }

    /// Validate ranges and patterns and build typed settings.
    ///
    /// # Returns
    /// * `Ok(ScheduleSettings)` if every field is valid
    /// * `Err(ScheduleError::Configuration)` naming the first invalid field
    pub fn validate(&self) -> ScheduleResult<ScheduleSettings> {
        if !(-90.0..=90.0).contains(&self.latitude) {
            return Err(ScheduleError::Configuration(format!(
                "Latitude {} out of range [-90, 90]",
                self.latitude
            )));
        }
        if !(-180.0..=180.0).contains(&self.longitude) {
            return Err(ScheduleError::Configuration(format!(
                "Longitude {} out of range [-180, 180]",
                self.longitude
            )));
        }
        if !(self.altitude >= 0.0) {
            return Err(ScheduleError::Configuration(format!(
                "Altitude {} must be non-negative",
                self.altitude
            )));
        }

        let timezone = parse_timezone(&self.timezone)
            .map_err(|e| ScheduleError::Configuration(e.to_string()))?;

        Ok(ScheduleSettings {
            location: GeoLocation::new(self.latitude, self.longitude, self.altitude),
            horizon: Horizon::parse(&self.horizon)?,
            seasonal_hours: SeasonalHourConfig::parse(&self.seasonal_hrs)?,
            early_spring: AnchorDate::parse(&self.early_spring, &[2, 3])?,
            early_fall: AnchorDate::parse(&self.early_fall, &[8, 9])?,
            schema: self.schedule.iter().copied().collect(),
            timezone,
            language: self.language.trim().to_uppercase(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_from_minimal_toml() {
        let config = ScheduleConfig::from_toml_str("latitude = 50.0\nlongitude = 8.0\n").unwrap();
        let settings = config.validate().unwrap();
        assert_eq!(settings.seasonal_hours, SeasonalHourConfig::default());
        assert_eq!(settings.early_spring, AnchorDate::EARLY_SPRING);
        assert_eq!(settings.early_fall, AnchorDate::EARLY_FALL);
        assert_eq!(settings.schema, ScheduleSchema::all());
        assert_eq!(settings.timezone, Tz::UTC);
        assert_eq!(settings.horizon, Horizon::default());
    }

    #[test]
    fn test_rejects_out_of_range_location() {
        let err = ScheduleConfig::new(91.0, 0.0).validate().unwrap_err();
        assert!(err.to_string().contains("Latitude"));
        let err = ScheduleConfig::new(0.0, -180.5).validate().unwrap_err();
        assert!(err.to_string().contains("Longitude"));
    }

    #[test]
    fn test_horizon_parse() {
        assert_eq!(
            Horizon::parse("-6:-4").unwrap(),
            Horizon {
                morning: -6.0,
                evening: -4.0
            }
        );
        assert_eq!(Horizon::parse("2.5").unwrap().evening, 2.5);
        assert!(Horizon::parse("46").is_err());
        assert!(Horizon::parse("abc").is_err());
    }

    #[test]
    fn test_seasonal_hours_parse() {
        assert_eq!(
            SeasonalHourConfig::parse("12").unwrap(),
            SeasonalHourConfig::default()
        );
        assert_eq!(
            SeasonalHourConfig::parse("4").unwrap(),
            SeasonalHourConfig::ROMAN
        );
        let custom = SeasonalHourConfig::parse("4:4").unwrap();
        assert_eq!((custom.day_parts, custom.night_parts, custom.roman), (4, 4, false));
        assert!(SeasonalHourConfig::parse("0").is_err());
        assert!(SeasonalHourConfig::parse("12:25").is_err());
    }

    #[test]
    fn test_anchor_date_parse() {
        assert_eq!(
            AnchorDate::parse("03-01", &[2, 3]).unwrap(),
            AnchorDate { month: 3, day: 1 }
        );
        assert!(AnchorDate::parse("04-01", &[2, 3]).is_err());
        assert!(AnchorDate::parse("02-30", &[2, 3]).is_err());
        assert!(AnchorDate::parse("2-22", &[2, 3]).is_err());
    }

    #[test]
    fn test_anchor_date_leap_shift() {
        let spring = AnchorDate::EARLY_SPRING;
        assert_eq!(spring.in_year(2024), NaiveDate::from_ymd_opt(2024, 2, 22));

        let fall = AnchorDate::EARLY_FALL;
        assert_eq!(fall.in_year(2023), NaiveDate::from_ymd_opt(2023, 8, 20));
        assert_eq!(fall.in_year(2024), NaiveDate::from_ymd_opt(2024, 8, 19));

        let march = AnchorDate { month: 3, day: 1 };
        assert_eq!(march.in_year(2024), NaiveDate::from_ymd_opt(2024, 2, 29));
    }

    #[test]
    fn test_schedule_list_parsed() {
        let config = ScheduleConfig::from_toml_str(
            "latitude = 1.0\nlongitude = 2.0\nschedule = [\"SunRise\", \"ObsIsDST\"]\n",
        )
        .unwrap();
        let settings = config.validate().unwrap();
        assert_eq!(settings.schema.len(), 2);
        assert!(settings.schema.contains(EventKind::ObsIsDst));

        assert!(ScheduleConfig::from_toml_str(
            "latitude = 1.0\nlongitude = 2.0\nschedule = [\"Nope\"]\n"
        )
        .is_err());
    }

    #[test]
    fn test_unknown_timezone_is_configuration_error() {
        let mut config = ScheduleConfig::new(50.0, 8.0);
        config.timezone = "Nowhere/Land".to_string();
        assert!(matches!(
            config.validate(),
            Err(ScheduleError::Configuration(_))
        ));
    }
}
