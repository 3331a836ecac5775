//! Calendar and clock breakdown of an instant in a named timezone.
//!
//! A [`DateContext`] is the input every other computation starts from. The
//! anchor context optionally carries a window of nested contexts, one per
//! whole-day offset, built from `timestamp + offset * 86400` seconds.

use std::collections::BTreeMap;

use chrono::{DateTime, Datelike, Duration, NaiveDate, Offset, TimeZone, Timelike, Utc};
use chrono_tz::{OffsetComponents, Tz};
use serde::{Deserialize, Serialize};

use crate::error::{ScheduleError, ScheduleResult};

/// Seconds in one civil day.
pub const SECONDS_PER_DAY: i64 = 86_400;

/// Default number of days built on each side of the anchor.
pub const DEFAULT_WINDOW: u32 = 2;

/// Structured calendar/clock breakdown of one instant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DateContext {
    /// Unix timestamp in whole seconds.
    pub timestamp: i64,
    /// IANA timezone name the breakdown was computed in.
    pub timezone: String,
    pub year: i32,
    pub month: u32,
    pub day: u32,
    pub hour: u32,
    pub minute: u32,
    pub second: u32,
    /// Local time of day in fractional hours, `[0, 24)`.
    pub day_fraction: f64,
    /// Day of week, 0 = Sunday.
    pub weekday: u32,
    /// ISO 8601 week number.
    pub iso_week: u32,
    pub is_dst: bool,
    /// DST state at the last second of the local day.
    pub is_dst_end_of_day: bool,
    pub utc_offset_secs: i32,
    pub is_leap_year: bool,
    /// Day of year, 1-based.
    pub day_of_year: u32,
    pub days_in_month: u32,
    pub days_in_year: u32,
    pub month_remaining_days: u32,
    pub year_remaining_days: u32,
    /// Elapsed fraction of the month, `[0, 1)`.
    pub month_progress: f64,
    /// Elapsed fraction of the year, `[0, 1)`.
    pub year_progress: f64,
    /// Nested contexts keyed by day offset; empty on nested contexts.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub window: BTreeMap<i32, DateContext>,
}

/// Build a date context for `timestamp` in the named timezone.
///
/// # Arguments
/// * `timestamp` - Unix timestamp in seconds
/// * `timezone` - IANA timezone name such as `Europe/Berlin`
/// * `window` - Number of whole days to build on each side of the anchor
///
/// # Returns
/// * `Ok(DateContext)` - The anchor context with its offset window
/// * `Err(ScheduleError::Timezone)` - If the timezone name is unknown
/// * `Err(ScheduleError::TimestampOutOfRange)` - If any instant in the window
///   cannot be represented
pub fn build_date_context(
    timestamp: i64,
    timezone: &str,
    window: u32,
) -> ScheduleResult<DateContext> {
    let tz = parse_timezone(timezone)?;
    DateContext::build(timestamp, tz, window)
}

/// Resolve an IANA timezone name.
pub fn parse_timezone(name: &str) -> ScheduleResult<Tz> {
    name.trim()
        .parse::<Tz>()
        .map_err(|e| ScheduleError::Timezone(format!("{}: {}", name, e)))
}

impl DateContext {
    /// Build the context for `timestamp` in `tz`, recursing once into every
    /// offset of `[-window, +window]` with a window of zero.
    pub fn build(timestamp: i64, tz: Tz, window: u32) -> ScheduleResult<Self> {
        let mut ctx = Self::single(timestamp, tz)?;

        if window > 0 {
            let span = window as i64;
            for offset in -span..=span {
                if offset == 0 {
                    continue;
                }
                let shifted = offset
                    .checked_mul(SECONDS_PER_DAY)
                    .and_then(|delta| timestamp.checked_add(delta))
                    .ok_or(ScheduleError::TimestampOutOfRange(timestamp))?;
                ctx.window
                    .insert(offset as i32, Self::build(shifted, tz, 0)?);
            }
        }

        Ok(ctx)
    }

    /// Build from a UTC datetime; sub-second precision is dropped.
    pub fn from_datetime(instant: DateTime<Utc>, tz: Tz, window: u32) -> ScheduleResult<Self> {
        Self::build(instant.timestamp(), tz, window)
    }

    fn single(timestamp: i64, tz: Tz) -> ScheduleResult<Self> {
        let utc = DateTime::<Utc>::from_timestamp(timestamp, 0)
            .ok_or(ScheduleError::TimestampOutOfRange(timestamp))?;
        let local = utc.with_timezone(&tz);

        let year = local.year();
        let month = local.month();
        let day = local.day();
        let (hour, minute, second) = (local.hour(), local.minute(), local.second());
        let seconds_of_day = local.num_seconds_from_midnight();
        let day_fraction = seconds_of_day as f64 / 3600.0;

        let is_leap_year = is_leap_year(year);
        let days_in_month = days_in_month(year, month);
        let days_in_year = if is_leap_year { 366 } else { 365 };
        let day_of_year = local.ordinal();

        // Last second of the local day, counted from now
        let end_of_day = timestamp + (SECONDS_PER_DAY - 1 - seconds_of_day as i64);
        let is_dst_end_of_day = DateTime::<Utc>::from_timestamp(end_of_day, 0)
            .map(|eod| is_dst(&eod.with_timezone(&tz)))
            .unwrap_or(false);

        Ok(Self {
            timestamp,
            timezone: tz.name().to_string(),
            year,
            month,
            day,
            hour,
            minute,
            second,
            day_fraction,
            weekday: local.weekday().num_days_from_sunday(),
            iso_week: local.iso_week().week(),
            is_dst: is_dst(&local),
            is_dst_end_of_day,
            utc_offset_secs: local.offset().fix().local_minus_utc(),
            is_leap_year,
            day_of_year,
            days_in_month,
            days_in_year,
            month_remaining_days: days_in_month - day,
            year_remaining_days: days_in_year - day_of_year,
            month_progress: ((day - 1) as f64 + day_fraction / 24.0) / days_in_month as f64,
            year_progress: ((day_of_year - 1) as f64 + day_fraction / 24.0)
                / days_in_year as f64,
            window: BTreeMap::new(),
        })
    }

    /// Context for a day offset; offset 0 is the context itself.
    pub fn offset(&self, offset: i32) -> Option<&DateContext> {
        if offset == 0 {
            Some(self)
        } else {
            self.window.get(&offset)
        }
    }

    /// Local calendar date.
    pub fn date(&self) -> NaiveDate {
        NaiveDate::from_ymd_opt(self.year, self.month, self.day)
            .unwrap_or(NaiveDate::MIN)
    }

    /// Timezone this context was built in.
    pub fn tz(&self) -> ScheduleResult<Tz> {
        parse_timezone(&self.timezone)
    }

    /// Absolute instant at `hours` after local midnight of this day.
    ///
    /// `hours` may exceed 24 to address the following day. Returns `None`
    /// when the local time does not exist (DST gap).
    pub fn instant_at(&self, hours: f64) -> ScheduleResult<Option<DateTime<Tz>>> {
        let tz = self.tz()?;
        let midnight = self.date().and_hms_opt(0, 0, 0).unwrap_or_default();
        let local = midnight + Duration::seconds((hours * 3600.0).round() as i64);
        Ok(tz.from_local_datetime(&local).earliest())
    }
}

fn is_dst(local: &DateTime<Tz>) -> bool {
    local.offset().dst_offset() != Duration::zero()
}

/// Gregorian leap year test.
pub fn is_leap_year(year: i32) -> bool {
    (year % 4 == 0 && year % 100 != 0) || year % 400 == 0
}

/// Number of days in `month` of `year`.
pub fn days_in_month(year: i32, month: u32) -> u32 {
    match month {
        1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
        4 | 6 | 9 | 11 => 30,
        2 if is_leap_year(year) => 29,
        2 => 28,
        _ => 0,
    }
}
