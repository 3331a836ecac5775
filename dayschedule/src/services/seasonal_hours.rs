//! Seasonal hours: the sunlit and dark parts of a day split into equal
//! partitions.
//!
//! Indices are signed: `1..=day_parts` for daytime hours counted from
//! sunrise, `-1..=-night_parts` for night hours counted from sunset. Zero is
//! never produced.

use serde::{Deserialize, Serialize};

use crate::astro::{keys, AstronomyRecord};
use crate::config::SeasonalHourConfig;
use crate::services::labels::roman_numeral;

/// Named phases of a 12/12 day, night hours first (`-1` Dusk .. `-12` Dawn),
/// then day hours (`1` Sunrise .. `12` Sunset).
pub const DAYTIME_PHASES: [&str; 24] = [
    "Dusk",
    "Evening",
    "Late Evening",
    "Bedtime",
    "Early Night",
    "Midnight",
    "Late Night",
    "Deep Night",
    "Small Hours",
    "Early Dawn",
    "Pre-Dawn",
    "Dawn",
    "Sunrise",
    "Early Morning",
    "Morning",
    "Mid-Morning",
    "Late Morning",
    "Noon",
    "Early Afternoon",
    "Afternoon",
    "Mid-Afternoon",
    "Late Afternoon",
    "Early Evening",
    "Sunset",
];

/// Daylight assumed when a record gives neither a duration nor both rise
/// and set.
pub const DEFAULT_DAYLIGHT_HOURS: f64 = 12.0;

/// Reported when no phase table applies.
pub const UNKNOWN_PHASE: &str = "unknown";

/// Sun rise/set and daylight split of one day.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SunDay {
    pub sunrise: Option<f64>,
    pub sunset: Option<f64>,
    /// Hours with the sun above the horizon.
    pub visible: f64,
    /// Hours with the sun below the horizon.
    pub invisible: f64,
}

impl SunDay {
    /// Extract from an astronomy record.
    ///
    /// Missing daylight durations are derived from rise and set, or from the
    /// sun altitude when neither occurs. Failing both, the day is split
    /// evenly.
    pub fn from_record(record: &AstronomyRecord) -> Self {
        let sunrise = record.event_time(keys::SUN_RISE);
        let sunset = record.event_time(keys::SUN_SET);
        let visible = record
            .number(keys::SUN_HRS_VISIBLE)
            .or_else(|| match (sunrise, sunset) {
                (Some(rise), Some(set)) => Some((set - rise).rem_euclid(24.0)),
                (None, None) => record
                    .number(keys::SUN_ALT)
                    .map(|alt| if alt >= 0.0 { 24.0 } else { 0.0 }),
                _ => None,
            })
            .unwrap_or_else(|| {
                log::warn!(
                    "No {} and no rise/set pair or sun altitude; assuming {} hours of daylight",
                    keys::SUN_HRS_VISIBLE,
                    DEFAULT_DAYLIGHT_HOURS
                );
                DEFAULT_DAYLIGHT_HOURS
            })
            .clamp(0.0, 24.0);
        let invisible = record
            .number(keys::SUN_HRS_INVISIBLE)
            .unwrap_or(24.0 - visible)
            .clamp(0.0, 24.0);

        Self {
            sunrise,
            sunset,
            visible,
            invisible,
        }
    }
}

/// Everything the partitioner reads.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PartitionInput {
    /// Current local time of day in hours.
    pub time: f64,
    pub today: SunDay,
    /// Next day, if available, for boundaries that have already passed.
    pub tomorrow: Option<SunDay>,
    /// Current sun altitude in degrees.
    pub sun_altitude: Option<f64>,
}

/// Start and end of one seasonal hour.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Boundary {
    /// Signed partition index.
    pub index: i32,
    /// Start in hours after today's midnight; past 24 for partitions that
    /// begin after midnight.
    pub begin: Option<f64>,
    pub end: Option<f64>,
    /// Next start at or after the current time; taken from tomorrow's
    /// anchor once today's start has passed.
    pub upcoming: Option<f64>,
}

/// Seasonal hour partition of one day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeasonalHourPartition {
    pub day_parts: u8,
    pub night_parts: u8,
    pub roman: bool,
    pub daypart_len: f64,
    pub nightpart_len: f64,
    /// Current signed index.
    pub index: i32,
    /// Day hours `1..=day_parts`, then night hours `-1..=-night_parts`.
    pub boundaries: Vec<Boundary>,
    /// Earliest upcoming boundary.
    pub next: Option<Boundary>,
}

enum Hour {
    Day(i32),
    Night(i32),
}

fn parts_elapsed(span: f64, len: f64) -> i32 {
    let parts = (span / len).ceil();
    if parts.is_nan() {
        0
    } else {
        parts as i32
    }
}

/// Partition the day described by `input`.
///
/// # Arguments
/// * `input` - Current time with today's and tomorrow's sun data
/// * `config` - Number of day and night partitions
///
/// # Returns
/// The partition with the current index, every boundary and the next one.
pub fn partition(input: &PartitionInput, config: &SeasonalHourConfig) -> SeasonalHourPartition {
    let day_parts = config.day_parts.max(1);
    let night_parts = config.night_parts.max(1);
    let (dp, np) = (day_parts as i32, night_parts as i32);

    let today = &input.today;
    let daypart_len = today.visible / day_parts as f64;
    let nightpart_len = today.invisible / night_parts as f64;
    let t = input.time;

    let uniform = |above: bool| {
        let mut len = daypart_len + nightpart_len;
        if len <= 0.0 {
            len = 24.0 / (if above { dp } else { np }) as f64;
        }
        let n = parts_elapsed(t, len);
        if above {
            Hour::Day(n)
        } else {
            Hour::Night(np + 1 - n)
        }
    };
    let above = input
        .sun_altitude
        .map(|alt| alt >= 0.0)
        .unwrap_or(today.visible > today.invisible);
    let before_sunrise =
        |rise: f64| Hour::Night((np + 1).saturating_sub(parts_elapsed(rise - t, nightpart_len)));

    let hour = match (today.sunrise, today.sunset) {
        (None, None) => uniform(above),
        (Some(rise), None) if t < rise => before_sunrise(rise),
        (None, Some(set)) if t < set => {
            Hour::Day((dp + 1).saturating_sub(parts_elapsed(set - t, daypart_len)))
        }
        (None, _) | (_, None) => uniform(above),
        (Some(rise), Some(set)) if set < rise => {
            if t >= rise {
                Hour::Day(parts_elapsed(t - rise, daypart_len))
            } else if t < set {
                Hour::Day(parts_elapsed(t + 24.0 - rise, daypart_len))
            } else {
                Hour::Night(parts_elapsed(t - set, nightpart_len))
            }
        }
        (Some(rise), Some(set)) => {
            if t < rise {
                before_sunrise(rise)
            } else if t < set {
                Hour::Day(parts_elapsed(t - rise, daypart_len))
            } else {
                Hour::Night(parts_elapsed(t - set, nightpart_len))
            }
        }
    };

    let index = match hour {
        Hour::Day(n) => n.clamp(1, dp),
        Hour::Night(n) => -n.clamp(1, np),
    };

    let tomorrow = input.tomorrow.as_ref();
    let mut boundaries = Vec::with_capacity((dp + np) as usize);
    for i in 1..=dp {
        let begin = today.sunrise.map(|rise| rise + (i - 1) as f64 * daypart_len);
        let next_day = tomorrow.and_then(|tm| {
            tm.sunrise
                .map(|rise| 24.0 + rise + (i - 1) as f64 * tm.visible / day_parts as f64)
        });
        boundaries.push(boundary(i, begin, daypart_len, t, next_day));
    }
    // Before sunrise the night that began yesterday evening is still running
    let current_night = today.sunrise.filter(|&rise| t < rise);
    for i in 1..=np {
        let begin = today.sunset.map(|set| set + (i - 1) as f64 * nightpart_len);
        let next_day = tomorrow.and_then(|tm| {
            tm.sunset
                .map(|set| 24.0 + set + (i - 1) as f64 * tm.invisible / night_parts as f64)
        });
        let mut b = boundary(-i, begin, nightpart_len, t, next_day);
        if let Some(early) = current_night
            .map(|rise| rise - (np - i + 1) as f64 * nightpart_len)
            .filter(|&early| early >= t)
        {
            b.upcoming = Some(early);
        }
        boundaries.push(b);
    }

    let next = boundaries
        .iter()
        .filter(|b| b.upcoming.is_some())
        .min_by(|a, b| a.upcoming.partial_cmp(&b.upcoming).unwrap_or(std::cmp::Ordering::Equal))
        .copied();

    SeasonalHourPartition {
        day_parts,
        night_parts,
        roman: config.roman,
        daypart_len,
        nightpart_len,
        index,
        boundaries,
        next,
    }
}

fn boundary(index: i32, begin: Option<f64>, len: f64, now: f64, next_day: Option<f64>) -> Boundary {
    let upcoming = match begin {
        Some(b) if b >= now => Some(b),
        _ => next_day,
    };
    Boundary {
        index,
        begin,
        end: begin.map(|b| b + len),
        upcoming,
    }
}

impl SeasonalHourPartition {
    /// Whether Latin hour/watch labels replace the phase table.
    pub fn uses_latin_labels(&self) -> bool {
        self.roman || matches!((self.day_parts, self.night_parts), (12, 4) | (4, 4))
    }

    /// Position of `index` in [`DAYTIME_PHASES`] for a 12/12 partition.
    pub fn phase_index(&self, index: i32) -> Option<usize> {
        if self.day_parts != 12 || self.night_parts != 12 || self.roman {
            return None;
        }
        match index {
            1..=12 => Some((11 + index) as usize),
            -12..=-1 => Some((-index - 1) as usize),
            _ => None,
        }
    }

    /// Label of the partition `index`: a phase name, a Latin hour or watch,
    /// or [`UNKNOWN_PHASE`].
    pub fn label(&self, index: i32) -> String {
        if let Some(i) = self.phase_index(index) {
            return DAYTIME_PHASES[i].to_string();
        }
        if self.uses_latin_labels() {
            let n = roman_numeral(index.unsigned_abs());
            return if index > 0 {
                format!("Hora {}", n)
            } else {
                format!("Vigilia {}", n)
            };
        }
        UNKNOWN_PHASE.to_string()
    }

    /// Label of the current partition.
    pub fn daytime(&self) -> String {
        self.label(self.index)
    }

    /// Start of every partition in today's own hours, in `[0, 24)`.
    ///
    /// Night hours that begin after midnight appear with their early
    /// morning occurrence before sunrise.
    pub fn starts_today(&self) -> Vec<(i32, f64)> {
        let sunrise = self
            .boundaries
            .iter()
            .find(|b| b.index == 1)
            .and_then(|b| b.begin);
        let np = self.night_parts as i32;

        let mut starts = Vec::new();
        for b in &self.boundaries {
            let Some(begin) = b.begin else { continue };
            if (0.0..24.0).contains(&begin) {
                starts.push((b.index, begin));
            }
            if b.index < 0 {
                if let Some(rise) = sunrise {
                    let n = -b.index;
                    let early = rise - (np - n + 1) as f64 * self.nightpart_len;
                    if early >= 0.0 && early < begin {
                        starts.push((b.index, early));
                    }
                }
            }
        }
        starts.sort_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal));
        starts
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ==================== Helper Functions ====================

    fn day(sunrise: f64, sunset: f64) -> SunDay {
        SunDay {
            sunrise: Some(sunrise),
            sunset: Some(sunset),
            visible: sunset - sunrise,
            invisible: 24.0 - (sunset - sunrise),
        }
    }

    fn input(time: f64, today: SunDay, tomorrow: Option<SunDay>) -> PartitionInput {
        PartitionInput {
            time,
            today,
            tomorrow,
            sun_altitude: None,
        }
    }

    fn twelve() -> SeasonalHourConfig {
        SeasonalHourConfig::default()
    }

    // ==================== Tests ====================

    #[test]
    fn test_solstice_noon_index() {
        let today = day(4.72, 21.52);
        let p = partition(&input(12.0, today, Some(today)), &twelve());
        assert!((p.daypart_len - 1.4).abs() < 1e-9);
        assert_eq!(p.index, ((12.0 - 4.72) / 1.4_f64).ceil() as i32);
        assert_eq!(p.index, 6);
        assert_eq!(p.daytime(), "Noon");
    }

    #[test]
    fn test_night_indices() {
        let today = day(6.0, 18.0);
        // One hour after sunset
        let p = partition(&input(18.5, today, None), &twelve());
        assert_eq!(p.index, -1);
        assert_eq!(p.daytime(), "Dusk");
        // Half an hour before sunrise
        let p = partition(&input(5.5, today, None), &twelve());
        assert_eq!(p.index, -12);
        assert_eq!(p.daytime(), "Dawn");
        // Midnight: six night hours since 18:00
        let p = partition(&input(0.0, today, None), &twelve());
        assert_eq!(p.index, -7);
    }

    #[test]
    fn test_exact_sunrise_is_first_hour() {
        let today = day(6.0, 18.0);
        let p = partition(&input(6.0, today, None), &twelve());
        assert_eq!(p.index, 1);
        assert_eq!(p.daytime(), "Sunrise");
    }

    #[test]
    fn test_polar_day_and_night() {
        let polar_day = SunDay {
            sunrise: None,
            sunset: None,
            visible: 24.0,
            invisible: 0.0,
        };
        let mut inp = input(13.0, polar_day, None);
        inp.sun_altitude = Some(20.0);
        let p = partition(&inp, &twelve());
        assert_eq!(p.index, 7);
        assert!(p.boundaries.iter().all(|b| b.begin.is_none()));
        assert!(p.next.is_none());

        let polar_night = SunDay {
            sunrise: None,
            sunset: None,
            visible: 0.0,
            invisible: 24.0,
        };
        let mut inp = input(13.0, polar_night, None);
        inp.sun_altitude = Some(-10.0);
        let p = partition(&inp, &twelve());
        assert!(p.index < 0 && p.index >= -12);
    }

    #[test]
    fn test_only_sunset_missing_before_sunrise() {
        let today = SunDay {
            sunrise: Some(2.0),
            sunset: None,
            visible: 22.0,
            invisible: 2.0,
        };
        let p = partition(&input(1.45, today, None), &twelve());
        assert_eq!(p.index, -9);
    }

    #[test]
    fn test_only_sunrise_missing_before_sunset() {
        let today = SunDay {
            sunrise: None,
            sunset: Some(23.0),
            visible: 23.0,
            invisible: 1.0,
        };
        let p = partition(&input(22.5, today, None), &twelve());
        assert_eq!(p.index, 12);
    }

    #[test]
    fn test_sunset_after_midnight() {
        // Sun sets at 00:30 and rises again at 02:00
        let today = SunDay {
            sunrise: Some(2.0),
            sunset: Some(0.5),
            visible: 22.5,
            invisible: 1.5,
        };
        assert_eq!(partition(&input(0.2, today, None), &twelve()).index, 12);
        assert_eq!(partition(&input(1.05, today, None), &twelve()).index, -5);
        assert_eq!(partition(&input(3.0, today, None), &twelve()).index, 1);
    }

    #[test]
    fn test_boundaries_and_next() {
        let today = day(6.0, 18.0);
        let tomorrow = day(5.9, 18.1);
        let p = partition(&input(7.5, today, Some(tomorrow)), &twelve());
        assert_eq!(p.boundaries.len(), 24);

        let first = p.boundaries[0];
        assert_eq!(first.index, 1);
        assert_eq!(first.begin, Some(6.0));
        assert_eq!(first.end, Some(7.0));
        // Passed today, so taken from tomorrow's sunrise
        assert!((first.upcoming.unwrap() - 29.9).abs() < 1e-9);

        let next = p.next.unwrap();
        assert_eq!(next.index, 3);
        assert_eq!(next.upcoming, Some(8.0));
    }

    #[test]
    fn test_next_before_sunrise_is_remaining_night_hour() {
        let today = day(4.72, 21.52);
        let p = partition(&input(2.0, today, Some(today)), &twelve());
        assert_eq!(p.index, -8);

        let next = p.next.unwrap();
        assert_eq!(next.index, -9);
        assert!((next.upcoming.unwrap() - 2.32).abs() < 1e-9);

        // Remaining night hours start before sunrise, tonight's are later
        let upcoming = |index: i32| {
            p.boundaries
                .iter()
                .find(|b| b.index == index)
                .and_then(|b| b.upcoming)
                .unwrap()
        };
        assert!((upcoming(-12) - 4.12).abs() < 1e-9);
        assert!((upcoming(-8) - 21.52 - 4.2).abs() < 1e-9);
        assert_eq!(upcoming(1), 4.72);
    }

    #[test]
    fn test_passed_boundary_without_tomorrow() {
        let today = day(6.0, 18.0);
        let p = partition(&input(20.0, today, None), &twelve());
        assert!(p.boundaries[0].upcoming.is_none());
        assert_eq!(p.next.unwrap().index, -3);
    }

    #[test]
    fn test_roman_labels() {
        let today = day(6.0, 18.0);
        let p = partition(&input(12.5, today, None), &SeasonalHourConfig::ROMAN);
        assert_eq!(p.index, 7);
        assert_eq!(p.daytime(), "Hora VII");
        let p = partition(&input(23.0, today, None), &SeasonalHourConfig::ROMAN);
        assert_eq!(p.index, -2);
        assert_eq!(p.daytime(), "Vigilia II");
    }

    #[test]
    fn test_unknown_phase_for_other_splits() {
        let config = SeasonalHourConfig::parse("6:8").unwrap();
        let today = day(6.0, 18.0);
        let p = partition(&input(12.5, today, None), &config);
        assert_eq!(p.index, 4);
        assert_eq!(p.daytime(), UNKNOWN_PHASE);
    }

    #[test]
    fn test_starts_today_include_early_night_hours() {
        let today = day(6.0, 18.0);
        let p = partition(&input(12.0, today, None), &twelve());
        let starts = p.starts_today();
        assert_eq!(starts.len(), 24);
        assert_eq!(starts[0], (-7, 0.0));
        assert_eq!(starts.last(), Some(&(-6, 23.0)));
        assert!(starts.windows(2).all(|w| w[0].1 < w[1].1));
    }

    #[test]
    fn test_from_record_derives_durations() {
        let rec = AstronomyRecord::new()
            .with(keys::SUN_RISE, "06:00")
            .with(keys::SUN_SET, "20:00");
        let sun = SunDay::from_record(&rec);
        assert_eq!(sun.visible, 14.0);
        assert_eq!(sun.invisible, 10.0);

        let rec = AstronomyRecord::new()
            .with(keys::SUN_RISE, "---")
            .with(keys::SUN_SET, "---")
            .with(keys::SUN_ALT, 12.0);
        let sun = SunDay::from_record(&rec);
        assert_eq!(sun.sunrise, None);
        assert_eq!(sun.visible, 24.0);
    }

    #[test]
    fn test_from_record_half_day_fallback() {
        let rec = AstronomyRecord::new()
            .with(keys::SUN_RISE, "03:10")
            .with(keys::SUN_SET, "---");
        let sun = SunDay::from_record(&rec);
        assert_eq!(sun.sunrise, Some(3.0 + 10.0 / 60.0));
        assert_eq!(sun.sunset, None);
        assert_eq!(sun.visible, DEFAULT_DAYLIGHT_HOURS);
        assert_eq!(sun.invisible, 24.0 - DEFAULT_DAYLIGHT_HOURS);

        // An explicit duration wins over the fallback
        let rec = rec.with(keys::SUN_HRS_VISIBLE, 20.5);
        assert_eq!(SunDay::from_record(&rec).visible, 20.5);
    }
}
