//! Bucketed event timeline of one calendar day.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::astro::parse_clock;
use crate::error::ScheduleError;

const SECONDS_PER_DAY: u32 = 86_400;

/// Position of an event bucket in the timeline.
///
/// Timed keys store whole seconds of the day, so keys are unique and the
/// derived ordering runs from the all-day and untimed buckets through
/// yesterday, today and tomorrow in chronological order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TimelineKey {
    /// Event lasting the whole day (`*`).
    AllDay,
    /// Event somewhere during the day without a time (`?`).
    Untimed,
    /// Late event of the previous day (`-H`).
    Yesterday(u32),
    /// Event of this day (`H`).
    At(u32),
    /// Early event of the next day (`+H`).
    Tomorrow(u32),
}

impl TimelineKey {
    /// Key for an hour value relative to this day's midnight.
    ///
    /// Values `>= 24` land on tomorrow and negative values on yesterday.
    /// Returns `None` for non-finite input or values more than a day away.
    pub fn from_hours(hours: f64) -> Option<Self> {
        if !hours.is_finite() {
            return None;
        }
        let secs = (hours * 3600.0).round() as i64;
        let day = SECONDS_PER_DAY as i64;
        match secs {
            s if (0..day).contains(&s) => Some(TimelineKey::At(s as u32)),
            s if (day..2 * day).contains(&s) => Some(TimelineKey::Tomorrow((s - day) as u32)),
            s if (-day..0).contains(&s) => Some(TimelineKey::Yesterday((s + day) as u32)),
            _ => None,
        }
    }

    /// Seconds of its own day, for timed keys.
    pub fn seconds(&self) -> Option<u32> {
        match self {
            TimelineKey::Yesterday(s) | TimelineKey::At(s) | TimelineKey::Tomorrow(s) => Some(*s),
            TimelineKey::AllDay | TimelineKey::Untimed => None,
        }
    }

    /// Hours relative to this day's midnight (negative for yesterday, past
    /// 24 for tomorrow).
    pub fn relative_hours(&self) -> Option<f64> {
        let hours = |s: &u32| *s as f64 / 3600.0;
        match self {
            TimelineKey::Yesterday(s) => Some(hours(s) - 24.0),
            TimelineKey::At(s) => Some(hours(s)),
            TimelineKey::Tomorrow(s) => Some(hours(s) + 24.0),
            TimelineKey::AllDay | TimelineKey::Untimed => None,
        }
    }

    pub fn is_timed(&self) -> bool {
        self.seconds().is_some()
    }
}

fn format_seconds(f: &mut fmt::Formatter<'_>, secs: u32) -> fmt::Result {
    write!(f, "{:02}:{:02}:{:02}", secs / 3600, secs / 60 % 60, secs % 60)
}

impl fmt::Display for TimelineKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TimelineKey::AllDay => f.write_str("*"),
            TimelineKey::Untimed => f.write_str("?"),
            TimelineKey::Yesterday(s) => {
                f.write_str("-")?;
                format_seconds(f, *s)
            }
            TimelineKey::At(s) => format_seconds(f, *s),
            TimelineKey::Tomorrow(s) => {
                f.write_str("+")?;
                format_seconds(f, *s)
            }
        }
    }
}

impl FromStr for TimelineKey {
    type Err = ScheduleError;

    /// Parse `*`, `?`, `+H`, `-H` or `H`, where `H` is either decimal hours
    /// or `HH:MM[:SS]`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let invalid = || ScheduleError::Parse(format!("Invalid timeline key: {:?}", s));
        let seconds = |text: &str| -> Result<u32, ScheduleError> {
            let hours = parse_clock(text)
                .or_else(|| text.parse::<f64>().ok())
                .filter(|h| (0.0..24.0).contains(h))
                .ok_or_else(invalid)?;
            Ok(((hours * 3600.0).round() as u32).min(SECONDS_PER_DAY - 1))
        };

        match s {
            "*" => Ok(TimelineKey::AllDay),
            "?" => Ok(TimelineKey::Untimed),
            _ => {
                if let Some(rest) = s.strip_prefix('+') {
                    Ok(TimelineKey::Tomorrow(seconds(rest)?))
                } else if let Some(rest) = s.strip_prefix('-') {
                    Ok(TimelineKey::Yesterday(seconds(rest)?))
                } else {
                    Ok(TimelineKey::At(seconds(s)?))
                }
            }
        }
    }
}

impl Serialize for TimelineKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for TimelineKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Events of one day grouped by [`TimelineKey`].
///
/// # Example
/// ```
/// use dayschedule::models::{EventTimeline, TimelineKey};
///
/// let mut timeline = EventTimeline::new();
/// timeline.add_hours(6.5, "SunRise");
/// timeline.add_hours(6.5, "CivilTwilightMorning");
/// let key = TimelineKey::from_hours(6.5).unwrap();
/// assert_eq!(timeline.get(&key).unwrap(), &["SunRise", "CivilTwilightMorning"]);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventTimeline(BTreeMap<TimelineKey, Vec<String>>);

impl EventTimeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `label` to the bucket at `key`.
    pub fn add_event(&mut self, key: TimelineKey, label: impl Into<String>) {
        self.0.entry(key).or_default().push(label.into());
    }

    /// Append `label` at an hour value relative to this day's midnight.
    ///
    /// Returns `false` (and records nothing) if the value cannot be placed.
    pub fn add_hours(&mut self, hours: f64, label: impl Into<String>) -> bool {
        match TimelineKey::from_hours(hours) {
            Some(key) => {
                self.add_event(key, label);
                true
            }
            None => false,
        }
    }

    /// Labels in the bucket at `key`.
    pub fn get(&self, key: &TimelineKey) -> Option<&[String]> {
        self.0.get(key).map(Vec::as_slice)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&TimelineKey, &Vec<String>)> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Buckets timed on this day, in chronological order.
    pub fn today(&self) -> impl DoubleEndedIterator<Item = (&TimelineKey, &Vec<String>)> {
        self.0
            .range(TimelineKey::At(0)..TimelineKey::Tomorrow(0))
    }

    /// First bucket timed on this day.
    pub fn first_today(&self) -> Option<(&TimelineKey, &Vec<String>)> {
        self.today().next()
    }

    /// Last bucket timed on this day.
    pub fn last_today(&self) -> Option<(&TimelineKey, &Vec<String>)> {
        self.today().next_back()
    }

    /// Nearest past and future events relative to `now_hours`.
    ///
    /// An event at exactly `now` counts as past. When this day has nothing
    /// in a direction, the relative bucket of the neighbouring day is used.
    pub fn digest(&self, now_hours: f64) -> TimelineDigest {
        let now_secs = (now_hours * 3600.0).floor() as i64;
        let now = TimelineKey::At(now_secs.clamp(0, SECONDS_PER_DAY as i64 - 1) as u32);

        let past: Vec<_> = self.today().filter(|(k, _)| **k <= now).rev().collect();
        let future: Vec<_> = self.today().filter(|(k, _)| **k > now).collect();

        let past = if past.is_empty() {
            self.0
                .range(TimelineKey::Yesterday(0)..TimelineKey::At(0))
                .next_back()
                .into_iter()
                .collect()
        } else {
            past
        };
        let future = if future.is_empty() {
            self.0
                .range(TimelineKey::Tomorrow(0)..)
                .next()
                .into_iter()
                .collect()
        } else {
            future
        };

        let flatten = |buckets: &[(&TimelineKey, &Vec<String>)]| -> Vec<String> {
            buckets
                .iter()
                .flat_map(|(_, labels)| labels.iter().cloned())
                .collect()
        };

        TimelineDigest {
            last_key: past.first().map(|(k, _)| **k),
            last: past.first().map(|(_, l)| (*l).clone()).unwrap_or_default(),
            next_key: future.first().map(|(k, _)| **k),
            next: future.first().map(|(_, l)| (*l).clone()).unwrap_or_default(),
            recent: flatten(&past),
            upcoming: flatten(&future),
        }
    }
}

/// Past/future view of a timeline at one instant.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TimelineDigest {
    pub last_key: Option<TimelineKey>,
    pub last: Vec<String>,
    pub next_key: Option<TimelineKey>,
    pub next: Vec<String>,
    /// Past labels, most recent first.
    pub recent: Vec<String>,
    /// Future labels in chronological order.
    pub upcoming: Vec<String>,
}
