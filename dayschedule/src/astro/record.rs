//! Keyed astronomy dataset supplied by an [`AstronomyProvider`](super::AstronomyProvider).

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Marker used by providers for events that do not occur on a given day.
pub const NOT_OCCURRING: &str = "---";

/// Well-known record keys.
pub mod keys {
    pub const SUN_RISE: &str = "SunRise";
    pub const SUN_SET: &str = "SunSet";
    pub const SUN_TRANSIT: &str = "SunTransit";
    pub const MOON_RISE: &str = "MoonRise";
    pub const MOON_SET: &str = "MoonSet";
    pub const MOON_TRANSIT: &str = "MoonTransit";
    pub const CIVIL_MORNING: &str = "CivilTwilightMorning";
    pub const CIVIL_EVENING: &str = "CivilTwilightEvening";
    pub const NAUTIC_MORNING: &str = "NauticTwilightMorning";
    pub const NAUTIC_EVENING: &str = "NauticTwilightEvening";
    pub const ASTRO_MORNING: &str = "AstroTwilightMorning";
    pub const ASTRO_EVENING: &str = "AstroTwilightEvening";
    pub const CUSTOM_MORNING: &str = "CustomTwilightMorning";
    pub const CUSTOM_EVENING: &str = "CustomTwilightEvening";
    pub const SUN_ALT: &str = "SunAlt";
    pub const SUN_AZ: &str = "SunAz";
    pub const MOON_ALT: &str = "MoonAlt";
    pub const MOON_AZ: &str = "MoonAz";
    pub const SUN_HRS_VISIBLE: &str = "SunHrsVisible";
    pub const SUN_HRS_INVISIBLE: &str = "SunHrsInvisible";
    pub const SUN_SIGN: &str = "SunSign";
    pub const MOON_SIGN: &str = "MoonSign";
    pub const MOON_PHASE: &str = "MoonPhaseS";
    pub const SEASON: &str = "ObsSeason";
    pub const SEASON_N: &str = "ObsSeasonN";
}

/// Opaque keyed astronomy data for one day offset.
///
/// The record stays untyped so it can cross a process or module boundary
/// unchanged; typed access goes through the accessor methods, which treat
/// absent keys, `null` and [`NOT_OCCURRING`] alike.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AstronomyRecord(BTreeMap<String, Value>);

impl AstronomyRecord {
    /// Create an empty record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a raw value.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.0.insert(key.into(), value.into());
    }

    /// Builder form of [`insert`](Self::insert).
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(key, value);
        self
    }

    /// Raw value for `key`.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Event time as fractional hours of the day.
    ///
    /// Accepts a number of hours or an `HH:MM[:SS]` string. Returns `None` if
    /// the event does not occur or the value cannot be read.
    pub fn event_time(&self, key: &str) -> Option<f64> {
        match self.0.get(key)? {
            Value::Number(n) => n.as_f64().filter(|h| h.is_finite()),
            Value::String(s) => {
                let parsed = parse_clock(s);
                if parsed.is_none() && s.trim() != NOT_OCCURRING {
                    log::warn!("Unreadable time value for {}: {:?}", key, s);
                }
                parsed
            }
            _ => None,
        }
    }

    /// Numeric value, also accepting numeric strings.
    pub fn number(&self, key: &str) -> Option<f64> {
        match self.0.get(key)? {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse::<f64>().ok(),
            _ => None,
        }
    }

    /// Text value; numbers are rendered as text.
    pub fn text(&self, key: &str) -> Option<String> {
        match self.0.get(key)? {
            Value::String(s) if s.trim() == NOT_OCCURRING => None,
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            Value::Bool(b) => Some(b.to_string()),
            _ => None,
        }
    }
}

impl FromIterator<(String, Value)> for AstronomyRecord {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Parse `HH:MM` or `HH:MM:SS` into fractional hours.
pub fn parse_clock(s: &str) -> Option<f64> {
    let mut parts = s.trim().split(':');
    let h: u32 = parts.next()?.trim().parse().ok()?;
    let m: u32 = parts.next()?.trim().parse().ok()?;
    let sec: f64 = match parts.next() {
        Some(p) => p.trim().parse().ok()?,
        None => 0.0,
    };
    if parts.next().is_some() || h > 24 || m > 59 || !(0.0..60.0).contains(&sec) {
        return None;
    }
    Some(h as f64 + m as f64 / 60.0 + sec / 3600.0)
}
