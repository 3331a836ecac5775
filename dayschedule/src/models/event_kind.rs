//! Closed set of event kinds a caller can ask the schedule to track.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ScheduleError;

/// Kind of event tracked in the day timeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EventKind {
    AstroTwilight,
    CivilTwilight,
    CustomTwilight,
    Daytime,
    MoonPhase,
    MoonRise,
    MoonSet,
    MoonSign,
    MoonTransit,
    NauticTwilight,
    #[serde(rename = "ObsIsDST")]
    ObsIsDst,
    ObsMeteoSeason,
    ObsPhenoSeason,
    ObsSeason,
    SeasonalHr,
    SunRise,
    SunSet,
    SunSign,
    SunTransit,
}

impl EventKind {
    pub const ALL: [EventKind; 19] = [
        EventKind::AstroTwilight,
        EventKind::CivilTwilight,
        EventKind::CustomTwilight,
        EventKind::Daytime,
        EventKind::MoonPhase,
        EventKind::MoonRise,
        EventKind::MoonSet,
        EventKind::MoonSign,
        EventKind::MoonTransit,
        EventKind::NauticTwilight,
        EventKind::ObsIsDst,
        EventKind::ObsMeteoSeason,
        EventKind::ObsPhenoSeason,
        EventKind::ObsSeason,
        EventKind::SeasonalHr,
        EventKind::SunRise,
        EventKind::SunSet,
        EventKind::SunSign,
        EventKind::SunTransit,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::AstroTwilight => "AstroTwilight",
            EventKind::CivilTwilight => "CivilTwilight",
            EventKind::CustomTwilight => "CustomTwilight",
            EventKind::Daytime => "Daytime",
            EventKind::MoonPhase => "MoonPhase",
            EventKind::MoonRise => "MoonRise",
            EventKind::MoonSet => "MoonSet",
            EventKind::MoonSign => "MoonSign",
            EventKind::MoonTransit => "MoonTransit",
            EventKind::NauticTwilight => "NauticTwilight",
            EventKind::ObsIsDst => "ObsIsDST",
            EventKind::ObsMeteoSeason => "ObsMeteoSeason",
            EventKind::ObsPhenoSeason => "ObsPhenoSeason",
            EventKind::ObsSeason => "ObsSeason",
            EventKind::SeasonalHr => "SeasonalHr",
            EventKind::SunRise => "SunRise",
            EventKind::SunSet => "SunSet",
            EventKind::SunSign => "SunSign",
            EventKind::SunTransit => "SunTransit",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EventKind {
    type Err = ScheduleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        EventKind::ALL
            .iter()
            .copied()
            .find(|k| k.as_str() == s)
            .ok_or_else(|| ScheduleError::Configuration(format!("Unknown event kind: {}", s)))
    }
}

/// Set of event kinds to populate; kinds outside the set are skipped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleSchema(BTreeSet<EventKind>);

impl ScheduleSchema {
    /// Schema tracking every event kind.
    pub fn all() -> Self {
        Self(EventKind::ALL.iter().copied().collect())
    }

    pub fn empty() -> Self {
        Self(BTreeSet::new())
    }

    pub fn contains(&self, kind: EventKind) -> bool {
        self.0.contains(&kind)
    }

    pub fn iter(&self) -> impl Iterator<Item = EventKind> + '_ {
        self.0.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Default for ScheduleSchema {
    fn default() -> Self {
        Self::all()
    }
}

impl FromIterator<EventKind> for ScheduleSchema {
    fn from_iter<I: IntoIterator<Item = EventKind>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl FromStr for ScheduleSchema {
    type Err = ScheduleError;

    /// Parse a comma separated list such as `SunRise,SunSet,SeasonalHr`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.split(',')
            .filter(|part| !part.trim().is_empty())
            .map(EventKind::from_str)
            .collect()
    }
}
