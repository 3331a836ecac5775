//! Per-day schedule result.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::models::event_kind::EventKind;
use crate::models::timeline::{EventTimeline, TimelineDigest, TimelineKey};
use crate::services::labels::CompassReading;
use crate::services::phenology::PhenoSeason;
use crate::services::seasonal_hours::SeasonalHourPartition;
use crate::services::seasons::MeteoSeason;
use crate::time::DateContext;

/// Classified attribute tracked across day boundaries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ChangeAttribute {
    Season,
    MeteoSeason,
    PhenoSeason,
    SunSign,
    MoonSign,
    MoonPhase,
    Dst,
}

impl ChangeAttribute {
    pub const ALL: [ChangeAttribute; 7] = [
        ChangeAttribute::Season,
        ChangeAttribute::MeteoSeason,
        ChangeAttribute::PhenoSeason,
        ChangeAttribute::SunSign,
        ChangeAttribute::MoonSign,
        ChangeAttribute::MoonPhase,
        ChangeAttribute::Dst,
    ];

    /// Event kind that gates the announcement of a change.
    pub fn event_kind(&self) -> EventKind {
        match self {
            ChangeAttribute::Season => EventKind::ObsSeason,
            ChangeAttribute::MeteoSeason => EventKind::ObsMeteoSeason,
            ChangeAttribute::PhenoSeason => EventKind::ObsPhenoSeason,
            ChangeAttribute::SunSign => EventKind::SunSign,
            ChangeAttribute::MoonSign => EventKind::MoonSign,
            ChangeAttribute::MoonPhase => EventKind::MoonPhase,
            ChangeAttribute::Dst => EventKind::ObsIsDst,
        }
    }

    /// Seasons last the whole day; the other changes happen at an unknown
    /// time during it.
    pub fn timeline_key(&self) -> TimelineKey {
        match self {
            ChangeAttribute::Season
            | ChangeAttribute::MeteoSeason
            | ChangeAttribute::PhenoSeason => TimelineKey::AllDay,
            _ => TimelineKey::Untimed,
        }
    }

    /// Name of the change marker in the flat readings.
    pub fn reading_key(&self) -> &'static str {
        match self {
            ChangeAttribute::Season => "ObsSeasonChng",
            ChangeAttribute::MeteoSeason => "ObsMeteoSeasonChng",
            ChangeAttribute::PhenoSeason => "ObsPhenoSeasonChng",
            ChangeAttribute::SunSign => "SunSignChng",
            ChangeAttribute::MoonSign => "MoonSignChng",
            ChangeAttribute::MoonPhase => "MoonPhaseSChng",
            ChangeAttribute::Dst => "ObsIsDSTChng",
        }
    }
}

impl fmt::Display for ChangeAttribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.event_kind().as_str())
    }
}

/// Direction of a recorded transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChangeMarker {
    /// The value differs from yesterday's (`1`).
    ChangedToday,
    /// The value will differ tomorrow (`2`).
    ChangesTomorrow,
}

impl ChangeMarker {
    pub fn code(&self) -> u8 {
        match self {
            ChangeMarker::ChangedToday => 1,
            ChangeMarker::ChangesTomorrow => 2,
        }
    }
}

/// Everything computed for one day offset.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScheduleRecord {
    /// Day offset relative to the anchor day.
    pub offset: i32,
    /// Calendar breakdown of this day at the anchor's clock time.
    pub context: DateContext,
    /// Roman-numeral clock reading.
    pub roman_time: String,
    /// Elapsed year in whole percent.
    pub year_progress: u32,
    /// Elapsed month in whole percent.
    pub month_progress: u32,
    pub sun_compass: Option<CompassReading>,
    pub moon_compass: Option<CompassReading>,
    pub seasonal_hours: SeasonalHourPartition,
    /// Daytime phase name or Latin hour label.
    pub daytime: String,
    /// Position in the daytime phase table, for 12/12 partitions.
    pub daytime_index: Option<usize>,
    pub meteo_season: MeteoSeason,
    /// `None` outside the phenological region.
    pub pheno_season: Option<PhenoSeason>,
    /// Astronomical season as supplied by the astronomy provider.
    pub season: Option<String>,
    pub season_index: Option<i64>,
    pub sun_sign: Option<String>,
    pub moon_sign: Option<String>,
    pub moon_phase: Option<String>,
    pub changes: BTreeMap<ChangeAttribute, ChangeMarker>,
    pub timeline: EventTimeline,
    /// Past/future view of the timeline, on the anchor day only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub digest: Option<TimelineDigest>,
}

impl ScheduleRecord {
    /// Value compared across days for `attribute`.
    pub fn change_value(&self, attribute: ChangeAttribute) -> Option<String> {
        match attribute {
            ChangeAttribute::Season => self
                .season_index
                .map(|i| i.to_string())
                .or_else(|| self.season.clone()),
            ChangeAttribute::MeteoSeason => Some(self.meteo_season.index().to_string()),
            ChangeAttribute::PhenoSeason => self.pheno_season.map(|p| p.index.to_string()),
            ChangeAttribute::SunSign => self.sun_sign.clone(),
            ChangeAttribute::MoonSign => self.moon_sign.clone(),
            ChangeAttribute::MoonPhase => self.moon_phase.clone(),
            // End of day, so a switch in the small hours counts for its own day
            ChangeAttribute::Dst => Some(u8::from(self.context.is_dst_end_of_day).to_string()),
        }
    }

    /// Human-readable value announced when `attribute` changes.
    pub fn change_label(&self, attribute: ChangeAttribute) -> Option<String> {
        let value = match attribute {
            ChangeAttribute::Season => self.season.clone().or_else(|| self.change_value(attribute)),
            ChangeAttribute::MeteoSeason => Some(self.meteo_season.name().to_string()),
            ChangeAttribute::PhenoSeason => self.pheno_season.map(|p| p.name().to_string()),
            _ => self.change_value(attribute),
        }?;
        Some(format!("{} {}", attribute, value))
    }

    pub fn marker(&self, attribute: ChangeAttribute) -> Option<ChangeMarker> {
        self.changes.get(&attribute).copied()
    }

    /// Flat key/value view for machine consumption.
    ///
    /// Scalars map to numbers or strings, absent values are omitted, and the
    /// timeline stays nested under `Schedule`.
    pub fn readings(&self) -> BTreeMap<String, Value> {
        let ctx = &self.context;
        let mut out = BTreeMap::new();
        let mut put = |key: &str, value: Value| {
            if !value.is_null() {
                out.insert(key.to_string(), value);
            }
        };

        put("ObsDate", json!(format!("{:04}-{:02}-{:02}", ctx.year, ctx.month, ctx.day)));
        put(
            "ObsTime",
            json!(format!("{:02}:{:02}:{:02}", ctx.hour, ctx.minute, ctx.second)),
        );
        put("ObsTimeR", json!(self.roman_time));
        put("ObsTimezone", json!(ctx.timezone));
        put("ObsUTCOffset", json!(ctx.utc_offset_secs));
        put("ObsIsDST", json!(u8::from(ctx.is_dst)));
        put("ObsWeekday", json!(ctx.weekday));
        put("ObsIsoWeek", json!(ctx.iso_week));
        put("ObsDayOfYear", json!(ctx.day_of_year));
        put("ObsIsLeapYear", json!(u8::from(ctx.is_leap_year)));
        put("ObsYearProgress", json!(self.year_progress));
        put("ObsMonthProgress", json!(self.month_progress));
        put("ObsYearRemainD", json!(ctx.year_remaining_days));
        put("ObsMonthRemainD", json!(ctx.month_remaining_days));

        put("ObsMeteoSeason", json!(self.meteo_season.name()));
        put("ObsMeteoSeasonN", json!(self.meteo_season.index()));
        if let Some(pheno) = self.pheno_season {
            put("ObsPhenoSeason", json!(pheno.name()));
            put("ObsPhenoSeasonN", json!(pheno.index));
        }
        put("ObsSeason", json!(self.season));
        put("ObsSeasonN", json!(self.season_index));
        put("SunSign", json!(self.sun_sign));
        put("MoonSign", json!(self.moon_sign));
        put("MoonPhaseS", json!(self.moon_phase));

        for (prefix, compass) in [("Sun", &self.sun_compass), ("Moon", &self.moon_compass)] {
            if let Some(c) = compass {
                put(&format!("{}Compass", prefix), json!(c.point16));
                put(&format!("{}CompassI", prefix), json!(c.point4));
                put(&format!("{}CompassS", prefix), json!(c.point8));
            }
        }

        let hours = &self.seasonal_hours;
        put("DaySeasonalHr", json!(hours.index));
        put("DaySeasonalHrsDay", json!(hours.day_parts));
        put("DaySeasonalHrsNight", json!(hours.night_parts));
        put("DaySeasonalHrLenDay", json!(round_minutes(hours.daypart_len)));
        put("DaySeasonalHrLenNight", json!(round_minutes(hours.nightpart_len)));
        if let Some(next) = hours.next {
            put("DaySeasonalHrNext", json!(next.index));
            put("DaySeasonalHrNextT", json!(next.upcoming));
        }
        put("Daytime", json!(self.daytime));
        put("DaytimeN", json!(self.daytime_index));

        for attribute in ChangeAttribute::ALL {
            let code = self.marker(attribute).map(|m| m.code()).unwrap_or(0);
            put(attribute.reading_key(), json!(code));
        }

        if let Some(digest) = &self.digest {
            put("SchedLast", json!(digest.last.join(",")));
            put("SchedLastT", json!(digest.last_key.map(|k| k.to_string())));
            put("SchedNext", json!(digest.next.join(",")));
            put("SchedNextT", json!(digest.next_key.map(|k| k.to_string())));
            put("SchedRecent", json!(digest.recent.join(",")));
            put("SchedUpcoming", json!(digest.upcoming.join(",")));
        }
        put(
            "Schedule",
            serde_json::to_value(&self.timeline).unwrap_or(Value::Null),
        );

        out
    }
}

/// Hours rounded to whole minutes.
fn round_minutes(hours: f64) -> f64 {
    (hours * 60.0).round() / 60.0
}
