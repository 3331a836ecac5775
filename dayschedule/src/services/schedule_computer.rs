//! Per-day schedule computation over the anchor's day window.
//!
//! Computing the anchor day needs the classification of its neighbours, so a
//! call runs in phases over an explicit [`DayWindow`]:
//!
//! 1. fetch the astronomy record of every day offset,
//! 2. classify the offsets in [`WINDOW_ORDER`], running change detection
//!    after each against the neighbours classified so far,
//! 3. link yesterday's last and tomorrow's first events into the anchor
//!    timeline and build its digest.

use std::collections::BTreeMap;
use std::sync::Arc;

use log::{debug, info};

use crate::astro::{keys, AstronomyParams, AstronomyProvider, AstronomyRecord};
use crate::config::ScheduleSettings;
use crate::error::{ScheduleError, ScheduleResult};
use crate::models::{EventKind, EventTimeline, ScheduleRecord, TimelineKey};
use crate::services::changes::detect_changes;
use crate::services::labels::{roman_clock, CompassReading};
use crate::services::phenology;
use crate::services::seasonal_hours::{partition, PartitionInput, SunDay, UNKNOWN_PHASE};
use crate::services::seasons::MeteoSeason;
use crate::time::{DateContext, DEFAULT_WINDOW, SECONDS_PER_DAY};

/// Classification order of the day offsets.
pub const WINDOW_ORDER: [i32; 5] = [2, 1, -2, -1, 0];

/// Timed astronomy events and the kind that schedules them.
const TIMED_EVENTS: [(EventKind, &str); 14] = [
    (EventKind::SunRise, keys::SUN_RISE),
    (EventKind::SunSet, keys::SUN_SET),
    (EventKind::SunTransit, keys::SUN_TRANSIT),
    (EventKind::MoonRise, keys::MOON_RISE),
    (EventKind::MoonSet, keys::MOON_SET),
    (EventKind::MoonTransit, keys::MOON_TRANSIT),
    (EventKind::CivilTwilight, keys::CIVIL_MORNING),
    (EventKind::CivilTwilight, keys::CIVIL_EVENING),
    (EventKind::NauticTwilight, keys::NAUTIC_MORNING),
    (EventKind::NauticTwilight, keys::NAUTIC_EVENING),
    (EventKind::AstroTwilight, keys::ASTRO_MORNING),
    (EventKind::AstroTwilight, keys::ASTRO_EVENING),
    (EventKind::CustomTwilight, keys::CUSTOM_MORNING),
    (EventKind::CustomTwilight, keys::CUSTOM_EVENING),
];

/// Scratch storage of one anchor computation.
#[derive(Debug, Clone, Default)]
pub struct DayWindow {
    pub astronomy: BTreeMap<i32, AstronomyRecord>,
    pub records: BTreeMap<i32, ScheduleRecord>,
}

impl DayWindow {
    pub fn get(&self, offset: i32) -> Option<&ScheduleRecord> {
        self.records.get(&offset)
    }

    /// Record of the anchor day.
    pub fn anchor(&self) -> Option<&ScheduleRecord> {
        self.get(0)
    }

    /// Take the anchor record, discarding the rest of the window.
    pub fn into_anchor(mut self) -> ScheduleResult<ScheduleRecord> {
        self.records
            .remove(&0)
            .ok_or_else(|| ScheduleError::Astronomy("anchor day was not computed".to_string()))
    }
}

/// Computes schedule records from date contexts and astronomy data.
pub struct ScheduleComputer {
    settings: ScheduleSettings,
    params: AstronomyParams,
    provider: Arc<dyn AstronomyProvider>,
}

impl ScheduleComputer {
    /// Create a computer for validated settings.
    ///
    /// # Arguments
    /// * `settings` - Validated schedule settings
    /// * `provider` - Source of the per-day astronomy records
    pub fn new(settings: ScheduleSettings, provider: Arc<dyn AstronomyProvider>) -> Self {
        let params = AstronomyParams::new(&settings.location, &settings.horizon, &settings.language);
        Self {
            settings,
            params,
            provider,
        }
    }

    pub fn settings(&self) -> &ScheduleSettings {
        &self.settings
    }

    /// Compute the anchor day together with its day window.
    ///
    /// A context without a complete window is rebuilt with the default one.
    ///
    /// # Returns
    /// * `Ok(DayWindow)` holding the records of offsets -2..=2
    /// * `Err(ScheduleError)` if the astronomy provider fails for any day
    pub fn compute(&self, anchor: &DateContext) -> ScheduleResult<DayWindow> {
        let span = DEFAULT_WINDOW as i32;
        let rebuilt;
        let anchor = if (-span..=span).all(|o| anchor.offset(o).is_some()) {
            anchor
        } else {
            rebuilt = DateContext::build(anchor.timestamp, anchor.tz()?, DEFAULT_WINDOW)?;
            &rebuilt
        };
        let context = |offset: i32| {
            anchor.offset(offset).ok_or_else(|| {
                ScheduleError::Configuration(format!("date window lacks offset {}", offset))
            })
        };

        let mut window = DayWindow::default();
        for offset in -span..=span {
            let record = self.provider.astronomy(context(offset)?, &self.params)?;
            window.astronomy.insert(offset, record);
        }

        for offset in WINDOW_ORDER {
            let today = window.astronomy.get(&offset).ok_or_else(|| {
                ScheduleError::Astronomy(format!("no astronomy record for offset {}", offset))
            })?;
            let tomorrow = window.astronomy.get(&(offset + 1));
            let record = self.classify(context(offset)?, offset, today, tomorrow);
            window.records.insert(offset, record);
            detect_changes(&mut window.records, offset, &self.settings.schema);
        }

        link_neighbours(&mut window.records);

        if let Some(record) = window.anchor() {
            info!(
                "Computed schedule for {}: seasonal hour {} ({}), {} timeline buckets",
                record.context.date(),
                record.seasonal_hours.index,
                record.daytime,
                record.timeline.len()
            );
        }
        Ok(window)
    }

    /// Compute one day on its own, without neighbour comparison.
    pub fn compute_day(&self, ctx: &DateContext, offset: i32) -> ScheduleResult<ScheduleRecord> {
        let today = self.provider.astronomy(ctx, &self.params)?;
        let next_timestamp = ctx
            .timestamp
            .checked_add(SECONDS_PER_DAY)
            .ok_or(ScheduleError::TimestampOutOfRange(ctx.timestamp))?;
        let next_ctx = DateContext::build(next_timestamp, ctx.tz()?, 0)?;
        let tomorrow = self.provider.astronomy(&next_ctx, &self.params)?;
        Ok(self.classify(ctx, offset, &today, Some(&tomorrow)))
    }

    fn classify(
        &self,
        ctx: &DateContext,
        offset: i32,
        today: &AstronomyRecord,
        tomorrow: Option<&AstronomyRecord>,
    ) -> ScheduleRecord {
        let settings = &self.settings;
        let schema = &settings.schema;

        let mut context = ctx.clone();
        context.window.clear();

        let input = PartitionInput {
            time: ctx.day_fraction,
            today: SunDay::from_record(today),
            tomorrow: tomorrow.map(SunDay::from_record),
            sun_altitude: today.number(keys::SUN_ALT),
        };
        let seasonal_hours = partition(&input, &settings.seasonal_hours);

        let mut timeline = EventTimeline::new();
        for (kind, key) in TIMED_EVENTS {
            if !schema.contains(kind) {
                continue;
            }
            if let Some(hours) = today.event_time(key) {
                timeline.add_hours(hours, key);
            }
        }

        let with_hours = schema.contains(EventKind::SeasonalHr);
        let with_daytime = schema.contains(EventKind::Daytime);
        if with_hours || with_daytime {
            for (index, start) in seasonal_hours.starts_today() {
                if with_hours {
                    timeline.add_hours(start, format!("{} {}", EventKind::SeasonalHr, index));
                }
                let label = seasonal_hours.label(index);
                if with_daytime && label != UNKNOWN_PHASE {
                    timeline.add_hours(start, label);
                }
            }
        }

        let record = ScheduleRecord {
            offset,
            roman_time: roman_clock(ctx.hour, ctx.minute, ctx.second),
            year_progress: (ctx.year_progress * 100.0).round() as u32,
            month_progress: (ctx.month_progress * 100.0).round() as u32,
            sun_compass: CompassReading::new(
                today.number(keys::SUN_AZ),
                today.number(keys::SUN_ALT),
            ),
            moon_compass: CompassReading::new(
                today.number(keys::MOON_AZ),
                today.number(keys::MOON_ALT),
            ),
            daytime: seasonal_hours.daytime(),
            daytime_index: seasonal_hours.phase_index(seasonal_hours.index),
            seasonal_hours,
            meteo_season: MeteoSeason::for_month(ctx.month, settings.location.is_southern()),
            pheno_season: phenology::estimate(
                ctx,
                &settings.location,
                settings.early_spring,
                settings.early_fall,
            ),
            season: today.text(keys::SEASON),
            season_index: today.number(keys::SEASON_N).map(|n| n.round() as i64),
            sun_sign: today.text(keys::SUN_SIGN),
            moon_sign: today.text(keys::MOON_SIGN),
            moon_phase: today.text(keys::MOON_PHASE),
            changes: BTreeMap::new(),
            timeline,
            digest: None,
            context,
        };

        debug!(
            "Classified offset {} ({}): hour {}, {} buckets",
            offset,
            record.context.date(),
            record.seasonal_hours.index,
            record.timeline.len()
        );
        record
    }
}

/// Copy yesterday's last and tomorrow's first events into the anchor
/// timeline as relative buckets, then build the anchor digest.
fn link_neighbours(records: &mut BTreeMap<i32, ScheduleRecord>) {
    let relative = |offset: i32, last: bool| {
        records.get(&offset).and_then(|r| {
            let bucket = if last {
                r.timeline.last_today()
            } else {
                r.timeline.first_today()
            };
            bucket.and_then(|(key, labels)| Some((key.seconds()?, labels.clone())))
        })
    };
    let yesterday = relative(-1, true);
    let tomorrow = relative(1, false);

    let Some(anchor) = records.get_mut(&0) else {
        return;
    };
    if let Some((secs, labels)) = yesterday {
        for label in labels {
            anchor.timeline.add_event(TimelineKey::Yesterday(secs), label);
        }
    }
    if let Some((secs, labels)) = tomorrow {
        for label in labels {
            anchor.timeline.add_event(TimelineKey::Tomorrow(secs), label);
        }
    }
    anchor.digest = Some(anchor.timeline.digest(anchor.context.day_fraction));
}
