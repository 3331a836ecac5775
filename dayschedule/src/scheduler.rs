//! Published schedule of a location.
//!
//! [`DaySchedule`] owns a [`ScheduleComputer`], serializes recomputation and
//! keeps the latest anchor-day record for readers.

use std::sync::{Arc, Mutex, RwLock};

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use log::{debug, info};

use crate::astro::AstronomyProvider;
use crate::config::ScheduleSettings;
use crate::error::ScheduleResult;
use crate::models::ScheduleRecord;
use crate::services::ScheduleComputer;
use crate::time::{DateContext, DEFAULT_WINDOW};

/// Schedule of one observer, recomputed on demand.
///
/// # Thread Safety
/// Recomputation is serialized by an internal lock; readers get the last
/// published record without waiting for a running computation.
///
/// # Example
/// ```
/// use std::sync::Arc;
/// use chrono::NaiveDate;
/// use chrono_tz::Tz;
/// use dayschedule::astro::{keys, AstronomyRecord, LocalAstronomy};
/// use dayschedule::config::{GeoLocation, ScheduleSettings};
/// use dayschedule::DaySchedule;
///
/// let provider = LocalAstronomy::new();
/// for day in 19..=23 {
///     provider.insert(
///         NaiveDate::from_ymd_opt(2024, 6, day).unwrap(),
///         AstronomyRecord::new()
///             .with(keys::SUN_RISE, "04:43")
///             .with(keys::SUN_SET, "21:33"),
///     );
/// }
/// let settings = ScheduleSettings::new(GeoLocation::new(52.52, 13.405, 34.0), Tz::Europe__Berlin);
/// let schedule = DaySchedule::new(settings, Arc::new(provider));
///
/// // 2024-06-21 12:00 CEST
/// let record = schedule.update(1_718_964_000).unwrap();
/// assert_eq!(record.seasonal_hours.index, 6);
/// assert!(schedule.current().is_some());
/// ```
pub struct DaySchedule {
    computer: ScheduleComputer,
    compute_lock: Mutex<()>,
    published: RwLock<Option<Arc<ScheduleRecord>>>,
}

impl DaySchedule {
    pub fn new(settings: ScheduleSettings, provider: Arc<dyn AstronomyProvider>) -> Self {
        Self {
            computer: ScheduleComputer::new(settings, provider),
            compute_lock: Mutex::new(()),
            published: RwLock::new(None),
        }
    }

    pub fn settings(&self) -> &ScheduleSettings {
        self.computer.settings()
    }

    pub fn computer(&self) -> &ScheduleComputer {
        &self.computer
    }

    /// Recompute for the instant `timestamp` and publish the anchor record.
    ///
    /// # Returns
    /// * `Ok(Arc<ScheduleRecord>)` - The newly published record
    /// * `Err(ScheduleError)` - The previous record stays published
    pub fn update(&self, timestamp: i64) -> ScheduleResult<Arc<ScheduleRecord>> {
        let _guard = self.compute_lock.lock().unwrap_or_else(|e| e.into_inner());

        let ctx = DateContext::build(timestamp, self.settings().timezone, DEFAULT_WINDOW)?;
        let record = Arc::new(self.computer.compute(&ctx)?.into_anchor()?);

        match self.published.write() {
            Ok(mut published) => *published = Some(Arc::clone(&record)),
            Err(poisoned) => *poisoned.into_inner() = Some(Arc::clone(&record)),
        }
        info!(
            "Published schedule for {} {}",
            record.context.date(),
            record.context.timezone
        );
        Ok(record)
    }

    /// Recompute for the current wall-clock time.
    pub fn update_now(&self) -> ScheduleResult<Arc<ScheduleRecord>> {
        self.update(Utc::now().timestamp())
    }

    /// Last published record.
    pub fn current(&self) -> Option<Arc<ScheduleRecord>> {
        match self.published.read() {
            Ok(published) => published.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// Instant of the next timeline event or seasonal hour boundary after
    /// the published record's time.
    ///
    /// # Returns
    /// * `Ok(None)` if nothing is published or nothing lies ahead
    /// * `Err(ScheduleError::Timezone)` if the record's timezone is unknown
    pub fn next_wakeup(&self) -> ScheduleResult<Option<DateTime<Tz>>> {
        let Some(record) = self.current() else {
            return Ok(None);
        };
        next_wakeup(&record)
    }
}

/// Earliest upcoming wake-up of `record`, in hours after its midnight
/// converted to an absolute instant.
pub fn next_wakeup(record: &ScheduleRecord) -> ScheduleResult<Option<DateTime<Tz>>> {
    let now = record.context.day_fraction;
    let event = record
        .digest
        .as_ref()
        .and_then(|d| d.next_key)
        .and_then(|k| k.relative_hours())
        .filter(|h| *h > now);
    let boundary = record
        .seasonal_hours
        .next
        .and_then(|b| b.upcoming)
        .filter(|h| *h > now);

    let hours = match (event, boundary) {
        (Some(a), Some(b)) => a.min(b),
        (Some(a), None) => a,
        (None, Some(b)) => b,
        (None, None) => return Ok(None),
    };

    match record.context.instant_at(hours)? {
        Some(instant) => Ok(Some(instant)),
        None => {
            debug!("Wake-up at {:.4}h falls into a DST gap, moving past it", hours);
            record.context.instant_at(hours + 1.0)
        }
    }
}
