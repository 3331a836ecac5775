//! In-memory astronomy provider.
//!
//! Serves pre-computed records keyed by local calendar date. Useful for
//! offline runs (records exported from an ephemeris service into a JSON file)
//! and for deterministic tests.

use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::sync::{Arc, RwLock};

use chrono::NaiveDate;

use super::{AstronomyParams, AstronomyProvider, AstronomyRecord};
use crate::error::{ScheduleError, ScheduleResult};
use crate::time::DateContext;

/// In-memory astronomy provider.
///
/// # Example
/// ```
/// use chrono::NaiveDate;
/// use dayschedule::astro::{keys, AstronomyRecord, LocalAstronomy};
///
/// let provider = LocalAstronomy::new();
/// provider.insert(
///     NaiveDate::from_ymd_opt(2024, 6, 21).unwrap(),
///     AstronomyRecord::new().with(keys::SUN_RISE, 4.72),
/// );
/// assert_eq!(provider.len(), 1);
/// ```
#[derive(Debug, Clone, Default)]
pub struct LocalAstronomy {
    records: Arc<RwLock<HashMap<NaiveDate, AstronomyRecord>>>,
}

impl LocalAstronomy {
    /// Create an empty provider.
    pub fn new() -> Self {
        Self::default()
    }

    /// Store the record for a local date, replacing any previous one.
    pub fn insert(&self, date: NaiveDate, record: AstronomyRecord) {
        match self.records.write() {
            Ok(mut records) => {
                records.insert(date, record);
            }
            Err(poisoned) => {
                poisoned.into_inner().insert(date, record);
            }
        }
    }

    pub fn len(&self) -> usize {
        self.records.read().map(|r| r.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Load records from a JSON object keyed by `YYYY-MM-DD`.
    ///
    /// # Arguments
    /// * `json` - JSON text such as `{"2024-06-21": {"SunRise": "04:43", ...}}`
    ///
    /// # Returns
    /// * `Ok(LocalAstronomy)` if every key is a valid date
    /// * `Err(ScheduleError::Parse)` otherwise
    pub fn from_json_str(json: &str) -> ScheduleResult<Self> {
        let raw: HashMap<String, AstronomyRecord> = serde_json::from_str(json)?;
        let provider = Self::new();
        for (key, record) in raw {
            let date = NaiveDate::parse_from_str(key.trim(), "%Y-%m-%d").map_err(|e| {
                ScheduleError::Parse(format!("Invalid astronomy date key '{}': {}", key, e))
            })?;
            provider.insert(date, record);
        }
        log::debug!("Loaded {} astronomy records", provider.len());
        Ok(provider)
    }

    /// Load records from a JSON file (see [`from_json_str`](Self::from_json_str)).
    pub fn from_file<P: AsRef<Path>>(path: P) -> ScheduleResult<Self> {
        let content = fs::read_to_string(path.as_ref())?;
        Self::from_json_str(&content)
    }
}

impl AstronomyProvider for LocalAstronomy {
    fn astronomy(
        &self,
        ctx: &DateContext,
        _params: &AstronomyParams,
    ) -> ScheduleResult<AstronomyRecord> {
        let date = ctx.date();
        let records = self
            .records
            .read()
            .map_err(|_| ScheduleError::Astronomy("record store poisoned".to_string()))?;
        records
            .get(&date)
            .cloned()
            .ok_or_else(|| ScheduleError::Astronomy(format!("No astronomy record for {}", date)))
    }
}
