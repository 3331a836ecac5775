//! Astronomy provider interface.
//!
//! Raw sun and moon data (rise/set/transit, twilight, positions) come from an
//! external provider. This module defines the seam the schedule computer
//! consumes, so different providers (an ephemeris service, a host plugin, the
//! in-memory [`LocalAstronomy`]) can be swapped in.

pub mod local;
pub mod record;

use serde::{Deserialize, Serialize};

use crate::config::{GeoLocation, Horizon};
use crate::error::ScheduleResult;
use crate::time::DateContext;

pub use local::LocalAstronomy;
pub use record::{keys, parse_clock, AstronomyRecord, NOT_OCCURRING};

/// Observer parameters passed to the provider with every request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AstronomyParams {
    pub latitude: f64,
    pub longitude: f64,
    pub altitude: f64,
    pub horizon_morning: f64,
    pub horizon_evening: f64,
    pub language: String,
}

impl AstronomyParams {
    pub fn new(location: &GeoLocation, horizon: &Horizon, language: &str) -> Self {
        Self {
            latitude: location.latitude,
            longitude: location.longitude,
            altitude: location.altitude,
            horizon_morning: horizon.morning,
            horizon_evening: horizon.evening,
            language: language.to_string(),
        }
    }
}

/// Source of per-day astronomy records.
///
/// # Thread Safety
/// Implementations must be `Send + Sync` so a [`DaySchedule`](crate::DaySchedule)
/// can be shared between threads.
///
/// # Error Handling
/// Failures (service unreachable, no data for the day) are returned as
/// `ScheduleError::Astronomy` and propagate to the caller unchanged; the
/// schedule computer performs no retries.
pub trait AstronomyProvider: Send + Sync {
    /// Fetch the astronomy record for the day and instant of `ctx`.
    ///
    /// # Arguments
    /// * `ctx` - Date context of the requested day offset
    /// * `params` - Observer location, horizon and language
    fn astronomy(&self, ctx: &DateContext, params: &AstronomyParams)
        -> ScheduleResult<AstronomyRecord>;
}

impl<F> AstronomyProvider for F
where
    F: Fn(&DateContext, &AstronomyParams) -> ScheduleResult<AstronomyRecord> + Send + Sync,
{
    fn astronomy(
        &self,
        ctx: &DateContext,
        params: &AstronomyParams,
    ) -> ScheduleResult<AstronomyRecord> {
        self(ctx, params)
    }
}
