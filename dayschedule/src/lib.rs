//! Per-day astronomical and calendrical schedule.
//!
//! Given an observer location, an instant and a few configuration knobs,
//! the crate computes for one calendar day:
//!
//! - a bucketed event timeline (sun and moon events, twilight stages,
//!   seasonal hour boundaries, season transitions),
//! - derived readings such as the current seasonal hour, daytime phase,
//!   meteorological and phenological season, compass labels and a roman clock,
//! - change markers for transitions across the yesterday/today/tomorrow
//!   boundary.
//!
//! Raw sun and moon data come from an [`astro::AstronomyProvider`]; the crate
//! never computes ephemerides itself.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use dayschedule::astro::LocalAstronomy;
//! use dayschedule::config::ScheduleConfig;
//! use dayschedule::DaySchedule;
//!
//! fn main() -> dayschedule::ScheduleResult<()> {
//!     let settings = ScheduleConfig::from_file("dayschedule.toml")?.validate()?;
//!     let provider = LocalAstronomy::from_file("astronomy.json")?;
//!     let schedule = DaySchedule::new(settings, Arc::new(provider));
//!     let record = schedule.update_now()?;
//!     println!("{} ({})", record.daytime, record.seasonal_hours.index);
//!     Ok(())
//! }
//! ```

pub mod astro;
pub mod config;
pub mod error;
pub mod models;
pub mod scheduler;
pub mod services;
pub mod time;

pub use config::{ScheduleConfig, ScheduleSettings};
pub use error::{ScheduleError, ScheduleResult};
pub use models::{EventKind, EventTimeline, ScheduleRecord, ScheduleSchema, TimelineKey};
pub use scheduler::DaySchedule;
pub use services::{DayWindow, ScheduleComputer};
pub use time::{build_date_context, DateContext};
