//! Schedule computation.
//!
//! [`ScheduleComputer`] drives the per-day classification; the other modules
//! hold the individual algorithms it delegates to.

pub mod changes;
pub mod labels;
pub mod phenology;
pub mod schedule_computer;
pub mod seasonal_hours;
pub mod seasons;

pub use labels::{roman_clock, CompassReading};
pub use phenology::PhenoSeason;
pub use schedule_computer::{DayWindow, ScheduleComputer, WINDOW_ORDER};
pub use seasonal_hours::{partition, Boundary, PartitionInput, SeasonalHourPartition, SunDay};
pub use seasons::MeteoSeason;
