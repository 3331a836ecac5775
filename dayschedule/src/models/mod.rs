//! Data produced by the schedule computation.

pub mod event_kind;
pub mod schedule;
pub mod timeline;

pub use event_kind::{EventKind, ScheduleSchema};
pub use schedule::{ChangeAttribute, ChangeMarker, ScheduleRecord};
pub use timeline::{EventTimeline, TimelineDigest, TimelineKey};
