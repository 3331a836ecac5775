//! Day-boundary change markers.
//!
//! A transition between two consecutive days is recorded once: the earlier
//! day is marked [`ChangeMarker::ChangesTomorrow`], the later one
//! [`ChangeMarker::ChangedToday`], and the later day's timeline announces the
//! new value when the attribute's event kind is scheduled.

use std::collections::BTreeMap;

use crate::models::{ChangeAttribute, ChangeMarker, ScheduleRecord, ScheduleSchema};

/// Detect transitions of `offset` against the neighbours present in
/// `records`.
///
/// The forward transition (today to tomorrow) takes precedence; the backward
/// one (yesterday to today) is only recorded when no forward transition was.
pub fn detect_changes(
    records: &mut BTreeMap<i32, ScheduleRecord>,
    offset: i32,
    schema: &ScheduleSchema,
) {
    for attribute in ChangeAttribute::ALL {
        if is_transition(records, offset, offset + 1, attribute) {
            mark(records, offset, offset + 1, attribute, schema);
        } else if is_transition(records, offset - 1, offset, attribute) {
            mark(records, offset - 1, offset, attribute, schema);
        }
    }
}

fn is_transition(
    records: &BTreeMap<i32, ScheduleRecord>,
    earlier: i32,
    later: i32,
    attribute: ChangeAttribute,
) -> bool {
    let (Some(first), Some(second)) = (records.get(&earlier), records.get(&later)) else {
        return false;
    };
    if first.marker(attribute).is_some() || second.marker(attribute).is_some() {
        return false;
    }
    match (first.change_value(attribute), second.change_value(attribute)) {
        (Some(a), Some(b)) => a != b,
        _ => false,
    }
}

fn mark(
    records: &mut BTreeMap<i32, ScheduleRecord>,
    earlier: i32,
    later: i32,
    attribute: ChangeAttribute,
    schema: &ScheduleSchema,
) {
    if let Some(record) = records.get_mut(&earlier) {
        record.changes.insert(attribute, ChangeMarker::ChangesTomorrow);
    }
    if let Some(record) = records.get_mut(&later) {
        record.changes.insert(attribute, ChangeMarker::ChangedToday);
        if schema.contains(attribute.event_kind()) {
            if let Some(label) = record.change_label(attribute) {
                record.timeline.add_event(attribute.timeline_key(), label);
            }
        }
        log::debug!(
            "{} changes between offsets {} and {}",
            attribute,
            earlier,
            later
        );
    }
}
