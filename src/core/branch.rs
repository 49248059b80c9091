//! Branch resolution and relations between events on different branches.
//!
//! A branch attaches to the main timeline at a single point. `"6>"`
//! branches off at 6 into the future, `"<6"` merges into the main
//! timeline at 6 from the past. Branches are compared by where they sit
//! on the main timeline, so two events on different branches are only
//! ever BEFORE, AFTER or VAGUE, except for permanent `{U}` events which
//! include everything.

use crate::core::classify::classify;
use crate::core::interval::{is_permanent_time, to_interval, RelationError};
use crate::core::table::relate_same_branch;
use crate::schema::event::EventRecord;
use crate::schema::interval::{Interval, IntervalType};
use crate::schema::relation::{IntervalRelation, RelType};

/// Decorations annotators add to branch descriptors. `<` and `>` carry
/// meaning and are not in this list.
pub const BRANCH_MARKERS: &[char] = &['!', '@', '#', '$', '%', '^', '&', '*', '?'];

/// Position of a branch on the main timeline.
///
/// `"6>"`, `">6"` and `"6>?"` are all `(6, +inf)`; `"<10"` and `"10<"`
/// are `(-inf, 10)`.
pub fn branch_to_interval(branch: &str) -> Result<Interval, RelationError> {
    let stripped: String = branch.chars().filter(|c| !BRANCH_MARKERS.contains(c)).collect();

    let parse = |raw: String| -> Result<f64, RelationError> {
        let value: f64 = raw.trim().parse().map_err(|_| {
            RelationError::InvalidAnnotation(format!("can't convert branch {branch:?} to an interval"))
        })?;
        if value.is_nan() {
            return Err(RelationError::InvalidAnnotation(format!(
                "branch {branch:?} has no attachment point"
            )));
        }
        Ok(value)
    };

    if stripped.contains('>') {
        let start = parse(stripped.replace('>', ""))?;
        return Ok(Interval::new(start, f64::INFINITY));
    }
    if stripped.contains('<') {
        let end = parse(stripped.replace('<', ""))?;
        return Ok(Interval::new(f64::NEG_INFINITY, end));
    }

    Err(RelationError::InvalidAnnotation(format!(
        "branch {branch:?} has no direction"
    )))
}

/// Place an event on the main timeline via its branch.
///
/// An open side of the event interval keeps running off the branch; a
/// bounded event takes the branch position outright.
pub fn merge_with_branch(event: Interval, branch: Interval) -> Interval {
    if event.is_left_open() {
        return Interval::new(f64::NEG_INFINITY, branch.end);
    }
    if event.is_right_open() {
        return Interval::new(branch.start, f64::INFINITY);
    }
    branch
}

fn main_timeline_position(record: &EventRecord, interval: Interval) -> Result<Interval, RelationError> {
    if record.is_on_main_timeline() {
        return Ok(interval);
    }
    Ok(merge_with_branch(interval, branch_to_interval(&record.branch)?))
}

/// Relation between two events on different branches.
pub fn relate_cross_branch(a: &EventRecord, b: &EventRecord) -> Result<RelType, RelationError> {
    if a.shares_branch_with(b) {
        return Err(RelationError::BranchMismatch {
            a: a.branch.clone(),
            b: b.branch.clone(),
            reason: "events on the same branch need relate_same_branch",
        });
    }

    let interval_a = to_interval(&a.time, a.event_type, true)?;
    let interval_b = to_interval(&b.time, b.event_type, true)?;

    let permanent = |r: &EventRecord| r.event_type == IntervalType::Unbounded && is_permanent_time(&r.time);
    if permanent(a) {
        return Ok(RelType::Includes);
    }
    if permanent(b) {
        return Ok(RelType::IsIncluded);
    }

    // a centered {U} has no position relative to another branch
    if a.event_type == IntervalType::Unbounded || b.event_type == IntervalType::Unbounded {
        return Ok(RelType::Vague);
    }

    let position_a = main_timeline_position(a, interval_a)?;
    let position_b = main_timeline_position(b, interval_b)?;

    match classify(position_a, position_b)? {
        IntervalRelation::Before => Ok(RelType::Before),
        IntervalRelation::After => Ok(RelType::After),
        _ => Ok(RelType::Vague),
    }
}

/// Relation between any two events, routed by branch.
pub fn relate(a: &EventRecord, b: &EventRecord) -> Result<RelType, RelationError> {
    if a.shares_branch_with(b) {
        relate_same_branch(a, b)
    } else {
        relate_cross_branch(a, b)
    }
}
