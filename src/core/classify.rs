//! Positional relation between two closed intervals.

use crate::core::interval::RelationError;
use crate::schema::interval::Interval;
use crate::schema::relation::IntervalRelation;

/// Classify `a` against `b`, ignoring interval types.
///
/// ```text
/// 1-3  4-6  BEFORE          4-6  1-3  AFTER
/// 1-6  3-4  INCLUDES        3-4  1-6  IS_INCLUDED
/// 1-4  3-6  OVERLAP_BEFORE  3-6  1-4  OVERLAP_AFTER
/// 1-3  1-3  SIMULTANEOUS
/// ```
///
/// Touching endpoints count as BEFORE/AFTER. The tests run in this order,
/// so a point inside an interval is included by it, and a point at the
/// edge of one is before or after it.
pub fn classify(a: Interval, b: Interval) -> Result<IntervalRelation, RelationError> {
    if a.start == b.start && a.end == b.end {
        return Ok(IntervalRelation::Simultaneous);
    }
    if a.end <= b.start {
        return Ok(IntervalRelation::Before);
    }
    if a.start >= b.end {
        return Ok(IntervalRelation::After);
    }
    if a.start <= b.start && b.end <= a.end {
        return Ok(IntervalRelation::Includes);
    }
    if b.start <= a.start && a.end <= b.end {
        return Ok(IntervalRelation::IsIncluded);
    }
    if a.start <= b.start && a.end <= b.end {
        return Ok(IntervalRelation::OverlapBefore);
    }
    if b.start <= a.start && b.end <= a.end {
        return Ok(IntervalRelation::OverlapAfter);
    }
    Err(RelationError::Unclassifiable { a, b })
}
