//! Time-string to interval conversion.

use thiserror::Error;

use crate::schema::interval::{Interval, IntervalType};

#[derive(Debug, Error)]
pub enum RelationError {
    #[error("invalid annotation: {0}")]
    InvalidAnnotation(String),
    #[error("unsupported interval type: {0}")]
    UnsupportedType(String),
    #[error("can't classify {a} against {b}")]
    Unclassifiable { a: Interval, b: Interval },
    #[error("branch mismatch for {a:?} and {b:?}: {reason}")]
    BranchMismatch {
        a: String,
        b: String,
        reason: &'static str,
    },
}

/// True for the two spellings of a time with no finite anchor.
pub fn is_permanent_time(time: &str) -> bool {
    time.is_empty() || time == ":"
}

/// True iff neither side of the type tag is a brace.
pub fn is_finite(interval_type: IntervalType) -> bool {
    !interval_type.left_open() && !interval_type.right_open()
}

fn parse_endpoint(raw: &str, time: &str) -> Result<f64, RelationError> {
    let value: f64 = raw.trim().parse().map_err(|_| {
        RelationError::InvalidAnnotation(format!("can't parse time {time:?}"))
    })?;
    if value.is_nan() {
        return Err(RelationError::InvalidAnnotation(format!(
            "time {time:?} is not a number"
        )));
    }
    Ok(value)
}

/// Convert a raw time string to an interval.
///
/// - `""` and `":"` are only valid for `{U}` and give the permanent
///   interval `(-inf, +inf)`.
/// - `"a:b"` gives `(a, b)` whatever the type.
/// - A single number gives a point, unless `treat_unbounded_as_infinite`
///   is set. Then the open side of a partially bounded type runs to
///   infinity: `[2}` is `(2, +inf)` and `{2]` is `(-inf, 2)`. A centered
///   `{2}` stays a point.
///
/// `treat_unbounded_as_infinite` is only meant for comparing events on
/// different branches.
pub fn to_interval(
    time: &str,
    interval_type: IntervalType,
    treat_unbounded_as_infinite: bool,
) -> Result<Interval, RelationError> {
    if is_permanent_time(time) {
        if interval_type != IntervalType::Unbounded {
            return Err(RelationError::InvalidAnnotation(format!(
                "time {time:?} is not compatible with {interval_type}"
            )));
        }
        return Ok(Interval::PERMANENT);
    }

    if let Some((start, end)) = time.split_once(':') {
        let start = parse_endpoint(start, time)?;
        let end = parse_endpoint(end, time)?;
        if start > end {
            return Err(RelationError::InvalidAnnotation(format!(
                "time range {time:?} ends before it starts"
            )));
        }
        return Ok(Interval::new(start, end));
    }

    let value = parse_endpoint(time, time)?;

    // {U} with a center stays a point even across branches
    if !treat_unbounded_as_infinite
        || is_finite(interval_type)
        || interval_type == IntervalType::Unbounded
    {
        return Ok(Interval::point(value));
    }

    let start = if interval_type.left_open() {
        f64::NEG_INFINITY
    } else {
        value
    };
    let end = if interval_type.right_open() {
        f64::INFINITY
    } else {
        value
    };
    Ok(Interval::new(start, end))
}
