use serde::{Deserialize, Serialize};
use std::fmt;

/// A closed interval on the extended real line.
///
/// Endpoints may be `±inf` but never NaN, and `start <= end`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Interval {
    pub start: f64,
    pub end: f64,
}

impl Interval {
    /// The interval covering the whole timeline.
    pub const PERMANENT: Interval = Interval {
        start: f64::NEG_INFINITY,
        end: f64::INFINITY,
    };

    pub fn new(start: f64, end: f64) -> Self {
        Self { start, end }
    }

    /// A zero-width interval at `value`.
    pub fn point(value: f64) -> Self {
        Self {
            start: value,
            end: value,
        }
    }

    pub fn is_permanent(&self) -> bool {
        *self == Self::PERMANENT
    }

    pub fn is_left_open(&self) -> bool {
        self.start == f64::NEG_INFINITY
    }

    pub fn is_right_open(&self) -> bool {
        self.end == f64::INFINITY
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}]", self.start, self.end)
    }
}

/// How precisely an event's position on the timeline is known.
///
/// Only these four types take part in relation computation. Serialized
/// as its display tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "&'static str")]
pub enum IntervalType {
    /// `[B]`: both ends known.
    Bounded,
    /// `{U}`: open on both sides, optionally centered on a finite point.
    Unbounded,
    /// `[U}`: starts at a known point, runs on to +inf.
    RightOpen,
    /// `{U]`: runs in from -inf, ends at a known point.
    LeftOpen,
}

impl IntervalType {
    pub const ALL: [IntervalType; 4] = [
        Self::Bounded,
        Self::Unbounded,
        Self::RightOpen,
        Self::LeftOpen,
    ];

    /// Display encoding used in annotation files and TimeML output.
    pub fn tag(&self) -> &'static str {
        match self {
            Self::Bounded => "[B]",
            Self::Unbounded => "{U}",
            Self::RightOpen => "[U}",
            Self::LeftOpen => "{U]",
        }
    }

    /// Parse a display tag. Anything but the four recognized tags is rejected.
    pub fn from_tag(tag: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.tag() == tag)
    }

    /// True when the left bracket of the tag is a brace.
    pub fn left_open(&self) -> bool {
        self.tag().starts_with('{')
    }

    /// True when the right bracket of the tag is a brace.
    pub fn right_open(&self) -> bool {
        self.tag().ends_with('}')
    }

    /// Row/column position in the conversion table.
    pub(crate) fn index(&self) -> usize {
        match self {
            Self::Bounded => 0,
            Self::Unbounded => 1,
            Self::RightOpen => 2,
            Self::LeftOpen => 3,
        }
    }
}

impl TryFrom<String> for IntervalType {
    type Error = String;

    fn try_from(tag: String) -> Result<Self, Self::Error> {
        Self::from_tag(&tag).ok_or_else(|| format!("unknown interval type tag {tag:?}"))
    }
}

impl From<IntervalType> for &'static str {
    fn from(value: IntervalType) -> Self {
        value.tag()
    }
}

impl fmt::Display for IntervalType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// The type code carried by a raw span annotation.
///
/// A superset of [`IntervalType`]: bundles and branch roots exist only
/// in raw input and are gone once the event graph is built.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum SpanType {
    Bounded,
    /// `[C]`: several consecutive atomic events sharing one timestamp.
    Bundle,
    Unbounded,
    RightOpen,
    LeftOpen,
    /// `[R>`
    BranchRootRight,
    /// `<R]`
    BranchRootLeft,
}

impl SpanType {
    pub fn tag(&self) -> &'static str {
        match self {
            Self::Bounded => "[B]",
            Self::Bundle => "[C]",
            Self::Unbounded => "{U}",
            Self::RightOpen => "[U}",
            Self::LeftOpen => "{U]",
            Self::BranchRootRight => "[R>",
            Self::BranchRootLeft => "<R]",
        }
    }

    /// The interval type this span resolves to, if it takes part in
    /// relation computation at all.
    pub fn interval_type(&self) -> Option<IntervalType> {
        match self {
            Self::Bounded => Some(IntervalType::Bounded),
            Self::Unbounded => Some(IntervalType::Unbounded),
            Self::RightOpen => Some(IntervalType::RightOpen),
            Self::LeftOpen => Some(IntervalType::LeftOpen),
            Self::Bundle | Self::BranchRootRight | Self::BranchRootLeft => None,
        }
    }
}

impl TryFrom<u8> for SpanType {
    type Error = String;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            0 => Ok(Self::Bounded),
            1 => Ok(Self::Bundle),
            2 => Ok(Self::Unbounded),
            3 => Ok(Self::RightOpen),
            4 => Ok(Self::LeftOpen),
            5 => Ok(Self::BranchRootRight),
            6 => Ok(Self::BranchRootLeft),
            other => Err(format!("unknown interval type code {other}")),
        }
    }
}

impl From<SpanType> for u8 {
    fn from(value: SpanType) -> Self {
        match value {
            SpanType::Bounded => 0,
            SpanType::Bundle => 1,
            SpanType::Unbounded => 2,
            SpanType::RightOpen => 3,
            SpanType::LeftOpen => 4,
            SpanType::BranchRootRight => 5,
            SpanType::BranchRootLeft => 6,
        }
    }
}

impl From<IntervalType> for SpanType {
    fn from(value: IntervalType) -> Self {
        match value {
            IntervalType::Bounded => Self::Bounded,
            IntervalType::Unbounded => Self::Unbounded,
            IntervalType::RightOpen => Self::RightOpen,
            IntervalType::LeftOpen => Self::LeftOpen,
        }
    }
}
