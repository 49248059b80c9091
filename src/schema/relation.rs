use serde::{Deserialize, Serialize};
use std::fmt;

/// Positional relation between two intervals, ignoring interval types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IntervalRelation {
    Simultaneous,
    Before,
    After,
    Includes,
    IsIncluded,
    /// `a` starts first and ends inside `b`.
    OverlapBefore,
    /// `b` starts first and ends inside `a`.
    OverlapAfter,
}

impl IntervalRelation {
    /// The relation seen from the other interval.
    pub fn inverse(&self) -> Self {
        match self {
            Self::Simultaneous => Self::Simultaneous,
            Self::Before => Self::After,
            Self::After => Self::Before,
            Self::Includes => Self::IsIncluded,
            Self::IsIncluded => Self::Includes,
            Self::OverlapBefore => Self::OverlapAfter,
            Self::OverlapAfter => Self::OverlapBefore,
        }
    }
}

/// A TimeML TLINK relation label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RelType {
    Before,
    After,
    Includes,
    IsIncluded,
    Simultaneous,
    Overlap,
    Vague,
}

impl RelType {
    /// The `relType` attribute value.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Before => "BEFORE",
            Self::After => "AFTER",
            Self::Includes => "INCLUDES",
            Self::IsIncluded => "IS_INCLUDED",
            Self::Simultaneous => "SIMULTANEOUS",
            Self::Overlap => "OVERLAP",
            Self::Vague => "VAGUE",
        }
    }

    /// Stable numeric id, as used by relation classifiers trained on this data.
    pub fn id(&self) -> u8 {
        match self {
            Self::Before => 0,
            Self::After => 1,
            Self::Includes => 2,
            Self::IsIncluded => 3,
            Self::Simultaneous => 4,
            Self::Overlap => 5,
            Self::Vague => 6,
        }
    }
}

impl fmt::Display for RelType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
