//! Type-pair conversion table and same-branch relations.
//!
//! A positional relation only becomes a TLINK label once both interval
//! types are taken into account: a point before the center of a `{U}`
//! event says nothing about their order. Each ordered type pair lists
//! the positional relations it is confident about; everything else is
//! the pair's default.

use crate::core::classify::classify;
use crate::core::interval::{to_interval, RelationError};
use crate::schema::event::EventRecord;
use crate::schema::interval::IntervalType;
use crate::schema::relation::{IntervalRelation, RelType};

use crate::schema::relation::IntervalRelation as P;

/// Conversion rules for one ordered pair of interval types.
#[derive(Debug, Clone, Copy)]
pub struct TypePairRule {
    pub confident: &'static [(IntervalRelation, RelType)],
    pub default: RelType,
}

impl TypePairRule {
    pub fn convert(&self, relation: IntervalRelation) -> RelType {
        self.confident
            .iter()
            .find(|(p, _)| *p == relation)
            .map(|(_, r)| *r)
            .unwrap_or(self.default)
    }
}

const fn rule(confident: &'static [(IntervalRelation, RelType)]) -> TypePairRule {
    TypePairRule {
        confident,
        default: RelType::Vague,
    }
}

const ALL_VAGUE: TypePairRule = rule(&[]);

const BOUNDED_BOUNDED: TypePairRule = rule(&[
    (P::Before, RelType::Before),
    (P::After, RelType::After),
    (P::Includes, RelType::Includes),
    (P::IsIncluded, RelType::IsIncluded),
    (P::OverlapBefore, RelType::Overlap),
    (P::OverlapAfter, RelType::Overlap),
    (P::Simultaneous, RelType::Simultaneous),
]);

const INCLUDED_BY_OPEN: TypePairRule = rule(&[
    (P::IsIncluded, RelType::IsIncluded),
    (P::Simultaneous, RelType::IsIncluded),
]);

const INCLUDES_OPEN: TypePairRule = rule(&[
    (P::Includes, RelType::Includes),
    (P::Simultaneous, RelType::Includes),
]);

const BOUNDED_RIGHT_OPEN: TypePairRule = rule(&[
    (P::Before, RelType::Before),
    (P::IsIncluded, RelType::IsIncluded),
    (P::OverlapBefore, RelType::Overlap),
    (P::Simultaneous, RelType::IsIncluded),
]);

const RIGHT_OPEN_BOUNDED: TypePairRule = rule(&[
    (P::After, RelType::After),
    (P::Includes, RelType::Includes),
    (P::OverlapAfter, RelType::Overlap),
    (P::Simultaneous, RelType::Includes),
]);

const BOUNDED_LEFT_OPEN: TypePairRule = rule(&[
    (P::After, RelType::After),
    (P::IsIncluded, RelType::IsIncluded),
    (P::OverlapAfter, RelType::Overlap),
    (P::Simultaneous, RelType::IsIncluded),
]);

const LEFT_OPEN_BOUNDED: TypePairRule = rule(&[
    (P::Before, RelType::Before),
    (P::Includes, RelType::Includes),
    (P::OverlapBefore, RelType::Overlap),
    (P::Simultaneous, RelType::Includes),
]);

const LEFT_OPEN_RIGHT_OPEN: TypePairRule = rule(&[
    (P::Before, RelType::Before),
    (P::OverlapBefore, RelType::Overlap),
    (P::Simultaneous, RelType::Overlap),
]);

const RIGHT_OPEN_LEFT_OPEN: TypePairRule = rule(&[
    (P::After, RelType::After),
    (P::OverlapAfter, RelType::Overlap),
    (P::Simultaneous, RelType::Overlap),
]);

/// Rows are the first event's type, columns the second's, both in
/// `IntervalType::ALL` order: `[B]`, `{U}`, `[U}`, `{U]`.
static CONVERSION_TABLE: [[TypePairRule; 4]; 4] = [
    [BOUNDED_BOUNDED, INCLUDED_BY_OPEN, BOUNDED_RIGHT_OPEN, BOUNDED_LEFT_OPEN],
    [INCLUDES_OPEN, ALL_VAGUE, INCLUDES_OPEN, INCLUDES_OPEN],
    [RIGHT_OPEN_BOUNDED, INCLUDED_BY_OPEN, ALL_VAGUE, RIGHT_OPEN_LEFT_OPEN],
    [LEFT_OPEN_BOUNDED, INCLUDED_BY_OPEN, LEFT_OPEN_RIGHT_OPEN, ALL_VAGUE],
];

pub fn type_pair_rule(a: IntervalType, b: IntervalType) -> &'static TypePairRule {
    &CONVERSION_TABLE[a.index()][b.index()]
}

/// Final label for a positional relation between events of types `a` and `b`.
pub fn convert(a: IntervalType, b: IntervalType, relation: IntervalRelation) -> RelType {
    type_pair_rule(a, b).convert(relation)
}

/// Relation between two events on the same branch.
pub fn relate_same_branch(a: &EventRecord, b: &EventRecord) -> Result<RelType, RelationError> {
    if !a.shares_branch_with(b) {
        return Err(RelationError::BranchMismatch {
            a: a.branch.clone(),
            b: b.branch.clone(),
            reason: "events on different branches need relate_cross_branch",
        });
    }

    let interval_a = to_interval(&a.time, a.event_type, false)?;
    let interval_b = to_interval(&b.time, b.event_type, false)?;

    // two always-true events overlap; the table would call them simultaneous
    if a.event_type == IntervalType::Unbounded
        && b.event_type == IntervalType::Unbounded
        && interval_a.is_permanent()
        && interval_b.is_permanent()
    {
        return Ok(RelType::Overlap);
    }

    let relation = classify(interval_a, interval_b)?;
    Ok(convert(a.event_type, b.event_type, relation))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::annotation::Span;
    use std::collections::BTreeMap;

    const ALL_RELATIONS: [IntervalRelation; 7] = [
        P::Simultaneous,
        P::Before,
        P::After,
        P::Includes,
        P::IsIncluded,
        P::OverlapBefore,
        P::OverlapAfter,
    ];

    fn event(time: &str, event_type: IntervalType, branch: &str) -> EventRecord {
        EventRecord {
            id: format!("ei{time}"),
            span: Span(0, 0),
            is_timex: false,
            eid: None,
            event_type,
            time: time.to_string(),
            branch: branch.to_string(),
            factuality: String::new(),
            relto: String::new(),
            is_visible_during_annotation: true,
            coreferent_of: None,
            attributes: BTreeMap::new(),
            debug: None,
        }
    }

    #[test]
    fn every_pair_defaults_to_vague() {
        for a in IntervalType::ALL {
            for b in IntervalType::ALL {
                let expected = type_pair_rule(a, b).confident.len();
                assert_eq!(type_pair_rule(a, b).default, RelType::Vague);
                let non_vague = ALL_RELATIONS
                    .iter()
                    .filter(|p| convert(a, b, **p) != RelType::Vague)
                    .count();
                assert_eq!(non_vague, expected, "{a} {b}");
            }
        }
    }

    #[test]
    fn same_type_open_pairs_are_always_vague() {
        for t in [IntervalType::Unbounded, IntervalType::RightOpen, IntervalType::LeftOpen] {
            for p in ALL_RELATIONS {
                assert_eq!(convert(t, t, p), RelType::Vague);
            }
        }
    }

    #[test]
    fn bounded_pair_is_a_direct_mapping() {
        let b = IntervalType::Bounded;
        assert_eq!(convert(b, b, P::Before), RelType::Before);
        assert_eq!(convert(b, b, P::OverlapBefore), RelType::Overlap);
        assert_eq!(convert(b, b, P::OverlapAfter), RelType::Overlap);
        assert_eq!(convert(b, b, P::Simultaneous), RelType::Simultaneous);
    }

    #[test]
    fn mixed_pairs_mirror_each_other() {
        let b = IntervalType::Bounded;
        let r = IntervalType::RightOpen;
        let l = IntervalType::LeftOpen;
        assert_eq!(convert(b, r, P::Before), RelType::Before);
        assert_eq!(convert(r, b, P::After), RelType::After);
        assert_eq!(convert(b, r, P::After), RelType::Vague);
        assert_eq!(convert(b, l, P::After), RelType::After);
        assert_eq!(convert(l, b, P::Before), RelType::Before);
        assert_eq!(convert(l, b, P::Simultaneous), RelType::Includes);
        assert_eq!(convert(l, r, P::Simultaneous), RelType::Overlap);
        assert_eq!(convert(r, l, P::OverlapAfter), RelType::Overlap);
        assert_eq!(convert(r, l, P::Before), RelType::Vague);
    }

    #[test]
    fn swapping_arguments_inverts_the_label() {
        for a in IntervalType::ALL {
            for b in IntervalType::ALL {
                for p in ALL_RELATIONS {
                    let forward = convert(a, b, p);
                    let backward = convert(b, a, p.inverse());
                    let expected = match forward {
                        RelType::Before => RelType::After,
                        RelType::After => RelType::Before,
                        RelType::Includes => RelType::IsIncluded,
                        RelType::IsIncluded => RelType::Includes,
                        other => other,
                    };
                    assert_eq!(backward, expected, "{a} {b} {p:?}");
                }
            }
        }
    }

    #[test]
    fn equal_bounded_times_are_simultaneous() {
        let a = event("2", IntervalType::Bounded, "");
        let b = event("2", IntervalType::Bounded, "");
        assert_eq!(relate_same_branch(&a, &b).unwrap(), RelType::Simultaneous);
    }

    #[test]
    fn permanent_unbounded_events_overlap() {
        let a = event(":", IntervalType::Unbounded, "");
        let b = event("", IntervalType::Unbounded, "");
        assert_eq!(relate_same_branch(&a, &b).unwrap(), RelType::Overlap);
        let c = event("", IntervalType::Unbounded, "");
        assert_eq!(relate_same_branch(&c, &c).unwrap(), RelType::Overlap);
    }

    #[test]
    fn centered_unbounded_events_stay_vague() {
        let a = event("1", IntervalType::Unbounded, "");
        let b = event("1", IntervalType::Unbounded, "");
        assert_eq!(relate_same_branch(&a, &b).unwrap(), RelType::Vague);
    }

    #[test]
    fn permanent_includes_bounded() {
        let a = event("", IntervalType::Unbounded, "");
        let b = event("3", IntervalType::Bounded, "");
        assert_eq!(relate_same_branch(&a, &b).unwrap(), RelType::Includes);
        assert_eq!(relate_same_branch(&b, &a).unwrap(), RelType::IsIncluded);
    }

    #[test]
    fn right_open_range_overlaps_bounded_range() {
        // [1:3} against [0:2]
        let a = event("1:3", IntervalType::RightOpen, "");
        let b = event("0:2", IntervalType::Bounded, "");
        assert_eq!(relate_same_branch(&a, &b).unwrap(), RelType::Overlap);
        assert_eq!(relate_same_branch(&b, &a).unwrap(), RelType::Overlap);
    }

    #[test]
    fn bounded_before_right_open() {
        let a = event("0", IntervalType::Bounded, "");
        let b = event("0.5:5", IntervalType::RightOpen, "");
        assert_eq!(relate_same_branch(&a, &b).unwrap(), RelType::Before);
    }

    #[test]
    fn different_branches_are_rejected() {
        let a = event("1", IntervalType::Bounded, "");
        let b = event("1", IntervalType::Bounded, "2>");
        assert!(matches!(
            relate_same_branch(&a, &b),
            Err(RelationError::BranchMismatch { .. })
        ));
    }

    #[test]
    fn invalid_time_propagates() {
        let a = event("", IntervalType::Bounded, "");
        let b = event("1", IntervalType::Bounded, "");
        assert!(matches!(
            relate_same_branch(&a, &b),
            Err(RelationError::InvalidAnnotation(_))
        ));
    }
}
