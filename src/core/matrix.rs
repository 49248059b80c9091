//! Dense relation matrix over one event graph.

use serde::Serialize;

use crate::core::branch::relate;
use crate::core::builder::EventGraph;
use crate::core::interval::RelationError;
use crate::schema::relation::RelType;

/// Labels for every ordered pair of distinct records, in graph order.
///
/// Both directions of a pair are computed independently, so some type
/// pairs may legitimately give asymmetric labels.
#[derive(Debug, Clone)]
pub struct RelationMatrix {
    ids: Vec<String>,
    timex: Vec<bool>,
    cross_branch: Vec<bool>,
    labels: Vec<Option<RelType>>,
}

/// One TimeML TLINK.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Tlink {
    pub lid: String,
    pub source: String,
    pub target: String,
    pub source_is_timex: bool,
    pub target_is_timex: bool,
    pub relation: RelType,
    pub cross_branch: bool,
}

/// Compute the label of every ordered pair of distinct records.
pub fn assemble(graph: &EventGraph) -> Result<RelationMatrix, RelationError> {
    let records = graph.records();
    let n = records.len();
    let mut labels = vec![None; n * n];
    let mut cross_branch = vec![false; n * n];

    for (i, a) in records.iter().enumerate() {
        for (j, b) in records.iter().enumerate() {
            if i == j {
                continue;
            }
            labels[i * n + j] = Some(relate(a, b)?);
            cross_branch[i * n + j] = !a.shares_branch_with(b);
        }
    }

    Ok(RelationMatrix {
        ids: records.iter().map(|r| r.id.clone()).collect(),
        timex: records.iter().map(|r| r.is_timex).collect(),
        cross_branch,
        labels,
    })
}

impl RelationMatrix {
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn ids(&self) -> &[String] {
        &self.ids
    }

    fn position(&self, id: &str) -> Option<usize> {
        self.ids.iter().position(|i| i == id)
    }

    /// Label from `a` to `b`. `None` for unknown ids and for `a == b`.
    pub fn get(&self, a: &str, b: &str) -> Option<RelType> {
        let i = self.position(a)?;
        let j = self.position(b)?;
        self.labels[i * self.len() + j]
    }

    /// Number of off-diagonal labels; always `n * (n - 1)`.
    pub fn label_count(&self) -> usize {
        self.labels.iter().filter(|l| l.is_some()).count()
    }

    /// All labels as TLINKs, row by row, numbered from `l1`.
    pub fn tlinks(&self) -> impl Iterator<Item = Tlink> + '_ {
        let n = self.len();
        self.labels
            .iter()
            .enumerate()
            .filter_map(move |(k, label)| label.map(|relation| (k / n, k % n, k, relation)))
            .zip(1usize..)
            .map(move |((i, j, k, relation), lid)| Tlink {
                lid: format!("l{lid}"),
                source: self.ids[i].clone(),
                target: self.ids[j].clone(),
                source_is_timex: self.timex[i],
                target_is_timex: self.timex[j],
                relation,
                cross_branch: self.cross_branch[k],
            })
    }
}
