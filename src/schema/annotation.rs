//! Raw NarrativeTime annotation of one document, as produced by the
//! annotation tool.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::interval::SpanType;

/// Inclusive word-index span `[start, end]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Span(pub u32, pub u32);

impl Span {
    pub fn start(&self) -> u32 {
        self.0
    }

    pub fn end(&self) -> u32 {
        self.1
    }

    pub fn is_well_formed(&self) -> bool {
        self.0 <= self.1
    }

    /// True if `other` lies entirely inside this span.
    pub fn contains(&self, other: &Span) -> bool {
        other.0 >= self.0 && other.1 <= self.1
    }
}

/// TimeML attributes for one timex or event, keyed by attribute name.
pub type RefAttributes = serde_json::Map<String, serde_json::Value>;

/// One span-level NarrativeTime annotation. A span may cover several
/// events; all of them receive the same temporal fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpanAnnotation {
    pub span: Span,
    #[serde(rename = "type")]
    pub span_type: SpanType,
    #[serde(default)]
    pub time: String,
    #[serde(default)]
    pub branch: String,
    #[serde(default)]
    pub relto: String,
    #[serde(default)]
    pub factuality: String,
}

/// A whole annotated document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    pub id: String,
    /// Space-delimited words; spans index into `text.split(' ')`.
    pub text: String,
    #[serde(default)]
    pub events: BTreeMap<u32, Span>,
    #[serde(default)]
    pub timex: BTreeMap<u32, Span>,
    #[serde(default)]
    pub event_order: BTreeMap<String, SpanAnnotation>,
    /// Word id to the word ids of its coreferent events.
    #[serde(default)]
    pub event_coreference: BTreeMap<u32, Vec<u32>>,
    /// Word ids of events hidden from the annotator.
    #[serde(default)]
    pub invisible_events: Vec<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timex_refs: Option<BTreeMap<u32, RefAttributes>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_refs: Option<BTreeMap<u32, RefAttributes>>,
}

impl Document {
    pub fn words(&self) -> Vec<&str> {
        self.text.split(' ').collect()
    }

    /// Number of raw events plus timexes; the size of the finished graph.
    pub fn entity_count(&self) -> usize {
        self.events.len() + self.timex.len()
    }
}
