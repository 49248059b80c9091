//! Event-graph construction: from raw span annotations to one canonical,
//! positioned record per event and timex.
//!
//! The steps run in a fixed order:
//! 1. assign ids and passthrough metadata to every mention,
//! 2. split bundle (`[C]`) annotations into atomic `[B]` entries,
//! 3. hand each span annotation's temporal fields to the mentions inside it,
//! 4. position events hidden from the annotator like a coreferent event,
//! 5. check that every mention ended up in the graph exactly once.

use rustc_hash::{FxHashMap, FxHashSet};
use serde::Serialize;
use std::cmp::Ordering;
use std::collections::BTreeMap;
use thiserror::Error;
use tracing::{debug, warn};

use crate::core::coreference::{resolve_word_id, CoreferenceIndex};
use crate::schema::annotation::{Document, RefAttributes, Span, SpanAnnotation};
use crate::schema::event::{DebugInfo, EventRecord, Mention, Position};
use crate::schema::interval::SpanType;

/// Tie-break step between the atomic events of one bundle.
pub const BUNDLE_EPSILON: f64 = 1e-4;

/// TIMEX3 attributes copied from `timex_refs`.
pub const TIMEX_ATTRIBUTES: &[&str] = &[
    "type",
    "value",
    "temporalFunction",
    "functionInDocument",
    "beginPoint",
    "endPoint",
    "quant",
    "freq",
    "valueFromFunction",
    "mod",
    "anchorTimeID",
    "comment",
];

/// EVENT and MAKEINSTANCE attributes copied from `event_refs`.
pub const EVENT_ATTRIBUTES: &[&str] = &[
    "class",
    "comment",
    "eventID",
    "signalID",
    "pos",
    "tense",
    "aspect",
    "cardinality",
    "polarity",
    "modality",
];

#[derive(Debug, Error)]
pub enum GraphError {
    #[error("{doc_id}: invalid annotation: {reason}")]
    InvalidAnnotation { doc_id: String, reason: String },
    #[error("{doc_id}: unsupported interval type {tag} for span {span:?}")]
    UnsupportedType {
        doc_id: String,
        tag: &'static str,
        span: Span,
    },
    #[error("{doc_id}: unresolved reference: {reason}")]
    UnresolvedReference { doc_id: String, reason: String },
    #[error("{doc_id}: consistency violation: {reason}")]
    ConsistencyViolation { doc_id: String, reason: String },
}

impl GraphError {
    fn invalid(doc: &Document, reason: impl Into<String>) -> Self {
        Self::InvalidAnnotation {
            doc_id: doc.id.clone(),
            reason: reason.into(),
        }
    }

    fn unresolved(doc: &Document, reason: impl Into<String>) -> Self {
        Self::UnresolvedReference {
            doc_id: doc.id.clone(),
            reason: reason.into(),
        }
    }

    fn inconsistent(doc: &Document, reason: impl Into<String>) -> Self {
        Self::ConsistencyViolation {
            doc_id: doc.id.clone(),
            reason: reason.into(),
        }
    }
}

/// Per-document build settings.
#[derive(Debug, Clone, Default)]
pub struct BuildOptions {
    /// Added to the numeric event key when minting `ei{n}` ids.
    pub corpus_offset: u32,
    pub attach_debug_text: bool,
}

/// One entry of the event order after bundle splitting.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderEntry {
    /// Key of the raw annotation this entry came from.
    pub key: String,
    /// 0 for annotations as written, `1..=k` for the parts of a bundle.
    pub sub_order: u32,
    pub annotation: SpanAnnotation,
}

impl OrderEntry {
    pub fn is_bundle_part(&self) -> bool {
        self.sub_order > 0
    }
}

/// The canonical events and timexes of one document, in event order.
#[derive(Debug, Clone, Serialize)]
pub struct EventGraph {
    pub document_id: String,
    records: Vec<EventRecord>,
    #[serde(skip)]
    index: FxHashMap<String, usize>,
}

impl EventGraph {
    fn new(document_id: &str) -> Self {
        Self {
            document_id: document_id.to_string(),
            records: Vec::new(),
            index: FxHashMap::default(),
        }
    }

    /// A graph over already positioned records. Later records with a
    /// repeated id replace earlier ones.
    pub fn from_records(document_id: &str, records: Vec<EventRecord>) -> Self {
        let mut graph = Self::new(document_id);
        for record in records {
            graph.upsert(record);
        }
        graph
    }

    /// Insert or replace by id. A replaced record keeps its position.
    /// Returns true if a record was replaced.
    fn upsert(&mut self, record: EventRecord) -> bool {
        if let Some(&pos) = self.index.get(&record.id) {
            self.records[pos] = record;
            return true;
        }
        self.index.insert(record.id.clone(), self.records.len());
        self.records.push(record);
        false
    }

    pub fn get(&self, id: &str) -> Option<&EventRecord> {
        self.index.get(id).map(|&pos| &self.records[pos])
    }

    pub fn records(&self) -> &[EventRecord] {
        &self.records
    }

    pub fn iter(&self) -> impl Iterator<Item = &EventRecord> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Build the event graph of one document.
pub fn build_event_graph(doc: &Document, options: &BuildOptions) -> Result<EventGraph, GraphError> {
    let mentions = format_metadata(doc, options)?;

    let invisible = doc
        .invisible_events
        .iter()
        .map(|&word_id| {
            resolve_word_id(word_id, &mentions).map_err(|w| {
                GraphError::unresolved(doc, format!("no event found for invisible word id {w}"))
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    let entries = split_bundles(doc)?;
    let mut graph = place_spans(doc, &entries, &mentions, &invisible)?;
    add_invisible_events(doc, &mut graph, &mentions, &invisible)?;

    if graph.len() != mentions.len() {
        return Err(GraphError::inconsistent(
            doc,
            format!(
                "{} events and timexes but {} event order entries",
                mentions.len(),
                graph.len()
            ),
        ));
    }

    debug!(
        doc_id = %doc.id,
        records = graph.len(),
        hidden = invisible.len(),
        "built event graph"
    );
    Ok(graph)
}

fn attribute_string(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn copy_attributes(refs: &RefAttributes, names: &[&str]) -> BTreeMap<String, String> {
    names
        .iter()
        .filter_map(|name| refs.get(*name).map(|v| (name.to_string(), attribute_string(v))))
        .collect()
}

fn required_attribute(
    doc: &Document,
    refs: &RefAttributes,
    name: &str,
    key: u32,
) -> Result<String, GraphError> {
    refs.get(name)
        .map(attribute_string)
        .ok_or_else(|| GraphError::unresolved(doc, format!("reference for {key} has no {name}")))
}

fn debug_info(doc: &Document, words: &[&str], span: Span) -> DebugInfo {
    let start = (span.start() as usize).min(words.len());
    let end = (span.end() as usize + 1).min(words.len());
    DebugInfo {
        text: words[start..end].join(" "),
        doc_id: doc.id.clone(),
    }
}

/// Step 1: mint ids and attach passthrough metadata. Events come first,
/// then timexes, each in key order.
pub fn format_metadata(doc: &Document, options: &BuildOptions) -> Result<Vec<Mention>, GraphError> {
    let words = doc.words();
    let mut mentions = Vec::with_capacity(doc.entity_count());

    for (&key, &span) in &doc.events {
        let (id, eid, attributes) = match &doc.event_refs {
            None => (
                format!("ei{}", u64::from(options.corpus_offset) + u64::from(key)),
                key.to_string(),
                BTreeMap::new(),
            ),
            Some(refs) => {
                let r = refs
                    .get(&key)
                    .ok_or_else(|| GraphError::unresolved(doc, format!("no event_refs entry for event {key}")))?;
                (
                    required_attribute(doc, r, "eiid", key)?,
                    required_attribute(doc, r, "eid", key)?,
                    copy_attributes(r, EVENT_ATTRIBUTES),
                )
            }
        };
        mentions.push(Mention {
            id,
            span,
            is_timex: false,
            eid: Some(eid),
            attributes,
            debug: None,
        });
    }

    for (&key, &span) in &doc.timex {
        let (id, attributes) = match &doc.timex_refs {
            None => (format!("t{key}"), BTreeMap::new()),
            Some(refs) => {
                let r = refs
                    .get(&key)
                    .ok_or_else(|| GraphError::unresolved(doc, format!("no timex_refs entry for timex {key}")))?;
                (required_attribute(doc, r, "tid", key)?, copy_attributes(r, TIMEX_ATTRIBUTES))
            }
        };
        mentions.push(Mention {
            id,
            span,
            is_timex: true,
            eid: None,
            attributes,
            debug: None,
        });
    }

    let mut seen = FxHashSet::default();
    for mention in &mut mentions {
        if !mention.span.is_well_formed() {
            return Err(GraphError::invalid(
                doc,
                format!("span {:?} of {} ends before it starts", mention.span, mention.id),
            ));
        }
        if !seen.insert(mention.id.clone()) {
            return Err(GraphError::inconsistent(
                doc,
                format!("id {} is used by more than one event or timex", mention.id),
            ));
        }
        if options.attach_debug_text {
            mention.debug = Some(debug_info(doc, &words, mention.span));
        }
    }

    Ok(mentions)
}

/// Numeric keys first in numeric order, then everything else.
fn compare_order_keys(a: &str, b: &str) -> Ordering {
    match (a.parse::<u64>(), b.parse::<u64>()) {
        (Ok(x), Ok(y)) => x.cmp(&y),
        (Ok(_), Err(_)) => Ordering::Less,
        (Err(_), Ok(_)) => Ordering::Greater,
        (Err(_), Err(_)) => a.cmp(b),
    }
}

/// `base + step * BUNDLE_EPSILON`, printed with at least four decimals
/// and as many as the raw time had.
fn offset_time(raw: &str, base: f64, step: u32) -> String {
    let value = base + f64::from(step) * BUNDLE_EPSILON;
    let raw = raw.trim();
    if raw.contains(['e', 'E']) {
        return value.to_string();
    }
    let decimals = raw.split_once('.').map_or(0, |(_, frac)| frac.len()).max(4);
    format!("{value:.decimals$}")
}

/// Step 2: replace every bundle with one `[B]` entry per visible atomic
/// event inside it, `BUNDLE_EPSILON` apart.
pub fn split_bundles(doc: &Document) -> Result<Vec<OrderEntry>, GraphError> {
    let invisible_spans: FxHashSet<Span> = doc
        .invisible_events
        .iter()
        .map(|&word_id| Span(word_id, word_id))
        .collect();

    let mut raw: Vec<(&String, &SpanAnnotation)> = doc.event_order.iter().collect();
    raw.sort_by(|(a, _), (b, _)| compare_order_keys(a, b));

    let mut entries = Vec::with_capacity(raw.len());
    for (key, annotation) in raw {
        if annotation.span_type != SpanType::Bundle {
            entries.push(OrderEntry {
                key: key.clone(),
                sub_order: 0,
                annotation: annotation.clone(),
            });
            continue;
        }

        if annotation.time.contains(':') {
            return Err(GraphError::invalid(
                doc,
                format!("bundle {key} has interval time {:?}", annotation.time),
            ));
        }
        if doc.timex.values().any(|span| annotation.span.contains(span)) {
            return Err(GraphError::invalid(
                doc,
                format!("bundle {key} covers a temporal expression"),
            ));
        }
        let base: f64 = annotation
            .time
            .trim()
            .parse()
            .ok()
            .filter(|t: &f64| t.is_finite())
            .ok_or_else(|| {
                GraphError::invalid(doc, format!("bundle {key} has no point time ({:?})", annotation.time))
            })?;

        let parts = doc
            .events
            .values()
            .filter(|span| annotation.span.contains(span) && !invisible_spans.contains(*span));
        for (step, span) in (1u32..).zip(parts) {
            let mut part = annotation.clone();
            part.span = *span;
            part.span_type = SpanType::Bounded;
            part.time = offset_time(&annotation.time, base, step);
            entries.push(OrderEntry {
                key: key.clone(),
                sub_order: step,
                annotation: part,
            });
        }
    }
    Ok(entries)
}

/// Step 3: give every mention inside a span the span's temporal fields.
/// Later entries override earlier ones for the same mention.
pub fn place_spans(
    doc: &Document,
    entries: &[OrderEntry],
    mentions: &[Mention],
    invisible: &[String],
) -> Result<EventGraph, GraphError> {
    let mut graph = EventGraph::new(&doc.id);

    for entry in entries {
        let span = entry.annotation.span;
        let nested: Vec<&Mention> = mentions.iter().filter(|m| span.contains(&m.span)).collect();
        if nested.is_empty() {
            return Err(GraphError::unresolved(
                doc,
                format!("no events found for span {span:?}"),
            ));
        }

        let mut chosen: Vec<&Mention> = nested
            .iter()
            .copied()
            .filter(|m| !invisible.contains(&m.id))
            .collect();

        if chosen.is_empty() {
            if entry.is_bundle_part() {
                return Err(GraphError::invalid(
                    doc,
                    format!("bundle {} part at {span:?} covers only hidden events", entry.key),
                ));
            }
            if nested.len() != 1 {
                return Err(GraphError::inconsistent(
                    doc,
                    format!("span {span:?} covers {} hidden events and no visible one", nested.len()),
                ));
            }
            warn!(
                doc_id = %doc.id,
                span = ?span,
                "span covers no visible events, using the hidden event under it"
            );
            chosen = nested;
        }

        let event_type = entry
            .annotation
            .span_type
            .interval_type()
            .ok_or_else(|| GraphError::UnsupportedType {
                doc_id: doc.id.clone(),
                tag: entry.annotation.span_type.tag(),
                span,
            })?;

        for mention in chosen {
            let record = mention.place(Position {
                event_type,
                time: entry.annotation.time.clone(),
                branch: entry.annotation.branch.clone(),
                factuality: entry.annotation.factuality.clone(),
                relto: entry.annotation.relto.clone(),
            });
            if graph.upsert(record) {
                debug!(doc_id = %doc.id, id = %mention.id, key = %entry.key, "span annotation overrides an earlier one");
            }
        }
    }

    Ok(graph)
}

/// Step 4: position every hidden event like its last coreferent event
/// that is already in the graph.
pub fn add_invisible_events(
    doc: &Document,
    graph: &mut EventGraph,
    mentions: &[Mention],
    invisible: &[String],
) -> Result<(), GraphError> {
    if invisible.is_empty() {
        return Ok(());
    }

    let index = CoreferenceIndex::build(&doc.event_coreference, mentions).map_err(|w| {
        GraphError::unresolved(doc, format!("no event found for coreferent word id {w}"))
    })?;

    for hidden_id in invisible {
        let mention = mentions
            .iter()
            .find(|m| &m.id == hidden_id)
            .ok_or_else(|| GraphError::unresolved(doc, format!("unknown hidden event {hidden_id}")))?;

        let source = index
            .partners(hidden_id)
            .unwrap_or_default()
            .iter()
            .rev()
            .find_map(|partner| graph.get(partner))
            .cloned()
            .ok_or_else(|| {
                GraphError::unresolved(doc, format!("could not find coreferent event for {hidden_id}"))
            })?;

        graph.upsert(mention.place_like(&source));
    }

    Ok(())
}
