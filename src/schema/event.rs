use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::annotation::Span;
use super::interval::IntervalType;

/// Covered text and source document, attached when debugging output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DebugInfo {
    pub text: String,
    pub doc_id: String,
}

/// A canonical event or timex with its resolved temporal position.
///
/// This is the unit the relation engine works on: every record in a
/// finished event graph has exactly one interval type and raw time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventRecord {
    /// `t{n}`/`tid` for timexes, `ei{n}`/`eiid` for events.
    pub id: String,
    pub span: Span,
    pub is_timex: bool,
    /// TimeML event id (`eid`), absent for timexes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub eid: Option<String>,
    pub event_type: IntervalType,
    /// Raw time: empty, `":"`, a number, or `"start:end"`.
    pub time: String,
    /// Empty for the main timeline.
    pub branch: String,
    pub factuality: String,
    pub relto: String,
    pub is_visible_during_annotation: bool,
    /// For events hidden from the annotator: the coreferent event the
    /// temporal fields were copied from.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coreferent_of: Option<String>,
    /// Passthrough TimeML attributes.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub attributes: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub debug: Option<DebugInfo>,
}

/// An event or timex mention before it has been placed on a timeline.
#[derive(Debug, Clone, PartialEq)]
pub struct Mention {
    pub id: String,
    pub span: Span,
    pub is_timex: bool,
    pub eid: Option<String>,
    pub attributes: BTreeMap<String, String>,
    pub debug: Option<DebugInfo>,
}

/// The temporal fields a span annotation assigns to every mention it covers.
#[derive(Debug, Clone, PartialEq)]
pub struct Position {
    pub event_type: IntervalType,
    pub time: String,
    pub branch: String,
    pub factuality: String,
    pub relto: String,
}

impl Mention {
    /// A visible record at `position`.
    pub fn place(&self, position: Position) -> EventRecord {
        EventRecord {
            id: self.id.clone(),
            span: self.span,
            is_timex: self.is_timex,
            eid: self.eid.clone(),
            event_type: position.event_type,
            time: position.time,
            branch: position.branch,
            factuality: position.factuality,
            relto: position.relto,
            is_visible_during_annotation: true,
            coreferent_of: None,
            attributes: self.attributes.clone(),
            debug: self.debug.clone(),
        }
    }

    /// A record hidden during annotation, positioned like its coreferent `source`.
    pub fn place_like(&self, source: &EventRecord) -> EventRecord {
        let mut record = self.place(Position {
            event_type: source.event_type,
            time: source.time.clone(),
            branch: source.branch.clone(),
            factuality: source.factuality.clone(),
            relto: String::new(),
        });
        record.is_visible_during_annotation = false;
        record.coreferent_of = Some(source.id.clone());
        record
    }
}

impl EventRecord {
    pub fn is_on_main_timeline(&self) -> bool {
        self.branch.is_empty()
    }

    pub fn shares_branch_with(&self, other: &EventRecord) -> bool {
        self.branch == other.branch
    }
}

/// A FactBank factuality value for one event instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FactValue {
    pub fvid: usize,
    pub eiid: String,
    pub value: String,
}

/// Map a NarrativeTime factuality code to its FactBank value.
pub fn fact_value(code: &str) -> Option<&'static str> {
    match code {
        "" => Some("CT+"),
        "-" => Some("CT-"),
        "m" => Some("PS+"),
        "m-" => Some("PS-"),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(branch: &str) -> EventRecord {
        EventRecord {
            id: "ei3".to_string(),
            span: Span(4, 4),
            is_timex: false,
            eid: Some("3".to_string()),
            event_type: IntervalType::Bounded,
            time: "1".to_string(),
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
    fn branch_membership() {
        let main = record("");
        let future = record("3>");
        assert!(main.is_on_main_timeline());
        assert!(!future.is_on_main_timeline());
        assert!(!main.shares_branch_with(&future));
        assert!(future.shares_branch_with(&record("3>")));
    }

    #[test]
    fn hidden_mentions_copy_temporal_fields() {
        let mut source = record("<4");
        source.event_type = IntervalType::RightOpen;
        source.factuality = "m".to_string();
        source.relto = "t1".to_string();
        let hidden = Mention {
            id: "ei9".to_string(),
            span: Span(12, 12),
            is_timex: false,
            eid: Some("9".to_string()),
            attributes: BTreeMap::new(),
            debug: None,
        };
        let placed = hidden.place_like(&source);
        assert_eq!(placed.id, "ei9");
        assert_eq!(placed.span, Span(12, 12));
        assert_eq!(placed.event_type, IntervalType::RightOpen);
        assert_eq!(placed.time, "1");
        assert_eq!(placed.branch, "<4");
        assert_eq!(placed.factuality, "m");
        assert_eq!(placed.relto, "");
        assert!(!placed.is_visible_during_annotation);
        assert_eq!(placed.coreferent_of.as_deref(), Some("ei3"));
    }

    #[test]
    fn factuality_codes() {
        assert_eq!(fact_value(""), Some("CT+"));
        assert_eq!(fact_value("-"), Some("CT-"));
        assert_eq!(fact_value("m"), Some("PS+"));
        assert_eq!(fact_value("m-"), Some("PS-"));
        assert_eq!(fact_value("x"), None);
    }

    #[test]
    fn serialization_skips_empty_optionals() {
        let json = serde_json::to_value(record("")).unwrap();
        assert!(json.get("coreferent_of").is_none());
        assert!(json.get("attributes").is_none());
        assert_eq!(json["event_type"], "[B]");
    }
}
