//! The conversion pipeline: raw annotation → event graph → relation matrix.
//!
//! Wires together the event-graph builder, the relation assembler and
//! factuality export, and drives them over a whole corpus.

use serde::Serialize;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, error, info};

use crate::core::builder::{build_event_graph, BuildOptions, EventGraph, GraphError};
use crate::core::config::{ConfigError, ConversionConfig};
use crate::core::interval::RelationError;
use crate::core::matrix::{assemble, RelationMatrix, Tlink};
use crate::schema::annotation::Document;
use crate::schema::event::{fact_value, EventRecord, FactValue};

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("graph error: {0}")]
    Graph(#[from] GraphError),
    #[error("{doc_id}: relation error: {source}")]
    Relation {
        doc_id: String,
        source: RelationError,
    },
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error on line {line}: {source}")]
    Json {
        line: usize,
        source: serde_json::Error,
    },
    #[error("{doc_id}: invalid annotation: {reason}")]
    InvalidAnnotation { doc_id: String, reason: String },
    #[error("{failed} of {total} documents failed to convert")]
    CorpusFailed { failed: usize, total: usize },
}

/// Everything computed for one document.
#[derive(Debug, Clone)]
pub struct ConvertedDocument {
    pub id: String,
    pub graph: EventGraph,
    pub matrix: RelationMatrix,
    pub fact_values: Vec<FactValue>,
}

/// Serializable view of a converted document.
#[derive(Debug, Serialize)]
pub struct DocumentOutput<'a> {
    pub id: &'a str,
    pub events: &'a [EventRecord],
    pub tlinks: Vec<Tlink>,
    pub fact_values: &'a [FactValue],
}

impl ConvertedDocument {
    pub fn output(&self) -> DocumentOutput<'_> {
        DocumentOutput {
            id: &self.id,
            events: self.graph.records(),
            tlinks: self.matrix.tlinks().collect(),
            fact_values: &self.fact_values,
        }
    }
}

/// A document that could not be converted.
#[derive(Debug)]
pub struct DocumentFailure {
    pub id: String,
    pub error: PipelineError,
}

/// Outcome of a corpus run. Failures never stop the run.
#[derive(Debug, Default)]
pub struct CorpusReport {
    pub converted: Vec<ConvertedDocument>,
    pub failures: Vec<DocumentFailure>,
}

impl CorpusReport {
    pub fn total(&self) -> usize {
        self.converted.len() + self.failures.len()
    }

    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }

    /// The converted documents, or an error if any document failed.
    pub fn into_result(self) -> Result<Vec<ConvertedDocument>, PipelineError> {
        if self.failures.is_empty() {
            return Ok(self.converted);
        }
        Err(PipelineError::CorpusFailed {
            failed: self.failures.len(),
            total: self.total(),
        })
    }
}

/// Converts documents one at a time, keeping instance ids unique across
/// a corpus. Built via `Converter::builder()`.
pub struct Converter {
    config: ConversionConfig,
    next_offset: u32,
}

/// Builder for constructing a `Converter`.
#[derive(Default)]
pub struct ConverterBuilder {
    config: Option<ConversionConfig>,
    config_path: Option<PathBuf>,
    corpus_offset: Option<u32>,
    use_global_instance_ids: Option<bool>,
    attach_debug_text: Option<bool>,
}

impl Converter {
    pub fn builder() -> ConverterBuilder {
        ConverterBuilder::default()
    }

    pub fn config(&self) -> &ConversionConfig {
        &self.config
    }

    /// Instance offset the next document will use.
    pub fn next_offset(&self) -> u32 {
        self.next_offset
    }

    /// Convert one document.
    pub fn convert(&mut self, doc: &Document) -> Result<ConvertedDocument, PipelineError> {
        let options = BuildOptions {
            corpus_offset: self.next_offset,
            attach_debug_text: self.config.attach_debug_text,
        };

        let graph = build_event_graph(doc, &options)?;
        let matrix = assemble(&graph).map_err(|source| PipelineError::Relation {
            doc_id: doc.id.clone(),
            source,
        })?;
        let fact_values = fact_values(&doc.id, &graph)?;

        if self.config.use_global_instance_ids {
            let events = u32::try_from(doc.events.len()).unwrap_or(u32::MAX);
            self.next_offset = self.next_offset.saturating_add(events);
        }

        debug!(
            doc_id = %doc.id,
            records = graph.len(),
            tlinks = matrix.label_count(),
            "converted document"
        );

        Ok(ConvertedDocument {
            id: doc.id.clone(),
            graph,
            matrix,
            fact_values,
        })
    }

    /// Convert every document in order. A failed document is logged and
    /// recorded; later documents are still converted.
    pub fn convert_corpus(&mut self, docs: &[Document]) -> CorpusReport {
        let mut report = CorpusReport::default();
        for doc in docs {
            match self.convert(doc) {
                Ok(converted) => report.converted.push(converted),
                Err(e) => {
                    error!(doc_id = %doc.id, error = %e, "failed to convert document");
                    report.failures.push(DocumentFailure {
                        id: doc.id.clone(),
                        error: e,
                    });
                }
            }
        }
        info!(
            converted = report.converted.len(),
            failed = report.failures.len(),
            "converted corpus"
        );
        report
    }
}

impl ConverterBuilder {
    /// Use `config` as the base settings.
    pub fn config(mut self, config: ConversionConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Load base settings from a RON file. Ignored when `config` is set.
    pub fn config_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config_path = Some(path.into());
        self
    }

    pub fn corpus_offset(mut self, offset: u32) -> Self {
        self.corpus_offset = Some(offset);
        self
    }

    pub fn use_global_instance_ids(mut self, enabled: bool) -> Self {
        self.use_global_instance_ids = Some(enabled);
        self
    }

    pub fn attach_debug_text(mut self, enabled: bool) -> Self {
        self.attach_debug_text = Some(enabled);
        self
    }

    pub fn build(self) -> Result<Converter, PipelineError> {
        let mut config = match (self.config, self.config_path) {
            (Some(config), _) => config,
            (None, Some(path)) => ConversionConfig::load_from_ron(&path)?,
            (None, None) => ConversionConfig::default(),
        };

        // Explicit overrides win over the file
        if let Some(offset) = self.corpus_offset {
            config.corpus_offset = offset;
        }
        if let Some(enabled) = self.use_global_instance_ids {
            config.use_global_instance_ids = enabled;
        }
        if let Some(enabled) = self.attach_debug_text {
            config.attach_debug_text = enabled;
        }

        Ok(Converter {
            next_offset: config.corpus_offset,
            config,
        })
    }
}

/// FactBank values for every event in the graph, numbered from 1.
pub fn fact_values(doc_id: &str, graph: &EventGraph) -> Result<Vec<FactValue>, PipelineError> {
    graph
        .iter()
        .filter(|r| !r.is_timex)
        .zip(1usize..)
        .map(|(record, fvid)| -> Result<FactValue, PipelineError> {
            let value = fact_value(&record.factuality).ok_or_else(|| PipelineError::InvalidAnnotation {
                doc_id: doc_id.to_string(),
                reason: format!("unknown factuality {:?} on {}", record.factuality, record.id),
            })?;
            Ok(FactValue {
                fvid,
                eiid: record.id.clone(),
                value: value.to_string(),
            })
        })
        .collect()
}

/// Parse a JSON-lines corpus, one document per non-empty line.
pub fn parse_jsonl(input: &str) -> Result<Vec<Document>, PipelineError> {
    input
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(i, line)| {
            serde_json::from_str(line).map_err(|source| PipelineError::Json { line: i + 1, source })
        })
        .collect()
}

/// Load a JSON-lines corpus from disk.
pub fn load_jsonl(path: &Path) -> Result<Vec<Document>, PipelineError> {
    let contents = std::fs::read_to_string(path)?;
    parse_jsonl(&contents)
}

#[cfg(test)]
mod tests {
    use super::*;

    const CORPUS: &str = r#"{"id": "a", "text": "x y", "events": {"0": [0, 0], "1": [1, 1]}, "event_order": {"0": {"span": [0, 0], "type": 0, "time": "1"}, "1": {"span": [1, 1], "type": 0, "time": "2", "factuality": "m-"}}}

{"id": "b", "text": "z", "events": {"0": [0, 0]}, "event_order": {"0": {"span": [0, 0], "type": 2, "time": "", "factuality": "?"}}}
{"id": "c", "text": "z", "events": {"0": [0, 0]}, "event_order": {"0": {"span": [0, 0], "type": 3, "time": "5"}}}
"#;

    fn corpus() -> Vec<Document> {
        parse_jsonl(CORPUS).unwrap()
    }

    #[test]
    fn parse_skips_blank_lines() {
        let docs = corpus();
        assert_eq!(docs.len(), 3);
        assert_eq!(docs[2].id, "c");
    }

    #[test]
    fn json_errors_carry_line_numbers() {
        let err = parse_jsonl("{\"id\": \"a\", \"text\": \"\"}\n\n{oops").unwrap_err();
        assert!(matches!(err, PipelineError::Json { line: 3, .. }));
    }

    #[test]
    fn unknown_type_code_is_rejected() {
        let line = r#"{"id": "a", "text": "x", "event_order": {"0": {"span": [0, 0], "type": 9}}}"#;
        assert!(matches!(parse_jsonl(line), Err(PipelineError::Json { line: 1, .. })));
    }

    #[test]
    fn convert_and_export_fact_values() {
        let mut converter = Converter::builder().build().unwrap();
        let converted = converter.convert(&corpus()[0]).unwrap();
        assert_eq!(converted.graph.len(), 2);
        assert_eq!(converted.matrix.get("ei0", "ei1"), Some(crate::schema::relation::RelType::Before));
        let values: Vec<(usize, &str, &str)> = converted
            .fact_values
            .iter()
            .map(|f| (f.fvid, f.eiid.as_str(), f.value.as_str()))
            .collect();
        assert_eq!(values, [(1, "ei0", "CT+"), (2, "ei1", "PS-")]);
    }

    #[test]
    fn global_ids_advance_only_on_success() {
        let docs = corpus();
        let mut converter = Converter::builder().corpus_offset(10).build().unwrap();
        let report = converter.convert_corpus(&docs);
        assert_eq!(report.converted.len(), 2);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].id, "b");
        assert!(matches!(report.failures[0].error, PipelineError::InvalidAnnotation { .. }));
        assert_eq!(report.converted[1].graph.records()[0].id, "ei12");
        assert_eq!(converter.next_offset(), 13);
    }

    #[test]
    fn local_ids_restart_every_document() {
        let docs = corpus();
        let mut converter = Converter::builder().use_global_instance_ids(false).build().unwrap();
        let report = converter.convert_corpus(&docs);
        assert_eq!(report.converted[1].graph.records()[0].id, "ei0");
        assert_eq!(converter.next_offset(), 0);
    }

    #[test]
    fn failures_surface_through_into_result() {
        let mut converter = Converter::builder().build().unwrap();
        let report = converter.convert_corpus(&corpus());
        assert!(!report.is_clean());
        assert!(matches!(
            report.into_result(),
            Err(PipelineError::CorpusFailed { failed: 1, total: 3 })
        ));
    }

    #[test]
    fn builder_overrides_config() {
        let config = ConversionConfig {
            use_global_instance_ids: true,
            attach_debug_text: false,
            corpus_offset: 3,
        };
        let converter = Converter::builder()
            .config(config)
            .attach_debug_text(true)
            .build()
            .unwrap();
        assert!(converter.config().attach_debug_text);
        assert_eq!(converter.next_offset(), 3);
    }

    #[test]
    fn missing_config_file_fails_build() {
        let result = Converter::builder().config_path("tests/fixtures/absent.ron").build();
        assert!(matches!(result, Err(PipelineError::Config(ConfigError::Io(_)))));
    }

    #[test]
    fn output_lists_tlinks() {
        let mut converter = Converter::builder().build().unwrap();
        let converted = converter.convert(&corpus()[0]).unwrap();
        let json = serde_json::to_value(converted.output()).unwrap();
        assert_eq!(json["id"], "a");
        assert_eq!(json["tlinks"].as_array().unwrap().len(), 2);
        assert_eq!(json["tlinks"][0]["relation"], "BEFORE");
        assert_eq!(json["tlinks"][1]["relation"], "AFTER");
        assert_eq!(json["fact_values"][1]["value"], "PS-");
    }
}
