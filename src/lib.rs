//! NarrativeTime → TimeML conversion.
//!
//! Turns span-level NarrativeTime timeline annotations (interval types,
//! times, branches, coreference) into a dense relation graph: one
//! BEFORE/AFTER/INCLUDES/IS_INCLUDED/SIMULTANEOUS/OVERLAP/VAGUE label
//! for every ordered pair of events and timexes in a document.

pub mod core;
pub mod schema;

pub use crate::core::builder::{build_event_graph, BuildOptions, EventGraph, GraphError};
pub use crate::core::config::ConversionConfig;
pub use crate::core::interval::RelationError;
pub use crate::core::matrix::{assemble, RelationMatrix, Tlink};
pub use crate::core::pipeline::{Converter, CorpusReport, PipelineError};
pub use crate::schema::relation::RelType;
