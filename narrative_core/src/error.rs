//! Engine errors - caller misuse and graph integrity violations.

use story_graph::ValidationReport;
use thiserror::Error;

/// Failures surfaced by the traversal controller.
///
/// Locked choices and unresolved placeholders are normal narrative conditions
/// and never show up here.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("node '{0}' does not exist in the graph")]
    UnknownNode(String),

    #[error("choice '{choice}' does not belong to node '{node_id}'")]
    ForeignChoice { node_id: String, choice: String },

    #[error("choice '{choice}' is not available at node '{node_id}'")]
    ChoiceUnavailable { node_id: String, choice: String },

    #[error("no available choice at index {index} (node '{node_id}' offers {available})")]
    ChoiceIndexOutOfRange {
        node_id: String,
        index: usize,
        available: usize,
    },

    #[error("choice '{choice}' at node '{node_id}' targets missing node '{target}'")]
    DanglingTarget {
        node_id: String,
        choice: String,
        target: String,
    },

    #[error("cannot {op} non-numeric value for '{key}'")]
    NonNumericUpdate { key: String, op: &'static str },

    #[error("graph failed validation: {0}")]
    InvalidGraph(ValidationReport),

    #[error("invalid engine configuration: {0}")]
    Config(#[from] toml::de::Error),
}

pub type EngineResult<T> = Result<T, EngineError>;
