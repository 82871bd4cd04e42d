//! Errors raised while building or loading a narrative graph.

use thiserror::Error;

/// Failures in assembling a [`NarrativeGraph`](crate::NarrativeGraph).
#[derive(Debug, Error)]
pub enum GraphError {
    #[error("duplicate node id '{0}'")]
    DuplicateNode(String),

    #[error("failed to parse TOML graph: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("failed to parse JSON graph: {0}")]
    Json(#[from] serde_json::Error),
}

pub type GraphResult<T> = Result<T, GraphError>;
