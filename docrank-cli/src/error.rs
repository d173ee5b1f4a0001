//! Error types for the DocRank pipeline.

use docrank_core::RankError;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while loading, processing or reporting a collection.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Collection directory not found: {0}")]
    CollectionNotFound(PathBuf),

    #[error("Input file not found: {0}")]
    InputNotFound(PathBuf),

    #[error("No readable documents found in {0}")]
    NoDocuments(PathBuf),

    #[error("Failed to parse {path}: {message}")]
    Parse { path: PathBuf, message: String },

    #[error("Processing exceeded time budget of {0}s")]
    Timeout(u64),

    #[error("Worker task failed: {0}")]
    Task(String),

    #[error("Ranking error: {0}")]
    Rank(#[from] RankError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl PipelineError {
    /// Create a parse error for a document
    pub fn parse(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::Parse {
            path: path.into(),
            message: message.into(),
        }
    }
}

/// Result type alias for pipeline operations.
pub type PipelineResult<T> = Result<T, PipelineError>;
