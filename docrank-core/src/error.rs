//! Error types for docrank-core

use thiserror::Error;

/// Errors that can occur while embedding, scoring or ranking sections
#[derive(Debug, Error)]
pub enum RankError {
    /// Query vector and a chunk embedding disagree on dimensionality.
    /// Fatal for the whole ranking call.
    #[error(
        "Dimension mismatch: query has {expected} dimensions but a chunk of \
         section '{section}' in '{document}' has {actual}"
    )]
    DimensionMismatch {
        expected: usize,
        actual: usize,
        document: String,
        section: String,
    },

    /// Invalid engine or chunker configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Model loading error
    #[error("Model error: {0}")]
    Model(String),

    /// Embedding generation error
    #[error("Embedding error: {0}")]
    Embedding(String),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl RankError {
    /// Create a dimension mismatch error for a chunk
    pub fn dimension_mismatch(
        expected: usize,
        actual: usize,
        document: impl Into<String>,
        section: impl Into<String>,
    ) -> Self {
        Self::DimensionMismatch {
            expected,
            actual,
            document: document.into(),
            section: section.into(),
        }
    }

    /// Create an invalid configuration error
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::InvalidConfig(msg.into())
    }

    /// Create a model error
    pub fn model(msg: impl Into<String>) -> Self {
        Self::Model(msg.into())
    }

    /// Create an embedding error
    pub fn embedding(msg: impl Into<String>) -> Self {
        Self::Embedding(msg.into())
    }

    /// Create a generic error
    pub fn other(msg: impl Into<String>) -> Self {
        Self::Other(msg.into())
    }

    /// Whether this error is a vector dimensionality mismatch
    pub fn is_dimension_mismatch(&self) -> bool {
        matches!(self, Self::DimensionMismatch { .. })
    }
}

/// Result type for ranking operations
pub type Result<T> = std::result::Result<T, RankError>;
