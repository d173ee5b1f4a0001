//! Embedding module
//!
//! Turns chunk and query text into vectors. A deterministic hash embedder is
//! always available; neural embeddings via fastembed sit behind the
//! `fastembed` feature.

mod discovery;
mod engine;
mod hash;

#[cfg(feature = "fastembed")]
mod fastembed;

pub use discovery::find_model_cache_dir;
pub use engine::VectorEngine;
pub use hash::{HashEmbedder, DEFAULT_HASH_DIMENSION};

#[cfg(feature = "fastembed")]
pub use self::fastembed::{FastEmbedder, FastEmbedderConfig};

use crate::error::Result;

/// A text embedding backend.
///
/// Implementations must be deterministic for a given model and return one
/// vector of `dimension()` entries per input text, in input order.
pub trait Embedder: Send + Sync {
    /// Short backend/model name for logs
    fn name(&self) -> &str;

    /// Length of every vector this embedder returns
    fn dimension(&self) -> usize;

    /// Embed a batch of texts
    fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>>;
}
