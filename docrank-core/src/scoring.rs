//! Chunk scoring
//!
//! Similarity between a chunk embedding and the query vector. Both sides are
//! unit length, so the inner product is the cosine similarity.

use crate::error::{RankError, Result};
use crate::model::Chunk;

/// Scores chunks against a query vector
#[derive(Debug, Clone, Copy, Default)]
pub struct Scorer;

impl Scorer {
    pub fn new() -> Self {
        Self
    }

    /// Compute the chunk's similarity to `query` and record it on the chunk.
    ///
    /// # Errors
    /// `RankError::DimensionMismatch` if the vector lengths differ. The chunk
    /// is left untouched in that case.
    pub fn score(&self, chunk: &mut Chunk, query: &[f32]) -> Result<f32> {
        let embedding = chunk.embedding();
        if embedding.len() != query.len() {
            return Err(RankError::dimension_mismatch(
                query.len(),
                embedding.len(),
                chunk.source_doc_name(),
                chunk.source_section_title(),
            ));
        }

        let score = dot(embedding, query);
        chunk.set_similarity(score);
        Ok(score)
    }
}

/// Inner product of two equal-length vectors
pub fn dot(a: &[f32], b: &[f32]) -> f32 {
    debug_assert_eq!(a.len(), b.len());
    a.iter().zip(b.iter()).map(|(x, y)| x * y).sum()
}

/// Scale a vector to unit L2 norm in place. Zero vectors are left as is.
pub fn l2_normalize(vector: &mut [f32]) {
    let norm: f32 = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > 0.0 && norm.is_finite() {
        for value in vector.iter_mut() {
            *value /= norm;
        }
    }
}
