//! Feature-hashing embedder
//!
//! Offline bag-of-words vectors: every lowercased word is hashed into one
//! signed bucket. Texts sharing vocabulary get a positive cosine similarity.

use sha2::{Digest, Sha256};
use unicode_segmentation::UnicodeSegmentation;

use super::Embedder;
use crate::error::Result;
use crate::scoring::l2_normalize;

/// Default vector length, matching the small sentence-transformer models
pub const DEFAULT_HASH_DIMENSION: usize = 384;

/// Deterministic SHA-256 feature-hashing embedder
#[derive(Debug, Clone)]
pub struct HashEmbedder {
    dimension: usize,
}

impl Default for HashEmbedder {
    fn default() -> Self {
        Self::new(DEFAULT_HASH_DIMENSION)
    }
}

impl HashEmbedder {
    /// Create a hash embedder with `dimension` buckets (at least 1)
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension: dimension.max(1),
        }
    }

    /// Embed one text. Text without words yields the zero vector.
    pub fn embed(&self, text: &str) -> Vec<f32> {
        let mut vector = vec![0.0f32; self.dimension];

        for word in text.to_lowercase().unicode_words() {
            let digest = Sha256::digest(word.as_bytes());
            let mut bucket_bytes = [0u8; 8];
            bucket_bytes.copy_from_slice(&digest[..8]);
            let bucket = (u64::from_le_bytes(bucket_bytes) % self.dimension as u64) as usize;
            let sign = if digest[8] & 1 == 0 { 1.0 } else { -1.0 };
            vector[bucket] += sign;
        }

        l2_normalize(&mut vector);
        vector
    }
}

impl Embedder for HashEmbedder {
    fn name(&self) -> &str {
        "hash"
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        Ok(texts.iter().map(|text| self.embed(text)).collect())
    }
}
