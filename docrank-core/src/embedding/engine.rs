//! Vector embedding engine
//!
//! High-level API for generating, normalizing and caching embeddings, and
//! for turning a section's raw text into embedded chunks.

use super::Embedder;
use crate::chunker::Chunker;
use crate::error::{RankError, Result};
use crate::model::{Chunk, Section};
use crate::scoring::l2_normalize;
use dashmap::DashMap;
use std::sync::Arc;

/// Vector embedding engine with caching
///
/// Wraps an [`Embedder`] with a DashMap cache for efficient repeated
/// lookups. Every vector it hands out is L2-normalized and `dimension()`
/// long. Construct once and share (it is `Send + Sync`).
pub struct VectorEngine {
    model: Arc<dyn Embedder>,
    cache: DashMap<String, Vec<f32>>,
    dimension: usize,
}

impl VectorEngine {
    /// Create VectorEngine around an embedder
    pub fn new(model: Arc<dyn Embedder>) -> Result<Self> {
        let dimension = model.dimension();
        if dimension == 0 {
            return Err(RankError::model(format!(
                "Embedder '{}' reports zero dimensions",
                model.name()
            )));
        }

        log::info!("VectorEngine ready ({}, {}d)", model.name(), dimension);

        Ok(Self {
            model,
            cache: DashMap::new(),
            dimension,
        })
    }

    /// Generate embedding with caching
    pub fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let mut batch = self.embed_batch(&[text])?;
        batch
            .pop()
            .ok_or_else(|| RankError::embedding("Embedder returned no vector"))
    }

    /// Embed the query text. Not cached.
    pub fn embed_query(&self, query: &str) -> Result<Vec<f32>> {
        let mut vectors = self.model.embed_batch(&[query])?;
        let mut vector = vectors
            .pop()
            .ok_or_else(|| RankError::embedding("Embedder returned no query vector"))?;
        self.check_dimension(&vector)?;
        l2_normalize(&mut vector);
        Ok(vector)
    }

    /// Batch embed with caching
    pub fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        // Check cache for all texts
        let mut results: Vec<Option<Vec<f32>>> = texts
            .iter()
            .map(|text| self.cache.get(*text).map(|v| v.clone()))
            .collect();

        // Find uncached texts
        let uncached: Vec<(usize, &str)> = results
            .iter()
            .enumerate()
            .filter(|(_, cached)| cached.is_none())
            .map(|(i, _)| (i, texts[i]))
            .collect();

        if uncached.is_empty() {
            return Ok(results.into_iter().flatten().collect());
        }

        // Batch embed uncached texts
        let uncached_texts: Vec<&str> = uncached.iter().map(|(_, t)| *t).collect();
        let new_embeddings = self.model.embed_batch(&uncached_texts)?;
        if new_embeddings.len() != uncached_texts.len() {
            return Err(RankError::embedding(format!(
                "Embedder returned {} vectors for {} texts",
                new_embeddings.len(),
                uncached_texts.len()
            )));
        }

        // Update cache and results
        for ((idx, text), mut emb) in uncached.iter().zip(new_embeddings.into_iter()) {
            self.check_dimension(&emb)?;
            l2_normalize(&mut emb);
            self.cache.insert(text.to_string(), emb.clone());
            results[*idx] = Some(emb);
        }

        Ok(results.into_iter().flatten().collect())
    }

    /// Chunk the section's raw text and attach embedded chunks to it.
    ///
    /// Replaces any existing chunks. Returns the number of chunks attached.
    pub fn process_section(&self, section: &mut Section, chunker: &Chunker) -> Result<usize> {
        let texts = chunker.chunk(&section.raw_text);
        if texts.is_empty() {
            section.chunks.clear();
            return Ok(0);
        }

        let refs: Vec<&str> = texts.iter().map(String::as_str).collect();
        let embeddings = self.embed_batch(&refs)?;

        section.chunks = texts
            .into_iter()
            .zip(embeddings)
            .map(|(text, embedding)| {
                Chunk::new(text, embedding, &section.source_doc_name, &section.title)
            })
            .collect();

        Ok(section.chunks.len())
    }

    /// Get embedding dimension
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// Name of the underlying embedder
    pub fn model_name(&self) -> &str {
        self.model.name()
    }

    /// Get cache size
    pub fn cache_size(&self) -> usize {
        self.cache.len()
    }

    /// Clear the cache
    pub fn clear_cache(&self) {
        self.cache.clear();
    }

    fn check_dimension(&self, vector: &[f32]) -> Result<()> {
        if vector.len() != self.dimension {
            return Err(RankError::embedding(format!(
                "Embedder '{}' returned {} dimensions, expected {}",
                self.model.name(),
                vector.len(),
                self.dimension
            )));
        }
        Ok(())
    }
}
