//! DocRank Core
//!
//! Persona-driven relevance ranking of document sections. Sections from many
//! documents are chunked and embedded, every chunk is scored against a query
//! vector, chunk scores are aggregated per section and all sections are
//! ranked globally. The best snippet of each top-ranked section is then
//! extracted for refinement.
//!
//! ## Features
//!
//! - **Mean-of-top-K aggregation** - A few strong passages beat many weak ones
//! - **Deterministic ranking** - Stable tie-break on input order, dense ranks
//! - **Pluggable embedders** - Offline hash embedder, fastembed behind the `fastembed` feature
//! - **Cached embedding engine** - DashMap-backed, shareable across threads
//!
//! ## Example
//!
//! ```ignore
//! use docrank_core::{Chunker, Document, HashEmbedder, RankingConfig, RankingEngine, Section, VectorEngine};
//! use std::sync::Arc;
//!
//! let vectors = VectorEngine::new(Arc::new(HashEmbedder::default()))?;
//! let chunker = Chunker::default();
//!
//! let mut section = Section::new("Nightlife", 4, "cities.pdf", "Bars and clubs...");
//! vectors.process_section(&mut section, &chunker)?;
//! let doc = Document::new("cities.pdf").with_sections(vec![section]);
//!
//! let query = vectors.embed_query("Persona: Travel Planner. Task: Plan a trip")?;
//! let engine = RankingEngine::new(RankingConfig::default())?;
//! let ranked = engine.rank_sections_globally(vec![doc], &query)?;
//! let snippets = engine.perform_sub_section_analysis(&ranked);
//! ```

pub mod aggregate;
pub mod chunker;
pub mod embedding;
pub mod error;
pub mod model;
pub mod ranking;
pub mod scoring;

// Re-exports for convenience
pub use aggregate::MeanOfTopK;
pub use chunker::{Chunker, ChunkerConfig};
pub use embedding::{Embedder, HashEmbedder, VectorEngine};
pub use error::{RankError, Result};
pub use model::{Chunk, Document, Score, Section, SectionBuilder, SubSectionAnalysis};
pub use ranking::{RankingConfig, RankingEngine};
pub use scoring::Scorer;

#[cfg(feature = "fastembed")]
pub use embedding::{FastEmbedder, FastEmbedderConfig};
