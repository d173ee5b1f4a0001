//! Global section ranking
//!
//! Scores every chunk against the query, aggregates chunk scores into a
//! section score, orders all sections of all documents and extracts the best
//! snippet from each top-ranked section.

use serde::{Deserialize, Serialize};

use crate::aggregate::{MeanOfTopK, DEFAULT_TOP_K};
use crate::error::{RankError, Result};
use crate::model::{Document, Section, SubSectionAnalysis};
use crate::scoring::Scorer;

/// Default number of top sections mined for snippets
pub const DEFAULT_TOP_N_SECTIONS: usize = 5;

/// Ranking configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RankingConfig {
    /// Chunks averaged per section (default: 3)
    pub top_k_chunks: usize,
    /// Top-ranked sections included in sub-section analysis (default: 5)
    pub top_n_sections_for_analysis: usize,
}

impl Default for RankingConfig {
    fn default() -> Self {
        Self {
            top_k_chunks: DEFAULT_TOP_K,
            top_n_sections_for_analysis: DEFAULT_TOP_N_SECTIONS,
        }
    }
}

impl RankingConfig {
    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if self.top_k_chunks == 0 {
            return Err(RankError::invalid_config("top_k_chunks must be at least 1"));
        }
        Ok(())
    }
}

/// Scores, aggregates and ranks sections across documents.
///
/// Holds no state between calls besides its configuration.
#[derive(Debug, Clone)]
pub struct RankingEngine {
    config: RankingConfig,
    scorer: Scorer,
    aggregator: MeanOfTopK,
}

impl RankingEngine {
    /// Create a ranking engine
    ///
    /// # Errors
    /// Returns `RankError::InvalidConfig` if `top_k_chunks` is zero.
    pub fn new(config: RankingConfig) -> Result<Self> {
        config.validate()?;
        log::info!(
            "Ranking engine ready (aggregation: mean of top-{}, analysis: top-{} sections)",
            config.top_k_chunks,
            config.top_n_sections_for_analysis
        );

        Ok(Self {
            scorer: Scorer::new(),
            aggregator: MeanOfTopK::new(config.top_k_chunks),
            config,
        })
    }

    /// Rank every section of every document against `query`.
    ///
    /// Returns all sections, most relevant first, with `aggregated_score` and
    /// `rank` (1-based, dense) populated. Equal scores keep their input order:
    /// documents in the given order, sections in document order.
    ///
    /// # Errors
    /// `RankError::DimensionMismatch` if any chunk embedding differs in
    /// length from `query`. No partial ranking is returned.
    pub fn rank_sections_globally(
        &self,
        documents: Vec<Document>,
        query: &[f32],
    ) -> Result<Vec<Section>> {
        let mut sections: Vec<Section> = documents
            .into_iter()
            .flat_map(|doc| doc.sections)
            .collect();
        log::debug!("Ranking {} sections", sections.len());

        // 1. Score every chunk
        for section in &mut sections {
            for chunk in &mut section.chunks {
                self.scorer.score(chunk, query)?;
            }
        }

        // 2. Aggregate per section
        for section in &mut sections {
            self.aggregator.aggregate(section);
        }

        // 3. Drop sections that never received a score
        let total = sections.len();
        sections.retain(|s| s.aggregated().is_scored());
        let dropped = total - sections.len();
        if dropped > 0 {
            log::warn!("Dropped {dropped} unscored sections from ranking");
        }

        // 4. Stable sort, descending
        sections.sort_by(|a, b| sort_key(b).total_cmp(&sort_key(a)));

        // 5. Dense ranks
        for (position, section) in sections.iter_mut().enumerate() {
            section.set_rank(position + 1);
        }

        log::info!("Global ranking complete: {} sections ranked", sections.len());
        Ok(sections)
    }

    /// Pick the best snippet from each of the top-N ranked sections.
    ///
    /// Sections without chunks are skipped, so fewer than N records may be
    /// returned. Records follow rank order.
    pub fn perform_sub_section_analysis(&self, ranked: &[Section]) -> Vec<SubSectionAnalysis> {
        let analysis: Vec<SubSectionAnalysis> = ranked
            .iter()
            .take(self.config.top_n_sections_for_analysis)
            .filter_map(|section| {
                let rank = section.rank()?;
                let chunk = section.best_chunk()?;
                let score = chunk.similarity_score()?;

                Some(SubSectionAnalysis {
                    source_document: section.source_doc_name.clone(),
                    section_title: section.title.clone(),
                    rank,
                    snippet_text: chunk.text().to_string(),
                    snippet_score: round_to(score, 4),
                })
            })
            .collect();

        log::debug!("Sub-section analysis produced {} snippets", analysis.len());
        analysis
    }
}

/// Total-order key for sorting. -0.0 is folded into 0.0 so the two tie.
fn sort_key(section: &Section) -> f32 {
    match section.aggregated_score() {
        Some(score) if score == 0.0 => 0.0,
        Some(score) => score,
        None => f32::NEG_INFINITY,
    }
}

/// Round to a fixed number of decimal places
fn round_to(value: f32, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (f64::from(value) * factor).round() / factor
}
