//! Section score aggregation
//!
//! A section scores the mean of its K best chunk scores.

use crate::model::{Score, Section};

/// Default number of chunks averaged per section
pub const DEFAULT_TOP_K: usize = 3;

/// Mean-of-top-K aggregator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MeanOfTopK {
    k: usize,
}

impl Default for MeanOfTopK {
    fn default() -> Self {
        Self { k: DEFAULT_TOP_K }
    }
}

impl MeanOfTopK {
    /// Create an aggregator averaging the best `k` chunks (at least 1)
    pub fn new(k: usize) -> Self {
        Self { k: k.max(1) }
    }

    pub fn k(&self) -> usize {
        self.k
    }

    /// Aggregate a section's chunk scores and store the result on it.
    ///
    /// Sections without chunks score 0.0. If any chunk was never scored the
    /// section stays `Score::Unscored`.
    pub fn aggregate(&self, section: &mut Section) -> Score {
        let scores: Option<Vec<f32>> = section
            .chunks
            .iter()
            .map(|chunk| chunk.similarity_score())
            .collect();

        let aggregated = match scores {
            Some(scores) => Score::Scored(self.mean_of_top_k(scores)),
            None => Score::Unscored,
        };
        section.set_aggregated(aggregated);
        aggregated
    }

    /// Arithmetic mean of the `min(k, len)` largest values, 0.0 when empty
    pub fn mean_of_top_k(&self, mut scores: Vec<f32>) -> f32 {
        if scores.is_empty() {
            return 0.0;
        }

        scores.sort_by(|a, b| b.total_cmp(a));
        let take = self.k.min(scores.len());
        let sum: f32 = scores[..take].iter().sum();
        sum / take as f32
    }
}
