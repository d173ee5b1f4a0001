//! Pipeline settings
//!
//! Settings come from an optional JSON file; command-line flags override
//! individual fields. Every field has a default so an empty file (or none at
//! all) is a valid configuration.

use crate::error::PipelineResult;
use docrank_core::embedding::DEFAULT_HASH_DIMENSION;
use docrank_core::{ChunkerConfig, Embedder, HashEmbedder, RankError, RankingConfig};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Default model for the fastembed backend
pub const DEFAULT_MODEL: &str = "bge-small-en-v1.5";

/// Which embedder turns text into vectors
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum EmbedderBackend {
    /// Offline feature hashing, no model download
    #[default]
    Hash,
    /// Neural sentence embeddings (requires the `fastembed` feature)
    Fastembed,
}

/// Embedding settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingSettings {
    pub backend: EmbedderBackend,
    /// Model name for the fastembed backend
    pub model: String,
    /// Model cache directory; discovered when unset
    pub cache_dir: Option<PathBuf>,
    /// Vector length for the hash backend
    pub hash_dimension: usize,
}

impl Default for EmbeddingSettings {
    fn default() -> Self {
        Self {
            backend: EmbedderBackend::Hash,
            model: DEFAULT_MODEL.to_string(),
            cache_dir: None,
            hash_dimension: DEFAULT_HASH_DIMENSION,
        }
    }
}

impl EmbeddingSettings {
    /// Construct the configured embedder
    pub fn build_embedder(&self) -> PipelineResult<Arc<dyn Embedder>> {
        match self.backend {
            EmbedderBackend::Hash => Ok(Arc::new(HashEmbedder::new(self.hash_dimension))),
            EmbedderBackend::Fastembed => self.build_fastembed(),
        }
    }

    #[cfg(feature = "fastembed")]
    fn build_fastembed(&self) -> PipelineResult<Arc<dyn Embedder>> {
        use docrank_core::{FastEmbedder, FastEmbedderConfig};

        let embedder = FastEmbedder::new(FastEmbedderConfig {
            model: self.model.clone(),
            cache_dir: self.cache_dir.clone(),
            ..Default::default()
        })?;
        Ok(Arc::new(embedder))
    }

    #[cfg(not(feature = "fastembed"))]
    fn build_fastembed(&self) -> PipelineResult<Arc<dyn Embedder>> {
        Err(RankError::invalid_config(
            "the fastembed backend requires building with `--features fastembed`",
        )
        .into())
    }
}

/// Complete pipeline settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub ranking: RankingConfig,
    pub chunking: ChunkerConfig,
    pub embedding: EmbeddingSettings,
    /// Documents processed concurrently (default: 4)
    pub workers: usize,
    /// Ranked sections listed in the report (default: 5)
    pub extracted_sections_limit: usize,
    /// Time budget for a whole run, in seconds
    pub timeout_secs: Option<u64>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            ranking: RankingConfig::default(),
            chunking: ChunkerConfig::default(),
            embedding: EmbeddingSettings::default(),
            workers: 4,
            extracted_sections_limit: 5,
            timeout_secs: None,
        }
    }
}

impl Settings {
    /// Load settings from a JSON file, or defaults when no file is given
    pub fn load(path: Option<&Path>) -> PipelineResult<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };

        let content = std::fs::read_to_string(path)?;
        let settings: Self = serde_json::from_str(&content)?;
        tracing::debug!("Loaded settings from {}", path.display());
        Ok(settings)
    }

    /// Apply command-line overrides on top of the loaded values
    pub fn apply(&mut self, overrides: SettingsOverrides) {
        if let Some(backend) = overrides.embedder {
            self.embedding.backend = backend;
        }
        if let Some(model) = overrides.model {
            self.embedding.model = model;
        }
        if let Some(top_k) = overrides.top_k {
            self.ranking.top_k_chunks = top_k;
        }
        if let Some(top_n) = overrides.top_n {
            self.ranking.top_n_sections_for_analysis = top_n;
        }
        if let Some(workers) = overrides.workers {
            self.workers = workers;
        }
        if let Some(timeout) = overrides.timeout_secs {
            self.timeout_secs = Some(timeout);
        }
    }

    /// Validate configuration values
    pub fn validate(&self) -> PipelineResult<()> {
        self.ranking.validate()?;
        if self.workers == 0 {
            return Err(RankError::invalid_config("workers must be at least 1").into());
        }
        if self.embedding.hash_dimension == 0 {
            return Err(RankError::invalid_config("hash_dimension must be at least 1").into());
        }
        Ok(())
    }
}

/// Values given on the command line
#[derive(Debug, Clone, Default)]
pub struct SettingsOverrides {
    pub embedder: Option<EmbedderBackend>,
    pub model: Option<String>,
    pub top_k: Option<usize>,
    pub top_n: Option<usize>,
    pub workers: Option<usize>,
    pub timeout_secs: Option<u64>,
}
