//! Neural sentence embeddings via fastembed (ONNX)

use fastembed::{EmbeddingModel, InitOptions, TextEmbedding};
use parking_lot::Mutex;
use std::path::PathBuf;

use super::discovery::find_model_cache_dir;
use super::Embedder;
use crate::error::{RankError, Result};

/// FastEmbedder configuration
#[derive(Debug, Clone)]
pub struct FastEmbedderConfig {
    /// Model name: "bge-small-en-v1.5" (default) or "all-minilm-l6-v2"
    pub model: String,
    /// Model cache directory; discovered when unset
    pub cache_dir: Option<PathBuf>,
    /// Texts per inference batch (default: 64)
    pub batch_size: usize,
    pub show_download_progress: bool,
}

impl Default for FastEmbedderConfig {
    fn default() -> Self {
        Self {
            model: "bge-small-en-v1.5".to_string(),
            cache_dir: None,
            batch_size: 64,
            show_download_progress: false,
        }
    }
}

/// fastembed `TextEmbedding` wrapper
///
/// The model sits behind a mutex so one instance can be shared by all
/// worker threads.
pub struct FastEmbedder {
    model: Mutex<TextEmbedding>,
    name: String,
    dimension: usize,
    batch_size: usize,
}

impl FastEmbedder {
    /// Load (downloading on first use) the configured model
    pub fn new(config: FastEmbedderConfig) -> Result<Self> {
        let model_kind = parse_model(&config.model)?;
        let cache_dir = find_model_cache_dir(config.cache_dir.as_deref())?;

        log::info!(
            "Loading fastembed model '{}' (cache: {})",
            config.model,
            cache_dir.display()
        );

        let model = TextEmbedding::try_new(
            InitOptions::new(model_kind)
                .with_cache_dir(cache_dir)
                .with_show_download_progress(config.show_download_progress),
        )
        .map_err(|e| RankError::model(format!("Failed to load fastembed model: {e}")))?;

        // Probe dimension
        let probe = model
            .embed(vec!["test"], None)
            .map_err(|e| RankError::model(format!("Failed to encode test string: {e}")))?;
        let dimension = probe
            .first()
            .map(Vec::len)
            .ok_or_else(|| RankError::model("Model returned no embedding for test string"))?;

        log::info!("Loaded fastembed model '{}' ({}d)", config.model, dimension);

        Ok(Self {
            model: Mutex::new(model),
            name: config.model,
            dimension,
            batch_size: config.batch_size.max(1),
        })
    }
}

impl Embedder for FastEmbedder {
    fn name(&self) -> &str {
        &self.name
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(vec![]);
        }

        let model = self.model.lock();
        model
            .embed(texts.to_vec(), Some(self.batch_size))
            .map_err(|e| RankError::embedding(format!("Failed to encode texts: {e}")))
    }
}

fn parse_model(name: &str) -> Result<EmbeddingModel> {
    match name.to_ascii_lowercase().as_str() {
        "bge-small-en-v1.5" | "bge-small" => Ok(EmbeddingModel::BGESmallENV15),
        "all-minilm-l6-v2" | "minilm" => Ok(EmbeddingModel::AllMiniLML6V2),
        other => Err(RankError::invalid_config(format!(
            "Unknown embedding model '{other}' (expected bge-small-en-v1.5 or all-minilm-l6-v2)"
        ))),
    }
}
