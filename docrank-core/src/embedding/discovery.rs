//! Model cache discovery
//!
//! Decides where downloaded embedding models are stored and looked up.

use crate::error::{RankError, Result};
use std::path::{Path, PathBuf};

/// Environment variable overriding the model cache directory
pub const MODELS_PATH_ENV: &str = "DOCRANK_MODELS_PATH";

/// Find the model cache directory with priority:
/// 1. Explicitly configured directory
/// 2. DOCRANK_MODELS_PATH environment variable
/// 3. User home directory (~/.docrank/models)
///
/// The directory does not need to exist yet; models are downloaded into it
/// on first use.
pub fn find_model_cache_dir(configured: Option<&Path>) -> Result<PathBuf> {
    // Priority 1: explicit setting
    if let Some(path) = configured {
        log::info!("Using configured model cache: {}", path.display());
        return Ok(path.to_path_buf());
    }

    // Priority 2: environment
    if let Some(path) = std::env::var_os(MODELS_PATH_ENV).filter(|v| !v.is_empty()) {
        let path = PathBuf::from(path);
        log::info!("Using {}: {}", MODELS_PATH_ENV, path.display());
        return Ok(path);
    }

    // Priority 3: user home directory
    if let Some(home) = std::env::var_os("HOME").or_else(|| std::env::var_os("USERPROFILE")) {
        let path = PathBuf::from(home).join(".docrank").join("models");
        log::debug!("Using user model cache: {}", path.display());
        return Ok(path);
    }

    log::warn!("No model cache directory could be determined");
    Err(RankError::model(
        "Model cache directory not found. Checked:\n\
         - configured cache_dir\n\
         - DOCRANK_MODELS_PATH environment variable\n\
         - ~/.docrank/models",
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_configured_path_wins() {
        let configured = Path::new("/opt/docrank/models");
        let found = find_model_cache_dir(Some(configured)).unwrap();
        assert_eq!(found, configured);
    }

    #[test]
    fn test_fallback_resolves_or_reports() {
        match find_model_cache_dir(None) {
            Ok(path) => assert!(path.components().count() > 0),
            Err(e) => assert!(e.to_string().contains("not found")),
        }
    }
}
