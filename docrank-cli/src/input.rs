//! Collection input
//!
//! A collection is a directory holding `challenge1b_input.json` and a `PDFs/`
//! folder with the documents it names.

use crate::error::{PipelineError, PipelineResult};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Input descriptor filename inside a collection
pub const INPUT_FILE: &str = "challenge1b_input.json";
/// Default report filename inside a collection
pub const OUTPUT_FILE: &str = "challenge1b_output.json";
/// Document folder inside a collection
pub const DOCUMENTS_DIR: &str = "PDFs";

/// One document entry of the input descriptor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InputDocument {
    pub filename: String,
    #[serde(default)]
    pub title: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Persona {
    #[serde(default)]
    pub role: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct JobToBeDone {
    #[serde(default)]
    pub task: String,
}

/// Parsed `challenge1b_input.json`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollectionInput {
    #[serde(default)]
    pub documents: Vec<InputDocument>,
    #[serde(default)]
    pub persona: Persona,
    #[serde(default)]
    pub job_to_be_done: JobToBeDone,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub challenge_info: Option<serde_json::Value>,
}

/// An opened collection directory
#[derive(Debug, Clone)]
pub struct Collection {
    root: PathBuf,
    input: CollectionInput,
}

impl Collection {
    /// Open a collection directory and read its input descriptor
    pub fn open(root: impl AsRef<Path>) -> PipelineResult<Self> {
        let root = root.as_ref().to_path_buf();
        if !root.is_dir() {
            return Err(PipelineError::CollectionNotFound(root));
        }

        let input_path = root.join(INPUT_FILE);
        if !input_path.is_file() {
            return Err(PipelineError::InputNotFound(input_path));
        }

        let content = std::fs::read_to_string(&input_path)?;
        let input: CollectionInput = serde_json::from_str(&content)?;

        tracing::info!(
            "Opened collection {} ({} documents listed)",
            root.display(),
            input.documents.len()
        );
        tracing::info!("Persona: {}", input.persona.role);
        tracing::info!("Task: {}", input.job_to_be_done.task);

        Ok(Self { root, input })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn input(&self) -> &CollectionInput {
        &self.input
    }

    pub fn persona(&self) -> &str {
        &self.input.persona.role
    }

    pub fn job_to_be_done(&self) -> &str {
        &self.input.job_to_be_done.task
    }

    /// Query text embedded for ranking
    pub fn query(&self) -> String {
        format!("Persona: {}. Task: {}", self.persona(), self.job_to_be_done())
    }

    /// Report location used when none is given
    pub fn default_output_path(&self) -> PathBuf {
        self.root.join(OUTPUT_FILE)
    }

    /// Paths of the listed documents that exist, in listing order.
    ///
    /// Missing files are logged and skipped.
    ///
    /// # Errors
    /// `PipelineError::NoDocuments` if none of the listed files exist.
    pub fn document_paths(&self) -> PipelineResult<Vec<PathBuf>> {
        let dir = self.root.join(DOCUMENTS_DIR);

        let paths: Vec<PathBuf> = self
            .input
            .documents
            .iter()
            .filter_map(|doc| {
                let path = dir.join(&doc.filename);
                if path.is_file() {
                    Some(path)
                } else {
                    tracing::warn!("Document not found, skipping: {}", path.display());
                    None
                }
            })
            .collect();

        if paths.is_empty() {
            return Err(PipelineError::NoDocuments(dir));
        }

        tracing::info!("Found {} documents to process", paths.len());
        Ok(paths)
    }
}
