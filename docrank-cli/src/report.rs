//! Output report
//!
//! Shapes ranked sections and snippets into the JSON report written next to
//! the collection input.

use crate::error::PipelineResult;
use docrank_core::{Section, SubSectionAnalysis};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::Path;
use std::sync::OnceLock;

/// Timestamp format for `processing_timestamp`
const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Metadata {
    pub input_documents: Vec<String>,
    pub persona: String,
    pub job_to_be_done: String,
    pub processing_timestamp: String,
}

/// A top-ranked section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractedSection {
    pub document: String,
    pub section_title: String,
    pub importance_rank: usize,
    pub page_number: u32,
}

/// A refined snippet from a top-ranked section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubsectionEntry {
    pub document: String,
    pub refined_text: String,
    pub page_number: u32,
}

/// The complete output document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    pub metadata: Metadata,
    pub extracted_sections: Vec<ExtractedSection>,
    pub subsection_analysis: Vec<SubsectionEntry>,
}

impl Report {
    /// Serialize with 4-space indentation
    pub fn to_json(&self) -> PipelineResult<String> {
        let mut buf = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
        let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
        self.serialize(&mut serializer)?;
        String::from_utf8(buf)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e).into())
    }

    /// Write the report as UTF-8 JSON, creating parent directories
    pub fn write_to_file(&self, path: &Path) -> PipelineResult<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let json = self.to_json()?;
        let mut file = std::fs::File::create(path)?;
        file.write_all(json.as_bytes())?;
        file.write_all(b"\n")?;

        tracing::info!("Report written to {}", path.display());
        Ok(())
    }
}

/// Builds a [`Report`] from ranking results
#[derive(Debug, Clone)]
pub struct ReportBuilder {
    input_documents: Vec<String>,
    persona: String,
    job_to_be_done: String,
    extracted_sections_limit: usize,
    timestamp: Option<String>,
}

impl ReportBuilder {
    pub fn new(
        input_documents: Vec<String>,
        persona: impl Into<String>,
        job_to_be_done: impl Into<String>,
    ) -> Self {
        Self {
            input_documents,
            persona: persona.into(),
            job_to_be_done: job_to_be_done.into(),
            extracted_sections_limit: 5,
            timestamp: None,
        }
    }

    /// Number of ranked sections listed under `extracted_sections` (default: 5)
    pub fn extracted_sections_limit(mut self, limit: usize) -> Self {
        self.extracted_sections_limit = limit;
        self
    }

    /// Fix the processing timestamp (defaults to local time at build)
    pub fn timestamp(mut self, timestamp: impl Into<String>) -> Self {
        self.timestamp = Some(timestamp.into());
        self
    }

    pub fn build(self, ranked: &[Section], analysis: &[SubSectionAnalysis]) -> Report {
        let extracted_sections = ranked
            .iter()
            .take(self.extracted_sections_limit)
            .filter_map(|section| {
                Some(ExtractedSection {
                    document: section.source_doc_name.clone(),
                    section_title: section.title.clone(),
                    importance_rank: section.rank()?,
                    page_number: section.page_number,
                })
            })
            .collect();

        let subsection_analysis = analysis
            .iter()
            .filter_map(|record| {
                let section = ranked.get(record.rank.checked_sub(1)?)?;
                Some(SubsectionEntry {
                    document: record.source_document.clone(),
                    refined_text: refine_text(&record.snippet_text),
                    page_number: section.page_number,
                })
            })
            .collect();

        let processing_timestamp = self
            .timestamp
            .unwrap_or_else(|| chrono::Local::now().format(TIMESTAMP_FORMAT).to_string());

        Report {
            metadata: Metadata {
                input_documents: self.input_documents,
                persona: self.persona,
                job_to_be_done: self.job_to_be_done,
                processing_timestamp,
            },
            extracted_sections,
            subsection_analysis,
        }
    }
}

/// Collapse runs of newlines into one and trim surrounding whitespace
pub fn refine_text(text: &str) -> String {
    static NEWLINE_RUNS: OnceLock<Option<Regex>> = OnceLock::new();

    match NEWLINE_RUNS.get_or_init(|| Regex::new(r"\n+").ok()) {
        Some(re) => re.replace_all(text, "\n").trim().to_string(),
        None => text.trim().to_string(),
    }
}
