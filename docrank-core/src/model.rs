//! Document, section and chunk types
//!
//! Core value types flowing through the ranking pipeline. Documents own their
//! sections, sections own their chunks. Everything is populated by the
//! structuring/embedding stage before ranking; the ranking engine only
//! writes similarity scores, aggregated scores and ranks.

use serde::{Deserialize, Serialize};

/// Relevance score that is either not yet computed or computed.
///
/// Replaces a nullable float so "never scored" is a distinct state rather
/// than a magic value.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(from = "Option<f32>", into = "Option<f32>")]
pub enum Score {
    #[default]
    Unscored,
    Scored(f32),
}

impl Score {
    /// The score value, if computed
    pub fn value(self) -> Option<f32> {
        match self {
            Self::Unscored => None,
            Self::Scored(value) => Some(value),
        }
    }

    pub fn is_scored(self) -> bool {
        matches!(self, Self::Scored(_))
    }
}

impl From<Option<f32>> for Score {
    fn from(value: Option<f32>) -> Self {
        value.map_or(Self::Unscored, Self::Scored)
    }
}

impl From<Score> for Option<f32> {
    fn from(score: Score) -> Self {
        score.value()
    }
}

/// Smallest unit of text carrying one embedding vector
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Chunk {
    text: String,
    source_doc_name: String,
    source_section_title: String,
    /// Unit-length embedding; not serialized
    #[serde(skip)]
    embedding: Vec<f32>,
    #[serde(default)]
    similarity: Score,
}

impl Chunk {
    /// Create an unscored chunk. The text must be non-empty and the
    /// embedding L2-normalized.
    pub fn new(
        text: impl Into<String>,
        embedding: Vec<f32>,
        source_doc_name: impl Into<String>,
        source_section_title: impl Into<String>,
    ) -> Self {
        let text = text.into();
        debug_assert!(!text.is_empty(), "chunk text must not be empty");
        Self {
            text,
            source_doc_name: source_doc_name.into(),
            source_section_title: source_section_title.into(),
            embedding,
            similarity: Score::Unscored,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn embedding(&self) -> &[f32] {
        &self.embedding
    }

    pub fn source_doc_name(&self) -> &str {
        &self.source_doc_name
    }

    pub fn source_section_title(&self) -> &str {
        &self.source_section_title
    }

    pub fn similarity(&self) -> Score {
        self.similarity
    }

    /// Similarity against the query, once scored
    pub fn similarity_score(&self) -> Option<f32> {
        self.similarity.value()
    }

    pub(crate) fn set_similarity(&mut self, score: f32) {
        self.similarity = Score::Scored(score);
    }
}

/// Titled, paginated subdivision of a document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Section {
    /// Section title (e.g. "Introduction", "Page 3")
    pub title: String,
    /// 1-based page where the section begins
    pub page_number: u32,
    /// Filename of the owning document
    pub source_doc_name: String,
    /// Full unprocessed text; may be empty
    pub raw_text: String,
    /// Chunks in text order
    #[serde(default)]
    pub chunks: Vec<Chunk>,
    #[serde(default)]
    aggregated: Score,
    #[serde(skip_serializing_if = "Option::is_none")]
    rank: Option<usize>,
}

impl Section {
    /// Create an empty, unscored section. Page numbers below 1 are clamped to 1.
    pub fn new(
        title: impl Into<String>,
        page_number: u32,
        source_doc_name: impl Into<String>,
        raw_text: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            page_number: page_number.max(1),
            source_doc_name: source_doc_name.into(),
            raw_text: raw_text.into(),
            chunks: Vec::new(),
            aggregated: Score::Unscored,
            rank: None,
        }
    }

    /// Create a new builder for Section
    pub fn builder() -> SectionBuilder {
        SectionBuilder::default()
    }

    pub fn aggregated(&self) -> Score {
        self.aggregated
    }

    /// Section-level relevance, once aggregated
    pub fn aggregated_score(&self) -> Option<f32> {
        self.aggregated.value()
    }

    /// 1-based global rank, once ranked
    pub fn rank(&self) -> Option<usize> {
        self.rank
    }

    pub fn has_chunks(&self) -> bool {
        !self.chunks.is_empty()
    }

    /// Highest-scoring chunk; ties go to the earliest chunk.
    /// Unscored chunks are never selected.
    pub fn best_chunk(&self) -> Option<&Chunk> {
        let mut best: Option<(&Chunk, f32)> = None;
        for chunk in &self.chunks {
            let Some(score) = chunk.similarity_score() else {
                continue;
            };
            match best {
                Some((_, best_score)) if score <= best_score => {}
                _ => best = Some((chunk, score)),
            }
        }
        best.map(|(chunk, _)| chunk)
    }

    pub(crate) fn set_aggregated(&mut self, score: Score) {
        self.aggregated = score;
    }

    pub(crate) fn set_rank(&mut self, rank: usize) {
        self.rank = Some(rank);
    }
}

/// Builder for Section with fluent API
#[derive(Debug, Default)]
pub struct SectionBuilder {
    title: Option<String>,
    page_number: Option<u32>,
    source_doc_name: Option<String>,
    raw_text: String,
    chunks: Vec<Chunk>,
}

impl SectionBuilder {
    /// Set the title
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Set the 1-based page number (defaults to 1)
    pub fn page(mut self, page_number: u32) -> Self {
        self.page_number = Some(page_number);
        self
    }

    /// Set the owning document's filename
    pub fn source(mut self, source_doc_name: impl Into<String>) -> Self {
        self.source_doc_name = Some(source_doc_name.into());
        self
    }

    /// Set the raw text
    pub fn raw_text(mut self, raw_text: impl Into<String>) -> Self {
        self.raw_text = raw_text.into();
        self
    }

    /// Add a chunk
    pub fn chunk(mut self, chunk: Chunk) -> Self {
        self.chunks.push(chunk);
        self
    }

    /// Build the Section
    pub fn build(self) -> Result<Section, SectionBuilderError> {
        let title = self.title.ok_or(SectionBuilderError::MissingTitle)?;
        let source = self.source_doc_name.ok_or(SectionBuilderError::MissingSource)?;
        if self.page_number == Some(0) {
            return Err(SectionBuilderError::InvalidPage);
        }

        let mut section = Section::new(title, self.page_number.unwrap_or(1), source, self.raw_text);
        section.chunks = self.chunks;
        Ok(section)
    }
}

/// Errors that can occur when building a Section
#[derive(Debug, thiserror::Error)]
pub enum SectionBuilderError {
    #[error("Missing required field: title")]
    MissingTitle,
    #[error("Missing required field: source document")]
    MissingSource,
    #[error("Page numbers are 1-based")]
    InvalidPage,
}

/// A single input document and its sections
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Document {
    /// Original filename (no directory)
    pub filename: String,
    /// Sections in document order
    #[serde(default)]
    pub sections: Vec<Section>,
}

impl Document {
    pub fn new(filename: impl Into<String>) -> Self {
        Self {
            filename: filename.into(),
            sections: Vec::new(),
        }
    }

    pub fn with_sections(mut self, sections: Vec<Section>) -> Self {
        self.sections = sections;
        self
    }

    pub fn chunk_count(&self) -> usize {
        self.sections.iter().map(|s| s.chunks.len()).sum()
    }
}

/// Representative snippet extracted from one top-ranked section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubSectionAnalysis {
    pub source_document: String,
    pub section_title: String,
    /// Global rank of the section the snippet came from
    pub rank: usize,
    pub snippet_text: String,
    /// Chunk similarity rounded to 4 decimal places
    pub snippet_score: f64,
}
