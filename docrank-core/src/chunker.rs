//! Paragraph chunking
//!
//! Splits section text into paragraph chunks. Each chunk carries the first
//! sentence(s) of the following paragraph so that context spanning a
//! paragraph break is not lost.

use serde::{Deserialize, Serialize};
use unicode_segmentation::UnicodeSegmentation;

/// Chunker configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChunkerConfig {
    /// Sentences borrowed from the next paragraph (default: 1)
    pub overlap_sentences: usize,
    /// Paragraphs shorter than this (in chars, after trimming) are dropped (default: 1)
    pub min_paragraph_chars: usize,
}

impl Default for ChunkerConfig {
    fn default() -> Self {
        Self {
            overlap_sentences: 1,
            min_paragraph_chars: 1,
        }
    }
}

/// Splits raw section text into overlapping paragraph chunks
#[derive(Debug, Clone, Default)]
pub struct Chunker {
    config: ChunkerConfig,
}

impl Chunker {
    pub fn new(config: ChunkerConfig) -> Self {
        Self { config }
    }

    /// Chunk `text` into paragraph texts. Empty or whitespace-only text
    /// yields no chunks, and no chunk is ever empty.
    pub fn chunk(&self, text: &str) -> Vec<String> {
        let paragraphs = self.paragraphs(text);

        paragraphs
            .iter()
            .enumerate()
            .map(|(i, paragraph)| {
                let overlap = paragraphs
                    .get(i + 1)
                    .map(|next| self.leading_sentences(next))
                    .unwrap_or_default();

                if overlap.is_empty() {
                    paragraph.to_string()
                } else {
                    format!("{paragraph} {overlap}")
                }
            })
            .collect()
    }

    fn paragraphs<'a>(&self, text: &'a str) -> Vec<&'a str> {
        let min_chars = self.config.min_paragraph_chars.max(1);
        text.split("\n\n")
            .map(str::trim)
            .filter(|p| p.chars().count() >= min_chars)
            .collect()
    }

    fn leading_sentences(&self, paragraph: &str) -> String {
        if self.config.overlap_sentences == 0 {
            return String::new();
        }

        let lead: String = paragraph
            .unicode_sentences()
            .take(self.config.overlap_sentences)
            .collect();
        lead.trim().to_string()
    }
}
