//! Document structuring
//!
//! Turns a file into a [`Document`] of titled, paginated sections with raw
//! text. Chunking and embedding happen later.
//!
//! PDFs are sectioned by their outline when they have one, and page by page
//! otherwise.

use crate::error::{PipelineError, PipelineResult};
use docrank_core::{Document, Section};
use std::path::Path;

/// Page separator in plain-text documents
const PAGE_BREAK: char = '\x0c';

/// Longest first line still treated as a page heading
const MAX_HEADING_CHARS: usize = 80;
const MAX_HEADING_WORDS: usize = 12;

/// Supported document formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    Pdf,
    Markdown,
    Text,
}

impl DocumentFormat {
    /// Detect the format from a file extension
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "pdf" => Some(Self::Pdf),
            "md" | "markdown" => Some(Self::Markdown),
            "txt" | "text" => Some(Self::Text),
            _ => None,
        }
    }
}

/// Parse a document file into sections
pub fn parse_document(path: &Path) -> PipelineResult<Document> {
    let filename = path
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| PipelineError::parse(path, "file name is not valid UTF-8"))?
        .to_string();

    let format = DocumentFormat::from_path(path)
        .ok_or_else(|| PipelineError::parse(path, "unsupported file type"))?;

    let sections = match format {
        DocumentFormat::Pdf => {
            let bytes = std::fs::read(path)?;
            let pages = pdf_extract::extract_text_from_mem_by_pages(&bytes)
                .map_err(|e| PipelineError::parse(path, e.to_string()))?;

            let sections = sections_from_outline(&filename, &read_outline(&bytes), &pages);
            if sections.is_empty() {
                tracing::debug!("{} has no outline, sectioning by page", filename);
                sections_from_pages(&filename, &pages)
            } else {
                sections
            }
        }
        DocumentFormat::Markdown | DocumentFormat::Text => {
            let text = std::fs::read_to_string(path)?;
            let stem = path
                .file_stem()
                .and_then(|s| s.to_str())
                .unwrap_or(filename.as_str());
            sections_from_text(&filename, stem, &text)
        }
    };

    tracing::debug!("Parsed {} into {} sections", filename, sections.len());
    Ok(Document::new(filename).with_sections(sections))
}

/// Outline entries as (title, 1-based page), in outline order.
/// Unreadable or missing outlines give an empty list.
fn read_outline(bytes: &[u8]) -> Vec<(String, u32)> {
    let toc = match lopdf::Document::load_mem(bytes).and_then(|doc| doc.get_toc()) {
        Ok(toc) => toc,
        Err(e) => {
            tracing::debug!("No usable outline: {}", e);
            return Vec::new();
        }
    };

    toc.toc
        .into_iter()
        .map(|entry| (entry.title.trim().to_string(), entry.page as u32))
        .collect()
}

/// One section per outline entry.
///
/// An entry covers its own page up to the page before the next entry starts;
/// the last entry runs to the end of the document. An entry sharing its page
/// with the next one gets no text. Entries with a blank title or page 0 are
/// dropped.
pub fn sections_from_outline(
    filename: &str,
    entries: &[(String, u32)],
    pages: &[String],
) -> Vec<Section> {
    let page_count = pages.len();

    entries
        .iter()
        .enumerate()
        .filter_map(|(i, (title, page))| {
            let start = (*page as usize).saturating_sub(1).min(page_count);
            let end = entries
                .get(i + 1)
                .map_or(page_count, |(_, next)| (*next as usize).saturating_sub(1))
                .min(page_count);
            let text = pages
                .get(start..end.max(start))
                .unwrap_or_default()
                .iter()
                .map(|p| p.trim())
                .filter(|p| !p.is_empty())
                .collect::<Vec<_>>()
                .join("\n");

            let builder = Section::builder().page(*page).source(filename).raw_text(text);
            let builder = if title.is_empty() { builder } else { builder.title(title.as_str()) };
            match builder.build() {
                Ok(section) => Some(section),
                Err(e) => {
                    tracing::debug!("Dropping outline entry {:?} in {}: {}", title, filename, e);
                    None
                }
            }
        })
        .collect()
}

/// One section per page. A page opening with a heading-like line is titled
/// by it, otherwise "Page {n}".
pub fn sections_from_pages(filename: &str, pages: &[String]) -> Vec<Section> {
    pages
        .iter()
        .enumerate()
        .map(|(i, text)| {
            let page = i as u32 + 1;
            let text = text.trim();
            let title = page_heading(text).unwrap_or_else(|| format!("Page {page}"));
            Section::new(title, page, filename, text)
        })
        .collect()
}

/// Heading-delimited sections for markdown and plain text.
///
/// Form feeds separate pages. Lines starting with `#` open a new section.
/// Text before the first heading becomes a section titled `stem`.
pub fn sections_from_text(filename: &str, stem: &str, text: &str) -> Vec<Section> {
    let mut sections = Vec::new();
    // Open heading and its page; None while still in the preface
    let mut heading: Option<(String, u32)> = None;
    let mut preface_page: Option<u32> = None;
    let mut body: Vec<&str> = Vec::new();

    for (i, page_text) in text.split(PAGE_BREAK).enumerate() {
        let page = i as u32 + 1;
        if i > 0 {
            body.push("");
        }

        for line in page_text.lines() {
            if let Some(title) = line.trim_start().strip_prefix('#') {
                flush(&mut sections, filename, stem, heading.take(), preface_page, &mut body);
                heading = Some((title.trim_start_matches('#').trim().to_string(), page));
                continue;
            }
            if heading.is_none() && preface_page.is_none() && !line.trim().is_empty() {
                preface_page = Some(page);
            }
            body.push(line);
        }
    }
    flush(&mut sections, filename, stem, heading, preface_page, &mut body);

    sections
}

fn flush(
    sections: &mut Vec<Section>,
    filename: &str,
    stem: &str,
    heading: Option<(String, u32)>,
    preface_page: Option<u32>,
    body: &mut Vec<&str>,
) {
    let text = body.join("\n").trim().to_string();
    body.clear();

    match heading {
        Some((title, page)) => sections.push(Section::new(title, page, filename, text)),
        None if !text.is_empty() => {
            sections.push(Section::new(stem, preface_page.unwrap_or(1), filename, text))
        }
        None => {}
    }
}

/// First non-empty line, if it reads like a heading
fn page_heading(text: &str) -> Option<String> {
    let line = text.lines().map(str::trim).find(|l| !l.is_empty())?;

    let short = line.chars().count() <= MAX_HEADING_CHARS
        && line.split_whitespace().count() <= MAX_HEADING_WORDS;
    let unterminated = !line.ends_with(['.', ',', ';', ':', '!', '?']);
    let has_letters = line.chars().any(char::is_alphabetic);

    (short && unterminated && has_letters).then(|| line.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use lopdf::content::{Content, Operation};
    use lopdf::{dictionary, Bookmark, Object, Stream};
    use tempfile::TempDir;

    /// Build a PDF with one line of text per page and top-level bookmarks
    /// given as (title, 1-based page).
    fn build_pdf(pages: &[&str], bookmarks: &[(&str, usize)]) -> Vec<u8> {
        let mut doc = lopdf::Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Courier",
        });
        let resources_id = doc.add_object(dictionary! {
            "Font" => dictionary! { "F1" => font_id },
        });

        let mut page_ids = Vec::new();
        for text in pages {
            let content = Content {
                operations: vec![
                    Operation::new("BT", vec![]),
                    Operation::new("Tf", vec!["F1".into(), 12.into()]),
                    Operation::new("Td", vec![72.into(), 720.into()]),
                    Operation::new("Tj", vec![Object::string_literal(*text)]),
                    Operation::new("ET", vec![]),
                ],
            };
            let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
            page_ids.push(doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "Contents" => content_id,
            }));
        }

        let kids: Vec<Object> = page_ids.iter().map(|&id| id.into()).collect();
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => pages.len() as i64,
                "Resources" => resources_id,
                "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
            }),
        );

        for (title, page) in bookmarks {
            let bookmark = Bookmark::new(title.to_string(), [0.0, 0.0, 0.0], 0, page_ids[page - 1]);
            doc.add_bookmark(bookmark, None);
        }

        let mut catalog = dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        };
        if let Some(outline_id) = doc.build_outline() {
            catalog.set("Outlines", outline_id);
        }
        let catalog_id = doc.add_object(catalog);
        doc.trailer.set("Root", catalog_id);

        let mut bytes = Vec::new();
        doc.save_to(&mut bytes).unwrap();
        bytes
    }

    fn write_pdf(dir: &TempDir, name: &str, bytes: &[u8]) -> std::path::PathBuf {
        let path = dir.path().join(name);
        std::fs::write(&path, bytes).unwrap();
        path
    }

    #[test]
    fn test_format_detection() {
        assert_eq!(DocumentFormat::from_path(Path::new("a.PDF")), Some(DocumentFormat::Pdf));
        assert_eq!(DocumentFormat::from_path(Path::new("a.md")), Some(DocumentFormat::Markdown));
        assert_eq!(DocumentFormat::from_path(Path::new("a.txt")), Some(DocumentFormat::Text));
        assert_eq!(DocumentFormat::from_path(Path::new("a.docx")), None);
        assert_eq!(DocumentFormat::from_path(Path::new("README")), None);
    }

    #[test]
    fn test_pages_titled_by_heading_or_number() {
        let pages = vec![
            "Comprehensive Guide to Cities\n\nMarseille is the oldest city.".to_string(),
            "The port is busy all year round. Ferries leave hourly.".to_string(),
            "   ".to_string(),
        ];
        let sections = sections_from_pages("cities.pdf", &pages);

        assert_eq!(sections.len(), 3);
        assert_eq!(sections[0].title, "Comprehensive Guide to Cities");
        assert_eq!(sections[0].page_number, 1);
        assert_eq!(sections[1].title, "Page 2");
        assert_eq!(sections[1].page_number, 2);
        assert_eq!(sections[2].title, "Page 3");
        assert!(sections[2].raw_text.is_empty());
        assert!(sections.iter().all(|s| s.source_doc_name == "cities.pdf"));
    }

    #[test]
    fn test_markdown_sections() {
        let text = "Intro text.\n\n# Beaches\nSandy and warm.\n\n## Nightlife\nBars open late.\n";
        let sections = sections_from_text("guide.md", "guide", text);

        let titles: Vec<&str> = sections.iter().map(|s| s.title.as_str()).collect();
        assert_eq!(titles, vec!["guide", "Beaches", "Nightlife"]);
        assert_eq!(sections[0].raw_text, "Intro text.");
        assert_eq!(sections[1].raw_text, "Sandy and warm.");
        assert_eq!(sections[2].raw_text, "Bars open late.");
    }

    #[test]
    fn test_form_feed_pages() {
        let text = "# Cover\nWelcome\x0c# Hotels\nBook early.\x0cMore hotels.";
        let sections = sections_from_text("guide.txt", "guide", text);

        assert_eq!(sections.len(), 2);
        assert_eq!(sections[0].page_number, 1);
        assert_eq!(sections[1].title, "Hotels");
        assert_eq!(sections[1].page_number, 2);
        assert_eq!(sections[1].raw_text, "Book early.\n\nMore hotels.");
    }

    #[test]
    fn test_empty_heading_section_kept() {
        let sections = sections_from_text("a.md", "a", "# Empty\n# Full\ntext");
        assert_eq!(sections.len(), 2);
        assert!(sections[0].raw_text.is_empty());
        assert_eq!(sections[1].raw_text, "text");
    }

    #[test]
    fn test_blank_text_has_no_sections() {
        assert!(sections_from_text("a.txt", "a", "\n\n  \n").is_empty());
    }

    #[test]
    fn test_parse_markdown_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("Tips.md");
        std::fs::write(&path, "# Packing\nBring layers.\n").unwrap();

        let doc = parse_document(&path).unwrap();
        assert_eq!(doc.filename, "Tips.md");
        assert_eq!(doc.sections.len(), 1);
        assert_eq!(doc.sections[0].title, "Packing");
    }

    #[test]
    fn test_parse_unsupported_and_corrupt() {
        let dir = TempDir::new().unwrap();

        let docx = dir.path().join("notes.docx");
        std::fs::write(&docx, "x").unwrap();
        assert!(matches!(parse_document(&docx), Err(PipelineError::Parse { .. })));

        let pdf = dir.path().join("broken.pdf");
        std::fs::write(&pdf, "not a pdf").unwrap();
        assert!(matches!(parse_document(&pdf), Err(PipelineError::Parse { .. })));
    }

    #[test]
    fn test_outline_ranges() {
        let pages: Vec<String> = ["sand", "surf", "bars", "clubs"].iter().map(|p| p.to_string()).collect();
        let entries = vec![
            ("Beaches".to_string(), 1),
            ("Nightlife".to_string(), 3),
        ];
        let sections = sections_from_outline("coast.pdf", &entries, &pages);

        assert_eq!(sections.len(), 2);
        assert_eq!(sections[0].title, "Beaches");
        assert_eq!(sections[0].page_number, 1);
        assert_eq!(sections[0].raw_text, "sand\nsurf");
        assert_eq!(sections[1].title, "Nightlife");
        assert_eq!(sections[1].page_number, 3);
        assert_eq!(sections[1].raw_text, "bars\nclubs");
        assert!(sections.iter().all(|s| s.source_doc_name == "coast.pdf"));
    }

    #[test]
    fn test_outline_shared_and_out_of_range_pages() {
        let pages = vec!["one".to_string(), "two".to_string()];
        let entries = vec![
            ("Cover".to_string(), 1),
            ("Contents".to_string(), 1),
            ("Appendix".to_string(), 9),
        ];
        let sections = sections_from_outline("a.pdf", &entries, &pages);

        assert_eq!(sections.len(), 3);
        assert!(sections[0].raw_text.is_empty());
        assert_eq!(sections[1].raw_text, "one\ntwo");
        assert_eq!(sections[2].page_number, 9);
        assert!(sections[2].raw_text.is_empty());
    }

    #[test]
    fn test_outline_drops_invalid_entries() {
        let pages = vec!["text".to_string()];
        let entries = vec![("".to_string(), 1), ("Zero".to_string(), 0), ("Kept".to_string(), 1)];
        let sections = sections_from_outline("a.pdf", &entries, &pages);

        assert_eq!(sections.len(), 1);
        assert_eq!(sections[0].title, "Kept");
        assert_eq!(sections[0].raw_text, "text");
    }

    #[test]
    fn test_parse_pdf_with_outline() {
        let dir = TempDir::new().unwrap();
        let bytes = build_pdf(
            &["Sandy coves", "Snorkeling spots", "Late bars"],
            &[("Beaches", 1), ("Nightlife", 3)],
        );
        let path = write_pdf(&dir, "Coast.pdf", &bytes);

        let doc = parse_document(&path).unwrap();
        assert_eq!(doc.filename, "Coast.pdf");

        let titles: Vec<&str> = doc.sections.iter().map(|s| s.title.as_str()).collect();
        assert_eq!(titles, vec!["Beaches", "Nightlife"]);
        assert_eq!(doc.sections[0].page_number, 1);
        assert!(doc.sections[0].raw_text.contains("Sandy coves"));
        assert!(doc.sections[0].raw_text.contains("Snorkeling spots"));
        assert!(!doc.sections[0].raw_text.contains("Late bars"));
        assert_eq!(doc.sections[1].page_number, 3);
        assert!(doc.sections[1].raw_text.contains("Late bars"));
    }

    #[test]
    fn test_parse_pdf_without_outline_sections_by_page() {
        let dir = TempDir::new().unwrap();
        let bytes = build_pdf(&["Packing Tips", "Bring layers."], &[]);
        let path = write_pdf(&dir, "Tips.pdf", &bytes);

        let doc = parse_document(&path).unwrap();
        assert_eq!(doc.sections.len(), 2);
        assert_eq!(doc.sections[0].title, "Packing Tips");
        assert_eq!(doc.sections[1].title, "Page 2");
        assert_eq!(doc.sections[1].page_number, 2);
        assert!(doc.sections[1].raw_text.contains("Bring layers."));
    }

    #[test]
    fn test_page_heading_heuristic() {
        assert_eq!(page_heading("\n  Packing Tips  \nBody"), Some("Packing Tips".to_string()));
        assert_eq!(page_heading("This is a sentence."), None);
        assert_eq!(page_heading("12 / 40"), None);
        assert_eq!(page_heading(""), None);
    }
}
