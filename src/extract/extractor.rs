//! Page-level extraction with header/footer cleanup and RTL decode
//! normalization.

use crate::extract::bidi::to_logical_order;
use crate::extract::formats::{docx_paragraphs, pdf_pages};
use crate::extract::script::{ScriptTag, detect_dominant_script};
use crate::extract::types::{ExtractedDocument, ExtractionError};

/// Seam between the ingestion orchestrator and the concrete decoders.
///
/// Extraction is synchronous and CPU-bound; the orchestrator runs it on a
/// blocking worker thread.
pub trait PageExtractor: Send + Sync {
    /// Decode a raw document into ordered page texts plus a script tag.
    fn extract(&self, bytes: &[u8], filename: &str) -> Result<ExtractedDocument, ExtractionError>;
}

/// Default extractor dispatching on the declared filename extension.
#[derive(Debug, Default, Clone, Copy)]
pub struct DocumentExtractor;

impl DocumentExtractor {
    /// Construct the default extractor.
    pub const fn new() -> Self {
        Self
    }
}

impl PageExtractor for DocumentExtractor {
    fn extract(&self, bytes: &[u8], filename: &str) -> Result<ExtractedDocument, ExtractionError> {
        match extension(filename).as_str() {
            "pdf" => {
                let raw_pages = pdf_pages(bytes)?;
                let script = detect_dominant_script(&raw_pages.join("\n"));
                // Hebrew-dominant pages decode in visual order; rebuild
                // logical order before the cleanup heuristic runs.
                let pages = raw_pages
                    .iter()
                    .map(|page| match script {
                        ScriptTag::RtlDominant => clean_page(&reorder_visual_lines(page)),
                        ScriptTag::LtrDominant => clean_page(page),
                    })
                    .collect::<Vec<_>>();
                tracing::debug!(
                    file = filename,
                    pages = pages.len(),
                    language = script.as_str(),
                    "Extracted PDF"
                );
                Ok(ExtractedDocument { pages, script })
            }
            "doc" | "docx" => {
                let paragraphs = docx_paragraphs(bytes)?;
                let script = detect_dominant_script(&paragraphs.join("\n"));
                tracing::debug!(
                    file = filename,
                    paragraphs = paragraphs.len(),
                    language = script.as_str(),
                    "Extracted Word document"
                );
                Ok(ExtractedDocument {
                    pages: paragraphs,
                    script,
                })
            }
            other => Err(ExtractionError::UnsupportedFormat(other.to_string())),
        }
    }
}

/// Strip the assumed running header and footer from one page.
///
/// Drops the first and the last line, clamped so pages with fewer than two
/// lines simply clean to the empty string. Remaining non-blank lines are
/// re-joined with newlines and trimmed. This is a lossy heuristic carried
/// over from the source system, not a correctness guarantee.
pub(crate) fn clean_page(raw: &str) -> String {
    let lines: Vec<&str> = raw.lines().collect();

    let from = 1.min(lines.len());
    let to = lines.len().saturating_sub(1).max(from);

    let mut body = String::new();
    for line in &lines[from..to] {
        if !line.trim().is_empty() {
            body.push_str(line);
            body.push('\n');
        }
    }
    body.trim().to_string()
}

/// Rebuild logical order for each line of a visually-ordered page.
///
/// Runs line by line so newline separators never sit inside an RTL run.
pub(crate) fn reorder_visual_lines(page: &str) -> String {
    page.lines().map(to_logical_order).collect::<Vec<_>>().join("\n")
}

fn extension(filename: &str) -> String {
    filename
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default()
}
