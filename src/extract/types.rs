//! Data types and errors for the document extractor.

use crate::extract::script::ScriptTag;
use thiserror::Error;

/// Errors produced while decoding an uploaded document.
#[derive(Debug, Error)]
pub enum ExtractionError {
    /// Filename extension is not one of the supported formats.
    #[error("unsupported document format: {0}")]
    UnsupportedFormat(String),
    /// The byte stream could not be parsed as a PDF.
    #[error("failed to parse PDF: {0}")]
    Pdf(String),
    /// The byte stream could not be parsed as a Word document.
    #[error("failed to parse Word document: {0}")]
    Word(String),
}

/// Result of extracting one uploaded document.
///
/// `pages` holds one entry per physical page (PDF) or paragraph (DOCX) in
/// document order. Blank entries are kept so callers that need per-page
/// alignment can rely on the indices; blank filtering happens downstream.
#[derive(Debug, Clone)]
pub struct ExtractedDocument {
    /// Cleaned page or paragraph texts in document order.
    pub pages: Vec<String>,
    /// Dominant script detected over the full raw text.
    pub script: ScriptTag,
}
