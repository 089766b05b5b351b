//! Format-specific decoding for PDF and OOXML Word documents.

use crate::extract::types::ExtractionError;
use std::io::Read;

/// Cap on the decompressed size of a single ZIP entry (zip-bomb protection).
const MAX_XML_ENTRY_BYTES: u64 = 50 * 1024 * 1024;

/// Decode a PDF into raw per-page text.
pub(crate) fn pdf_pages(bytes: &[u8]) -> Result<Vec<String>, ExtractionError> {
    pdf_extract::extract_text_from_mem_by_pages(bytes)
        .map_err(|error| ExtractionError::Pdf(error.to_string()))
}

/// Decode a DOCX into per-paragraph text.
///
/// Reads `word/document.xml` and collects the `w:t` text nodes of each
/// `w:p` paragraph. Paragraphs with no text are emitted as empty strings so
/// the sequence mirrors the document's paragraph order.
pub(crate) fn docx_paragraphs(bytes: &[u8]) -> Result<Vec<String>, ExtractionError> {
    let mut archive = zip::ZipArchive::new(std::io::Cursor::new(bytes))
        .map_err(|error| ExtractionError::Word(error.to_string()))?;

    let mut document_xml = Vec::new();
    {
        let entry = archive
            .by_name("word/document.xml")
            .map_err(|error| ExtractionError::Word(error.to_string()))?;
        entry
            .take(MAX_XML_ENTRY_BYTES)
            .read_to_end(&mut document_xml)
            .map_err(|error| ExtractionError::Word(error.to_string()))?;
        if document_xml.len() as u64 >= MAX_XML_ENTRY_BYTES {
            return Err(ExtractionError::Word(
                "word/document.xml exceeds size limit".to_string(),
            ));
        }
    }

    paragraphs_from_document_xml(&document_xml)
}

fn paragraphs_from_document_xml(xml: &[u8]) -> Result<Vec<String>, ExtractionError> {
    let mut reader = quick_xml::Reader::from_reader(xml);
    reader.config_mut().trim_text(false);

    let mut paragraphs = Vec::new();
    let mut current: Option<String> = None;
    let mut in_text_node = false;
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(quick_xml::events::Event::Start(e)) => match e.local_name().as_ref() {
                b"p" => current = Some(String::new()),
                b"t" => in_text_node = true,
                _ => {}
            },
            Ok(quick_xml::events::Event::Text(t)) if in_text_node => {
                if let Some(paragraph) = current.as_mut() {
                    paragraph.push_str(t.unescape().unwrap_or_default().as_ref());
                }
            }
            Ok(quick_xml::events::Event::End(e)) => match e.local_name().as_ref() {
                b"p" => {
                    if let Some(paragraph) = current.take() {
                        paragraphs.push(paragraph.trim().to_string());
                    }
                }
                b"t" => in_text_node = false,
                _ => {}
            },
            Ok(quick_xml::events::Event::Eof) => break,
            Err(error) => return Err(ExtractionError::Word(error.to_string())),
            _ => {}
        }
        buf.clear();
    }

    Ok(paragraphs)
}
