//! Document text extraction: format decoding, script detection, and
//! bidirectional reordering helpers.

mod bidi;
mod extractor;
mod formats;
mod script;
mod types;

pub use bidi::to_logical_order;
pub use extractor::{DocumentExtractor, PageExtractor};
pub use script::{ScriptTag, detect_dominant_script};
pub use types::{ExtractedDocument, ExtractionError};
