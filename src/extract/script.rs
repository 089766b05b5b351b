//! Dominant-script classification for extracted documents.

use serde::Serialize;

/// Writing-direction classification attached once per document.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
pub enum ScriptTag {
    /// Hebrew letters dominate; visual reordering applies.
    #[serde(rename = "he")]
    RtlDominant,
    /// Latin letters dominate (also the default for empty documents).
    #[serde(rename = "en")]
    LtrDominant,
}

impl ScriptTag {
    /// Short language label used in sink payloads and wire events.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::RtlDominant => "he",
            Self::LtrDominant => "en",
        }
    }
}

/// Classify a document by comparing Hebrew-block code points against ASCII letters.
///
/// The count runs over the entire raw text, not per page. Ties favor
/// [`ScriptTag::RtlDominant`] because mixed Hebrew documents commonly embed
/// Latin terms but not the other way around.
pub fn detect_dominant_script(text: &str) -> ScriptTag {
    let mut hebrew = 0usize;
    let mut latin = 0usize;

    for ch in text.chars() {
        if ('\u{0590}'..='\u{05FF}').contains(&ch) {
            hebrew += 1;
        } else if ch.is_ascii_alphabetic() {
            latin += 1;
        }
    }

    if hebrew >= latin && hebrew > 0 {
        ScriptTag::RtlDominant
    } else {
        ScriptTag::LtrDominant
    }
}
