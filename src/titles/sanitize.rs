//! Title candidate sanitization and localized fallbacks.

/// Clean a raw model completion into a title candidate.
///
/// Quote, backtick, and newline characters become spaces, internal
/// whitespace is collapsed, and the result is trimmed. Candidates with zero
/// words or more than five are discarded (returned as the empty string).
pub(crate) fn sanitize_candidate(raw: &str) -> String {
    let cleaned: String = raw
        .chars()
        .map(|ch| match ch {
            '\r' | '\n' | '"' | '\'' | '`' => ' ',
            other => other,
        })
        .collect();

    let collapsed = cleaned.split_whitespace().collect::<Vec<_>>().join(" ");
    let word_count = collapsed.split_whitespace().count();

    if word_count == 0 || word_count > 5 {
        String::new()
    } else {
        collapsed
    }
}

/// Localized placeholder used when generation fails or is discarded.
pub(crate) fn fallback_title(language: &str) -> &'static str {
    if language == "he" { "שיחה חדשה" } else { "New Chat" }
}

/// Strip leading/trailing non-alphanumeric characters (English titles only).
pub(crate) fn trim_edge_punctuation(title: &str) -> String {
    title
        .trim_matches(|ch: char| !ch.is_alphanumeric())
        .trim()
        .to_string()
}
