//! Logical-order reconstruction for visually-ordered RTL text.
//!
//! PDF text extraction yields glyphs in visual (left-to-right positional)
//! order, which scrambles Hebrew runs. [`to_logical_order`] rebuilds logical
//! order by reversing each RTL bidi run in place while leaving LTR runs
//! untouched. It is a pure function; the extractor applies it line by line
//! to every page of an RTL-dominant PDF before cleanup.

use unicode_bidi::BidiInfo;

/// Substitute mirrored punctuation pairs when a run is reversed.
fn mirror(ch: char) -> char {
    match ch {
        '(' => ')',
        ')' => '(',
        '[' => ']',
        ']' => '[',
        '{' => '}',
        '}' => '{',
        other => other,
    }
}

/// Convert visually-ordered text into logical order.
///
/// The text is partitioned into maximal directional runs per the Unicode
/// bidirectional algorithm. Runs with an odd embedding level (RTL) are
/// reversed character-by-character with mirrored-pair substitution; even
/// (LTR) runs are copied verbatim. Runs are concatenated in their original
/// order, so pure-LTR input passes through unchanged.
pub fn to_logical_order(visual: &str) -> String {
    if visual.is_empty() {
        return String::new();
    }

    let bidi = BidiInfo::new(visual, None);
    let mut out = String::with_capacity(visual.len());

    for paragraph in &bidi.paragraphs {
        let mut run_start = paragraph.range.start;
        while run_start < paragraph.range.end {
            let level = bidi.levels[run_start];
            let mut run_end = run_start;
            while run_end < paragraph.range.end && bidi.levels[run_end] == level {
                run_end += 1;
            }
            // Level boundaries always fall on character boundaries.
            let run = &visual[run_start..run_end];
            if level.is_rtl() {
                for ch in run.chars().rev() {
                    out.push(mirror(ch));
                }
            } else {
                out.push_str(run);
            }
            run_start = run_end;
        }
    }

    out
}
