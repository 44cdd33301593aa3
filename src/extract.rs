//! Short labels derived from prompt text.
//!
//! Two deliberately different heuristics, one per rendered view:
//!
//! - [`preview`]: a terse three-word teaser for the narrow table column.
//! - [`derive_title`]: a descriptive label (up to 80 characters) for the
//!   mobile summary line, used only when the tag record has no title.
//!
//! Both take prompt text that has already been folded onto one line.

/// Characters stripped from both ends of every preview token.
const PREVIEW_TRIM: &[char] = &[
    ' ', ',', '.', ';', ':', '\u{2014}', '-', '"', '\'', '(', ')', '[', ']',
];

/// Characters stripped from the end of a truncated title.
const TITLE_TRIM: &[char] = &[' ', ',', '.', ';', '-'];

const PREVIEW_WORDS: usize = 3;
const TITLE_FALLBACK_WORDS: usize = 6;
const MAX_TITLE_LEN: usize = 80;

/// First three words that contain a letter, with surrounding punctuation
/// removed.
///
/// ```text
/// "A lone lighthouse, glowing faintly"  → "A lone lighthouse"
/// "— 42 (red) balloons, drifting"       → "red balloons drifting"
/// ```
pub fn preview(text: &str) -> String {
    text.split_whitespace()
        .map(|token| token.trim_matches(PREVIEW_TRIM))
        .filter(|token| token.chars().any(char::is_alphabetic))
        .take(PREVIEW_WORDS)
        .collect::<Vec<_>>()
        .join(" ")
}

/// A title from prompt text: the clause before the first comma, or the first
/// six words when there is no comma or the clause is empty, capped at 80
/// characters.
pub fn derive_title(text: &str) -> String {
    let text = text.trim();
    if text.is_empty() {
        return String::new();
    }

    let title = match text.split_once(',') {
        Some((clause, _)) if !clause.trim().is_empty() => clause.trim().to_string(),
        _ => text
            .split_whitespace()
            .take(TITLE_FALLBACK_WORDS)
            .collect::<Vec<_>>()
            .join(" "),
    };

    if title.chars().count() > MAX_TITLE_LEN {
        let cut: String = title.chars().take(MAX_TITLE_LEN).collect();
        cut.trim_end_matches(TITLE_TRIM).to_string()
    } else {
        title
    }
}
