// src/utils/fs.rs

//! File name sanitization.

use unicode_segmentation::UnicodeSegmentation;

/// Sanitize arbitrary text (typically a page title) into a safe file name
/// segment.
///
/// Path separators become hyphens, punctuation outside a small allowed set is
/// dropped, whitespace runs become underscores, and the result is truncated
/// to `max_len` grapheme clusters. Never returns an empty string.
pub fn sanitize_segment(text: &str, max_len: usize) -> String {
    let replaced = text.trim().replace(['/', '\\'], "-");

    let filtered: String = replaced
        .chars()
        .filter(|c| {
            c.is_alphanumeric()
                || c.is_whitespace()
                || matches!(c, '_' | '-' | '(' | ')' | '（' | '）' | '・' | 'ー')
        })
        .collect();

    let underscored = filtered.split_whitespace().collect::<Vec<_>>().join("_");

    let truncated: String = underscored.graphemes(true).take(max_len).collect();
    let trimmed = truncated.trim_end_matches('_');

    if trimmed.is_empty() {
        "page".to_string()
    } else {
        trimmed.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn replaces_separators_and_whitespace() {
        assert_eq!(sanitize_segment("Setup / Install Guide", 80), "Setup_-_Install_Guide");
    }

    #[test]
    fn drops_unsafe_punctuation() {
        assert_eq!(sanitize_segment("What's new? <v2>", 80), "Whats_new_v2");
    }

    #[test]
    fn keeps_cjk_text() {
        assert_eq!(sanitize_segment("ブロックの使い方", 80), "ブロックの使い方");
    }

    #[test]
    fn truncates_to_max_graphemes() {
        let long = "a".repeat(100);
        assert_eq!(sanitize_segment(&long, 80).len(), 80);

        let cjk = "あ".repeat(100);
        let out = sanitize_segment(&cjk, 80);
        assert_eq!(out.graphemes(true).count(), 80);
    }

    #[test]
    fn empty_input_falls_back() {
        assert_eq!(sanitize_segment("", 80), "page");
        assert_eq!(sanitize_segment("???", 80), "page");
    }
}
