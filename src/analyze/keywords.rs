//! Lexical keyword signal: candidate extraction and keyword match ratio.

use std::collections::HashSet;

use super::finish;

/// At most this many keyword candidates are kept per text.
pub const MAX_KEYWORDS: usize = 5;
/// Tokens must be strictly longer than this (in chars) to qualify.
pub const MIN_KEYWORD_CHARS: usize = 3;

/// Extract up to [`MAX_KEYWORDS`] distinct lowercase keywords.
///
/// A candidate is a whitespace-separated token made only of alphabetic chars
/// and longer than [`MIN_KEYWORD_CHARS`]. Tokens with attached punctuation
/// (`"tool,"`) do not qualify. Candidates keep first-occurrence order so the
/// selection is deterministic.
pub fn extract_keywords(text: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut out = Vec::with_capacity(MAX_KEYWORDS);

    for word in text.split_whitespace() {
        if out.len() == MAX_KEYWORDS {
            break;
        }
        if word.chars().count() <= MIN_KEYWORD_CHARS || !word.chars().all(char::is_alphabetic) {
            continue;
        }
        let folded = word.to_lowercase();
        if seen.insert(folded.clone()) {
            out.push(folded);
        }
    }
    out
}

/// Fraction of `keywords` contained (case-insensitive substring) in `text`.
///
/// An empty keyword set scores 0.0.
pub fn keyword_match(keywords: &[String], text: &str) -> f64 {
    if keywords.is_empty() {
        return 0.0;
    }
    let haystack = text.to_lowercase();
    let matches = keywords
        .iter()
        .filter(|k| haystack.contains(k.to_lowercase().as_str()))
        .count();
    finish(matches as f64 / keywords.len() as f64)
}
