// SPDX-FileCopyrightText: 2026 Advisor Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Term extraction and substring-frequency scoring.

/// Split a visitor query into scoring terms.
///
/// Terms are lowercased, stripped of surrounding punctuation, and must be
/// longer than three characters, which drops stop-word noise ("the", "is",
/// "a") without a stop-word list.
pub fn query_terms(query: &str) -> Vec<String> {
    query
        .to_lowercase()
        .split_whitespace()
        .map(|w| w.trim_matches(|c: char| !c.is_alphanumeric()))
        .filter(|w| w.chars().count() > 3)
        .map(str::to_string)
        .collect()
}

/// Score a text against the extracted terms: one point per non-overlapping
/// occurrence of each term, summed over all terms.
pub fn score_text(text_lower: &str, terms: &[String]) -> u32 {
    terms
        .iter()
        .map(|term| text_lower.matches(term.as_str()).count() as u32)
        .sum()
}

/// Truncate content to at most `max_chars` characters on a char boundary,
/// appending an ellipsis when anything was cut.
pub fn excerpt(content: &str, max_chars: usize) -> String {
    if content.chars().count() <= max_chars {
        return content.to_string();
    }
    let cut: String = content.chars().take(max_chars).collect();
    format!("{cut}...")
}
