//! Term counting over a document's searchable text

use crate::db::models::Document;

/// Lower-cased, whitespace-separated query terms
pub fn query_terms(query: &str) -> Vec<String> {
    query
        .to_lowercase()
        .split_whitespace()
        .map(String::from)
        .collect()
}

/// Sum of non-overlapping literal occurrences of every term in `text`.
///
/// `text` must already be lower-cased. Terms are plain substrings, so
/// `"rent"` also counts inside `"current"`.
pub fn score_text(terms: &[String], text: &str) -> u64 {
    terms
        .iter()
        .filter(|term| !term.is_empty())
        .map(|term| text.matches(term.as_str()).count() as u64)
        .sum()
}

/// Raw relevance of a document; zero means no match
pub fn score_document(terms: &[String], document: &Document) -> u64 {
    score_text(terms, &document.searchable_text())
}
