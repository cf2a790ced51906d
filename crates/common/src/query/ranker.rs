//! Ranking and relevance normalization

use super::scorer::score_document;
use crate::db::models::Document;
use uuid::Uuid;

/// A document that matched the query, with its scores
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoredDocument {
    pub id: Uuid,
    pub name: String,
    pub content: String,

    /// Sum of term occurrences
    pub raw_score: u64,

    /// Percentage of the best raw score among the kept documents (0..=100)
    pub relevance: u8,
}

/// Score, filter, order and cap `documents`.
///
/// Non-matching documents are dropped. Equal scores keep their input order.
/// An empty result means nothing matched.
pub fn rank(documents: Vec<Document>, terms: &[String], max_sources: usize) -> Vec<ScoredDocument> {
    let mut scored: Vec<ScoredDocument> = documents
        .into_iter()
        .filter_map(|doc| {
            let raw_score = score_document(terms, &doc);
            (raw_score > 0).then(|| ScoredDocument {
                id: doc.id,
                name: doc.name,
                content: doc.content,
                raw_score,
                relevance: 0,
            })
        })
        .collect();

    // sort_by is stable
    scored.sort_by(|a, b| b.raw_score.cmp(&a.raw_score));
    scored.truncate(max_sources);

    let Some(max) = scored.first().map(|doc| doc.raw_score) else {
        return scored;
    };

    for doc in &mut scored {
        doc.relevance = normalize(doc.raw_score, max);
    }

    scored
}

/// `round(raw / max * 100)` with halves rounded up, in integer arithmetic
pub fn normalize(raw: u64, max: u64) -> u8 {
    if max == 0 {
        return 0;
    }
    let (raw, max) = (raw.min(max) as u128, max as u128);
    ((200 * raw + max) / (2 * max)) as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::NewDocument;
    use crate::query::scorer::query_terms;

    fn doc(name: &str, content: &str) -> Document {
        NewDocument::new(name, content).build(None)
    }

    #[test]
    fn test_normalize() {
        assert_eq!(normalize(4, 4), 100);
        assert_eq!(normalize(2, 4), 50);
        assert_eq!(normalize(1, 3), 33);
        assert_eq!(normalize(2, 3), 67);
        assert_eq!(normalize(1, 8), 13); // 12.5 rounds up
        assert_eq!(normalize(0, 0), 0);
    }

    #[test]
    fn test_rank_orders_and_normalizes() {
        let docs = vec![
            doc("Memo", "see the date of the meeting"),
            doc("Lease", "the expiry date is 2025-03-01; expiry notice"),
            doc("Recipe", "flour and sugar"),
        ];
        let ranked = rank(docs, &query_terms("expiry date"), 3);

        assert_eq!(ranked.len(), 2);
        assert_eq!(ranked[0].name, "Lease");
        assert_eq!(ranked[0].raw_score, 3);
        assert_eq!(ranked[0].relevance, 100);
        assert_eq!(ranked[1].name, "Memo");
        assert_eq!(ranked[1].raw_score, 1);
        assert_eq!(ranked[1].relevance, 33);
    }

    #[test]
    fn test_rank_caps_results() {
        let docs = (0..6).map(|i| doc(&format!("Doc {}", i), "clause")).collect();
        let ranked = rank(docs, &query_terms("clause"), 3);
        assert_eq!(ranked.len(), 3);
    }

    #[test]
    fn test_ties_keep_input_order() {
        let docs = vec![doc("A", "term"), doc("B", "term")];
        let ranked = rank(docs, &query_terms("term"), 3);
        let names: Vec<_> = ranked.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec!["A", "B"]);
        assert!(ranked.iter().all(|d| d.relevance == 100));
    }

    #[test]
    fn test_no_matches_is_empty() {
        let docs = vec![doc("A", "alpha"), doc("B", "beta")];
        assert!(rank(docs, &query_terms("gamma"), 3).is_empty());
    }

    #[test]
    fn test_blank_query_matches_nothing() {
        let docs = vec![doc("A", "alpha")];
        assert!(rank(docs, &query_terms("   "), 3).is_empty());
    }

    #[test]
    fn test_relevance_bounds() {
        let docs = vec![
            doc("A", "x x x x x x x"),
            doc("B", "x"),
            doc("C", "x x"),
            doc("D", "y"),
        ];
        let ranked = rank(docs, &query_terms("x"), 3);
        assert_eq!(ranked[0].relevance, 100);
        assert!(ranked.iter().all(|d| d.relevance <= 100 && d.raw_score > 0));
        assert!(ranked.windows(2).all(|w| w[0].raw_score >= w[1].raw_score));
    }
}
