//! Answer result shaping

use super::answer::GeneratedAnswer;
use super::ranker::ScoredDocument;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const NO_DOCUMENTS_MESSAGE: &str =
    "I couldn't find any documents in your collection. Try adding some documents first!";

pub const NO_DOCUMENTS_ANONYMOUS_MESSAGE: &str =
    "I couldn't find any documents. Please sign in to query your documents or add some documents first.";

pub const NO_MATCHES_MESSAGE: &str =
    "I couldn't find any documents matching your query. Try a different search term.";

/// A document cited by an answer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Source {
    pub id: Uuid,
    pub name: String,
    pub relevance: u8,
}

/// Terminal state of a query
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueryOutcome {
    NoDocuments,
    NoMatches,
    Generated,
    Fallback,
}

impl QueryOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            QueryOutcome::NoDocuments => "no_documents",
            QueryOutcome::NoMatches => "no_matches",
            QueryOutcome::Generated => "generated",
            QueryOutcome::Fallback => "fallback",
        }
    }
}

/// The answer to a query
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnswerResult {
    pub response: String,
    pub sources: Vec<Source>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub outcome: QueryOutcome,
}

impl AnswerResult {
    /// The caller has no documents at all
    pub fn no_documents(anonymous: bool) -> Self {
        let message = if anonymous {
            NO_DOCUMENTS_ANONYMOUS_MESSAGE
        } else {
            NO_DOCUMENTS_MESSAGE
        };
        Self::message(message, QueryOutcome::NoDocuments)
    }

    /// Documents exist but none matched
    pub fn no_matches() -> Self {
        Self::message(NO_MATCHES_MESSAGE, QueryOutcome::NoMatches)
    }

    fn message(text: &str, outcome: QueryOutcome) -> Self {
        Self {
            response: text.to_string(),
            sources: Vec::new(),
            error: None,
            outcome,
        }
    }
}

/// Combine generated text with the ranked sources, unchanged
pub fn format_answer(answer: GeneratedAnswer, ranked: &[ScoredDocument]) -> AnswerResult {
    let outcome = if answer.is_fallback() {
        QueryOutcome::Fallback
    } else {
        QueryOutcome::Generated
    };

    AnswerResult {
        response: answer.text,
        sources: ranked
            .iter()
            .map(|doc| Source {
                id: doc.id,
                name: doc.name.clone(),
                relevance: doc.relevance,
            })
            .collect(),
        error: answer.error,
        outcome,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_answer_keeps_order_and_text() {
        let ranked = vec![
            ScoredDocument {
                id: Uuid::new_v4(),
                name: "Lease".into(),
                content: String::new(),
                raw_score: 3,
                relevance: 100,
            },
            ScoredDocument {
                id: Uuid::new_v4(),
                name: "Memo".into(),
                content: String::new(),
                raw_score: 1,
                relevance: 33,
            },
        ];
        let answer = GeneratedAnswer {
            text: "  **Answer**  ".into(),
            error: None,
        };

        let result = format_answer(answer, &ranked);
        assert_eq!(result.response, "  **Answer**  ");
        assert_eq!(result.outcome, QueryOutcome::Generated);
        assert_eq!(result.sources[0].name, "Lease");
        assert_eq!(result.sources[1].relevance, 33);
        assert_eq!(result.sources[0].id, ranked[0].id);
    }

    #[test]
    fn test_empty_outcomes() {
        let anonymous = AnswerResult::no_documents(true);
        let identified = AnswerResult::no_documents(false);
        assert_ne!(anonymous.response, identified.response);
        assert!(anonymous.sources.is_empty());
        assert_eq!(identified.outcome, QueryOutcome::NoDocuments);

        let none = AnswerResult::no_matches();
        assert_eq!(none.response, NO_MATCHES_MESSAGE);
        assert_eq!(none.outcome.as_str(), "no_matches");
    }

    #[test]
    fn test_serialization_omits_empty_error() {
        let json = serde_json::to_value(AnswerResult::no_matches()).unwrap();
        assert!(json.get("error").is_none());
        assert_eq!(json["outcome"], "no_matches");
    }
}
