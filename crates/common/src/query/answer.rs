//! Answer generation with a deterministic fallback
//!
//! The generator gets exactly one attempt, bounded by a deadline. Any
//! failure is absorbed here and replaced by an extractive answer built
//! from the ranked documents already in hand.

use super::assembler::{build_context, build_prompt, snippet};
use super::ranker::ScoredDocument;
use crate::errors::AppError;
use crate::genai::{GenerationRequest, Generator};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Marker closing every fallback answer
pub const FALLBACK_NOTE: &str =
    "(Note: AI response generation failed, showing basic document matches instead.)";

/// Text produced for a ranked query
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratedAnswer {
    pub text: String,

    /// Set when the fallback was used
    pub error: Option<String>,
}

impl GeneratedAnswer {
    pub fn is_fallback(&self) -> bool {
        self.error.is_some()
    }
}

/// Generator adapter for the query path
pub struct AnswerGenerator {
    generator: Arc<dyn Generator>,
    timeout: Duration,
    snippet_chars: usize,
}

impl AnswerGenerator {
    pub fn new(generator: Arc<dyn Generator>, timeout: Duration, snippet_chars: usize) -> Self {
        Self {
            generator,
            timeout,
            snippet_chars,
        }
    }

    /// Answer `query` from `ranked`; never fails
    pub async fn answer(&self, query: &str, ranked: &[ScoredDocument]) -> GeneratedAnswer {
        let prompt = build_prompt(query, &build_context(ranked));
        let request = GenerationRequest::new(prompt);
        let start = Instant::now();

        let result = match tokio::time::timeout(self.timeout, self.generator.generate(&request)).await {
            Ok(result) => result,
            Err(_) => Err(AppError::GenerationTimeout {
                timeout_ms: self.timeout.as_millis() as u64,
            }),
        };

        match result {
            Ok(text) => {
                tracing::debug!(
                    model = self.generator.model_name(),
                    latency_ms = start.elapsed().as_millis() as u64,
                    "Answer generated"
                );
                GeneratedAnswer { text, error: None }
            }
            Err(e) => {
                tracing::warn!(
                    model = self.generator.model_name(),
                    latency_ms = start.elapsed().as_millis() as u64,
                    error = %e,
                    "Answer generation failed, using fallback"
                );
                GeneratedAnswer {
                    text: fallback_response(query, ranked, self.snippet_chars),
                    error: Some(format!("AI generation error: {}", e)),
                }
            }
        }
    }
}

/// Extractive answer listing each ranked document with a snippet
pub fn fallback_response(query: &str, ranked: &[ScoredDocument], snippet_chars: usize) -> String {
    let mut text = format!(
        "I found some information related to \"{}\" in your documents:\n\n",
        query
    );

    for (i, doc) in ranked.iter().enumerate() {
        text.push_str(&format!(
            "{}. From \"{}\":\n{}\n\n",
            i + 1,
            doc.name,
            snippet(&doc.content, snippet_chars)
        ));
    }

    text.push_str(FALLBACK_NOTE);
    text
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::genai::testing::ScriptedGenerator;
    use uuid::Uuid;

    fn scored(name: &str, content: &str) -> ScoredDocument {
        ScoredDocument {
            id: Uuid::new_v4(),
            name: name.to_string(),
            content: content.to_string(),
            raw_score: 1,
            relevance: 100,
        }
    }

    #[test]
    fn test_fallback_layout() {
        let ranked = vec![scored("Lease", "Rent is $1,850."), scored("Memo", "x".repeat(400).as_str())];
        let text = fallback_response("rent", &ranked, 300);

        assert!(text.starts_with("I found some information related to \"rent\" in your documents:\n\n"));
        assert!(text.contains("1. From \"Lease\":\nRent is $1,850.\n\n"));
        assert!(text.contains(&format!("2. From \"Memo\":\n{}...\n\n", "x".repeat(300))));
        assert!(text.ends_with(FALLBACK_NOTE));
        assert!(text.find("Lease").unwrap() < text.find("Memo").unwrap());
    }

    #[tokio::test]
    async fn test_success_passes_text_through() {
        let generator = Arc::new(ScriptedGenerator::replying("The lease expires in March [Document 1]."));
        let adapter = AnswerGenerator::new(generator.clone(), Duration::from_secs(8), 300);

        let answer = adapter.answer("expiry", &[scored("Lease", "expiry 2025-03-01")]).await;
        assert_eq!(answer.text, "The lease expires in March [Document 1].");
        assert!(!answer.is_fallback());
        assert_eq!(generator.calls(), 1);

        let prompt = &generator.requests()[0].prompt;
        assert!(prompt.contains("Document 1: Lease\nexpiry 2025-03-01\n"));
    }

    #[tokio::test]
    async fn test_provider_error_falls_back() {
        let generator = Arc::new(ScriptedGenerator::failing("quota exceeded"));
        let adapter = AnswerGenerator::new(generator.clone(), Duration::from_secs(8), 300);

        let answer = adapter.answer("rent", &[scored("Lease", "rent")]).await;
        assert!(answer.is_fallback());
        assert!(answer.text.contains(FALLBACK_NOTE));
        let error = answer.error.unwrap();
        assert!(error.starts_with("AI generation error: "));
        assert!(error.contains("quota exceeded"));
        assert_eq!(generator.calls(), 1);
    }

    #[tokio::test]
    async fn test_timeout_falls_back() {
        let generator = Arc::new(ScriptedGenerator::sleeping(Duration::from_secs(5)));
        let adapter = AnswerGenerator::new(generator.clone(), Duration::from_millis(20), 300);

        let answer = adapter.answer("rent", &[scored("Lease", "rent")]).await;
        assert!(answer.text.ends_with(FALLBACK_NOTE));
        assert!(answer.error.unwrap().contains("timed out"));
        assert_eq!(generator.calls(), 1);
    }
}
