//! Query answering pipeline
//!
//! Stages, each in its own module:
//! - `scorer`: literal term counting over a document's searchable text
//! - `ranker`: filtering, stable ordering, capping and normalization
//! - `assembler`: prompt context assembly
//! - `answer`: generation under a deadline with an extractive fallback
//! - `formatter`: the `AnswerResult` handed back to callers

pub mod answer;
pub mod assembler;
pub mod formatter;
pub mod ranker;
pub mod scorer;

pub use answer::{AnswerGenerator, GeneratedAnswer, FALLBACK_NOTE};
pub use formatter::{AnswerResult, QueryOutcome, Source};
pub use ranker::ScoredDocument;

use crate::config::{GenerationConfig, QueryConfig};
use crate::db::{DocumentStore, OwnerFilter};
use crate::errors::{AppError, Result};
use crate::genai::Generator;
use crate::metrics;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Pipeline tuning
#[derive(Debug, Clone)]
pub struct QueryOptions {
    /// Maximum documents cited per answer
    pub max_sources: usize,

    /// Snippet length in fallback answers
    pub snippet_chars: usize,

    /// Deadline for the generation call
    pub timeout: Duration,
}

impl QueryOptions {
    pub fn from_config(query: &QueryConfig, generation: &GenerationConfig) -> Self {
        Self {
            max_sources: query.max_sources.max(1),
            snippet_chars: query.snippet_chars,
            timeout: generation.query_timeout(),
        }
    }
}

impl Default for QueryOptions {
    fn default() -> Self {
        Self {
            max_sources: 3,
            snippet_chars: 300,
            timeout: Duration::from_secs(8),
        }
    }
}

/// Answers natural-language questions over a caller's documents
pub struct QueryEngine {
    store: Arc<dyn DocumentStore>,
    answerer: AnswerGenerator,
    max_sources: usize,
}

impl QueryEngine {
    pub fn new(store: Arc<dyn DocumentStore>, generator: Arc<dyn Generator>, options: QueryOptions) -> Self {
        Self {
            store,
            answerer: AnswerGenerator::new(generator, options.timeout, options.snippet_chars),
            max_sources: options.max_sources,
        }
    }

    /// Answer `query` from the documents visible to `owner`.
    ///
    /// Empty collections, no matches and generation failures all produce an
    /// `AnswerResult`; only a blank query or a store failure is an error.
    pub async fn answer_query(&self, query: &str, owner: Option<&str>) -> Result<AnswerResult> {
        if query.trim().is_empty() {
            return Err(AppError::Validation {
                message: "Query is required".to_string(),
                field: Some("query".to_string()),
            });
        }

        let start = Instant::now();
        let filter = OwnerFilter::from_identity(owner);
        let documents = self.store.find_many(&filter).await?;

        tracing::info!(
            owner = owner.unwrap_or("anonymous"),
            documents = documents.len(),
            "Documents loaded for query"
        );

        let result = if documents.is_empty() {
            AnswerResult::no_documents(filter.is_anonymous())
        } else {
            let terms = scorer::query_terms(query);
            let ranked = ranker::rank(documents, &terms, self.max_sources);

            if ranked.is_empty() {
                AnswerResult::no_matches()
            } else {
                tracing::debug!(
                    sources = ranked.len(),
                    top_score = ranked[0].raw_score,
                    "Documents ranked"
                );
                let answer = self.answerer.answer(query, &ranked).await;
                formatter::format_answer(answer, &ranked)
            }
        };

        let elapsed = start.elapsed();
        metrics::record_query(elapsed.as_secs_f64(), result.outcome.as_str(), result.sources.len());

        tracing::info!(
            outcome = result.outcome.as_str(),
            sources = result.sources.len(),
            latency_ms = elapsed.as_millis() as u64,
            "Query answered"
        );

        Ok(result)
    }
}
