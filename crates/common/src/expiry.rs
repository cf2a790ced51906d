//! Expiry date extraction
//!
//! Asks the generator for a document's expiry date and accepts the answer
//! only if it is a bare `YYYY-MM-DD` calendar date. Extraction never fails
//! the caller: anything unusable is treated as "no expiry date".
//!
//! Scans run against a time budget. Documents not reached before it runs
//! out are reported as `deferred` and left untouched.

use crate::config::ExpiryConfig;
use crate::db::models::Document;
use crate::db::{DocumentStore, OwnerFilter};
use crate::errors::{AppError, Result};
use crate::genai::{GenerationRequest, Generator};
use crate::metrics;
use crate::query::assembler::truncate_chars;
use chrono::NaiveDate;
use regex_lite::Regex;
use serde::Serialize;
use std::sync::{Arc, OnceLock};
use std::time::{Duration, Instant};
use uuid::Uuid;

fn date_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").expect("valid date pattern"))
}

/// Prompt asking for the expiry date of one document
pub fn build_expiry_prompt(name: &str, content: &str, char_budget: usize) -> String {
    format!(
        "You are an AI document analyzer. Find the expiry date of the following document if it has one.\n\
         The document is titled: \"{}\"\n\n\
         Document content:\n{}\n\n\
         Reply with ONLY the expiry date in YYYY-MM-DD format. If the document has no specific expiry date, reply with \"NONE\".",
        name,
        truncate_chars(content, char_budget)
    )
}

/// Accept a trimmed `YYYY-MM-DD` answer that names a real date
pub fn parse_expiry_answer(answer: &str) -> Option<NaiveDate> {
    let answer = answer.trim();
    if !date_pattern().is_match(answer) {
        return None;
    }
    NaiveDate::parse_from_str(answer, "%Y-%m-%d").ok()
}

/// Per-document scan status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ScanStatus {
    Updated,
    NoExpiryFound,
    SkippedNoContent,
    Deferred,
    Error,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanEntry {
    pub id: Uuid,
    pub name: String,
    pub status: ScanStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expiry_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Outcome of scanning a collection
#[derive(Debug, Clone, Default, Serialize)]
pub struct ScanReport {
    /// Documents examined; deferred ones are not counted
    pub processed: usize,
    pub updated: usize,
    pub deferred: usize,
    pub results: Vec<ScanEntry>,
}

/// Extracts and stores document expiry dates
pub struct ExpiryExtractor {
    generator: Arc<dyn Generator>,
    char_budget: usize,
    timeout: Duration,
    scan_budget: Option<Duration>,
}

impl ExpiryExtractor {
    pub fn new(generator: Arc<dyn Generator>, char_budget: usize, timeout: Duration) -> Self {
        Self {
            generator,
            char_budget,
            timeout,
            scan_budget: None,
        }
    }

    pub fn from_config(generator: Arc<dyn Generator>, config: &ExpiryConfig) -> Self {
        Self::new(generator, config.content_char_budget, config.document_timeout())
            .with_scan_budget(config.scan_budget())
    }

    /// Bound the total time spent by `scan`
    pub fn with_scan_budget(mut self, budget: Duration) -> Self {
        self.scan_budget = Some(budget);
        self
    }

    /// Expiry date of `document`, `None` when absent or unreadable
    pub async fn extract(&self, document: &Document) -> Option<NaiveDate> {
        self.extract_within(document, self.timeout).await
    }

    async fn extract_within(&self, document: &Document, timeout: Duration) -> Option<NaiveDate> {
        let prompt = build_expiry_prompt(&document.name, &document.content, self.char_budget);
        let request = GenerationRequest::new(prompt);

        let answer = match tokio::time::timeout(timeout, self.generator.generate(&request)).await {
            Ok(Ok(answer)) => answer,
            Ok(Err(e)) => {
                tracing::warn!(document_id = %document.id, error = %e, "Expiry extraction failed");
                return None;
            }
            Err(_) => {
                tracing::warn!(document_id = %document.id, "Expiry extraction timed out");
                return None;
            }
        };

        let date = parse_expiry_answer(&answer);
        tracing::debug!(
            document_id = %document.id,
            answer = answer.trim(),
            found = date.is_some(),
            "Expiry answer received"
        );
        date
    }

    /// Re-extract one document's expiry date and store it, clearing it when none is found
    pub async fn refresh_document(
        &self,
        store: &dyn DocumentStore,
        id: Uuid,
        identity: Option<&str>,
    ) -> Result<Document> {
        let document = store
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::DocumentNotFound { id: id.to_string() })?;

        if !document.is_writable_by(identity) {
            return Err(AppError::NotOwner { id: id.to_string() });
        }

        let expiry_date = self.extract(&document).await;
        let updated = store.set_expiry_date(id, expiry_date).await?;

        tracing::info!(
            document_id = %id,
            expiry_date = ?expiry_date,
            "Document expiry refreshed"
        );
        Ok(updated)
    }

    /// Sequentially scan every document visible under `filter`.
    ///
    /// Only found dates are written; one document failing does not stop the scan.
    pub async fn scan(&self, store: &dyn DocumentStore, filter: &OwnerFilter) -> Result<ScanReport> {
        let documents = store.find_many(filter).await?;
        let deadline = self.scan_budget.map(|budget| Instant::now() + budget);
        let mut report = ScanReport::default();

        for document in documents {
            let timeout = match deadline {
                Some(deadline) => self.timeout.min(deadline.saturating_duration_since(Instant::now())),
                None => self.timeout,
            };
            let mut entry = ScanEntry {
                id: document.id,
                name: document.name.clone(),
                status: ScanStatus::NoExpiryFound,
                expiry_date: None,
                error: None,
            };

            if document.content.trim().is_empty() {
                entry.status = ScanStatus::SkippedNoContent;
            } else if timeout.is_zero() {
                entry.status = ScanStatus::Deferred;
                report.deferred += 1;
            } else if let Some(date) = self.extract_within(&document, timeout).await {
                match store.set_expiry_date(document.id, Some(date)).await {
                    Ok(_) => {
                        entry.status = ScanStatus::Updated;
                        entry.expiry_date = Some(date);
                        report.updated += 1;
                    }
                    Err(e) => {
                        tracing::error!(document_id = %document.id, error = %e, "Failed to store expiry date");
                        entry.status = ScanStatus::Error;
                        entry.error = Some(e.to_string());
                    }
                }
            }

            report.results.push(entry);
        }

        report.processed = report.results.len() - report.deferred;
        metrics::record_expiry_scan(report.processed, report.updated);
        if report.deferred > 0 {
            tracing::warn!(deferred = report.deferred, "Expiry scan budget exhausted");
        }
        tracing::info!(
            processed = report.processed,
            updated = report.updated,
            "Expiry scan complete"
        );

        Ok(report)
    }
}
