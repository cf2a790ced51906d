//! LexForge Common Library
//!
//! Shared code for the LexForge services including:
//! - Document model and repository
//! - Query answering pipeline (scoring, ranking, answer assembly)
//! - Generative text client abstraction
//! - Expiry extraction, AI editing, and share links
//! - Error types, configuration, identity, and metrics

pub mod auth;
pub mod config;
pub mod db;
pub mod editing;
pub mod errors;
pub mod expiry;
pub mod genai;
pub mod metrics;
pub mod query;
pub mod share;

// Re-export commonly used types
pub use config::AppConfig;
pub use db::{DocumentStore, OwnerFilter, Repository};
pub use errors::{AppError, Result};
pub use genai::Generator;
pub use query::{AnswerResult, QueryEngine};

/// Application version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default generative model
pub const DEFAULT_GENERATION_MODEL: &str = "gemini-1.5-flash";
