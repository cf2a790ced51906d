//! Configuration management for LexForge services
//!
//! Supports loading configuration from:
//! - Environment variables (prefixed with APP__)
//! - Configuration files (config/default.toml, config/<env>.toml)
//! - Default values

use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Main application configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AppConfig {
    /// Server configuration
    #[serde(default)]
    pub server: ServerConfig,

    /// Database configuration
    #[serde(default)]
    pub database: DatabaseConfig,

    /// Generative text service configuration
    #[serde(default)]
    pub generation: GenerationConfig,

    /// Query pipeline configuration
    #[serde(default)]
    pub query: QueryConfig,

    /// Expiry extraction configuration
    #[serde(default)]
    pub expiry: ExpiryConfig,

    /// Share link configuration
    #[serde(default)]
    pub share: ShareConfig,

    /// Identity configuration
    #[serde(default)]
    pub auth: AuthConfig,

    /// Observability configuration
    #[serde(default)]
    pub observability: ObservabilityConfig,

    /// Rate limiting configuration
    #[serde(default)]
    pub rate_limit: RateLimitConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    /// Host to bind to
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to listen on
    #[serde(default = "default_port")]
    pub port: u16,

    /// Request timeout in seconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// Shutdown timeout in seconds
    #[serde(default = "default_shutdown_timeout")]
    pub shutdown_timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DatabaseConfig {
    /// Primary database URL (for writes)
    #[serde(default = "default_database_url")]
    pub url: String,

    /// Read replica URL (optional, falls back to primary)
    pub read_url: Option<String>,

    /// Maximum number of connections
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,

    /// Minimum number of connections
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,

    /// Connection timeout in seconds
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,

    /// Idle timeout in seconds
    #[serde(default = "default_idle_timeout")]
    pub idle_timeout_secs: u64,

    /// Create the documents table on startup if missing
    #[serde(default = "default_enabled")]
    pub run_migrations: bool,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GenerationConfig {
    /// Generation provider: gemini, mock
    #[serde(default = "default_generation_provider")]
    pub provider: String,

    /// API key for the generation service
    pub api_key: Option<String>,

    /// API base URL (for custom endpoints)
    pub api_base: Option<String>,

    /// Model used for querying and expiry extraction
    #[serde(default = "default_generation_model")]
    pub model: String,

    /// Model used for document editing
    #[serde(default = "default_edit_model")]
    pub edit_model: String,

    /// Model used for template generation
    #[serde(default = "default_generation_model")]
    pub template_model: String,

    /// HTTP request timeout in seconds
    #[serde(default = "default_generation_timeout")]
    pub timeout_secs: u64,

    /// Upper bound on a query's generation call before falling back
    #[serde(default = "default_ai_deadline")]
    pub query_timeout_secs: u64,

    /// Upper bound on an editing call
    #[serde(default = "default_ai_deadline")]
    pub edit_timeout_secs: u64,

    /// Sampling temperature for queries
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Maximum output tokens for queries
    #[serde(default = "default_max_output_tokens")]
    pub max_output_tokens: u32,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct QueryConfig {
    /// Maximum number of documents cited per answer
    #[serde(default = "default_max_sources")]
    pub max_sources: usize,

    /// Snippet length (characters) in fallback answers
    #[serde(default = "default_snippet_chars")]
    pub snippet_chars: usize,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ExpiryConfig {
    /// Characters of document content submitted for expiry extraction
    #[serde(default = "default_content_char_budget")]
    pub content_char_budget: usize,

    /// Deadline for one document's extraction, in seconds
    #[serde(default = "default_ai_deadline")]
    pub document_timeout_secs: u64,

    /// Time budget for a whole scan; documents left over are deferred
    #[serde(default = "default_scan_budget")]
    pub scan_budget_secs: u64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ShareConfig {
    /// Share link lifetime when the caller does not specify one
    #[serde(default = "default_share_expiry_days")]
    pub default_expiry_days: i64,

    /// Public base URL used to build share links
    #[serde(default = "default_public_base_url")]
    pub public_base_url: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AuthConfig {
    /// HS256 secret for verifying identity tokens (disabled when unset)
    pub jwt_secret: Option<String>,

    /// Header carrying the caller identity set by the upstream auth proxy
    #[serde(default = "default_identity_header")]
    pub identity_header: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ObservabilityConfig {
    /// Log level (debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Enable JSON logging
    #[serde(default = "default_enabled")]
    pub json_logging: bool,

    /// Metrics port (0 to disable)
    #[serde(default = "default_metrics_port")]
    pub metrics_port: u16,

    /// Service name for tracing
    #[serde(default = "default_service_name")]
    pub service_name: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RateLimitConfig {
    /// Requests per second (global)
    #[serde(default = "default_rate_limit")]
    pub requests_per_second: u32,

    /// Burst capacity
    #[serde(default = "default_burst")]
    pub burst: u32,

    /// Enable rate limiting
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

// Default value functions
fn default_host() -> String { "0.0.0.0".to_string() }
fn default_port() -> u16 { 8080 }
fn default_request_timeout() -> u64 { 30 }
fn default_shutdown_timeout() -> u64 { 30 }
fn default_database_url() -> String { "postgres://localhost/lexforge".to_string() }
fn default_max_connections() -> u32 { 20 }
fn default_min_connections() -> u32 { 2 }
fn default_connect_timeout() -> u64 { 10 }
fn default_idle_timeout() -> u64 { 300 }
fn default_generation_provider() -> String { "gemini".to_string() }
fn default_generation_model() -> String { crate::DEFAULT_GENERATION_MODEL.to_string() }
fn default_edit_model() -> String { "gemini-1.5-pro".to_string() }
fn default_generation_timeout() -> u64 { 30 }
fn default_ai_deadline() -> u64 { 8 }
fn default_temperature() -> f32 { 0.7 }
fn default_max_output_tokens() -> u32 { 2048 }
fn default_max_sources() -> usize { 3 }
fn default_snippet_chars() -> usize { 300 }
fn default_content_char_budget() -> usize { 15_000 }
fn default_scan_budget() -> u64 { 120 }
fn default_share_expiry_days() -> i64 { 7 }
fn default_public_base_url() -> String { "http://localhost:3000".to_string() }
fn default_identity_header() -> String { "X-User-ID".to_string() }
fn default_log_level() -> String { "info".to_string() }
fn default_metrics_port() -> u16 { 9090 }
fn default_service_name() -> String { "lexforge".to_string() }
fn default_rate_limit() -> u32 { 50 }
fn default_burst() -> u32 { 100 }
fn default_enabled() -> bool { true }

impl AppConfig {
    /// Load configuration from environment and files
    pub fn load() -> Result<Self, ConfigError> {
        let env = std::env::var("APP_ENV").unwrap_or_else(|_| "development".to_string());

        let config = Config::builder()
            // Load base config file
            .add_source(File::with_name("config/default").required(false))
            // Load environment-specific config
            .add_source(File::with_name(&format!("config/{}", env)).required(false))
            // Load local overrides
            .add_source(File::with_name("config/local").required(false))
            // Load from environment variables with APP__ prefix
            // e.g., APP__GENERATION__API_KEY=...
            .add_source(
                Environment::with_prefix("APP")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }

    /// Get request timeout as Duration
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.server.request_timeout_secs)
    }

    /// Get shutdown timeout as Duration
    pub fn shutdown_timeout(&self) -> Duration {
        Duration::from_secs(self.server.shutdown_timeout_secs)
    }
}

impl ExpiryConfig {
    pub fn document_timeout(&self) -> Duration {
        Duration::from_secs(self.document_timeout_secs)
    }

    pub fn scan_budget(&self) -> Duration {
        Duration::from_secs(self.scan_budget_secs)
    }

    /// Route deadline for scans: the budget plus one in-flight extraction
    pub fn scan_route_timeout(&self) -> Duration {
        self.scan_budget() + self.document_timeout() + Duration::from_secs(5)
    }
}

impl GenerationConfig {
    pub fn query_timeout(&self) -> Duration {
        Duration::from_secs(self.query_timeout_secs)
    }

    pub fn edit_timeout(&self) -> Duration {
        Duration::from_secs(self.edit_timeout_secs)
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            database: DatabaseConfig::default(),
            generation: GenerationConfig::default(),
            query: QueryConfig::default(),
            expiry: ExpiryConfig::default(),
            share: ShareConfig::default(),
            auth: AuthConfig::default(),
            observability: ObservabilityConfig::default(),
            rate_limit: RateLimitConfig::default(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            request_timeout_secs: default_request_timeout(),
            shutdown_timeout_secs: default_shutdown_timeout(),
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: default_database_url(),
            read_url: None,
            max_connections: default_max_connections(),
            min_connections: default_min_connections(),
            connect_timeout_secs: default_connect_timeout(),
            idle_timeout_secs: default_idle_timeout(),
            run_migrations: default_enabled(),
        }
    }
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            provider: default_generation_provider(),
            api_key: None,
            api_base: None,
            model: default_generation_model(),
            edit_model: default_edit_model(),
            template_model: default_generation_model(),
            timeout_secs: default_generation_timeout(),
            query_timeout_secs: default_ai_deadline(),
            edit_timeout_secs: default_ai_deadline(),
            temperature: default_temperature(),
            max_output_tokens: default_max_output_tokens(),
        }
    }
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            max_sources: default_max_sources(),
            snippet_chars: default_snippet_chars(),
        }
    }
}

impl Default for ExpiryConfig {
    fn default() -> Self {
        Self {
            content_char_budget: default_content_char_budget(),
            document_timeout_secs: default_ai_deadline(),
            scan_budget_secs: default_scan_budget(),
        }
    }
}

impl Default for ShareConfig {
    fn default() -> Self {
        Self {
            default_expiry_days: default_share_expiry_days(),
            public_base_url: default_public_base_url(),
        }
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: None,
            identity_header: default_identity_header(),
        }
    }
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            json_logging: default_enabled(),
            metrics_port: default_metrics_port(),
            service_name: default_service_name(),
        }
    }
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            requests_per_second: default_rate_limit(),
            burst: default_burst(),
            enabled: default_enabled(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.generation.model, "gemini-1.5-flash");
        assert_eq!(config.query.max_sources, 3);
        assert_eq!(config.query.snippet_chars, 300);
        assert_eq!(config.expiry.content_char_budget, 15_000);
        assert_eq!(config.generation.query_timeout(), Duration::from_secs(8));
        assert_eq!(config.observability.service_name, "lexforge");
    }

    #[test]
    fn test_scan_route_outlasts_scan_budget() {
        let config = AppConfig::default();
        assert_eq!(config.expiry.document_timeout(), Duration::from_secs(8));
        assert!(config.expiry.scan_route_timeout() > config.expiry.scan_budget() + config.expiry.document_timeout());
        assert!(config.expiry.scan_route_timeout() > config.request_timeout());
    }

    #[test]
    fn test_partial_sections_fill_defaults() {
        let config: AppConfig = serde_json::from_value(serde_json::json!({
            "query": { "snippet_chars": 120 },
            "share": { "public_base_url": "https://docs.example.com" }
        }))
        .unwrap();

        assert_eq!(config.query.snippet_chars, 120);
        assert_eq!(config.query.max_sources, 3);
        assert_eq!(config.share.default_expiry_days, 7);
        assert_eq!(config.share.public_base_url, "https://docs.example.com");
        assert_eq!(config.auth.identity_header, "X-User-ID");
    }
}
