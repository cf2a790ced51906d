//! Generative text service abstraction
//!
//! Provides a unified interface over text generation providers:
//! - Google Gemini (Generative Language REST API)
//! - A deterministic mock for development without an API key

mod gemini;
#[cfg(test)]
pub(crate) mod testing;

pub use gemini::GeminiGenerator;

use crate::config::GenerationConfig;
use crate::errors::Result;
use async_trait::async_trait;
use std::sync::Arc;

/// A single generation call
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRequest {
    pub prompt: String,

    /// Overrides the generator's default model
    pub model: Option<String>,

    pub max_output_tokens: Option<u32>,

    pub temperature: Option<f32>,
}

impl GenerationRequest {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            model: None,
            max_output_tokens: None,
            temperature: None,
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn with_max_output_tokens(mut self, tokens: u32) -> Self {
        self.max_output_tokens = Some(tokens);
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }
}

/// Trait for text generation
#[async_trait]
pub trait Generator: Send + Sync {
    /// Generate text for a prompt
    async fn generate(&self, request: &GenerationRequest) -> Result<String>;

    /// Get the default model name
    fn model_name(&self) -> &str;
}

/// Mock generator for development and testing
pub struct MockGenerator {
    model: String,
}

impl MockGenerator {
    pub fn new() -> Self {
        Self {
            model: "mock-generator".to_string(),
        }
    }
}

impl Default for MockGenerator {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Generator for MockGenerator {
    async fn generate(&self, request: &GenerationRequest) -> Result<String> {
        let preview: String = request
            .prompt
            .lines()
            .find(|line| !line.trim().is_empty())
            .unwrap_or_default()
            .chars()
            .take(120)
            .collect();

        Ok(format!(
            "Based on the provided documents, here is a response to: {}\n\n\
             [Mock response - generation API key not configured]",
            preview.trim()
        ))
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

/// Create a generator based on configuration
pub fn create_generator(config: &GenerationConfig) -> Result<Arc<dyn Generator>> {
    match config.provider.as_str() {
        "gemini" => match config.api_key.as_deref().filter(|k| !k.is_empty()) {
            Some(key) => Ok(Arc::new(GeminiGenerator::new(
                key.to_string(),
                config.model.clone(),
                config.api_base.clone(),
                config.timeout_secs,
            )?)),
            None => {
                tracing::warn!("Gemini API key not configured, using mock generator");
                Ok(Arc::new(MockGenerator::new()))
            }
        },
        "mock" => Ok(Arc::new(MockGenerator::new())),
        other => {
            tracing::warn!(provider = other, "Unknown generation provider, using mock");
            Ok(Arc::new(MockGenerator::new()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_generator() {
        let generator = MockGenerator::new();
        let request = GenerationRequest::new("\nWhat is the rent?\nmore context");
        let text = generator.generate(&request).await.unwrap();
        assert!(text.contains("What is the rent?"));
        assert!(text.contains("Mock response"));
        assert_eq!(generator.model_name(), "mock-generator");
    }

    #[test]
    fn test_create_generator_without_key_uses_mock() {
        let config = GenerationConfig::default();
        let generator = create_generator(&config).unwrap();
        assert_eq!(generator.model_name(), "mock-generator");
    }

    #[test]
    fn test_create_generator_with_key() {
        let config = GenerationConfig {
            api_key: Some("test-key".into()),
            ..Default::default()
        };
        let generator = create_generator(&config).unwrap();
        assert_eq!(generator.model_name(), "gemini-1.5-flash");
    }

    #[test]
    fn test_request_builder() {
        let request = GenerationRequest::new("prompt")
            .with_model("gemini-1.5-pro")
            .with_max_output_tokens(1024)
            .with_temperature(0.3);
        assert_eq!(request.model.as_deref(), Some("gemini-1.5-pro"));
        assert_eq!(request.max_output_tokens, Some(1024));
        assert_eq!(request.temperature, Some(0.3));
    }
}
