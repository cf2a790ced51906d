//! AI-assisted document editing and template drafting

use crate::config::GenerationConfig;
use crate::errors::{AppError, Result};
use crate::genai::{GenerationRequest, Generator};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Shown to the caller when the edit deadline passes
pub const TIMEOUT_MESSAGE: &str =
    "The template generation timed out. Please try a simpler template description.";

const TEMPLATE_MAX_TOKENS: u32 = 1024;
const TEMPLATE_TEMPERATURE: f32 = 0.3;

/// Which prompt an instruction gets
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditMode {
    /// Draft a new template from a description
    Template,
    /// Rewrite the supplied content
    Edit,
}

impl EditMode {
    /// Template drafting is requested by mentioning both "generate" and "template"
    pub fn detect(instruction: &str) -> Self {
        let lower = instruction.to_lowercase();
        if lower.contains("generate") && lower.contains("template") {
            EditMode::Template
        } else {
            EditMode::Edit
        }
    }
}

/// Runs editing instructions through the generator
pub struct DocumentEditor {
    generator: Arc<dyn Generator>,
    edit_model: String,
    template_model: String,
    max_output_tokens: u32,
    temperature: f32,
    timeout: Duration,
}

impl DocumentEditor {
    pub fn new(generator: Arc<dyn Generator>, config: &GenerationConfig) -> Self {
        Self {
            generator,
            edit_model: config.edit_model.clone(),
            template_model: config.template_model.clone(),
            max_output_tokens: config.max_output_tokens,
            temperature: config.temperature,
            timeout: config.edit_timeout(),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Build the generation request for `instruction` applied to `content`
    pub fn build_request(&self, content: &str, instruction: &str) -> (EditMode, GenerationRequest) {
        let mode = EditMode::detect(instruction);
        let request = match mode {
            EditMode::Template => GenerationRequest::new(format!(
                "Create a brief template for: {}\n\n\
                 Keep it under 2000 characters and include only the essential elements.\n\
                 Use placeholders such as [NAME] and [DATE] where appropriate.\n\
                 Return only the template content, without explanations.",
                instruction
            ))
            .with_model(self.template_model.as_str())
            .with_max_output_tokens(TEMPLATE_MAX_TOKENS)
            .with_temperature(TEMPLATE_TEMPERATURE),
            EditMode::Edit => GenerationRequest::new(format!(
                "Edit the following document according to this instruction: \"{}\"\n\n\
                 Document content:\n{}\n\n\
                 Return only the edited document content, without explanations or extra text.",
                instruction, content
            ))
            .with_model(self.edit_model.as_str())
            .with_max_output_tokens(self.max_output_tokens)
            .with_temperature(self.temperature),
        };
        (mode, request)
    }

    /// Apply `instruction` to `content`, returning the new text
    pub async fn edit(&self, content: &str, instruction: &str) -> Result<String> {
        if content.trim().is_empty() || instruction.trim().is_empty() {
            return Err(AppError::Validation {
                message: "Content and prompt are required".to_string(),
                field: None,
            });
        }

        let (mode, request) = self.build_request(content, instruction);
        let start = Instant::now();

        let text = tokio::time::timeout(self.timeout, self.generator.generate(&request))
            .await
            .map_err(|_| AppError::GenerationTimeout {
                timeout_ms: self.timeout.as_millis() as u64,
            })??;

        tracing::info!(
            mode = ?mode,
            model = request.model.as_deref().unwrap_or_default(),
            latency_ms = start.elapsed().as_millis() as u64,
            "Document edited"
        );

        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::genai::testing::ScriptedGenerator;

    fn editor(generator: Arc<ScriptedGenerator>) -> DocumentEditor {
        let config = GenerationConfig {
            edit_model: "edit-model".into(),
            template_model: "template-model".into(),
            ..Default::default()
        };
        DocumentEditor::new(generator, &config)
    }

    #[test]
    fn test_mode_detection() {
        assert_eq!(EditMode::detect("Generate a lease TEMPLATE"), EditMode::Template);
        assert_eq!(EditMode::detect("generate a summary"), EditMode::Edit);
        assert_eq!(EditMode::detect("make it formal"), EditMode::Edit);
    }

    #[tokio::test]
    async fn test_template_request() {
        let generator = Arc::new(ScriptedGenerator::replying("[NAME] agrees..."));
        let editor = editor(generator.clone());

        let text = editor.edit("ignored", "generate an NDA template").await.unwrap();
        assert_eq!(text, "[NAME] agrees...");

        let request = &generator.requests()[0];
        assert_eq!(request.model.as_deref(), Some("template-model"));
        assert_eq!(request.max_output_tokens, Some(1024));
        assert_eq!(request.temperature, Some(0.3));
        assert!(request.prompt.contains("under 2000 characters"));
        assert!(!request.prompt.contains("ignored"));
    }

    #[tokio::test]
    async fn test_edit_request() {
        let generator = Arc::new(ScriptedGenerator::replying("Formal text"));
        let editor = editor(generator.clone());

        editor.edit("hey there", "make it formal").await.unwrap();

        let request = &generator.requests()[0];
        assert_eq!(request.model.as_deref(), Some("edit-model"));
        assert_eq!(request.max_output_tokens, Some(2048));
        assert_eq!(request.temperature, Some(0.7));
        assert!(request.prompt.contains("hey there"));
        assert!(request.prompt.contains("\"make it formal\""));
    }

    #[tokio::test]
    async fn test_missing_input_is_rejected() {
        let generator = Arc::new(ScriptedGenerator::replying("x"));
        let editor = editor(generator.clone());
        assert!(matches!(editor.edit("", "fix").await, Err(AppError::Validation { .. })));
        assert!(matches!(editor.edit("text", " ").await, Err(AppError::Validation { .. })));
        assert_eq!(generator.calls(), 0);
    }

    #[tokio::test]
    async fn test_timeout_and_errors() {
        let slow = editor(Arc::new(ScriptedGenerator::sleeping(Duration::from_secs(5))))
            .with_timeout(Duration::from_millis(20));
        assert!(matches!(
            slow.edit("text", "generate a template").await,
            Err(AppError::GenerationTimeout { .. })
        ));

        let failing = editor(Arc::new(ScriptedGenerator::failing("quota")));
        assert!(matches!(
            failing.edit("text", "shorten").await,
            Err(AppError::GenerationError { .. })
        ));
    }
}
