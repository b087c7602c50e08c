// Windowed translation pipeline
//
// - window: splits a document into request-sized runs of entries
// - prompt: renders a run into one instruction for the model
// - validate: structural acceptance checks on the model's answer
// - driver: plans, prompts, validates, retries and commits
// - ollama: HTTP backend
// - scratch: checkpoint and error-log files

pub mod driver;
pub mod ollama;
pub mod prompt;
pub mod scratch;
pub mod validate;
pub mod window;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

pub use driver::{AttemptFailure, FileOutcome, TranslationReport, WindowedTranslator};
pub use ollama::OllamaBackend;
pub use prompt::PromptBuilder;
pub use scratch::ScratchFiles;
pub use validate::validate_response;
pub use window::{Window, WindowPlanner};

use crate::config::TranslateConfig;
use crate::error::Result;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    #[serde(default)]
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
}

impl ChatRequest {
    /// Single user turn, the only shape the pipeline sends
    pub fn user(model: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            messages: vec![ChatMessage::user(content)],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatResponse {
    pub message: ChatMessage,
}

/// Text-generation service the driver delegates to
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ChatBackend: Send + Sync {
    /// Issue one non-streaming chat request
    async fn chat(&self, request: ChatRequest) -> Result<ChatResponse>;

    /// Check the model can be served before any work starts
    async fn check_model(&self, model: &str) -> Result<()> {
        let _ = model;
        Ok(())
    }
}

/// Factory for creating backend instances
pub struct BackendFactory;

impl BackendFactory {
    pub fn create_backend(config: &TranslateConfig) -> Result<Arc<dyn ChatBackend>> {
        let backend = OllamaBackend::new(
            &config.endpoint,
            Duration::from_secs(config.request_timeout_secs),
        )?;
        debug!("Using ollama at {}", backend.endpoint());
        Ok(Arc::new(backend))
    }
}
