use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use serde_json::json;
use std::time::Duration;
use tracing::{debug, info};

use super::{ChatBackend, ChatMessage, ChatRequest, ChatResponse};
use crate::error::{Result, SubtransError};

/// Body of `POST /api/chat`
#[derive(Debug, Serialize)]
struct OllamaChatRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    stream: bool,
}

/// Ollama chat client
pub struct OllamaBackend {
    client: Client,
    endpoint: String,
}

impl OllamaBackend {
    pub fn new(endpoint: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(SubtransError::Http)?;

        Ok(Self {
            client,
            endpoint: endpoint.trim_end_matches('/').to_string(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl ChatBackend for OllamaBackend {
    async fn chat(&self, request: ChatRequest) -> Result<ChatResponse> {
        let url = format!("{}/api/chat", self.endpoint);
        let body = OllamaChatRequest {
            model: &request.model,
            messages: &request.messages,
            stream: false,
        };

        debug!("Sending chat request to: {}", url);

        let response = self.client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| SubtransError::Backend(format!("HTTP request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(SubtransError::Backend(format!(
                "Ollama API error {}: {}", status, error_text
            )));
        }

        let chat_response: ChatResponse = response.json().await
            .map_err(|e| SubtransError::Backend(format!("Failed to parse response: {}", e)))?;

        debug!("Raw Ollama response: {}", chat_response.message.content);
        Ok(chat_response)
    }

    /// Check if Ollama is reachable and the model is pulled
    async fn check_model(&self, model: &str) -> Result<()> {
        let url = format!("{}/api/show", self.endpoint);

        let response = self.client
            .post(&url)
            .json(&json!({ "name": model }))
            .send()
            .await
            .map_err(|e| SubtransError::Backend(format!("Failed to connect to Ollama: {}", e)))?;

        if response.status().is_success() {
            info!("Ollama model '{}' is available", model);
            Ok(())
        } else {
            Err(SubtransError::Backend(format!(
                "Ollama model '{}' not found. Please pull the model first: ollama pull {}",
                model, model
            )))
        }
    }
}
