//! Ollama client implementing [`ModelClient`].

use std::time::Duration;

use async_trait::async_trait;
use serde_json::json;
use tracing::debug;

use super::{LlmError, ModelClient};

/// Client for an Ollama `/api/generate` endpoint.
pub struct OllamaClient {
    endpoint: String,
    http: reqwest::Client,
    timeout: Duration,
}

impl OllamaClient {
    pub fn new(endpoint: String, timeout: Duration) -> Self {
        Self {
            endpoint,
            http: reqwest::Client::new(),
            timeout,
        }
    }
}

#[async_trait]
impl ModelClient for OllamaClient {
    async fn generate(&self, model: &str, prompt: &str) -> Result<String, LlmError> {
        let body = json!({
            "model": model,
            "prompt": prompt,
            "stream": false,
            "format": "json",
        });

        let response = self
            .http
            .post(&self.endpoint)
            .json(&body)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    LlmError::Timeout
                } else {
                    LlmError::Transport(e)
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(LlmError::Status(status));
        }

        let raw = response.text().await.map_err(|e| {
            if e.is_timeout() {
                LlmError::Timeout
            } else {
                LlmError::Transport(e)
            }
        })?;

        debug!(bytes = raw.len(), "raw model response received");
        Ok(raw)
    }
}
