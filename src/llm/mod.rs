//! Model client module for the generative budget path.
//!
//! This module provides a trait-based abstraction over text-generation
//! endpoints, with Ollama as the primary implementation. Nothing here
//! assumes the model returns valid JSON; callers get the raw response body
//! and the budget pipeline's normalizer deals with the rest.

mod ollama;

pub use ollama::OllamaClient;

use async_trait::async_trait;

/// Failure reaching or waiting on the model endpoint. Every variant is
/// recoverable at the orchestrator level (failover to the deterministic
/// builder); none of them should surface to an API caller.
#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    #[error("model call timed out")]
    Timeout,

    #[error("model endpoint unreachable: {0}")]
    Transport(#[source] reqwest::Error),

    #[error("model endpoint returned status {0}")]
    Status(reqwest::StatusCode),
}

/// Trait for model clients.
///
/// Implementations make exactly one non-streaming attempt per call and apply
/// their own bounded timeout. No retries: a second attempt at a
/// non-deterministic generation rarely improves the outcome and costs
/// latency.
#[async_trait]
pub trait ModelClient: Send + Sync {
    /// Send `prompt` to the named model and return the raw response text.
    async fn generate(&self, model: &str, prompt: &str) -> Result<String, LlmError>;
}
