//! Application configuration.
//!
//! All environment reads happen here, once, at startup. The resulting
//! `Config` is passed into the components that need it; pipeline code never
//! consults the environment directly.

use std::time::Duration;

/// Runtime configuration for the service.
#[derive(Debug, Clone)]
pub struct Config {
    /// Port the HTTP API listens on.
    pub port: u16,

    /// Path to the sqlite database file.
    pub db_path: String,

    /// Full URL of the Ollama generate endpoint
    /// (e.g. `http://localhost:11434/api/generate`). `None` disables the
    /// model path entirely; the deterministic builder is used instead.
    pub ollama_url: Option<String>,

    /// Model name passed to the endpoint.
    pub ollama_model: String,

    /// Skip the model call even when an endpoint is configured.
    pub mock_budget: bool,

    /// Upper bound on a single model call. A timeout fails over to the
    /// deterministic builder, it is never surfaced to the caller.
    pub model_timeout: Duration,
}

impl Config {
    /// Build the configuration from the process environment.
    pub fn from_env() -> Self {
        let port = std::env::var("PORT")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(3000);

        let db_path =
            std::env::var("DB_PATH").unwrap_or_else(|_| "budgetpilot.db".to_string());

        let ollama_url = std::env::var("OLLAMA_URL").ok().filter(|v| !v.is_empty());

        let ollama_model =
            std::env::var("OLLAMA_MODEL").unwrap_or_else(|_| "mistral".to_string());

        let mock_budget = std::env::var("MOCK_BUDGET")
            .map(|v| v == "true" || v == "1")
            .unwrap_or(false);

        let model_timeout = std::env::var("MODEL_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .map(Duration::from_secs)
            .unwrap_or(Duration::from_secs(60));

        Self {
            port,
            db_path,
            ollama_url,
            ollama_model,
            mock_budget,
            model_timeout,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 3000,
            db_path: "budgetpilot.db".to_string(),
            ollama_url: None,
            ollama_model: "mistral".to_string(),
            mock_budget: false,
            model_timeout: Duration::from_secs(60),
        }
    }
}
