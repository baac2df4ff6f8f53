//! budgetpilot - personal budgeting service.
//!
//! Records income, expenses, and savings in sqlite and produces recommended
//! budgets, either deterministically or via a local Ollama model whose
//! output is normalized and clamped against numeric policy rules.

mod api;
mod budget;
mod config;
mod llm;
mod store;

use std::sync::Arc;

use tracing::info;
use tracing_subscriber::EnvFilter;

use api::AppState;
use budget::{BudgetGenerator, GeneratorSettings};
use config::Config;
use llm::{ModelClient, OllamaClient};
use store::Store;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::from_env();
    info!(db = %config.db_path, port = config.port, "starting budgetpilot");

    let store = Arc::new(Store::open(&config.db_path)?);

    let model: Option<Arc<dyn ModelClient>> = config.ollama_url.as_ref().map(|url| {
        Arc::new(OllamaClient::new(url.clone(), config.model_timeout)) as Arc<dyn ModelClient>
    });
    if model.is_none() {
        info!("no model endpoint configured, deterministic budgets only");
    }

    let generator = BudgetGenerator::new(
        store.clone(),
        model,
        GeneratorSettings {
            model: config.ollama_model.clone(),
            mock: config.mock_budget,
        },
    );

    let state = Arc::new(AppState {
        config,
        store,
        generator,
    });

    api::serve(state).await
}
