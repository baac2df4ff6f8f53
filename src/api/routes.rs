//! Route table and handlers.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get, post},
    Json, Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;

use crate::budget::{BudgetGenerator, BudgetProposal};
use crate::config::Config;
use crate::store::{Store, StoreError};

use super::types::{
    CategoryTotal, ExpenseListResponse, HealthResponse, NewExpenseRequest,
    NewIncomeRequest, SummaryResponse,
};

/// Shared application state behind every handler.
pub struct AppState {
    pub config: Config,
    pub store: Arc<Store>,
    pub generator: BudgetGenerator,
}

fn internal(err: StoreError) -> (StatusCode, String) {
    (StatusCode::INTERNAL_SERVER_ERROR, err.to_string())
}

fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/health", get(health))
        .route("/api/summary", get(summary))
        .route("/api/income", post(add_income))
        .route("/api/expense", post(add_expense))
        .route("/api/expenses", get(list_expenses))
        .route("/api/expense/:id", delete(delete_expense))
        .route("/api/budget/generate", post(generate_budget))
        .route("/api/budget", get(budget_history))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Bind and serve the API until the process exits.
pub async fn serve(state: Arc<AppState>) -> anyhow::Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], state.config.port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("listening on {}", addr);
    axum::serve(listener, router(state)).await?;
    Ok(())
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}

async fn summary(
    State(state): State<Arc<AppState>>,
) -> Result<Json<SummaryResponse>, (StatusCode, String)> {
    let total_income = state.store.total_income().await.map_err(internal)?;
    let total_savings = state.store.total_savings().await.map_err(internal)?;
    let expenses_by_category = state
        .store
        .expenses_by_category()
        .await
        .map_err(internal)?
        .into_iter()
        .map(|(category, amount)| CategoryTotal { category, amount })
        .collect();
    let daily_expenses = state.store.daily_expense_totals().await.map_err(internal)?;

    Ok(Json(SummaryResponse {
        total_income,
        total_savings,
        expenses_by_category,
        daily_expenses,
    }))
}

async fn add_income(
    State(state): State<Arc<AppState>>,
    Json(req): Json<NewIncomeRequest>,
) -> Result<StatusCode, (StatusCode, String)> {
    if !req.amount.is_finite() || req.amount < 0.0 {
        return Err((StatusCode::BAD_REQUEST, "amount must be non-negative".into()));
    }
    state
        .store
        .add_income(req.amount, &req.category, req.notes.as_deref())
        .await
        .map_err(internal)?;
    Ok(StatusCode::CREATED)
}

async fn add_expense(
    State(state): State<Arc<AppState>>,
    Json(req): Json<NewExpenseRequest>,
) -> Result<StatusCode, (StatusCode, String)> {
    if !req.amount.is_finite() || req.amount < 0.0 {
        return Err((StatusCode::BAD_REQUEST, "amount must be non-negative".into()));
    }
    state
        .store
        .add_expense(req.amount, &req.category, req.notes.as_deref())
        .await
        .map_err(internal)?;
    Ok(StatusCode::CREATED)
}

async fn list_expenses(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ExpenseListResponse>, (StatusCode, String)> {
    let transactions = state.store.list_expenses().await.map_err(internal)?;
    Ok(Json(ExpenseListResponse { transactions }))
}

async fn delete_expense(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<StatusCode, (StatusCode, String)> {
    state.store.delete_expense(id).await.map_err(internal)?;
    Ok(StatusCode::NO_CONTENT)
}

/// Run the pipeline. Model trouble is absorbed inside the generator; the
/// only failure a caller can see here is the store being unavailable.
async fn generate_budget(
    State(state): State<Arc<AppState>>,
) -> Result<Json<BudgetProposal>, (StatusCode, String)> {
    let proposal = state.generator.generate().await.map_err(internal)?;
    Ok(Json(proposal))
}

async fn budget_history(
    State(state): State<Arc<AppState>>,
) -> Result<Json<BudgetProposal>, (StatusCode, String)> {
    let budget = state.store.list_budget().await.map_err(internal)?;
    Ok(Json(BudgetProposal { budget }))
}
