//! HTTP API for the budgeting service.
//!
//! ## Endpoints
//!
//! - `GET /api/health` - Health check
//! - `GET /api/summary` - Income, grouped expenses, savings, daily totals
//! - `POST /api/income` - Record an income entry
//! - `POST /api/expense` - Record an expense transaction
//! - `GET /api/expenses` - List all expense transactions
//! - `DELETE /api/expense/{id}` - Remove one expense transaction
//! - `POST /api/budget/generate` - Run the budget generation pipeline
//! - `GET /api/budget` - Stored budget history

mod routes;
pub mod types;

pub use routes::{serve, AppState};
