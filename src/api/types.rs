//! Request/response DTOs for the HTTP API.

use serde::{Deserialize, Serialize};

use crate::store::{DailyTotal, ExpenseRow};

#[derive(Debug, Deserialize)]
pub struct NewIncomeRequest {
    pub amount: f64,
    pub category: String,
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct NewExpenseRequest {
    pub amount: f64,
    pub category: String,
    pub notes: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CategoryTotal {
    pub category: String,
    pub amount: f64,
}

/// The dashboard aggregate view.
#[derive(Debug, Serialize)]
pub struct SummaryResponse {
    pub total_income: f64,
    pub total_savings: f64,
    pub expenses_by_category: Vec<CategoryTotal>,
    pub daily_expenses: Vec<DailyTotal>,
}

#[derive(Debug, Serialize)]
pub struct ExpenseListResponse {
    pub transactions: Vec<ExpenseRow>,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}
