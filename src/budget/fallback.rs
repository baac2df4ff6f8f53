//! Deterministic budget builder.
//!
//! The canonical fallback: a complete proposal computed from stored numbers
//! alone, used when the model path is disabled, unreachable, or produced
//! output that could not be salvaged. Total and pure, it never fails and
//! always emits all ten fixed categories.

use std::collections::HashMap;

use super::{round2, BudgetEntry, BudgetProposal, Category};

/// Build a proposal from the current savings value and per-category expense
/// sums. Categories with no recorded spending get `current_amount = 0`.
pub fn build_mock(total_savings: f64, expenses: &[(String, f64)]) -> BudgetProposal {
    let by_category: HashMap<&str, f64> = expenses
        .iter()
        .map(|(category, amount)| (category.as_str(), *amount))
        .collect();

    let mut budget = Vec::with_capacity(Category::ALL.len());
    for category in Category::ALL {
        let current = round2(by_category.get(category.name()).copied().unwrap_or(0.0));

        let (recommended, notes) = match category {
            Category::Investments => {
                // 20-25% of savings; midpoint-ish 22%.
                let recommended = round2(total_savings * 0.22);
                let notes = if recommended > 0.0 {
                    "Allocate part of savings to long-term investments."
                } else {
                    "No savings available to invest."
                };
                (recommended, notes)
            }
            Category::Savings => {
                let notes = if current > 0.0 {
                    "Keep building emergency savings."
                } else {
                    "No savings recorded yet."
                };
                (current, notes)
            }
            _ if current <= 0.0 => {
                (0.0, "No current spending recorded; no recommendation.")
            }
            Category::Rent => (
                current,
                "Rent typically fixed; renegotiate lease if possible.",
            ),
            _ => (
                // 75-85% band, midpoint 80%.
                round2(current * 0.80),
                "Trim 15%-25% where possible (plan/coupon/bulk buy).",
            ),
        };

        budget.push(BudgetEntry {
            category: category.name().to_string(),
            current_amount: current,
            recommended_amount: recommended,
            notes: notes.to_string(),
        });
    }

    BudgetProposal { budget }
}
