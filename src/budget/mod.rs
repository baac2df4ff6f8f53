//! Budget generation pipeline.
//!
//! # Key Concepts
//! - Facts: aggregated income/savings/expense totals read from storage
//! - Fallback: deterministic budget built from the facts alone
//! - Normalize: reshaping loosely-structured model output into entry lists
//! - Validate: numeric policy clamp applied to every surviving entry
//! - Generator: orchestrates the model path with failover to the fallback

pub mod facts;
pub mod fallback;
pub mod generator;
pub mod normalize;
pub mod validate;

pub use facts::FinancialFacts;
pub use fallback::build_mock;
pub use generator::{BudgetGenerator, GeneratorSettings, ModelPathError};
pub use normalize::normalize;
pub use validate::{validate, EmptyResultError};

use serde::{Deserialize, Serialize};

/// The fixed category set. Policy rules key off these names; free-text
/// categories are tolerated in entries but get no special treatment beyond
/// the generic clamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Rent,
    Electricity,
    Gas,
    Water,
    Groceries,
    Entertainment,
    PhoneRecharge,
    Other,
    Savings,
    Investments,
}

impl Category {
    pub const ALL: [Category; 10] = [
        Category::Rent,
        Category::Electricity,
        Category::Gas,
        Category::Water,
        Category::Groceries,
        Category::Entertainment,
        Category::PhoneRecharge,
        Category::Other,
        Category::Savings,
        Category::Investments,
    ];

    /// Canonical display name, as stored and as expected from the model.
    pub fn name(&self) -> &'static str {
        match self {
            Category::Rent => "Rent",
            Category::Electricity => "Electricity",
            Category::Gas => "Gas",
            Category::Water => "Water",
            Category::Groceries => "Groceries",
            Category::Entertainment => "Entertainment",
            Category::PhoneRecharge => "Phone Recharge",
            Category::Other => "Other",
            Category::Savings => "Savings",
            Category::Investments => "Investments",
        }
    }

    /// Case-insensitive lookup of a known category.
    pub fn from_name(name: &str) -> Option<Category> {
        let trimmed = name.trim();
        Category::ALL
            .iter()
            .copied()
            .find(|c| c.name().eq_ignore_ascii_case(trimmed))
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// One category's current vs. recommended spending plus an advisory note.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BudgetEntry {
    pub category: String,
    pub current_amount: f64,
    pub recommended_amount: f64,
    pub notes: String,
}

/// A full budget proposal, one entry per category, in generation order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BudgetProposal {
    pub budget: Vec<BudgetEntry>,
}

/// Round a monetary value to two decimal places.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_lookup_is_case_insensitive() {
        assert_eq!(Category::from_name("rent"), Some(Category::Rent));
        assert_eq!(Category::from_name("  GROCERIES "), Some(Category::Groceries));
        assert_eq!(
            Category::from_name("phone recharge"),
            Some(Category::PhoneRecharge)
        );
        assert_eq!(Category::from_name("crypto"), None);
    }

    #[test]
    fn round2_matches_cent_arithmetic() {
        assert_eq!(round2(110.0000001), 110.0);
        assert_eq!(round2(123.456), 123.46);
        assert_eq!(round2(500.0 * 0.22), 110.0);
    }
}
