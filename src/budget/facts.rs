//! Aggregation of financial facts from storage.

use crate::store::{Store, StoreError};

/// The numeric facts one budget generation works from. Transient;
/// recomputed from storage on every invocation and never persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct FinancialFacts {
    pub total_income: f64,
    pub total_savings: f64,
    /// Per-category expense sums, largest first.
    pub expenses_by_category: Vec<(String, f64)>,
}

impl FinancialFacts {
    /// Read the three aggregates. Pure reads, no side effects; the reads are
    /// independent of each other so ordering between them does not matter.
    pub async fn load(store: &Store) -> Result<Self, StoreError> {
        let total_income = store.total_income().await?;
        let total_savings = store.total_savings().await?;
        let expenses_by_category = store.expenses_by_category().await?;
        Ok(Self {
            total_income,
            total_savings,
            expenses_by_category,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn load_reflects_recorded_facts() {
        let store = Store::open_in_memory().unwrap();
        store.add_income(2500.0, "Salary", None).await.unwrap();
        store.add_expense(800.0, "Rent", None).await.unwrap();
        store.add_expense(150.0, "Groceries", None).await.unwrap();

        let facts = FinancialFacts::load(&store).await.unwrap();
        assert_eq!(facts.total_income, 2500.0);
        assert_eq!(facts.total_savings, 1550.0);
        assert_eq!(facts.expenses_by_category.len(), 2);
        assert_eq!(facts.expenses_by_category[0].0, "Rent");
    }

    #[tokio::test]
    async fn load_on_empty_store_is_all_zero() {
        let store = Store::open_in_memory().unwrap();
        let facts = FinancialFacts::load(&store).await.unwrap();
        assert_eq!(facts.total_income, 0.0);
        assert_eq!(facts.total_savings, 0.0);
        assert!(facts.expenses_by_category.is_empty());
    }
}
