//! Budget generation orchestrator.
//!
//! One linear decision sequence per invocation: load facts, pick the model
//! path or the deterministic builder, normalize and validate whatever the
//! model said, persist, return. Model-path failures of any kind fail over to
//! the deterministic builder; only storage failures reach the caller.

use std::sync::Arc;

use tracing::{info, warn};

use crate::llm::{LlmError, ModelClient};
use crate::store::{Store, StoreError};

use super::validate::EmptyResultError;
use super::{build_mock, normalize, validate, BudgetProposal, FinancialFacts};

/// Why the model path was abandoned. Internal to the orchestrator: every
/// variant is handled by failing over, and none is ever conflated with a
/// [`StoreError`].
#[derive(Debug, thiserror::Error)]
pub enum ModelPathError {
    #[error("model call failed: {0}")]
    Model(#[from] LlmError),

    #[error("model output had no recognizable budget shape")]
    Unparseable,

    #[error(transparent)]
    Empty(#[from] EmptyResultError),
}

/// Knobs the orchestrator needs beyond its collaborators.
#[derive(Debug, Clone)]
pub struct GeneratorSettings {
    /// Model name passed through to the client.
    pub model: String,
    /// Skip the model call even when a client is configured.
    pub mock: bool,
}

/// Composes aggregation, the optional model call, normalization, validation,
/// and persistence into one `generate()` entry point.
pub struct BudgetGenerator {
    store: Arc<Store>,
    model: Option<Arc<dyn ModelClient>>,
    settings: GeneratorSettings,
}

impl BudgetGenerator {
    pub fn new(
        store: Arc<Store>,
        model: Option<Arc<dyn ModelClient>>,
        settings: GeneratorSettings,
    ) -> Self {
        Self {
            store,
            model,
            settings,
        }
    }

    /// Produce and persist a budget proposal.
    ///
    /// Fails only on storage errors. The proposal is appended to the budget
    /// table entry by entry before being returned; persistence is not
    /// transactional (budget rows are append-only history).
    pub async fn generate(&self) -> Result<BudgetProposal, StoreError> {
        let facts = FinancialFacts::load(&self.store).await?;

        let proposal = match &self.model {
            Some(client) if !self.settings.mock => {
                match self.model_path(client.as_ref(), &facts).await {
                    Ok(proposal) => proposal,
                    Err(err) => {
                        warn!(error = %err, "model path failed, using deterministic budget");
                        build_mock(facts.total_savings, &facts.expenses_by_category)
                    }
                }
            }
            _ => {
                info!("model disabled, using deterministic budget");
                build_mock(facts.total_savings, &facts.expenses_by_category)
            }
        };

        self.store.insert_budget_entries(&proposal.budget).await?;
        Ok(proposal)
    }

    /// The generative path: one bounded model call, then reshape and clamp.
    async fn model_path(
        &self,
        client: &dyn ModelClient,
        facts: &FinancialFacts,
    ) -> Result<BudgetProposal, ModelPathError> {
        let prompt = build_prompt(facts);
        let raw = client.generate(&self.settings.model, &prompt).await?;

        let entries = normalize(&raw).ok_or(ModelPathError::Unparseable)?;
        let budget = validate(&entries)?;
        Ok(BudgetProposal { budget })
    }
}

/// Strict instruction prompt embedding the facts and the numeric policy.
/// Stating the rules up front makes compliant output more likely; the
/// validator still enforces every one of them afterwards.
fn build_prompt(facts: &FinancialFacts) -> String {
    let expenses = facts
        .expenses_by_category
        .iter()
        .map(|(category, amount)| format!("{}: {}", category, amount))
        .collect::<Vec<_>>()
        .join(", ");

    format!(
        r#"You must return exactly one JSON object and nothing else. Schema:
{{
  "budget": [
    {{
      "category": "Rent|Electricity|Gas|Water|Groceries|Entertainment|Phone Recharge|Other|Savings|Investments",
      "current_amount": 0.0,
      "recommended_amount": 0.0,
      "notes": "one concise tip (max 20 words)"
    }}
  ]
}}

Rules:
1) Do NOT change the current_amount values provided (they are authoritative).
2) If current_amount is 0, recommended_amount MUST be 0 and notes must indicate "No current spending recorded; no recommendation."
3) For every category except Rent, recommended_amount MUST be between 75% and 85% of current_amount. Round to two decimals.
4) For Rent, do NOT exceed current_amount; reductions must be conservative (max 10%).
5) Investments recommended_amount should be 20-25% of the total savings provided.
6) Use numeric values (no currency symbols or commas).
7) notes must be one concise tip (max 20 words).
8) Output only the JSON, nothing else.

Context:
Total income: {income}
Total savings: {savings}
Current expenses: {expenses}

Return the JSON now."#,
        income = facts.total_income,
        savings = facts.total_savings,
        expenses = expenses,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Stub model returning a canned result (or error) and counting calls.
    struct StubModel {
        reply: Result<String, fn() -> LlmError>,
        calls: AtomicUsize,
    }

    impl StubModel {
        fn ok(reply: &str) -> Self {
            Self {
                reply: Ok(reply.to_string()),
                calls: AtomicUsize::new(0),
            }
        }

        fn failing(err: fn() -> LlmError) -> Self {
            Self {
                reply: Err(err),
                calls: AtomicUsize::new(0),
            }
        }

        fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl ModelClient for StubModel {
        async fn generate(&self, _model: &str, _prompt: &str) -> Result<String, LlmError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match &self.reply {
                Ok(text) => Ok(text.clone()),
                Err(make) => Err(make()),
            }
        }
    }

    fn settings(mock: bool) -> GeneratorSettings {
        GeneratorSettings {
            model: "mistral".to_string(),
            mock,
        }
    }

    async fn seeded_store() -> Arc<Store> {
        let store = Arc::new(Store::open_in_memory().unwrap());
        store.add_income(3000.0, "Salary", None).await.unwrap();
        store.add_expense(1000.0, "Rent", None).await.unwrap();
        store.add_expense(200.0, "Groceries", None).await.unwrap();
        store
    }

    #[tokio::test]
    async fn no_model_configured_uses_deterministic_budget_and_persists() {
        let store = seeded_store().await;
        let generator = BudgetGenerator::new(store.clone(), None, settings(false));

        let proposal = generator.generate().await.unwrap();
        assert_eq!(proposal.budget.len(), 10);

        let persisted = store.list_budget().await.unwrap();
        assert_eq!(persisted, proposal.budget);
    }

    #[tokio::test]
    async fn mock_flag_skips_a_configured_model() {
        let store = seeded_store().await;
        let model = Arc::new(StubModel::ok("{}"));
        let generator =
            BudgetGenerator::new(store, Some(model.clone()), settings(true));

        let proposal = generator.generate().await.unwrap();
        assert_eq!(proposal.budget.len(), 10);
        assert_eq!(model.call_count(), 0);
    }

    #[tokio::test]
    async fn timeout_fails_over_to_deterministic_budget() {
        let store = seeded_store().await;
        let model = Arc::new(StubModel::failing(|| LlmError::Timeout));
        let generator =
            BudgetGenerator::new(store.clone(), Some(model.clone()), settings(false));

        let proposal = generator.generate().await.unwrap();
        assert_eq!(model.call_count(), 1);

        // Fallback output, not a partial model result: Rent kept, Groceries
        // at the 80% midpoint, and exactly the fallback rows persisted.
        let rent = proposal.budget.iter().find(|e| e.category == "Rent").unwrap();
        assert_eq!(rent.recommended_amount, 1000.0);
        let groceries = proposal
            .budget
            .iter()
            .find(|e| e.category == "Groceries")
            .unwrap();
        assert_eq!(groceries.recommended_amount, 160.0);

        assert_eq!(store.list_budget().await.unwrap(), proposal.budget);
    }

    #[tokio::test]
    async fn unusable_model_output_fails_over() {
        let store = seeded_store().await;
        let model = Arc::new(StubModel::ok("I'd be happy to help, but cannot."));
        let generator =
            BudgetGenerator::new(store, Some(model), settings(false));

        let proposal = generator.generate().await.unwrap();
        assert_eq!(proposal.budget.len(), 10);
    }

    #[tokio::test]
    async fn entries_surviving_nothing_fails_over() {
        // Parses and reshapes fine, but every entry lacks a category.
        let store = seeded_store().await;
        let model = Arc::new(StubModel::ok(
            r#"{"budget":[{"current_amount": 10, "recommended_amount": 8}]}"#,
        ));
        let generator =
            BudgetGenerator::new(store, Some(model), settings(false));

        let proposal = generator.generate().await.unwrap();
        assert_eq!(proposal.budget.len(), 10);
    }

    #[tokio::test]
    async fn valid_model_output_is_clamped_and_persisted() {
        let store = seeded_store().await;
        let model = Arc::new(StubModel::ok(
            "```json\n{\"budget\":[{\"category\":\"Groceries\",\"current_amount\":200,\"recommended_amount\":500,\"notes\":\"x\"}]}\n```",
        ));
        let generator =
            BudgetGenerator::new(store.clone(), Some(model), settings(false));

        let proposal = generator.generate().await.unwrap();
        assert_eq!(proposal.budget.len(), 1);
        assert_eq!(proposal.budget[0].recommended_amount, 160.0);

        let persisted = store.list_budget().await.unwrap();
        assert_eq!(persisted.len(), 1);
        assert_eq!(persisted[0].recommended_amount, 160.0);
    }

    #[tokio::test]
    async fn generate_works_against_an_on_disk_store() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("budget.db");
        let store = Arc::new(Store::open(path.to_str().unwrap()).unwrap());
        store.add_income(500.0, "Salary", None).await.unwrap();

        let generator = BudgetGenerator::new(store.clone(), None, settings(false));
        let proposal = generator.generate().await.unwrap();

        let investments = proposal
            .budget
            .iter()
            .find(|e| e.category == "Investments")
            .unwrap();
        assert_eq!(investments.recommended_amount, 110.0);
        assert_eq!(store.list_budget().await.unwrap().len(), 10);
    }

    #[test]
    fn fallback_output_is_a_fixed_point_of_the_policy() {
        // No savings and no Savings expense row: every fallback entry
        // already satisfies the clamp, so normalize+validate change nothing.
        let facts_expenses = vec![
            ("Rent".to_string(), 1000.0),
            ("Groceries".to_string(), 200.0),
            ("Gas".to_string(), 45.5),
        ];
        let proposal = build_mock(0.0, &facts_expenses);

        let raw = serde_json::to_string(&proposal).unwrap();
        let entries = normalize(&raw).unwrap();
        let revalidated = validate(&entries).unwrap();
        assert_eq!(revalidated, proposal.budget);
    }

    #[test]
    fn prompt_embeds_facts_and_policy() {
        let facts = FinancialFacts {
            total_income: 3000.0,
            total_savings: 1800.0,
            expenses_by_category: vec![("Rent".to_string(), 1000.0)],
        };
        let prompt = build_prompt(&facts);
        assert!(prompt.contains("Total income: 3000"));
        assert!(prompt.contains("Total savings: 1800"));
        assert!(prompt.contains("Rent: 1000"));
        assert!(prompt.contains("between 75% and 85%"));
    }
}
