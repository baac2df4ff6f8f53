//! Numeric policy validation and clamping.
//!
//! The model is told the rules up front, but its output is never trusted:
//! every entry that comes out of normalization is coerced to numbers and
//! corrected in place wherever it breaks policy. Entries are fixed, not
//! rejected; only a missing category discards an entry.
//!
//! Policy per category (after coercion, `c` = current, `r` = recommended):
//! - `c <= 0`: `r` forced to 0.
//! - Rent: `r` may not exceed `c` and may cut at most 10%.
//! - everything else: `r` must land in `[0.75c, 0.85c]`; out-of-band values
//!   are overwritten with the band midpoint.

use serde_json::Value;
use tracing::warn;

use super::{round2, BudgetEntry};

/// Zero entries survived validation. Reached from the model path this
/// triggers failover; the deterministic builder can never produce it.
#[derive(Debug, thiserror::Error)]
#[error("no valid budget entries after normalization and validation")]
pub struct EmptyResultError;

/// Coerce and clamp a raw entry list into policy-conforming budget entries.
pub fn validate(raw: &[Value]) -> Result<Vec<BudgetEntry>, EmptyResultError> {
    let mut entries = Vec::with_capacity(raw.len());

    for item in raw {
        let category = match item.get("category").and_then(Value::as_str) {
            Some(name) if !name.trim().is_empty() => name.trim().to_string(),
            _ => {
                warn!(entry = %item, "skipping budget entry without a category");
                continue;
            }
        };

        let current = amount_of(item, &["current_amount", "current", "amount"]);
        let mut recommended = amount_of(item, &["recommended_amount", "recommended"]);
        let mut notes = note_of(item);

        if current <= 0.0 {
            recommended = 0.0;
            if notes.is_empty() {
                notes = "No current spending recorded; no recommendation.".to_string();
            }
        } else {
            if category.eq_ignore_ascii_case("rent") {
                if recommended > current || recommended <= 0.0 {
                    recommended = round2(current);
                } else {
                    let floor = round2(current * 0.90);
                    if recommended < floor {
                        recommended = floor;
                    }
                }
            } else {
                let min_rec = round2(current * 0.75);
                let max_rec = round2(current * 0.85);
                if recommended > current || recommended < min_rec || recommended > max_rec {
                    recommended = round2((min_rec + max_rec) / 2.0);
                }
            }
            if notes.is_empty() {
                notes = "Review and reduce where possible.".to_string();
            }
        }

        entries.push(BudgetEntry {
            category,
            current_amount: round2(current),
            recommended_amount: round2(recommended),
            notes,
        });
    }

    if entries.is_empty() {
        return Err(EmptyResultError);
    }
    Ok(entries)
}

/// First present alias wins; its value is coerced to a number, with numeric
/// strings accepted and anything else reading as 0.
fn amount_of(entry: &Value, aliases: &[&str]) -> f64 {
    for key in aliases {
        if let Some(value) = entry.get(*key) {
            if let Some(n) = value.as_f64() {
                return n;
            }
            if let Some(s) = value.as_str() {
                return s.trim().parse().unwrap_or(0.0);
            }
            return 0.0;
        }
    }
    0.0
}

fn note_of(entry: &Value) -> String {
    for key in ["notes", "note"] {
        if let Some(value) = entry.get(key) {
            if let Some(s) = value.as_str() {
                return s.trim().to_string();
            }
            if !value.is_null() {
                return value.to_string();
            }
        }
    }
    String::new()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn out_of_band_recommendation_is_clamped_to_midpoint() {
        // current 200 -> band [150, 170], midpoint 160.
        let raw = vec![json!({
            "category": "Groceries",
            "current_amount": 200,
            "recommended_amount": 500,
            "notes": "x"
        })];
        let entries = validate(&raw).unwrap();
        assert_eq!(entries[0].recommended_amount, 160.0);
        assert_eq!(entries[0].current_amount, 200.0);
        assert_eq!(entries[0].notes, "x");
    }

    #[test]
    fn in_band_recommendation_is_kept() {
        let raw = vec![json!({
            "category": "Entertainment",
            "current_amount": 100,
            "recommended_amount": 78.5,
            "notes": ""
        })];
        let entries = validate(&raw).unwrap();
        assert_eq!(entries[0].recommended_amount, 78.5);
        assert_eq!(entries[0].notes, "Review and reduce where possible.");
    }

    #[test]
    fn rent_cuts_are_capped_at_ten_percent() {
        let raw = vec![
            json!({"category": "Rent", "current_amount": 1000, "recommended_amount": 500}),
            json!({"category": "rent", "current_amount": 1000, "recommended_amount": 950}),
            json!({"category": "Rent", "current_amount": 1000, "recommended_amount": 1200}),
        ];
        let entries = validate(&raw).unwrap();
        assert_eq!(entries[0].recommended_amount, 900.0); // raised to the floor
        assert_eq!(entries[1].recommended_amount, 950.0); // within 10%, kept
        assert_eq!(entries[2].recommended_amount, 1000.0); // above current, reset
    }

    #[test]
    fn zero_current_forces_zero_recommendation() {
        let raw = vec![json!({
            "category": "Water",
            "current_amount": 0,
            "recommended_amount": 25
        })];
        let entries = validate(&raw).unwrap();
        assert_eq!(entries[0].recommended_amount, 0.0);
        assert_eq!(
            entries[0].notes,
            "No current spending recorded; no recommendation."
        );
    }

    #[test]
    fn aliases_and_numeric_strings_are_coerced() {
        let raw = vec![json!({
            "category": "Gas",
            "current": "40",
            "recommended": "34",
            "note": "switch plan"
        })];
        let entries = validate(&raw).unwrap();
        assert_eq!(entries[0].current_amount, 40.0);
        assert_eq!(entries[0].recommended_amount, 34.0);
        assert_eq!(entries[0].notes, "switch plan");
    }

    #[test]
    fn non_numeric_amounts_read_as_zero() {
        let raw = vec![json!({
            "category": "Other",
            "current_amount": "lots",
            "recommended_amount": null
        })];
        let entries = validate(&raw).unwrap();
        assert_eq!(entries[0].current_amount, 0.0);
        assert_eq!(entries[0].recommended_amount, 0.0);
    }

    #[test]
    fn entries_without_category_are_discarded() {
        let raw = vec![
            json!({"current_amount": 50, "recommended_amount": 40}),
            json!({"category": "  ", "current_amount": 50}),
            json!({"category": "Groceries", "current_amount": 50, "recommended_amount": 40}),
        ];
        let entries = validate(&raw).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].category, "Groceries");
    }

    #[test]
    fn all_entries_invalid_is_an_error() {
        let raw = vec![json!({"current_amount": 50})];
        assert!(validate(&raw).is_err());
        assert!(validate(&[]).is_err());
    }

    #[test]
    fn unknown_free_text_categories_still_get_the_generic_band() {
        let raw = vec![json!({
            "category": "Pet Supplies",
            "current_amount": 100,
            "recommended_amount": 10
        })];
        let entries = validate(&raw).unwrap();
        // band [75, 85], midpoint 80
        assert_eq!(entries[0].recommended_amount, 80.0);
    }
}
