//! Model response normalization.
//!
//! The model is asked for one strict JSON object, but what actually comes
//! back varies: the canonical object, a bare array, a single entry, a map
//! keyed by category name, any of those inside markdown fences or prose, or
//! nested under a wrapper field like `response`. This stage reshapes all of
//! those into one raw entry list and nothing more; type coercion and policy
//! live in the validator.

use serde_json::{json, Map, Value};

use super::Category;

/// Wrapper fields some providers nest their payload under.
const WRAPPER_FIELDS: &[&str] = &["response", "result", "output", "content", "text"];

/// Bound on wrapper-field recursion. Real responses nest at most once or
/// twice; anything deeper is garbage.
const MAX_UNWRAP_DEPTH: usize = 3;

/// Reshape raw model output into a budget entry list. Returns `None` when no
/// recognizable shape is found; that is an expected outcome and the caller's
/// signal to fail over. Never panics.
pub fn normalize(raw: &str) -> Option<Vec<Value>> {
    let value = parse_candidate(raw)?;
    reshape(&value).or_else(|| unwrap_nested(&value, MAX_UNWRAP_DEPTH))
}

/// Parse `text` as JSON, tolerating fence markers and surrounding prose.
/// First tries the cleaned text whole, then the substring between the first
/// `{` and the last `}`.
fn parse_candidate(text: &str) -> Option<Value> {
    let cleaned = text.replace("```json", "").replace("```", "");
    let cleaned = cleaned.trim();
    if cleaned.is_empty() {
        return None;
    }

    if let Ok(value) = serde_json::from_str::<Value>(cleaned) {
        return Some(value);
    }

    let start = cleaned.find('{')?;
    let end = cleaned.rfind('}')?;
    if end < start {
        return None;
    }
    serde_json::from_str(&cleaned[start..=end]).ok()
}

/// Look for the payload under known wrapper fields, recursing through
/// string-valued wrappers (which get the full extraction treatment again)
/// and object-valued ones.
fn unwrap_nested(value: &Value, depth: usize) -> Option<Vec<Value>> {
    if depth == 0 {
        return None;
    }
    let obj = value.as_object()?;

    for field in WRAPPER_FIELDS {
        match obj.get(*field) {
            Some(Value::String(inner)) => {
                if let Some(parsed) = parse_candidate(inner) {
                    if let Some(list) =
                        reshape(&parsed).or_else(|| unwrap_nested(&parsed, depth - 1))
                    {
                        return Some(list);
                    }
                }
            }
            Some(inner @ Value::Object(_)) | Some(inner @ Value::Array(_)) => {
                if let Some(list) =
                    reshape(inner).or_else(|| unwrap_nested(inner, depth - 1))
                {
                    return Some(list);
                }
            }
            _ => {}
        }
    }
    None
}

/// The shapes a parsed payload is allowed to take.
enum Shape<'a> {
    /// `{"budget": [...]}` — the canonical form.
    BudgetList(&'a Vec<Value>),
    /// `{"budget": {...}}` — a single entry under the budget key.
    BudgetSingle(&'a Value),
    /// A bare array of entries.
    BareList(&'a Vec<Value>),
    /// A single entry-like object.
    SingleEntry(&'a Value),
    /// `{"Rent": {...}, "Gas": {...}}` — category name to entry fields.
    CategoryMap(&'a Map<String, Value>),
}

fn classify(value: &Value) -> Option<Shape<'_>> {
    if let Some(budget) = value.get("budget") {
        match budget {
            Value::Array(list) => return Some(Shape::BudgetList(list)),
            Value::Object(_) => return Some(Shape::BudgetSingle(budget)),
            _ => return None,
        }
    }
    if let Value::Array(list) = value {
        return Some(Shape::BareList(list));
    }
    if let Value::Object(map) = value {
        if looks_like_category_map(map) {
            return Some(Shape::CategoryMap(map));
        }
        if looks_like_entry(value) {
            return Some(Shape::SingleEntry(value));
        }
    }
    None
}

fn reshape(value: &Value) -> Option<Vec<Value>> {
    match classify(value)? {
        Shape::BudgetList(list) => Some(list.clone()),
        Shape::BudgetSingle(entry) => Some(vec![entry.clone()]),
        Shape::BareList(list) => Some(list.clone()),
        Shape::SingleEntry(entry) => Some(vec![entry.clone()]),
        Shape::CategoryMap(map) => Some(
            map.iter()
                .map(|(category, fields)| {
                    json!({
                        "category": category,
                        "current_amount": first_of(fields, &["current_amount", "current", "amount"]),
                        "recommended_amount": first_of(fields, &["recommended_amount", "recommended"]),
                        "notes": first_of(fields, &["notes", "note"]),
                    })
                })
                .collect(),
        ),
    }
}

fn looks_like_entry(value: &Value) -> bool {
    ["category", "current_amount", "recommended_amount", "current", "amount"]
        .iter()
        .any(|key| value.get(key).is_some())
}

/// Every key must map to an object that either carries recognizable amount
/// or note fields, or is itself named after a known category.
fn looks_like_category_map(map: &Map<String, Value>) -> bool {
    !map.is_empty()
        && map.iter().all(|(key, value)| {
            value.is_object()
                && (value.get("current_amount").is_some()
                    || value.get("recommended_amount").is_some()
                    || value.get("amount").is_some()
                    || Category::from_name(key).is_some())
        })
}

fn first_of(fields: &Value, aliases: &[&str]) -> Value {
    aliases
        .iter()
        .find_map(|key| fields.get(*key).cloned())
        .unwrap_or(Value::Null)
}
