//! Flatten category payloads into uniform [`TransactionRow`] lists.
//!
//! Accepted shapes:
//! - `[record, ...]` (nested arrays are flattened one level)
//! - `{"any": [record, ...], ...}`
//! - `{"any": {"transactions": [record, ...]}, ...}`
//!
//! Everything else normalizes to an empty list.

use serde_json::{Map, Value};
use tracing::debug;

use crate::amount;
use crate::fields::{self, DATE_FIELDS, DESCRIPTION_FIELDS};
use crate::transaction::TransactionRow;

/// Normalize any transaction blob. Never panics, never mutates `blob`.
pub fn normalize(blob: &Value) -> Vec<TransactionRow> {
    match blob {
        Value::Array(items) => rows_from_array(items),
        Value::Object(map) => rows_from_object(map),
        other => {
            debug!(kind = fields::kind(other), "not a transaction container");
            Vec::new()
        }
    }
}

fn rows_from_array(items: &[Value]) -> Vec<TransactionRow> {
    let mut rows = Vec::with_capacity(items.len());
    for item in items.iter().filter(|v| fields::is_truthy(v)) {
        match item {
            Value::Array(inner) => rows.extend(
                inner
                    .iter()
                    .filter(|v| fields::is_truthy(v))
                    .filter_map(row_from_record),
            ),
            _ => rows.extend(row_from_record(item)),
        }
    }
    rows
}

fn rows_from_object(map: &Map<String, Value>) -> Vec<TransactionRow> {
    let mut rows = Vec::new();
    for (key, value) in map {
        match value {
            Value::Array(items) => rows.extend(rows_from_array(items)),
            Value::Object(inner) => match inner.get("transactions") {
                Some(Value::Array(items)) => rows.extend(rows_from_array(items)),
                _ => debug!(key = key.as_str(), "object entry without a transactions array"),
            },
            other => debug!(key = key.as_str(), kind = fields::kind(other), "skipping entry"),
        }
    }
    rows
}

/// Build one row from a record. Bare strings become description-only rows.
fn row_from_record(record: &Value) -> Option<TransactionRow> {
    match record {
        Value::Object(map) => {
            let description = fields::text_or_empty(map, DESCRIPTION_FIELDS);
            let amount = amount::resolve(record, &description);
            Some(TransactionRow {
                date: fields::text_or_empty(map, DATE_FIELDS),
                description,
                amount,
            })
        }
        Value::String(text) => Some(TransactionRow {
            date: String::new(),
            description: text.trim().to_string(),
            amount: amount::resolve(record, text),
        }),
        other => {
            debug!(kind = fields::kind(other), "dropping non-record entry");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_array_of_records() {
        let blob = json!([
            {"date": "2024-01-01", "description": "Rent pmt", "amount": -1500},
            null,
            {"Date": "2024-01-03", "memo": "Card sale", "Amount": "$210.00"}
        ]);
        let rows = normalize(&blob);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0], TransactionRow::new("2024-01-01", "Rent pmt", -1500.0));
        assert_eq!(rows[1].description, "Card sale");
        assert_eq!(rows[1].amount, 210.0);
    }

    #[test]
    fn test_nested_arrays_flatten_one_level() {
        let blob = json!([[{"amount": 1}, false, {"amount": 2}], {"amount": 3}, 0, ""]);
        let amounts: Vec<f64> = normalize(&blob).iter().map(|r| r.amount).collect();
        assert_eq!(amounts, vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_object_of_arrays_concatenates_in_order() {
        let blob = json!({
            "week1": [{"amount": 10}],
            "week2": [{"amount": 20}, {"amount": 30}]
        });
        let amounts: Vec<f64> = normalize(&blob).iter().map(|r| r.amount).collect();
        assert_eq!(amounts, vec![10.0, 20.0, 30.0]);
    }

    #[test]
    fn test_object_of_transaction_holders() {
        let blob = json!({
            "Funder A": {"transactions": [{"amount": "-500"}], "count": 1},
            "Funder B": {"transactions": [{"description": "ACH debit -250.00"}]},
            "Broken": {"transactions": "nope"}
        });
        let rows = normalize(&blob);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1].amount, -250.0);
    }

    #[test]
    fn test_bare_string_entries_use_text() {
        let rows = normalize(&json!(["Wire in 1,200.00"]));
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].amount, 1200.0);
    }

    #[test]
    fn test_malformed_blobs_are_empty() {
        assert!(normalize(&json!(null)).is_empty());
        assert!(normalize(&json!(42)).is_empty());
        assert!(normalize(&json!("text")).is_empty());
        assert!(normalize(&json!({"amount": 5})).is_empty());
    }

    #[test]
    fn test_input_is_untouched() {
        let blob = json!([{"amount": "$5"}]);
        let before = blob.clone();
        let _ = normalize(&blob);
        assert_eq!(blob, before);
    }
}
