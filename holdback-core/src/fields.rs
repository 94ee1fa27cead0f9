//! Ordered field probing over loosely-typed JSON records.
//!
//! Extraction output drifts between `date`/`Date`/`transaction_date` and so on,
//! so every lookup takes a priority-ordered list of candidate names.

use serde_json::{Map, Value};

pub const DATE_FIELDS: &[&str] = &[
    "date",
    "Date",
    "transaction_date",
    "transactionDate",
    "posted_date",
    "post_date",
];

pub const DESCRIPTION_FIELDS: &[&str] = &[
    "description",
    "Description",
    "desc",
    "memo",
    "details",
    "name",
    "payee",
];

/// First candidate field holding a non-empty string or a number, as text.
pub fn first_text(record: &Map<String, Value>, candidates: &[&str]) -> Option<String> {
    candidates
        .iter()
        .filter_map(|name| record.get(*name))
        .find_map(value_text)
}

/// Same as [`first_text`], but yields an empty string when nothing matches.
pub fn text_or_empty(record: &Map<String, Value>, candidates: &[&str]) -> String {
    first_text(record, candidates).unwrap_or_default()
}

fn value_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => {
            let s = s.trim();
            if s.is_empty() { None } else { Some(s.to_string()) }
        }
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// JavaScript-style truthiness, used to drop placeholder entries.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Short name of a JSON value's kind, for log fields.
pub fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
