//! Amount resolution for loosely-structured transaction records.
//!
//! Extracted statements spell the amount field many different ways, encode it
//! as a number or as formatted text (`"$1,234.56"`), and sometimes only carry
//! it inside the description. Resolution order:
//!
//! 1. candidate fields in [`AMOUNT_FIELDS`] order; first finite non-zero wins
//! 2. the LAST currency-like token in the fallback text
//! 3. `0.0`
//!
//! Step 2 takes the last token because statement lines tend to print running
//! balances before the transaction amount.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;
use tracing::debug;

/// Candidate amount fields, highest priority first.
pub const AMOUNT_FIELDS: &[&str] = &[
    "amount",
    "Amount",
    "value",
    "amt",
    "debit_amount",
    "debitAmount",
    "daily_amount",
    "Daily Amount",
    "Daily amount",
    "daily amount",
    "dailyAmount",
    "original_amount",
    "OriginalAmount",
];

// -$1,234.56 | $45.67 | 123 | 1,000
static CURRENCY_TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"-?\$?\d[\d,]*(?:\.\d+)?").expect("currency token pattern"));

/// Resolve a signed amount from `record`, falling back to `fallback_text`.
///
/// Never fails: unresolvable input yields `0.0`.
pub fn resolve(record: &Value, fallback_text: &str) -> f64 {
    if let Some(amount) = resolve_fields(record) {
        return amount;
    }
    match amount_from_text(fallback_text) {
        Some(amount) => amount,
        None => {
            debug!(text = fallback_text, "amount unresolved; using 0");
            0.0
        }
    }
}

/// Probe [`AMOUNT_FIELDS`] on an object record.
pub fn resolve_fields(record: &Value) -> Option<f64> {
    let map = record.as_object()?;
    AMOUNT_FIELDS
        .iter()
        .filter_map(|name| map.get(*name))
        .filter_map(parse_amount_value)
        .find(|amount| *amount != 0.0)
}

/// Parse a JSON number or formatted string into a finite amount.
pub fn parse_amount_value(value: &Value) -> Option<f64> {
    let amount = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => parse_amount_str(s)?,
        _ => return None,
    };
    amount.is_finite().then_some(amount)
}

/// Strip everything but digits, `.`, `-`, `+` and parse.
pub fn parse_amount_str(raw: &str) -> Option<f64> {
    let cleaned: String = raw
        .chars()
        .filter(|c| c.is_ascii_digit() || matches!(c, '.' | '-' | '+'))
        .collect();
    if cleaned.is_empty() {
        return None;
    }
    cleaned.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Last currency-like token in free text.
pub fn amount_from_text(text: &str) -> Option<f64> {
    let token = CURRENCY_TOKEN.find_iter(text).last()?;
    parse_amount_str(token.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_formatted_string_amount() {
        assert_eq!(resolve(&json!({"Amount": "$1,234.56"}), ""), 1234.56);
    }

    #[test]
    fn test_description_fallback_takes_last_match() {
        let amount = resolve(&json!({}), "Payment of -$45.00 received");
        assert_eq!(amount, -45.00);

        let amount = resolve(&json!({}), "Balance 12,000.00 deposit 350.25");
        assert_eq!(amount, 350.25);
    }

    #[test]
    fn test_field_priority_order() {
        let record = json!({"amt": 7, "value": "9.50", "OriginalAmount": 100});
        assert_eq!(resolve(&record, ""), 9.50);
    }

    #[test]
    fn test_zero_field_falls_through_to_next_candidate() {
        let record = json!({"amount": "0.00", "Daily Amount": "$250"});
        assert_eq!(resolve(&record, ""), 250.0);
    }

    #[test]
    fn test_unparseable_field_falls_back_to_text() {
        let record = json!({"amount": "n/a", "debitAmount": true});
        assert_eq!(resolve(&record, "ACH debit 89.99"), 89.99);
    }

    #[test]
    fn test_unresolved_is_zero() {
        assert_eq!(resolve(&json!({"amount": "pending"}), "no digits here"), 0.0);
        assert_eq!(resolve(&json!(null), ""), 0.0);
    }

    #[test]
    fn test_malformed_numeric_text_rejected() {
        assert_eq!(parse_amount_str("1.2.3"), None);
        assert_eq!(parse_amount_str("--5"), None);
        assert_eq!(parse_amount_str("+$12"), Some(12.0));
        assert_eq!(parse_amount_str("USD"), None);
    }

    #[test]
    fn test_non_object_record_uses_text() {
        assert_eq!(resolve(&json!("ignored"), "Fee $3"), 3.0);
    }
}
