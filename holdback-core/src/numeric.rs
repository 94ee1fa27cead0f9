//! Best-effort numeric parsing and banker's rounding.

use serde_json::Value;

/// Remainders within this distance of `0.5` count as exact ties.
pub const TIE_TOLERANCE: f64 = 1e-10;

/// Parse a reported figure (`10000`, `"$10,000.00"`, `null`, ...) into a number.
///
/// Thousands separators and currency symbols are stripped; anything that still
/// fails to parse (or is not finite) becomes `0.0`.
pub fn parse_loose_number(value: &Value) -> f64 {
    match value {
        Value::Number(n) => n.as_f64().filter(|v| v.is_finite()).unwrap_or(0.0),
        Value::String(s) => parse_loose_str(s),
        _ => 0.0,
    }
}

/// String form of [`parse_loose_number`].
pub fn parse_loose_str(raw: &str) -> f64 {
    let cleaned: String = raw
        .chars()
        .filter(|c| c.is_ascii_digit() || matches!(c, '.' | '-'))
        .collect();
    cleaned
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .unwrap_or(0.0)
}

/// Parse an optional reported figure; absent or unparseable input is `None`.
pub fn parse_optional_number(value: Option<&Value>) -> Option<f64> {
    value.map(parse_loose_number).filter(|v| is_usable(*v))
}

/// Finite and non-zero: the bar a figure must clear to override another.
pub fn is_usable(value: f64) -> bool {
    value.is_finite() && value != 0.0
}

/// Round to `decimals` places, sending exact ties to the even neighbour.
///
/// `12.25 -> 12.2`, `12.35 -> 12.4`, `12.26 -> 12.3`. Non-finite input yields `0.0`.
pub fn round_half_even(value: f64, decimals: i32) -> f64 {
    if !value.is_finite() {
        return 0.0;
    }
    let factor = 10f64.powi(decimals);
    let scaled = value * factor;
    let floor = scaled.floor();
    let remainder = scaled - floor;

    let rounded = if (remainder - 0.5).abs() < TIE_TOLERANCE {
        if floor % 2.0 == 0.0 { floor } else { floor + 1.0 }
    } else {
        scaled.round()
    };
    rounded / factor
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_loose_number() {
        assert_eq!(parse_loose_number(&json!(10000)), 10000.0);
        assert_eq!(parse_loose_number(&json!("$10,000.50")), 10000.5);
        assert_eq!(parse_loose_number(&json!("-1,500")), -1500.0);
        assert_eq!(parse_loose_number(&json!("n/a")), 0.0);
        assert_eq!(parse_loose_number(&json!(null)), 0.0);
        assert_eq!(parse_loose_number(&json!({"x": 1})), 0.0);
    }

    #[test]
    fn test_parse_optional_number() {
        assert_eq!(parse_optional_number(None), None);
        assert_eq!(parse_optional_number(Some(&json!("0"))), None);
        assert_eq!(parse_optional_number(Some(&json!("8,250"))), Some(8250.0));
    }

    #[test]
    fn test_round_half_even_ties() {
        assert_eq!(round_half_even(12.25, 1), 12.2);
        assert_eq!(round_half_even(12.35, 1), 12.4);
        assert_eq!(round_half_even(0.5, 0), 0.0);
        assert_eq!(round_half_even(1.5, 0), 2.0);
        assert_eq!(round_half_even(2.5, 0), 2.0);
        assert_eq!(round_half_even(-12.25, 1), -12.2);
    }

    #[test]
    fn test_round_half_even_non_ties() {
        assert_eq!(round_half_even(12.26, 1), 12.3);
        assert_eq!(round_half_even(12.24, 1), 12.2);
        assert_eq!(round_half_even(12.5, 1), 12.5);
        assert_eq!(round_half_even(f64::NAN, 1), 0.0);
    }
}
