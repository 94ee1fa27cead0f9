//! Parsers for the JSON blobs carried by a statement document.

pub mod categories;
pub mod funders;

use std::borrow::Cow;

use serde_json::Value;
use tracing::debug;

pub use categories::build_category_tree;
pub use funders::parse_funder_records;

/// Webhooks sometimes deliver blobs as JSON-encoded strings; decode those.
///
/// A string that is not valid JSON decodes to `null`.
pub fn decode_blob(blob: &Value) -> Cow<'_, Value> {
    match blob {
        Value::String(raw) => match serde_json::from_str::<Value>(raw) {
            Ok(decoded) => Cow::Owned(decoded),
            Err(err) => {
                debug!(%err, "blob string is not JSON");
                Cow::Owned(Value::Null)
            }
        },
        other => Cow::Borrowed(other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_decode_blob() {
        assert_eq!(*decode_blob(&json!("[1, 2]")), json!([1, 2]));
        assert_eq!(*decode_blob(&json!({"a": []})), json!({"a": []}));
        assert_eq!(*decode_blob(&json!("not json")), Value::Null);
    }
}
