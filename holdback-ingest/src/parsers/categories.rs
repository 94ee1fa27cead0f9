//! Category tree assembly.
//!
//! The extracted categories object is merged with two optional sibling blobs
//! (business owner records, funder list records). Those land under fixed
//! synthetic names so the aggregator's pseudo-category rules keep them out of
//! revenue.

use serde_json::{Map, Value};
use tracing::debug;

use holdback_core::categories::{CategoryTree, BUSINESS_OWNER_CATEGORY, FUNDER_LIST_CATEGORY};
use holdback_core::fields;

use super::decode_blob;

/// Build the tree for one statement.
pub fn build_category_tree(
    categories: &Value,
    business_owner: Option<&Value>,
    funder_list: Option<&Value>,
) -> CategoryTree {
    let mut tree = CategoryTree::from_value(&decode_blob(categories));

    for (name, blob) in [
        (BUSINESS_OWNER_CATEGORY, business_owner),
        (FUNDER_LIST_CATEGORY, funder_list),
    ] {
        let Some(blob) = blob else { continue };
        let decoded = decode_blob(blob);
        if !fields::is_truthy(&decoded) {
            continue;
        }
        if !tree.insert(name, &as_record_list(&decoded)) {
            debug!(category = name, "sibling blob not mergeable");
        }
    }

    tree
}

/// A lone record object (all scalar values) becomes a one-element list, so it
/// merges as a flat category instead of a nest of empty subcategories. Keyed
/// blobs get the same treatment one level down: `{"owner": {..}}` keeps its
/// `owner` subcategory with a single row.
fn as_record_list(blob: &Value) -> Value {
    match blob {
        Value::Object(map) if is_record(map) => Value::Array(vec![blob.clone()]),
        Value::Object(map) => Value::Object(
            map.iter()
                .map(|(key, value)| {
                    let value = match value {
                        Value::Object(inner) if is_record(inner) => Value::Array(vec![value.clone()]),
                        other => other.clone(),
                    };
                    (key.clone(), value)
                })
                .collect(),
        ),
        other => other.clone(),
    }
}

fn is_record(map: &Map<String, Value>) -> bool {
    map.values().all(|v| !v.is_array() && !v.is_object())
}
