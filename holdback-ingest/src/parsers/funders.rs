//! Funder record parser: raw funder blob -> [`McaItem`] list.
//!
//! Accepted shapes:
//!   [ {funder, frequency, amount, ...}, ... ]
//!   { "Jan 2024": [ {...}, ... ], "Feb 2024": [ ... ] }
//!
//! In the keyed shape the key becomes the period of records that lack one.

use serde_json::Value;
use tracing::debug;

use holdback_core::fields;
use holdback_core::mca::McaItem;

use super::decode_blob;

pub fn parse_funder_records(blob: &Value) -> Vec<McaItem> {
    let blob = decode_blob(blob);
    match &*blob {
        Value::Array(records) => items_from(records, ""),
        Value::Object(map) => {
            let mut items = Vec::new();
            for (period, value) in map {
                match value {
                    Value::Array(records) => items.extend(items_from(records, period)),
                    other => debug!(
                        period = period.as_str(),
                        kind = fields::kind(other),
                        "skipping funder entry"
                    ),
                }
            }
            items
        }
        other => {
            debug!(kind = fields::kind(other), "funder blob is not a list");
            Vec::new()
        }
    }
}

fn items_from(records: &[Value], default_period: &str) -> Vec<McaItem> {
    records
        .iter()
        .filter(|r| fields::is_truthy(r))
        .filter_map(|r| McaItem::from_record(r, default_period))
        .collect()
}
