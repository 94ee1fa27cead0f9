//! Merchant cash advance (MCA) funder debit records.
//!
//! Funders debit either daily or weekly. Weekly debits are converted to a
//! daily-equivalent figure over five business days so that all funders can be
//! summed on the same basis.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::amount;
use crate::fields;

/// Business days a weekly debit is spread across.
pub const BUSINESS_DAYS_PER_WEEK: f64 = 5.0;

const PERIOD_FIELDS: &[&str] = &["period", "Period", "month", "Month", "statement_period"];
const FUNDER_FIELDS: &[&str] = &[
    "funder",
    "Funder",
    "funder_name",
    "funderName",
    "name",
    "lender",
    "Lender",
];
const FREQUENCY_FIELDS: &[&str] = &[
    "frequency",
    "Frequency",
    "debit_frequency",
    "debitFrequency",
    "freq",
];
const NOTES_FIELDS: &[&str] = &["notes", "Notes", "note", "memo", "description"];

/// One funder debit, with its daily-equivalent amount derived at construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct McaItem {
    pub period: String,
    pub funder: String,
    pub frequency: String,
    pub raw_amount: f64,
    pub is_weekly: bool,
    pub daily_equivalent_amount: f64,
    pub notes: String,
}

impl McaItem {
    pub fn new(
        period: impl Into<String>,
        funder: impl Into<String>,
        frequency: impl Into<String>,
        raw_amount: f64,
        notes: impl Into<String>,
    ) -> Self {
        let frequency = frequency.into();
        let is_weekly = is_weekly_frequency(&frequency);
        let daily_equivalent_amount = if is_weekly {
            raw_amount / BUSINESS_DAYS_PER_WEEK
        } else {
            raw_amount
        };
        Self {
            period: period.into(),
            funder: funder.into(),
            frequency,
            raw_amount,
            is_weekly,
            daily_equivalent_amount,
            notes: notes.into(),
        }
    }

    /// Derive an item from a raw funder record. Only objects qualify.
    ///
    /// `default_period` is used when the record carries no period field.
    pub fn from_record(record: &Value, default_period: &str) -> Option<Self> {
        let map = record.as_object()?;
        let notes = fields::text_or_empty(map, NOTES_FIELDS);
        let raw_amount = amount::resolve(record, &notes);
        let period =
            fields::first_text(map, PERIOD_FIELDS).unwrap_or_else(|| default_period.to_string());
        Some(Self::new(
            period,
            fields::text_or_empty(map, FUNDER_FIELDS),
            fields::text_or_empty(map, FREQUENCY_FIELDS),
            raw_amount,
            notes,
        ))
    }
}

/// `"Weekly"`, `"weekly debit"`, `"WEEK"` all count as weekly.
pub fn is_weekly_frequency(frequency: &str) -> bool {
    frequency.to_lowercase().contains("week")
}
