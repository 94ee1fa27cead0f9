//! Transaction row type produced by amount resolution + normalization.

use serde::{Deserialize, Serialize};

/// A single normalized statement transaction.
///
/// Rows are only ever built by [`crate::normalize`]; downstream code reads
/// them but never edits them in place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct TransactionRow {
    /// Date exactly as extracted (no parsing; formats vary per statement)
    pub date: String,
    /// Human-readable description
    pub description: String,
    /// Signed amount. `0.0` doubles as the "could not resolve" sentinel.
    pub amount: f64,
}

impl TransactionRow {
    pub fn new(date: impl Into<String>, description: impl Into<String>, amount: f64) -> Self {
        Self {
            date: date.into(),
            description: description.into(),
            amount,
        }
    }

    /// True when no amount could be recovered for this row.
    ///
    /// A genuine `$0.00` transaction reports true as well.
    pub fn is_unresolved(&self) -> bool {
        self.amount == 0.0
    }

    /// Returns true if this is a debit (negative amount)
    pub fn is_debit(&self) -> bool {
        self.amount < 0.0
    }

    /// Returns true if this is a credit (positive amount)
    pub fn is_credit(&self) -> bool {
        self.amount > 0.0
    }
}

/// Sum of row amounts.
pub fn sum_rows(rows: &[TransactionRow]) -> f64 {
    rows.iter().map(|r| r.amount).sum()
}
