//! Funder risk: holdback percentage from daily-equivalent funder debits.
//!
//! holdback% = round_half_even((Σ selected daily debits × 20) / revenue × 100, 1)

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use holdback_core::mca::McaItem;
use holdback_core::numeric::round_half_even;

/// Fixed industry multiplier applied to the daily funder total.
pub const FUNDER_MULTIPLIER: f64 = 20.0;

/// Decimal places kept in the holdback percentage.
pub const HOLDBACK_DECIMALS: i32 = 1;

/// Index-based selection over the full funder list. `None` = all selected.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FunderSelection(Option<BTreeSet<usize>>);

impl FunderSelection {
    pub fn all() -> Self {
        Self(None)
    }

    pub fn only(indices: impl IntoIterator<Item = usize>) -> Self {
        Self(Some(indices.into_iter().collect()))
    }

    pub fn is_selected(&self, index: usize) -> bool {
        self.0.as_ref().is_none_or(|set| set.contains(&index))
    }

    /// Selected indices within `0..len`.
    pub fn indices(&self, len: usize) -> Vec<usize> {
        (0..len).filter(|i| self.is_selected(*i)).collect()
    }

    /// Flip one funder; out-of-range indices are ignored.
    pub fn toggle(&mut self, index: usize, len: usize) {
        if index >= len {
            return;
        }
        let set = self.0.get_or_insert_with(|| (0..len).collect());
        if !set.remove(&index) {
            set.insert(index);
        }
    }

    /// All selected -> none; anything else -> all.
    pub fn toggle_all(&mut self, len: usize) {
        let all = self.0.as_ref().is_none_or(|set| set.len() == len);
        self.0 = Some(if all { BTreeSet::new() } else { (0..len).collect() });
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HoldbackSummary {
    pub total_funders: f64,
    pub subtotal: f64,
    pub ratio: f64,
    pub holdback_percent: f64,
}

impl HoldbackSummary {
    /// `"12.5%"`
    pub fn display_percent(&self) -> String {
        format!("{:.1}%", self.holdback_percent)
    }
}

/// Compute holdback for the selected funders against `revenue`.
///
/// Non-positive revenue gives a zero ratio and percentage. Only exact ties at
/// the second decimal go to even, so `ratio = 0.125` reports `12.5`, not `12.0`.
pub fn compute_holdback(items: &[McaItem], selection: &FunderSelection, revenue: f64) -> HoldbackSummary {
    let total_funders: f64 = items
        .iter()
        .enumerate()
        .filter(|(i, _)| selection.is_selected(*i))
        .map(|(_, item)| item.daily_equivalent_amount)
        .sum();
    let subtotal = total_funders * FUNDER_MULTIPLIER;
    let ratio = if revenue > 0.0 { subtotal / revenue } else { 0.0 };

    HoldbackSummary {
        total_funders,
        subtotal,
        ratio,
        holdback_percent: round_half_even(ratio * 100.0, HOLDBACK_DECIMALS),
    }
}
