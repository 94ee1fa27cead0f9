//! Row-level inclusion overlay on top of a [`CategoryAggregate`].
//!
//! Keys that were never toggled are "all rows included". A key is only
//! materialized into an explicit index set on its first toggle; an explicit
//! empty set means "none included".

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use tracing::debug;

use holdback_core::categories::SubcategoryKey;
use holdback_core::transaction::{sum_rows, TransactionRow};

use crate::aggregator::CategoryAggregate;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SelectionState {
    included: BTreeMap<SubcategoryKey, BTreeSet<usize>>,
}

impl SelectionState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Explicit index set for `key`, if it has been materialized.
    pub fn included(&self, key: &SubcategoryKey) -> Option<&BTreeSet<usize>> {
        self.included.get(key)
    }

    pub fn is_included(&self, key: &SubcategoryKey, index: usize) -> bool {
        self.included.get(key).is_none_or(|set| set.contains(&index))
    }

    /// Number of materialized keys.
    pub fn len(&self) -> usize {
        self.included.len()
    }

    pub fn is_empty(&self) -> bool {
        self.included.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&SubcategoryKey, &BTreeSet<usize>)> {
        self.included.iter()
    }

    /// Sum of included rows; untouched keys sum every row.
    pub fn effective_amount(&self, key: &SubcategoryKey, rows: &[TransactionRow]) -> f64 {
        match self.included.get(key) {
            Some(set) => rows
                .iter()
                .enumerate()
                .filter(|(i, _)| set.contains(i))
                .map(|(_, r)| r.amount)
                .sum(),
            None => sum_rows(rows),
        }
    }

    /// Flip one row. Out-of-range indices are ignored; returns whether anything changed.
    pub fn toggle_row(&mut self, key: &SubcategoryKey, index: usize, rows: &[TransactionRow]) -> bool {
        if index >= rows.len() {
            debug!(key = key.as_str(), index, len = rows.len(), "toggle index out of range");
            return false;
        }
        let set = self
            .included
            .entry(key.clone())
            .or_insert_with(|| (0..rows.len()).collect());
        if !set.remove(&index) {
            set.insert(index);
        }
        true
    }

    /// All included -> none; anything else -> all.
    pub fn toggle_all(&mut self, key: &SubcategoryKey, rows: &[TransactionRow]) {
        let all_included = self
            .included
            .get(key)
            .is_none_or(|set| set.len() == rows.len());
        let next = if all_included {
            BTreeSet::new()
        } else {
            (0..rows.len()).collect()
        };
        self.included.insert(key.clone(), next);
    }

    /// Replace the set for `key` outright, dropping indices outside `rows`.
    pub fn set_included(
        &mut self,
        key: &SubcategoryKey,
        indices: impl IntoIterator<Item = usize>,
        rows: &[TransactionRow],
    ) {
        let set = indices.into_iter().filter(|i| *i < rows.len()).collect();
        self.included.insert(key.clone(), set);
    }

    /// Back to "everything included".
    pub fn reset(&mut self) {
        self.included.clear();
    }

    /// Effective total of one main category, skipping pseudo-category keys.
    pub fn effective_main_total(&self, aggregate: &CategoryAggregate, main: &str) -> f64 {
        let mut keys = aggregate.keys_for(main);
        keys.sort();
        keys.iter()
            .filter(|key| !aggregate.is_excluded_key(key))
            .map(|key| self.effective_amount(key, aggregate.rows(key)))
            .sum()
    }

    pub fn effective_main_totals(&self, aggregate: &CategoryAggregate) -> BTreeMap<String, f64> {
        aggregate
            .main_to_subs
            .keys()
            .map(|main| (main.clone(), self.effective_main_total(aggregate, main)))
            .collect()
    }

    /// Grand total after selection: Σ effective main totals.
    pub fn selected_total(&self, aggregate: &CategoryAggregate) -> f64 {
        self.effective_main_totals(aggregate).values().sum()
    }

    /// Every key of `aggregate` with its included indices spelled out.
    pub fn materialize(&self, aggregate: &CategoryAggregate) -> BTreeMap<SubcategoryKey, Vec<usize>> {
        aggregate
            .sub_to_rows
            .iter()
            .map(|(key, rows)| {
                let indices = match self.included.get(key) {
                    Some(set) => set.iter().copied().collect(),
                    None => (0..rows.len()).collect(),
                };
                (key.clone(), indices)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rows(amounts: &[f64]) -> Vec<TransactionRow> {
        amounts
            .iter()
            .map(|a| TransactionRow::new("", "", *a))
            .collect()
    }

    fn key() -> SubcategoryKey {
        SubcategoryKey::new("Deposits", "Card Sales")
    }

    #[test]
    fn test_absent_key_includes_everything() {
        let state = SelectionState::new();
        let rows = rows(&[10.0, 20.0, 30.0]);
        assert_eq!(state.effective_amount(&key(), &rows), 60.0);
        assert!(state.is_included(&key(), 2));
    }

    #[test]
    fn test_first_toggle_materializes_all_but_one() {
        let mut state = SelectionState::new();
        let rows = rows(&[10.0, 20.0, 30.0]);
        assert!(state.toggle_row(&key(), 1, &rows));
        assert_eq!(state.included(&key()).unwrap().len(), 2);
        assert_eq!(state.effective_amount(&key(), &rows), 40.0);

        assert!(state.toggle_row(&key(), 1, &rows));
        assert_eq!(state.effective_amount(&key(), &rows), 60.0);
    }

    #[test]
    fn test_out_of_range_toggle_is_noop() {
        let mut state = SelectionState::new();
        let rows = rows(&[10.0]);
        assert!(!state.toggle_row(&key(), 5, &rows));
        assert!(state.is_empty());
    }

    #[test]
    fn test_toggle_all_pairs() {
        let mut state = SelectionState::new();
        let rows = rows(&[10.0, 20.0]);

        state.toggle_all(&key(), &rows);
        assert_eq!(state.effective_amount(&key(), &rows), 0.0);
        assert!(state.included(&key()).unwrap().is_empty());

        state.toggle_all(&key(), &rows);
        assert_eq!(state.effective_amount(&key(), &rows), 30.0);
    }

    #[test]
    fn test_toggle_all_from_partial_selects_all() {
        let mut state = SelectionState::new();
        let rows = rows(&[10.0, 20.0]);
        state.toggle_row(&key(), 0, &rows);
        state.toggle_all(&key(), &rows);
        assert_eq!(state.included(&key()).unwrap().len(), 2);
    }

    #[test]
    fn test_set_included_drops_out_of_range() {
        let mut state = SelectionState::new();
        let rows = rows(&[1.0, 2.0]);
        state.set_included(&key(), [0, 1, 9], &rows);
        assert_eq!(state.included(&key()).unwrap().len(), 2);
        state.reset();
        assert!(state.is_empty());
    }
}
