//! Revenue reconciliation: reported deposits vs. selection-adjusted categories.
//!
//! The figure shown to the reviewer is chosen in priority order:
//! 1. the in-session optimistic value installed by the last save
//! 2. the persisted "saved monthly revenue"
//! 3. the freshly computed difference
//!
//! The optimistic value only bridges the gap until the store round-trips the
//! save. With a store that reports save generations it is dropped once the
//! persisted generation catches up. Without generations it falls back to a
//! narrow heuristic: drop it once the persisted value is usable and either
//! changed since the save or equals the optimistic value.

use serde::{Deserialize, Serialize};
use tracing::debug;

use holdback_core::numeric::is_usable;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DifferenceSource {
    Optimistic,
    Saved,
    Computed,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Reconciliation {
    pub selected_total_from_categories: f64,
    /// reported - selected; always the fresh computation
    pub difference: f64,
    /// What the reviewer sees
    pub displayed_difference: f64,
    pub source: DifferenceSource,
}

/// Persisted revenue as last read from the store.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PersistedRevenue {
    pub value: Option<f64>,
    pub generation: Option<u64>,
}

impl PersistedRevenue {
    pub fn new(value: Option<f64>) -> Self {
        Self {
            value,
            generation: None,
        }
    }

    pub fn with_generation(mut self, generation: Option<u64>) -> Self {
        self.generation = generation;
        self
    }

    /// The value, if finite and non-zero.
    pub fn usable(&self) -> Option<f64> {
        self.value.filter(|v| is_usable(*v))
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OptimisticOverride {
    pub value: f64,
    pub generation: u64,
    /// Persisted value observed when the save happened
    persisted_at_save: Option<f64>,
}

/// Stateless reconciliation with no optimistic layer.
pub fn reconcile(reported_total: f64, selected_total: f64, saved: Option<f64>) -> Reconciliation {
    let difference = reported_total - selected_total;
    let (displayed_difference, source) = match saved.filter(|v| is_usable(*v)) {
        Some(v) => (v, DifferenceSource::Saved),
        None => (difference, DifferenceSource::Computed),
    };
    Reconciliation {
        selected_total_from_categories: selected_total,
        difference,
        displayed_difference,
        source,
    }
}

/// Session-scoped reconciler holding the optimistic override.
#[derive(Debug, Clone, Default)]
pub struct RevenueReconciler {
    optimistic: Option<OptimisticOverride>,
    generation: u64,
}

impl RevenueReconciler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reconcile(
        &mut self,
        reported_total: f64,
        selected_total: f64,
        persisted: PersistedRevenue,
    ) -> Reconciliation {
        self.clear_if_caught_up(persisted);

        let mut result = reconcile(reported_total, selected_total, persisted.usable());
        if let Some(o) = self.optimistic.filter(|o| is_usable(o.value)) {
            result.displayed_difference = o.value;
            result.source = DifferenceSource::Optimistic;
        }
        result
    }

    /// Generation the next save will be written under.
    pub fn next_generation(&self) -> u64 {
        self.generation + 1
    }

    /// Last generation saved or restored in this session.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Continue numbering after a restored save.
    pub fn resume_from(&mut self, generation: u64) {
        self.generation = self.generation.max(generation);
    }

    /// Install the optimistic value after a successful save.
    pub fn record_save(&mut self, value: f64, generation: u64, persisted: PersistedRevenue) {
        self.generation = generation;
        self.optimistic = Some(OptimisticOverride {
            value,
            generation,
            persisted_at_save: persisted.usable(),
        });
    }

    pub fn optimistic(&self) -> Option<&OptimisticOverride> {
        self.optimistic.as_ref()
    }

    pub fn clear_optimistic(&mut self) {
        self.optimistic = None;
    }

    fn clear_if_caught_up(&mut self, persisted: PersistedRevenue) {
        let (Some(o), Some(value)) = (self.optimistic, persisted.usable()) else {
            return;
        };
        let caught_up = match persisted.generation {
            Some(g) => g >= o.generation,
            None => o.persisted_at_save != Some(value) || value == o.value,
        };
        if caught_up {
            debug!(generation = o.generation, value, "persisted revenue caught up; dropping optimistic value");
            self.optimistic = None;
        }
    }
}
