//! Review session: one document's aggregate plus the reviewer's edits.
//!
//! Everything mutable about a review (row selection, funder selection,
//! optimistic revenue) lives here and only changes through `&mut self`.
//! Sessions share nothing, so separate documents can be reviewed on separate
//! threads without coordination.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use holdback_core::categories::{CategoryTree, SubcategoryKey};
use holdback_core::mca::McaItem;
use holdback_core::transaction::TransactionRow;
use holdback_ingest::StatementDocument;

use crate::aggregator::{aggregate, CategoryAggregate};
use crate::reconciler::{PersistedRevenue, Reconciliation, RevenueReconciler};
use crate::risk::{compute_holdback, FunderSelection, HoldbackSummary};
use crate::selection::SelectionState;
use crate::store::{RevenueStore, StoreError};

/// Unit of persistence handed to a [`RevenueStore`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavePayload {
    pub document_id: String,
    pub generation: u64,
    pub saved_at: DateTime<Utc>,
    /// Every subcategory key with its included row indices
    pub selection: BTreeMap<SubcategoryKey, Vec<usize>>,
    #[serde(default)]
    pub selected_funders: Vec<usize>,
    pub selected_total_from_categories: f64,
    pub effective_main_totals: BTreeMap<String, f64>,
    pub difference: f64,
}

#[derive(Debug, Clone)]
pub struct ReviewSession {
    document_id: String,
    reported_total: f64,
    persisted: PersistedRevenue,
    aggregate: CategoryAggregate,
    selection: SelectionState,
    reconciler: RevenueReconciler,
    mca_items: Vec<McaItem>,
    funder_selection: FunderSelection,
}

impl ReviewSession {
    pub fn new(
        document_id: impl Into<String>,
        tree: &CategoryTree,
        reported_total: f64,
        mca_items: Vec<McaItem>,
    ) -> Self {
        Self {
            document_id: document_id.into(),
            reported_total,
            persisted: PersistedRevenue::default(),
            aggregate: aggregate(tree),
            selection: SelectionState::new(),
            reconciler: RevenueReconciler::new(),
            mca_items,
            funder_selection: FunderSelection::all(),
        }
    }

    /// Build a session straight from an ingested statement document.
    pub fn from_document(doc: &StatementDocument) -> Self {
        let session = Self::new(&doc.id, &doc.category_tree(), doc.reported_total(), doc.mca_items());
        session.with_persisted(
            PersistedRevenue::new(doc.saved_revenue()).with_generation(doc.saved_revenue_generation),
        )
    }

    pub fn with_persisted(mut self, persisted: PersistedRevenue) -> Self {
        self.persisted = persisted;
        self
    }

    /// Called when the host re-reads the persisted revenue.
    pub fn set_persisted(&mut self, persisted: PersistedRevenue) {
        self.persisted = persisted;
    }

    pub fn document_id(&self) -> &str {
        &self.document_id
    }

    pub fn reported_total(&self) -> f64 {
        self.reported_total
    }

    pub fn aggregate(&self) -> &CategoryAggregate {
        &self.aggregate
    }

    pub fn selection(&self) -> &SelectionState {
        &self.selection
    }

    pub fn mca_items(&self) -> &[McaItem] {
        &self.mca_items
    }

    pub fn funder_selection(&self) -> &FunderSelection {
        &self.funder_selection
    }

    pub fn rows(&self, key: &SubcategoryKey) -> &[TransactionRow] {
        self.aggregate.rows(key)
    }

    pub fn toggle_row(&mut self, key: &SubcategoryKey, index: usize) -> bool {
        let rows = self.aggregate.rows(key);
        self.selection.toggle_row(key, index, rows)
    }

    /// Returns false for keys the aggregate does not know.
    pub fn toggle_all(&mut self, key: &SubcategoryKey) -> bool {
        if !self.aggregate.contains_key(key) {
            debug!(key = key.as_str(), "toggle_all on unknown key");
            return false;
        }
        let rows = self.aggregate.rows(key);
        self.selection.toggle_all(key, rows);
        true
    }

    pub fn reset_selection(&mut self) {
        self.selection.reset();
        self.funder_selection = FunderSelection::all();
    }

    pub fn effective_amount(&self, key: &SubcategoryKey) -> f64 {
        self.selection.effective_amount(key, self.aggregate.rows(key))
    }

    pub fn effective_main_total(&self, main: &str) -> f64 {
        self.selection.effective_main_total(&self.aggregate, main)
    }

    pub fn effective_main_totals(&self) -> BTreeMap<String, f64> {
        self.selection.effective_main_totals(&self.aggregate)
    }

    pub fn selected_total_from_categories(&self) -> f64 {
        self.selection.selected_total(&self.aggregate)
    }

    pub fn reconcile(&mut self) -> Reconciliation {
        let selected = self.selected_total_from_categories();
        self.reconciler
            .reconcile(self.reported_total, selected, self.persisted)
    }

    pub fn toggle_funder(&mut self, index: usize) {
        self.funder_selection.toggle(index, self.mca_items.len());
    }

    pub fn toggle_all_funders(&mut self) {
        self.funder_selection.toggle_all(self.mca_items.len());
    }

    pub fn select_funders(&mut self, indices: impl IntoIterator<Item = usize>) {
        let len = self.mca_items.len();
        self.funder_selection = FunderSelection::only(indices.into_iter().filter(|i| *i < len));
    }

    /// Holdback against the revenue figure currently shown to the reviewer.
    pub fn holdback(&mut self) -> HoldbackSummary {
        let revenue = self.reconcile().displayed_difference;
        compute_holdback(&self.mca_items, &self.funder_selection, revenue)
    }

    /// Payload for the next save. Does not change session state.
    pub fn save_payload(&self) -> SavePayload {
        let selected = self.selected_total_from_categories();
        SavePayload {
            document_id: self.document_id.clone(),
            generation: self.reconciler.next_generation(),
            saved_at: Utc::now(),
            selection: self.selection.materialize(&self.aggregate),
            selected_funders: self.funder_selection.indices(self.mca_items.len()),
            selected_total_from_categories: selected,
            effective_main_totals: self.effective_main_totals(),
            difference: self.reported_total - selected,
        }
    }

    /// Persist through `store`, then install the optimistic revenue value.
    ///
    /// On store failure the session is left exactly as it was.
    pub fn save<S: RevenueStore + ?Sized>(&mut self, store: &mut S) -> Result<SavePayload, StoreError> {
        let payload = self.save_payload();
        store.save(&payload)?;
        self.reconciler
            .record_save(payload.difference, payload.generation, self.persisted);
        info!(
            document = %self.document_id,
            generation = payload.generation,
            difference = payload.difference,
            "session saved"
        );
        Ok(payload)
    }

    /// Adopt a previously saved selection. Keys unknown to this aggregate are dropped.
    pub fn restore(&mut self, payload: &SavePayload) {
        self.selection.reset();
        for (key, indices) in &payload.selection {
            if !self.aggregate.contains_key(key) {
                debug!(key = key.as_str(), "saved key not in current categories");
                continue;
            }
            let rows = self.aggregate.rows(key);
            if indices.len() == rows.len() && indices.iter().all(|i| *i < rows.len()) {
                continue;
            }
            self.selection.set_included(key, indices.iter().copied(), rows);
        }
        self.select_funders(payload.selected_funders.iter().copied());
        self.reconciler.resume_from(payload.generation);
    }

    pub fn optimistic_pending(&self) -> bool {
        self.reconciler.optimistic().is_some()
    }
}
