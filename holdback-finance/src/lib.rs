//! holdback-finance: category aggregation, selection overlay, revenue reconciliation, and holdback risk

pub mod aggregator;
pub mod reconciler;
pub mod risk;
pub mod selection;
pub mod session;
pub mod store;

pub use aggregator::{aggregate, CategoryAggregate};
pub use reconciler::{reconcile, DifferenceSource, PersistedRevenue, Reconciliation, RevenueReconciler};
pub use risk::{compute_holdback, FunderSelection, HoldbackSummary, FUNDER_MULTIPLIER};
pub use selection::SelectionState;
pub use session::{ReviewSession, SavePayload};
pub use store::{MemoryStore, RevenueStore, StoreError};
