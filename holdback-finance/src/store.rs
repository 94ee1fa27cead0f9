//! Persistence seam for saved review sessions.
//!
//! The engine never writes anywhere itself; hosts hand it a [`RevenueStore`].

use std::collections::HashMap;

use thiserror::Error;

use crate::session::SavePayload;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store unavailable: {0}")]
    Unavailable(String),

    #[error("store I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("stored payload is not valid JSON: {0}")]
    Serde(#[from] serde_json::Error),
}

pub trait RevenueStore {
    /// Persist a payload, replacing any earlier one for the same document.
    fn save(&mut self, payload: &SavePayload) -> Result<(), StoreError>;

    /// Latest payload for `document_id`, if any.
    fn load(&mut self, document_id: &str) -> Result<Option<SavePayload>, StoreError>;
}

/// In-process store, one payload per document.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    payloads: HashMap<String, SavePayload>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, document_id: &str) -> Option<&SavePayload> {
        self.payloads.get(document_id)
    }
}

impl RevenueStore for MemoryStore {
    fn save(&mut self, payload: &SavePayload) -> Result<(), StoreError> {
        self.payloads
            .insert(payload.document_id.clone(), payload.clone());
        Ok(())
    }

    fn load(&mut self, document_id: &str) -> Result<Option<SavePayload>, StoreError> {
        Ok(self.payloads.get(document_id).cloned())
    }
}
