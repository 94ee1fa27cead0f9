//! File-backed session store: one pretty-printed JSON payload per document.

use std::fs;
use std::path::{Path, PathBuf};

use holdback_finance::{RevenueStore, SavePayload, StoreError};
use sha2::{Digest, Sha256};

#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, document_id: &str) -> PathBuf {
        self.dir.join(format!("{}.json", file_stem(document_id)))
    }
}

/// Filesystem-safe id plus the first 8 bytes of its SHA-256, so ids that
/// sanitise alike (`doc/1`, `doc_1`) still get separate files.
fn file_stem(document_id: &str) -> String {
    let safe: String = document_id
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.') { c } else { '_' })
        .collect();
    let digest = Sha256::digest(document_id.as_bytes());
    format!("{safe}-{}", hex::encode(&digest[..8]))
}

impl RevenueStore for FileStore {
    fn save(&mut self, payload: &SavePayload) -> Result<(), StoreError> {
        fs::create_dir_all(&self.dir)?;
        let json = serde_json::to_string_pretty(payload)?;
        fs::write(self.path_for(&payload.document_id), json)?;
        Ok(())
    }

    fn load(&mut self, document_id: &str) -> Result<Option<SavePayload>, StoreError> {
        let path = self.path_for(document_id);
        if !path.exists() {
            return Ok(None);
        }
        let s = fs::read_to_string(&path)?;
        Ok(Some(serde_json::from_str(&s)?))
    }
}
