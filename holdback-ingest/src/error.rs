use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("reading {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid statement JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("statement document must be a JSON object, got {0}")]
    NotAnObject(&'static str),

    #[error("statement document has no id")]
    MissingId,
}

pub type IngestResult<T> = Result<T, IngestError>;
