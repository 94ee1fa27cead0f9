//! holdback-ingest: statement document loading and blob parsers (categories, funders).

pub mod error;
pub mod parsers;
pub mod types;

pub use error::{IngestError, IngestResult};
pub use parsers::{build_category_tree, decode_blob, parse_funder_records};
pub use types::{load_document, parse_document, StatementDocument};
