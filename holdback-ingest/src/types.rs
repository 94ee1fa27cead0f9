use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use holdback_core::categories::CategoryTree;
use holdback_core::fields;
use holdback_core::mca::McaItem;
use holdback_core::numeric::{parse_loose_number, parse_optional_number};

use crate::error::{IngestError, IngestResult};
use crate::parsers::{build_category_tree, parse_funder_records};

/// One statement's extracted data plus the figures reported alongside it.
///
/// Figures stay as raw JSON until read; they may be numbers or formatted strings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatementDocument {
    #[serde(default, alias = "document_id", alias = "documentId")]
    pub id: String,

    #[serde(default, alias = "reported_total_deposits", alias = "total_deposits", alias = "totalDeposits")]
    pub reported_total_deposits: Value,

    #[serde(default, alias = "saved_monthly_revenue", alias = "monthly_revenue")]
    pub saved_monthly_revenue: Option<Value>,

    /// Save generation the persisted revenue was written under, when the store tracks it.
    #[serde(default, alias = "saved_revenue_generation")]
    pub saved_revenue_generation: Option<u64>,

    #[serde(default)]
    pub categories: Value,

    #[serde(default, alias = "business_owner", alias = "business_name_and_owner")]
    pub business_owner: Option<Value>,

    #[serde(default, alias = "funder_list")]
    pub funder_list: Option<Value>,

    #[serde(default, alias = "mca_funders", alias = "funder_records")]
    pub funders: Option<Value>,
}

impl StatementDocument {
    /// Reported total deposits, best-effort parsed (`0.0` when unreadable).
    pub fn reported_total(&self) -> f64 {
        parse_loose_number(&self.reported_total_deposits)
    }

    /// Previously saved monthly revenue, if present and usable.
    pub fn saved_revenue(&self) -> Option<f64> {
        parse_optional_number(self.saved_monthly_revenue.as_ref())
    }

    pub fn category_tree(&self) -> CategoryTree {
        build_category_tree(
            &self.categories,
            self.business_owner.as_ref(),
            self.funder_list.as_ref(),
        )
    }

    pub fn mca_items(&self) -> Vec<McaItem> {
        self.funders
            .as_ref()
            .map(parse_funder_records)
            .unwrap_or_default()
    }
}

/// Parse a statement document from JSON text.
pub fn parse_document(text: &str) -> IngestResult<StatementDocument> {
    let value: Value = serde_json::from_str(text)?;
    if !value.is_object() {
        return Err(IngestError::NotAnObject(fields::kind(&value)));
    }
    let doc: StatementDocument = serde_json::from_value(value)?;
    if doc.id.trim().is_empty() {
        return Err(IngestError::MissingId);
    }
    Ok(doc)
}

/// Read and parse a statement document file.
pub fn load_document(path: impl AsRef<Path>) -> IngestResult<StatementDocument> {
    let path = path.as_ref();
    let text = fs::read_to_string(path).map_err(|source| IngestError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_document(&text)
}
