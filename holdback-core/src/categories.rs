//! Category tree, subcategory addressing, and pseudo-category detection.
//!
//! A statement's categories arrive as one JSON object. Each main category is
//! either flat (an array of records) or nested (an object of subcategory
//! blobs). Flat mains act as their own single subcategory.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::fields;

pub const KEY_SEPARATOR: &str = "::";

/// Synthetic main category that business-owner records are merged under.
pub const BUSINESS_OWNER_CATEGORY: &str = "Business Name and Owner";

/// Synthetic main category that funder-list records are merged under.
pub const FUNDER_LIST_CATEGORY: &str = "Funder List";

/// `main::sub` address of one subcategory's row list.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SubcategoryKey(String);

impl SubcategoryKey {
    pub fn new(main: &str, sub: &str) -> Self {
        Self(format!("{main}{KEY_SEPARATOR}{sub}"))
    }

    /// Key of a flat main category (`main::main`).
    pub fn flat(main: &str) -> Self {
        Self::new(main, main)
    }

    /// Wrap an already-composed key string (e.g. from saved state or the CLI).
    pub fn from_raw(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Split back into `(main, sub)` at the first separator.
    pub fn parts(&self) -> Option<(&str, &str)> {
        self.0.split_once(KEY_SEPARATOR)
    }
}

impl fmt::Display for SubcategoryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

fn collapse(name: &str) -> String {
    name.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Business identity bucket, including the common "owder" extraction typo.
pub fn is_business_name_and_owner(name: &str) -> bool {
    let n = collapse(name);
    n == "business name and owner"
        || n == "business name and owder"
        || (n.contains("business name") && n.contains("owner"))
}

/// Funder-list bucket.
pub fn is_funder_list(name: &str) -> bool {
    let n = collapse(name);
    n == "funder list" || n == "funders list"
}

/// Informational bucket that must never count toward revenue.
pub fn is_pseudo_category(name: &str) -> bool {
    is_business_name_and_owner(name) || is_funder_list(name)
}

/// A subcategory is excluded from revenue math if it or its main is a pseudo-category.
pub fn is_excluded(main: &str, sub: &str) -> bool {
    is_pseudo_category(main) || is_pseudo_category(sub)
}

/// Shape of one main category.
#[derive(Debug, Clone, PartialEq)]
pub enum MainCategory {
    /// Array of records; the main is its own single subcategory.
    Flat(Value),
    /// Named subcategory blobs in document order.
    Nested(Vec<(String, Value)>),
}

impl MainCategory {
    /// Subcategory names and blobs. Flat mains yield `(main, blob)`.
    pub fn subcategories<'a>(&'a self, main: &'a str) -> Vec<(&'a str, &'a Value)> {
        match self {
            MainCategory::Flat(blob) => vec![(main, blob)],
            MainCategory::Nested(subs) => subs.iter().map(|(n, b)| (n.as_str(), b)).collect(),
        }
    }

    pub fn is_flat(&self) -> bool {
        matches!(self, MainCategory::Flat(_))
    }
}

/// Main category name -> [`MainCategory`], in document order, names unique.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CategoryTree {
    mains: Vec<(String, MainCategory)>,
}

/// Blank names carry nothing; names containing the key separator would alias
/// another (main, sub) pair's key.
fn valid_name(name: &str) -> bool {
    !name.trim().is_empty() && !name.contains(KEY_SEPARATOR)
}

impl CategoryTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from an extracted categories object. Non-objects give an empty tree.
    pub fn from_value(value: &Value) -> Self {
        let mut tree = Self::new();
        match value.as_object() {
            Some(map) => {
                for (name, blob) in map {
                    tree.insert(name, blob);
                }
            }
            None => debug!(kind = fields::kind(value), "categories payload is not an object"),
        }
        tree
    }

    /// Insert or replace a main category. Returns false if the entry was rejected
    /// (blank name, name containing `::`, or a blob that is neither array nor object).
    pub fn insert(&mut self, name: &str, blob: &Value) -> bool {
        if !valid_name(name) {
            debug!(main = name, "dropping main category with blank or `::` name");
            return false;
        }
        let category = match blob {
            Value::Array(_) => MainCategory::Flat(blob.clone()),
            Value::Object(map) => MainCategory::Nested(
                map.iter()
                    .filter(|(sub, _)| {
                        let ok = valid_name(sub);
                        if !ok {
                            debug!(main = name, sub = sub.as_str(), "dropping subcategory with blank or `::` name");
                        }
                        ok
                    })
                    .map(|(sub, b)| (sub.clone(), b.clone()))
                    .collect(),
            ),
            other => {
                debug!(main = name, kind = fields::kind(other), "dropping main category");
                return false;
            }
        };

        match self.mains.iter_mut().find(|(n, _)| n == name) {
            Some(slot) => slot.1 = category,
            None => self.mains.push((name.to_string(), category)),
        }
        true
    }

    pub fn get(&self, name: &str) -> Option<&MainCategory> {
        self.mains.iter().find(|(n, _)| n == name).map(|(_, c)| c)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &MainCategory)> {
        self.mains.iter().map(|(n, c)| (n.as_str(), c))
    }

    pub fn len(&self) -> usize {
        self.mains.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mains.is_empty()
    }
}
