//! Category aggregation: main -> subcategory -> rows, with per-level sums.
//!
//! Pseudo-categories (business name/owner, funder list) keep their rows and
//! subcategory sums so reviewers can see them, but contribute nothing to main
//! totals or the grand total.
//!
//! Sums are taken in key order rather than document order, so reshuffling the
//! source object never moves a total by a rounding ulp.

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

use holdback_core::categories::{is_excluded, CategoryTree, SubcategoryKey};
use holdback_core::normalize::normalize;
use holdback_core::transaction::{sum_rows, TransactionRow};

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryAggregate {
    pub sub_totals: BTreeMap<SubcategoryKey, f64>,
    pub main_totals: BTreeMap<String, f64>,
    /// Subcategory names per main, in document order
    pub main_to_subs: BTreeMap<String, Vec<String>>,
    pub sub_to_rows: BTreeMap<SubcategoryKey, Vec<TransactionRow>>,
    pub total_from_categories: f64,
    #[serde(skip)]
    main_order: Vec<String>,
    #[serde(skip)]
    excluded: BTreeSet<SubcategoryKey>,
}

impl CategoryAggregate {
    /// Main category names in document order.
    pub fn mains(&self) -> impl Iterator<Item = &str> {
        self.main_order.iter().map(String::as_str)
    }

    /// Subcategory keys under `main`, in document order.
    pub fn keys_for(&self, main: &str) -> Vec<SubcategoryKey> {
        self.main_to_subs
            .get(main)
            .map(|subs| subs.iter().map(|sub| SubcategoryKey::new(main, sub)).collect())
            .unwrap_or_default()
    }

    /// Rows for `key`; unknown keys yield an empty slice.
    pub fn rows(&self, key: &SubcategoryKey) -> &[TransactionRow] {
        self.sub_to_rows.get(key).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn contains_key(&self, key: &SubcategoryKey) -> bool {
        self.sub_to_rows.contains_key(key)
    }

    pub fn sub_total(&self, main: &str, sub: &str) -> Option<f64> {
        self.sub_totals.get(&SubcategoryKey::new(main, sub)).copied()
    }

    pub fn main_total(&self, main: &str) -> Option<f64> {
        self.main_totals.get(main).copied()
    }

    /// Whether `key` is kept out of main/grand totals.
    pub fn is_excluded_key(&self, key: &SubcategoryKey) -> bool {
        self.excluded.contains(key)
    }

    /// Number of rows across all subcategories.
    pub fn row_count(&self) -> usize {
        self.sub_to_rows.values().map(Vec::len).sum()
    }
}

/// Aggregate a category tree. Pure: the tree is only read.
pub fn aggregate(tree: &CategoryTree) -> CategoryAggregate {
    let mut agg = CategoryAggregate::default();

    for (main, category) in tree.iter() {
        let mut names = Vec::new();
        for (sub, blob) in category.subcategories(main) {
            let key = SubcategoryKey::new(main, sub);
            if is_excluded(main, sub) {
                agg.excluded.insert(key.clone());
            }
            let rows = normalize(blob);
            agg.sub_totals.insert(key.clone(), sum_rows(&rows));
            agg.sub_to_rows.insert(key, rows);
            names.push(sub.to_string());
        }
        agg.main_to_subs.insert(main.to_string(), names);
        agg.main_order.push(main.to_string());
    }

    let mut main_totals = BTreeMap::new();
    for (main, subs) in &agg.main_to_subs {
        let mut included: Vec<&String> = subs.iter().filter(|sub| !is_excluded(main, sub)).collect();
        included.sort();
        let total: f64 = included
            .into_iter()
            .filter_map(|sub| agg.sub_totals.get(&SubcategoryKey::new(main, sub)))
            .sum();
        main_totals.insert(main.clone(), total);
    }
    agg.main_totals = main_totals;

    agg.total_from_categories = agg.main_totals.values().sum();
    agg
}
