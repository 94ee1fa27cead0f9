// Property-based tests for aggregation and the selection overlay.
// CI: 256 cases (default). Soak: PROPTEST_CASES=10000 cargo test --release

use std::collections::BTreeSet;

use holdback_core::{CategoryTree, SubcategoryKey, TransactionRow};
use holdback_finance::{aggregate, SelectionState};
use proptest::prelude::*;
use serde_json::{json, Map, Value};

fn config() -> ProptestConfig {
    ProptestConfig {
        cases: std::env::var("PROPTEST_CASES")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(256),
        failure_persistence: None,
        ..ProptestConfig::default()
    }
}

// ---------------------------------------------------------------------------
// Generators
// ---------------------------------------------------------------------------

/// Cent amounts, positive or negative.
fn arb_amount() -> impl Strategy<Value = f64> {
    (-500_000i64..500_000).prop_map(|cents| cents as f64 / 100.0)
}

fn arb_record() -> impl Strategy<Value = Value> {
    arb_amount().prop_map(|a| json!({"date": "2024-01-01", "description": "txn", "amount": a}))
}

fn arb_sub_name() -> impl Strategy<Value = String> {
    prop_oneof![
        4 => r"[A-Z][a-z]{2,8}",
        1 => Just("Business Name and Owner".to_string()),
        1 => Just("Funder List".to_string()),
    ]
}

fn arb_main() -> impl Strategy<Value = Value> {
    prop_oneof![
        proptest::collection::vec(arb_record(), 0..6).prop_map(Value::Array),
        proptest::collection::btree_map(
            arb_sub_name(),
            proptest::collection::vec(arb_record(), 0..6),
            1..4
        )
        .prop_map(|subs| {
            let map: Map<String, Value> = subs.into_iter().map(|(k, v)| (k, Value::Array(v))).collect();
            Value::Object(map)
        }),
    ]
}

fn arb_tree() -> impl Strategy<Value = Value> {
    proptest::collection::btree_map(
        prop_oneof![4 => r"[A-Z][a-z]{2,8}", 1 => Just("Funder List".to_string())],
        arb_main(),
        0..5,
    )
    .prop_map(|mains| Value::Object(mains.into_iter().collect()))
}

fn rows_from(amounts: &[f64]) -> Vec<TransactionRow> {
    amounts.iter().map(|a| TransactionRow::new("", "", *a)).collect()
}

// ---------------------------------------------------------------------------
// Properties
// ---------------------------------------------------------------------------

proptest! {
    #![proptest_config(config())]

    #[test]
    fn aggregation_is_idempotent(raw in arb_tree()) {
        let before = raw.clone();
        let tree = CategoryTree::from_value(&raw);
        let first = aggregate(&tree);
        let second = aggregate(&tree);
        prop_assert_eq!(first, second);
        prop_assert_eq!(raw, before);
    }

    #[test]
    fn pseudo_categories_never_reach_totals(raw in arb_tree()) {
        let agg = aggregate(&CategoryTree::from_value(&raw));

        let mut expected = 0.0;
        let mut mains: Vec<&String> = agg.main_to_subs.keys().collect();
        mains.sort();
        for main in mains {
            let mut main_total = 0.0;
            let mut keys = agg.keys_for(main);
            keys.sort();
            for key in keys {
                if !agg.is_excluded_key(&key) {
                    main_total += agg.sub_totals[&key];
                }
            }
            prop_assert_eq!(agg.main_totals[main.as_str()], main_total);
            expected += main_total;
        }
        prop_assert!((agg.total_from_categories - expected).abs() < 1e-6);

        // Excluded rows stay queryable
        for key in agg.sub_totals.keys() {
            prop_assert!(agg.sub_to_rows.contains_key(key));
        }
    }

    #[test]
    fn selection_is_monotonic_for_non_negative_rows(
        amounts in proptest::collection::vec(0u32..1_000_000, 1..20),
        picks in proptest::collection::vec(any::<bool>(), 20),
        extra in proptest::collection::vec(any::<bool>(), 20),
    ) {
        let amounts: Vec<f64> = amounts.into_iter().map(|c| c as f64 / 100.0).collect();
        let rows = rows_from(&amounts);
        let key = SubcategoryKey::new("Deposits", "Card");

        let small: BTreeSet<usize> = (0..rows.len()).filter(|i| picks[*i]).collect();
        let large: BTreeSet<usize> = (0..rows.len()).filter(|i| picks[*i] || extra[*i]).collect();

        let mut s = SelectionState::new();
        s.set_included(&key, small, &rows);
        let mut l = SelectionState::new();
        l.set_included(&key, large, &rows);

        let full = SelectionState::new().effective_amount(&key, &rows);
        let small_total = s.effective_amount(&key, &rows);
        let large_total = l.effective_amount(&key, &rows);
        prop_assert!(small_total <= large_total);
        prop_assert!(large_total <= full);
    }

    #[test]
    fn toggle_all_twice_restores_full_inclusion(
        amounts in proptest::collection::vec(arb_amount(), 0..12),
    ) {
        let rows = rows_from(&amounts);
        let key = SubcategoryKey::flat("Rent");
        let mut state = SelectionState::new();
        let original = state.effective_amount(&key, &rows);

        state.toggle_all(&key, &rows);
        state.toggle_all(&key, &rows);

        prop_assert_eq!(state.effective_amount(&key, &rows), original);
        for i in 0..rows.len() {
            prop_assert!(state.is_included(&key, i));
        }
    }

    #[test]
    fn row_toggle_twice_is_identity_on_totals(
        amounts in proptest::collection::vec(arb_amount(), 1..12),
        index in 0usize..12,
    ) {
        let rows = rows_from(&amounts);
        let key = SubcategoryKey::flat("Rent");
        let mut state = SelectionState::new();
        let original = state.effective_amount(&key, &rows);

        state.toggle_row(&key, index, &rows);
        state.toggle_row(&key, index, &rows);

        prop_assert_eq!(state.effective_amount(&key, &rows), original);
    }
}
