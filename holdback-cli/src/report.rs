//! Rendering a review session for the terminal, as JSON, or as CSV rows.

use std::fmt::Write as _;
use std::io;

use anyhow::{Context, Result};
use serde::Serialize;
use serde_json::json;

use holdback_core::{McaItem, SubcategoryKey};
use holdback_finance::{DifferenceSource, HoldbackSummary, Reconciliation, ReviewSession};

/// `-1234.5` -> `-$1,234.50`
pub fn fmt_money(value: f64) -> String {
    let cents = (value.abs() * 100.0).round() as u64;
    let whole = (cents / 100).to_string();
    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, ch) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    let sign = if value < 0.0 && cents > 0 { "-" } else { "" };
    format!("{sign}${grouped}.{:02}", cents % 100)
}

fn source_label(source: DifferenceSource) -> &'static str {
    match source {
        DifferenceSource::Optimistic => "just saved",
        DifferenceSource::Saved => "saved",
        DifferenceSource::Computed => "computed",
    }
}

pub fn render_text(session: &mut ReviewSession) -> String {
    let recon = session.reconcile();
    let holdback = session.holdback();
    let mut out = String::new();

    let _ = writeln!(out, "Document {}", session.document_id());
    let _ = writeln!(out);

    let agg = session.aggregate();
    for main in agg.mains() {
        let effective = session.effective_main_total(main);
        let _ = writeln!(out, "{main:<40} {:>16}", fmt_money(effective));
        for key in agg.keys_for(main) {
            let rows = agg.rows(&key);
            let included = (0..rows.len())
                .filter(|i| session.selection().is_included(&key, *i))
                .count();
            let sub = key.parts().map(|(_, sub)| sub).unwrap_or(key.as_str());
            let marker = if agg.is_excluded_key(&key) { " (excluded)" } else { "" };
            let _ = writeln!(
                out,
                "  {:<38} {:>16}  [{included}/{}]{marker}",
                sub,
                fmt_money(session.effective_amount(&key)),
                rows.len()
            );
        }
    }

    let _ = writeln!(out);
    let _ = writeln!(out, "{:<40} {:>16}", "Reported deposits", fmt_money(session.reported_total()));
    let _ = writeln!(
        out,
        "{:<40} {:>16}",
        "Selected from categories",
        fmt_money(recon.selected_total_from_categories)
    );
    let _ = writeln!(
        out,
        "{:<40} {:>16}  ({})",
        "Revenue",
        fmt_money(recon.displayed_difference),
        source_label(recon.source)
    );

    let items = session.mca_items();
    if !items.is_empty() {
        let _ = writeln!(out);
        let _ = writeln!(out, "Funders");
        for (i, item) in items.iter().enumerate() {
            let mark = if session.funder_selection().is_selected(i) { 'x' } else { ' ' };
            let _ = writeln!(
                out,
                "  [{mark}] {i:>2} {:<24} {:<10} {:>12} -> {:>12}/day",
                item.funder,
                item.frequency,
                fmt_money(item.raw_amount),
                fmt_money(item.daily_equivalent_amount)
            );
        }
    }
    let _ = writeln!(out, "{:<40} {:>16}", "Holdback", holdback.display_percent());
    out
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct JsonReport<'a> {
    document_id: &'a str,
    reported_total: f64,
    effective_main_totals: std::collections::BTreeMap<String, f64>,
    reconciliation: Reconciliation,
    funders: Vec<JsonFunder<'a>>,
    holdback: HoldbackSummary,
}

#[derive(Serialize)]
struct JsonFunder<'a> {
    #[serde(flatten)]
    item: &'a McaItem,
    selected: bool,
}

pub fn render_json(session: &mut ReviewSession) -> Result<String> {
    let reconciliation = session.reconcile();
    let holdback = session.holdback();
    let report = JsonReport {
        document_id: session.document_id(),
        reported_total: session.reported_total(),
        effective_main_totals: session.effective_main_totals(),
        reconciliation,
        funders: session
            .mca_items()
            .iter()
            .enumerate()
            .map(|(i, item)| JsonFunder {
                item,
                selected: session.funder_selection().is_selected(i),
            })
            .collect(),
        holdback,
    };
    serde_json::to_string_pretty(&report).context("serialize report")
}

/// Rows of one subcategory as CSV, with their inclusion flag.
pub fn export_rows<W: io::Write>(session: &ReviewSession, key: &SubcategoryKey, out: W) -> Result<()> {
    let mut w = csv::Writer::from_writer(out);
    w.write_record(["index", "date", "description", "amount", "included"])?;
    for (i, row) in session.rows(key).iter().enumerate() {
        let included = session.selection().is_included(key, i);
        w.write_record([
            i.to_string(),
            row.date.clone(),
            row.description.clone(),
            format!("{:.2}", row.amount),
            included.to_string(),
        ])?;
    }
    w.flush()?;
    Ok(())
}

/// Row-level JSON for a single subcategory.
pub fn rows_json(session: &ReviewSession, key: &SubcategoryKey) -> serde_json::Value {
    let rows: Vec<_> = session
        .rows(key)
        .iter()
        .enumerate()
        .map(|(i, row)| {
            json!({
                "index": i,
                "date": row.date,
                "description": row.description,
                "amount": row.amount,
                "included": session.selection().is_included(key, i),
            })
        })
        .collect();
    json!({ "key": key.as_str(), "rows": rows })
}

#[cfg(test)]
mod tests {
    use super::*;
    use holdback_core::CategoryTree;

    fn session() -> ReviewSession {
        let tree = CategoryTree::from_value(&json!({
            "Deposits": {
                "Card Sales": [
                    {"date": "2024-01-02", "description": "Square, batch", "amount": 1200.5},
                    {"date": "2024-01-03", "description": "Square", "amount": 300}
                ],
                "Business Name and Owner": [{"amount": 5000}]
            },
            "Rent": [{"date": "2024-01-01", "description": "Rent pmt", "amount": -1500}]
        }));
        let funders = vec![McaItem::new("Jan", "Acme Capital", "Weekly", 1000.0, "")];
        ReviewSession::new("doc-1", &tree, 10000.0, funders)
    }

    #[test]
    fn test_fmt_money() {
        assert_eq!(fmt_money(0.0), "$0.00");
        assert_eq!(fmt_money(1234.5), "$1,234.50");
        assert_eq!(fmt_money(-1500.0), "-$1,500.00");
        assert_eq!(fmt_money(1234567.891), "$1,234,567.89");
        assert_eq!(fmt_money(-0.001), "$0.00");
    }

    #[test]
    fn test_text_report_marks_exclusions_and_counts() {
        let mut s = session();
        s.toggle_row(&SubcategoryKey::new("Deposits", "Card Sales"), 1);
        let text = render_text(&mut s);
        assert!(text.contains("Document doc-1"));
        assert!(text.contains("[1/2]"));
        assert!(text.contains("(excluded)"));
        assert!(text.contains("(computed)"));
        assert!(text.contains("Acme Capital"));
        // revenue 10000 - (1200.50 - 1500) = 10299.50
        assert!(text.contains("$10,299.50"));
    }

    #[test]
    fn test_json_report_shape() {
        let mut s = session();
        let v: serde_json::Value = serde_json::from_str(&render_json(&mut s).unwrap()).unwrap();
        assert_eq!(v["documentId"], "doc-1");
        assert_eq!(v["reconciliation"]["source"], "computed");
        assert_eq!(v["funders"][0]["funder"], "Acme Capital");
        assert_eq!(v["funders"][0]["selected"], true);
        assert_eq!(v["holdback"]["totalFunders"], 200.0);
    }

    #[test]
    fn test_export_csv_quotes_and_flags() {
        let mut s = session();
        let key = SubcategoryKey::new("Deposits", "Card Sales");
        s.toggle_row(&key, 0);
        let mut buf = Vec::new();
        export_rows(&s, &key, &mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "index,date,description,amount,included");
        assert_eq!(lines[1], "0,2024-01-02,\"Square, batch\",1200.50,false");
        assert_eq!(lines[2], "1,2024-01-03,Square,300.00,true");
    }

    #[test]
    fn test_rows_json_for_unknown_key_is_empty() {
        let s = session();
        let v = rows_json(&s, &SubcategoryKey::flat("Ghost"));
        assert_eq!(v["rows"].as_array().unwrap().len(), 0);
    }
}
