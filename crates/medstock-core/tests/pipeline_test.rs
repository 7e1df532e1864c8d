#![allow(clippy::unwrap_used)]
// Behavioural tests for the filter/sort pipeline over realistic records.

use medstock_core::classify::{CodeTable, Role, Status};
use medstock_core::query::{self, FilterSet, SortDirection, SortSpec, filter, sort};
use medstock_core::{Classification, Record, TableView};
use serde_json::{Value, json};

// ── Helpers ─────────────────────────────────────────────────────────

fn records(values: Vec<Value>) -> Vec<Record> {
    values
        .into_iter()
        .map(|v| Record::try_from(v).unwrap())
        .collect()
}

fn field(rows: &[Record], name: &str) -> Vec<String> {
    rows.iter().map(|r| r.display(name)).collect()
}

fn inventory() -> Vec<Record> {
    records(vec![
        json!({ "id": 1, "name": "Nitrile Gloves", "unit": "box", "categoryName": "PPE", "quantity": 120 }),
        json!({ "id": 2, "name": "Saline 0.9%", "unit": "bag", "categoryName": "Fluids", "quantity": 40 }),
        json!({ "id": 3, "name": "Surgical Mask", "unit": "box", "categoryName": "PPE", "quantity": 300 }),
        json!({ "id": 4, "name": "Gauze Pads", "unit": "pack", "categoryName": null, "quantity": 75 }),
        json!({ "id": 5, "name": "IV Cannula", "unit": "piece", "quantity": 500 }),
        json!({ "id": 6, "name": "Box Splint", "unit": "piece", "categoryName": "Ortho", "quantity": 12 }),
    ])
}

const FIELDS: &[&str] = &["name", "unit"];

// ── Properties ──────────────────────────────────────────────────────

#[test]
fn filter_is_idempotent() {
    let rows = inventory();
    let filters = FilterSet::new().with("categoryName", "PPE");
    for q in ["", "box", "MASK", "zzz", " p "] {
        let once = filter(&rows, q, &filters, FIELDS);
        let twice = filter(&once, q, &filters, FIELDS);
        assert_eq!(once, twice, "query {q:?}");
    }
}

#[test]
fn empty_query_equals_filters_alone() {
    let rows = inventory();
    let filters = FilterSet::new().with("categoryName", "PPE");
    let out = filter(&rows, "", &filters, FIELDS);
    let expected: Vec<Record> = rows
        .iter()
        .filter(|r| r.get("categoryName") == Some(&json!("PPE")))
        .cloned()
        .collect();
    assert_eq!(out, expected);
}

#[test]
fn adding_a_query_never_grows_the_result() {
    let rows = inventory();
    for filters in [FilterSet::new(), FilterSet::new().with("unit", "box")] {
        let base = filter(&rows, "", &filters, FIELDS).len();
        for q in ["a", "box", "gl", "0.9", "x"] {
            assert!(filter(&rows, q, &filters, FIELDS).len() <= base, "query {q:?}");
        }
    }
}

#[test]
fn filter_preserves_input_order() {
    let rows = inventory();
    let out = filter(&rows, "s", &FilterSet::new(), FIELDS);
    let ids: Vec<i64> = out.iter().map(|r| r.get("id").unwrap().as_i64().unwrap()).collect();
    let mut sorted = ids.clone();
    sorted.sort_unstable();
    assert_eq!(ids, sorted);
    assert_eq!(ids, vec![1, 2, 3, 4, 6]);
}

#[test]
fn sort_with_all_equal_keys_is_identity() {
    let rows = records((0..8).map(|i| json!({ "seq": i, "status": 1 })).collect());
    for direction in [SortDirection::Asc, SortDirection::Desc] {
        let out = sort(&rows, &SortSpec::new("status", direction));
        assert_eq!(out, rows, "{direction}");
    }
}

#[test]
fn toggle_determinism() {
    let start = SortSpec::default();
    assert_eq!(start, SortSpec { key: None, direction: SortDirection::Asc });

    let twice = start.toggled("name").toggled("name");
    assert_eq!(twice, SortSpec::new("name", SortDirection::Desc));

    let switched = start.toggled("name").toggled("id");
    assert_eq!(switched, SortSpec::new("id", SortDirection::Asc));
}

#[test]
fn classification_is_total() {
    assert_eq!(Role::classify(Some(&json!(1))).label, "Admin");
    assert_eq!(Status::classify(Some(&json!(1))).label, "Approved");
    assert_eq!(Role::classify(Some(&json!(999))), Classification::UNKNOWN);
    assert_eq!(Status::classify(Some(&json!(999))).label, "Unknown");
}

// ── Scenarios ───────────────────────────────────────────────────────

fn bob_and_ann() -> Vec<Record> {
    records(vec![
        json!({ "name": "Bob", "email": "b@x.com", "role": "Admin" }),
        json!({ "name": "Ann", "email": "a@x.com", "role": "User" }),
    ])
}

#[test]
fn scenario_query_matches_name_or_email() {
    let filters = FilterSet::new().with("role", "all");
    let out = filter(&bob_and_ann(), "a", &filters, &["name", "email"]);
    assert_eq!(field(&out, "name"), vec!["Bob", "Ann"]);
}

#[test]
fn scenario_role_filter_selects_admin() {
    let filters = FilterSet::new().with("role", "Admin");
    let out = filter(&bob_and_ann(), "", &filters, &["name", "email"]);
    assert_eq!(out, vec![bob_and_ann()[0].clone()]);
}

#[test]
fn scenario_sort_by_id_then_toggle() {
    let rows = records(vec![json!({ "id": 3 }), json!({ "id": 1 }), json!({ "id": 2 })]);
    let mut view = TableView::new(Vec::<String>::new());

    view.click_header("id");
    assert_eq!(field(&view.apply(&rows), "id"), vec!["1", "2", "3"]);

    view.click_header("id");
    assert_eq!(field(&view.apply(&rows), "id"), vec!["3", "2", "1"]);
}

#[test]
fn scenario_null_sorts_first_ascending() {
    let rows = records(vec![json!({ "id": 1, "name": "X" }), json!({ "id": 2, "name": null })]);
    let out = sort(&rows, &SortSpec::new("name", SortDirection::Asc));
    assert_eq!(field(&out, "id"), vec!["2", "1"]);
}

// ── Composition ─────────────────────────────────────────────────────

#[test]
fn pipeline_filters_before_sorting() {
    let rows = inventory();
    let out = query::pipeline(
        &rows,
        "box",
        &FilterSet::new(),
        FIELDS,
        &SortSpec::new("quantity", SortDirection::Desc),
    );
    assert_eq!(field(&out, "name"), vec!["Surgical Mask", "Nitrile Gloves", "Box Splint"]);
}

#[test]
fn missing_category_drops_out_of_category_filter_but_not_all() {
    let rows = inventory();
    let ortho = FilterSet::new().with("categoryName", "Ortho");
    assert_eq!(field(&filter(&rows, "", &ortho, FIELDS), "id"), vec!["6"]);
    let all = FilterSet::new().with("categoryName", "all");
    assert_eq!(filter(&rows, "", &all, FIELDS).len(), rows.len());
}

#[test]
fn distinct_categories_skip_null_and_missing() {
    let rows = inventory();
    assert_eq!(query::distinct_count(&rows, "categoryName"), 3);
    assert_eq!(query::count(&rows), 6);
}

#[test]
fn summary_snapshot() {
    let rows = inventory();
    let mut view = TableView::new(FIELDS.iter().copied());
    view.set_filter("categoryName", "all");
    view.set_query("box");
    let shown = view.apply(&rows);
    insta::assert_json_snapshot!(view.summary(&rows, &shown), @r#"
    {
      "total": 6,
      "shown": 3,
      "distinct": [
        [
          "categoryName",
          2
        ]
      ]
    }
    "#);
}
