// ── Count aggregation ──
//
// Header counters shown above every list: how many rows, how many
// distinct values a categorical column takes, and per-value tallies
// for dashboard breakdowns.

use std::borrow::Borrow;
use std::collections::HashSet;

use indexmap::IndexMap;
use serde::Serialize;
use serde_json::Value;

use crate::model::Record;

/// Number of rows in a displayed sequence.
pub fn count<T>(records: &[T]) -> usize {
    records.len()
}

/// Identity key for distinct counting. Numbers key by numeric value,
/// everything else by its exact JSON form (strings stay case-sensitive).
fn identity(value: &Value) -> String {
    match value {
        Value::Number(n) => match n.as_i64() {
            Some(i) => format!("n:{i}"),
            None => format!("n:{}", n.as_f64().unwrap_or_default()),
        },
        other => format!("v:{other}"),
    }
}

fn present<'a>(record: &'a Record, field: &str) -> Option<&'a Value> {
    record.value(field)
}

/// Cardinality of the set of `field` values across `records`.
///
/// Duplicates collapse; null and missing values are not counted.
pub fn distinct_count<R: Borrow<Record>>(records: &[R], field: &str) -> usize {
    records
        .iter()
        .filter_map(|r| present(r.borrow(), field).map(identity))
        .collect::<HashSet<_>>()
        .len()
}

/// Rows per distinct `field` value, in first-seen order.
pub fn tally<R: Borrow<Record>>(records: &[R], field: &str) -> Vec<(Value, usize)> {
    let mut counts: IndexMap<String, (Value, usize)> = IndexMap::new();
    for record in records {
        if let Some(value) = present(record.borrow(), field) {
            counts
                .entry(identity(value))
                .or_insert_with(|| (value.clone(), 0))
                .1 += 1;
        }
    }
    counts.into_values().collect()
}

/// Counters for one list view.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Summary {
    /// Rows fetched.
    pub total: usize,
    /// Rows left after filtering.
    pub shown: usize,
    /// Distinct values per categorical field, over the shown rows.
    pub distinct: Vec<(String, usize)>,
}

impl Summary {
    pub fn of<R, S>(all: &[R], shown: &[R], fields: &[S]) -> Self
    where
        R: Borrow<Record>,
        S: AsRef<str>,
    {
        Self {
            total: count(all),
            shown: count(shown),
            distinct: fields
                .iter()
                .map(|f| (f.as_ref().to_owned(), distinct_count(shown, f.as_ref())))
                .collect(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    fn lots() -> Vec<Record> {
        [
            json!({ "itemName": "Gauze", "status": 1 }),
            json!({ "itemName": "Saline", "status": 0 }),
            json!({ "itemName": "Gauze", "status": 1.0 }),
            json!({ "itemName": "gauze", "status": null }),
            json!({ "itemName": "Mask" }),
        ]
        .into_iter()
        .map(|v| Record::try_from(v).unwrap())
        .collect()
    }

    #[test]
    fn count_is_length() {
        assert_eq!(count(&lots()), 5);
        assert_eq!(count::<Record>(&[]), 0);
    }

    #[test]
    fn distinct_collapses_duplicates_case_sensitively() {
        assert_eq!(distinct_count(&lots(), "itemName"), 4);
    }

    #[test]
    fn distinct_ignores_null_and_missing() {
        // 1 and 1.0 are the same value.
        assert_eq!(distinct_count(&lots(), "status"), 2);
        assert_eq!(distinct_count(&lots(), "nope"), 0);
    }

    #[test]
    fn tally_counts_in_first_seen_order() {
        let t = tally(&lots(), "status");
        assert_eq!(t, vec![(json!(1), 2), (json!(0), 1)]);
    }

    #[test]
    fn summary_counts_shown_rows() {
        let all = lots();
        let shown: Vec<Record> = all[..2].to_vec();
        let summary = Summary::of(&all, &shown, &["itemName", "status"]);
        assert_eq!(summary.total, 5);
        assert_eq!(summary.shown, 2);
        assert_eq!(
            summary.distinct,
            vec![("itemName".to_owned(), 2), ("status".to_owned(), 2)]
        );
    }
}
