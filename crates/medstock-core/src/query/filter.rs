// ── Filter engine ──
//
// Free-text search across a screen's searchable fields (OR), combined
// with strict-equality categorical filters (AND). Pure: never reorders,
// never mutates, never fails on odd field types.

use std::borrow::{Borrow, Cow};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::CoreError;
use crate::model::Record;

/// Filter value meaning "no constraint on this field".
pub const ALL: &str = "all";

/// Selected value per categorical field, in insertion order.
///
/// A field set to [`ALL`] (or never set) does not constrain results.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FilterSet(IndexMap<String, Value>);

impl FilterSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// A set with every listed field present and unconstrained.
    pub fn all_of<S: AsRef<str>>(fields: &[S]) -> Self {
        Self(
            fields
                .iter()
                .map(|f| (f.as_ref().to_owned(), Value::from(ALL)))
                .collect(),
        )
    }

    pub fn set(&mut self, field: impl Into<String>, value: impl Into<Value>) {
        self.0.insert(field.into(), value.into());
    }

    /// Builder form of [`set`](Self::set).
    pub fn with(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set(field, value);
        self
    }

    /// Put `field` back to [`ALL`], keeping its position.
    pub fn reset(&mut self, field: &str) {
        if let Some(value) = self.0.get_mut(field) {
            *value = Value::from(ALL);
        }
    }

    pub fn reset_all(&mut self) {
        for value in self.0.values_mut() {
            *value = Value::from(ALL);
        }
    }

    /// Selected value for `field`; [`ALL`] when unset.
    pub fn get(&self, field: &str) -> Cow<'_, Value> {
        self.0
            .get(field)
            .map_or_else(|| Cow::Owned(Value::from(ALL)), Cow::Borrowed)
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// The constraining `(field, value)` pairs, skipping [`ALL`].
    pub fn active(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.0
            .iter()
            .filter(|(_, v)| !is_all(v))
            .map(|(k, v)| (k.as_str(), v))
    }

    pub fn is_active(&self) -> bool {
        self.active().next().is_some()
    }

    /// Parse a `field=value` assignment from the command line or the TUI.
    ///
    /// The value is read as a JSON scalar when it is one (`status=1`
    /// yields the number 1, `cold=true` a boolean, `name="1"` the string
    /// "1") and otherwise taken verbatim as a string (`role=Admin`).
    pub fn parse_assignment(raw: &str) -> Result<(String, Value), CoreError> {
        let (field, value) = raw
            .split_once('=')
            .ok_or_else(|| CoreError::ValidationFailed {
                message: format!("expected FIELD=VALUE, got '{raw}'"),
            })?;
        let field = field.trim();
        if field.is_empty() {
            return Err(CoreError::ValidationFailed {
                message: format!("missing field name in '{raw}'"),
            });
        }

        let value = match serde_json::from_str::<Value>(value) {
            Ok(v @ (Value::Number(_) | Value::Bool(_) | Value::String(_) | Value::Null)) => v,
            _ => Value::from(value),
        };
        Ok((field.to_owned(), value))
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for FilterSet {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

fn is_all(value: &Value) -> bool {
    value.as_str() == Some(ALL)
}

// ── Predicates ───────────────────────────────────────────────────────

/// Trim and lower-case a query the way every comparison expects it.
pub fn normalize_query(query: &str) -> String {
    query.trim().to_lowercase()
}

/// String form used for free-text matching.
///
/// Numbers and booleans are coerced; null, arrays and objects have no
/// text form and never match.
pub fn searchable_text(value: &Value) -> Option<Cow<'_, str>> {
    match value {
        Value::String(s) => Some(Cow::Borrowed(s)),
        Value::Number(n) => Some(Cow::Owned(n.to_string())),
        Value::Bool(b) => Some(Cow::Borrowed(if *b { "true" } else { "false" })),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

/// Text predicate. `normalized` must come from [`normalize_query`].
pub fn matches_query<S: AsRef<str>>(record: &Record, normalized: &str, search_fields: &[S]) -> bool {
    if normalized.is_empty() {
        return true;
    }
    search_fields.iter().any(|field| {
        record
            .get(field.as_ref())
            .and_then(searchable_text)
            .is_some_and(|text| text.to_lowercase().contains(normalized))
    })
}

/// Categorical predicate: every active filter must equal the field exactly.
pub fn matches_filters(record: &Record, filters: &FilterSet) -> bool {
    filters.active().all(|(field, selected)| {
        record
            .get(field)
            .is_some_and(|value| values_equal(value, selected))
    })
}

/// Strict equality. No case folding, no string/number coercion; numbers
/// compare by numeric value so `1` equals `1.0`.
pub fn values_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => match (x.as_i64(), y.as_i64()) {
            (Some(x), Some(y)) => x == y,
            _ => x.as_f64() == y.as_f64(),
        },
        _ => a == b,
    }
}

// ── Engine ───────────────────────────────────────────────────────────

/// Records matching the query on any search field and every active filter,
/// in input order.
pub fn filter<R, S>(records: &[R], query: &str, filters: &FilterSet, search_fields: &[S]) -> Vec<R>
where
    R: Borrow<Record> + Clone,
    S: AsRef<str>,
{
    let normalized = normalize_query(query);
    records
        .iter()
        .filter(|r| {
            let record: &Record = Borrow::borrow(*r);
            matches_query(record, &normalized, search_fields) && matches_filters(record, filters)
        })
        .cloned()
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    fn rec(value: Value) -> Record {
        Record::try_from(value).unwrap()
    }

    fn people() -> Vec<Record> {
        vec![
            rec(json!({ "name": "Bob", "email": "b@x.com", "role": "Admin", "status": 1 })),
            rec(json!({ "name": "Ann", "email": "a@x.com", "role": "User", "status": 0 })),
            rec(json!({ "name": "Cyd", "email": "c@y.org", "role": "User", "status": 1 })),
        ]
    }

    #[test]
    fn empty_input_yields_empty_output() {
        let out = filter::<Record, &str>(&[], "x", &FilterSet::new(), &["name"]);
        assert!(out.is_empty());
    }

    #[test]
    fn query_is_trimmed_and_case_folded() {
        let out = filter(&people(), "  BOB ", &FilterSet::new(), &["name"]);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].display("name"), "Bob");
    }

    #[test]
    fn any_search_field_may_match() {
        let out = filter(&people(), "y.org", &FilterSet::new(), &["name", "email"]);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].display("name"), "Cyd");
    }

    #[test]
    fn only_configured_fields_participate() {
        let out = filter(&people(), "admin", &FilterSet::new(), &["name", "email"]);
        assert!(out.is_empty());
    }

    #[test]
    fn numbers_and_booleans_are_coerced_to_text() {
        let records = vec![
            rec(json!({ "lot": 4521, "cold": true })),
            rec(json!({ "lot": 17, "cold": false })),
        ];
        let out = filter(&records, "452", &FilterSet::new(), &["lot"]);
        assert_eq!(out.len(), 1);
        let out = filter(&records, "TRUE", &FilterSet::new(), &["cold"]);
        assert_eq!(out.len(), 1);
    }

    #[test]
    fn null_missing_and_nested_never_match_text() {
        let records = vec![
            rec(json!({ "name": null })),
            rec(json!({})),
            rec(json!({ "name": ["null"] })),
        ];
        let out = filter(&records, "null", &FilterSet::new(), &["name"]);
        assert!(out.is_empty());
    }

    #[test]
    fn empty_query_matches_records_without_search_fields() {
        let records = vec![rec(json!({})), rec(json!({ "name": null }))];
        let out = filter(&records, "   ", &FilterSet::new(), &["name"]);
        assert_eq!(out.len(), 2);
    }

    #[test]
    fn categorical_filters_are_strict_and_anded() {
        let filters = FilterSet::new().with("role", "User").with("status", 1);
        let out = filter(&people(), "", &filters, &["name"]);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].display("name"), "Cyd");

        let lowercase = FilterSet::new().with("role", "user");
        assert!(filter(&people(), "", &lowercase, &["name"]).is_empty());

        let stringly = FilterSet::new().with("status", "1");
        assert!(filter(&people(), "", &stringly, &["name"]).is_empty());
    }

    #[test]
    fn all_sentinel_is_no_constraint() {
        let filters = FilterSet::all_of(&["role", "status"]);
        assert!(!filters.is_active());
        assert_eq!(filter(&people(), "", &filters, &["name"]).len(), 3);
    }

    #[test]
    fn missing_categorical_field_is_excluded() {
        let records = vec![rec(json!({ "name": "x" })), rec(json!({ "name": "y", "role": "Admin" }))];
        let filters = FilterSet::new().with("role", "Admin");
        let out = filter(&records, "", &filters, &["name"]);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].display("name"), "y");
    }

    #[test]
    fn numeric_filters_ignore_integer_float_representation() {
        let records = vec![rec(json!({ "status": 2.0 })), rec(json!({ "status": 3 }))];
        let filters = FilterSet::new().with("status", 2);
        assert_eq!(filter(&records, "", &filters, &["name"]).len(), 1);
    }

    #[test]
    fn reset_keeps_field_but_unconstrains() {
        let mut filters = FilterSet::new().with("role", "Admin").with("status", 1);
        filters.reset("role");
        assert_eq!(filters.get("role").as_ref(), &json!("all"));
        assert_eq!(filters.active().count(), 1);
        filters.reset_all();
        assert!(!filters.is_active());
        assert_eq!(filters.fields().collect::<Vec<_>>(), vec!["role", "status"]);
    }

    #[test]
    fn unset_field_reads_as_all() {
        assert_eq!(FilterSet::new().get("role").as_ref(), &json!("all"));
    }

    #[test]
    fn parse_assignment_reads_json_scalars() {
        assert_eq!(
            FilterSet::parse_assignment("status=1").unwrap(),
            ("status".to_owned(), json!(1))
        );
        assert_eq!(
            FilterSet::parse_assignment("role=Admin").unwrap(),
            ("role".to_owned(), json!("Admin"))
        );
        assert_eq!(
            FilterSet::parse_assignment("code=\"1\"").unwrap(),
            ("code".to_owned(), json!("1"))
        );
        assert_eq!(
            FilterSet::parse_assignment("cold=true").unwrap(),
            ("cold".to_owned(), json!(true))
        );
        assert_eq!(
            FilterSet::parse_assignment("note=a=b").unwrap(),
            ("note".to_owned(), json!("a=b"))
        );
    }

    #[test]
    fn parse_assignment_rejects_malformed_input() {
        assert!(FilterSet::parse_assignment("role").is_err());
        assert!(FilterSet::parse_assignment("=Admin").is_err());
    }
}
