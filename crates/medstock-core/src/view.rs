// ── Table view state ──
//
// The query / filter / sort state a list screen holds between
// keystrokes. Every change is followed by `apply` over the latest
// snapshot; nothing is cached here.

use std::borrow::Borrow;

use serde_json::Value;

use crate::model::Record;
use crate::query::{self, FilterSet, SortSpec, Summary};
use crate::resource::ResourceSpec;

/// Query, filters, and sort for one table.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TableView {
    query: String,
    filters: FilterSet,
    sort: SortSpec,
    search_fields: Vec<String>,
}

impl TableView {
    pub fn new<I, S>(search_fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            search_fields: search_fields.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    /// View over a catalogued resource, with its categorical filters
    /// present and set to "all".
    pub fn for_resource(spec: &ResourceSpec) -> Self {
        Self {
            filters: FilterSet::all_of(spec.categorical),
            ..Self::new(spec.search_fields.iter().copied())
        }
    }

    // ── Query ────────────────────────────────────────────────────────

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn set_query(&mut self, query: impl Into<String>) {
        self.query = query.into();
    }

    pub fn search_fields(&self) -> &[String] {
        &self.search_fields
    }

    // ── Filters ──────────────────────────────────────────────────────

    pub fn filters(&self) -> &FilterSet {
        &self.filters
    }

    pub fn set_filter(&mut self, field: impl Into<String>, value: impl Into<Value>) {
        self.filters.set(field, value);
    }

    pub fn clear_filters(&mut self) {
        self.filters.reset_all();
    }

    // ── Sort ─────────────────────────────────────────────────────────

    pub fn sort_spec(&self) -> &SortSpec {
        &self.sort
    }

    pub fn set_sort(&mut self, spec: SortSpec) {
        self.sort = spec;
    }

    /// Header click on `key`.
    pub fn click_header(&mut self, key: &str) {
        self.sort.toggle(key);
    }

    // ── Evaluation ───────────────────────────────────────────────────

    /// The rows to display: `sort(filter(records))`.
    pub fn apply<R>(&self, records: &[R]) -> Vec<R>
    where
        R: Borrow<Record> + Clone,
    {
        query::pipeline(
            records,
            &self.query,
            &self.filters,
            &self.search_fields,
            &self.sort,
        )
    }

    /// Counters for the current view. Distinct counts cover the view's
    /// filter fields.
    pub fn summary<R: Borrow<Record>>(&self, all: &[R], shown: &[R]) -> Summary {
        let fields: Vec<&str> = self.filters.fields().collect();
        Summary::of(all, shown, &fields)
    }

    /// `true` when neither query nor any filter narrows the rows.
    pub fn is_unfiltered(&self) -> bool {
        query::filter::normalize_query(&self.query).is_empty() && !self.filters.is_active()
    }
}
