// ── Client-side query pipeline ──
//
// `display = sort(filter(records, query, filters, fields), spec)`
//
// Both engines are pure functions over borrowed snapshots and are
// generic over the row handle (`Record`, `&Record`, `Arc<Record>`), so
// callers holding shared snapshots never deep-copy rows.

pub mod aggregate;
pub mod filter;
pub mod sort;

pub use aggregate::{Summary, count, distinct_count, tally};
pub use filter::{ALL, FilterSet, filter};
pub use sort::{SortDirection, SortSpec, compare_values, sort};

use std::borrow::Borrow;

use crate::model::Record;

/// Filter then sort, the order every list view applies them in.
pub fn pipeline<R, S>(
    records: &[R],
    query: &str,
    filters: &FilterSet,
    search_fields: &[S],
    spec: &SortSpec,
) -> Vec<R>
where
    R: Borrow<Record> + Clone,
    S: AsRef<str>,
{
    sort(&filter(records, query, filters, search_fields), spec)
}
