// ── Sort engine ──
//
// Single-column stable sort over dynamic JSON fields, plus the header
// click toggle. Null and missing values are the lowest value of every
// column, so they lead on ascending and trail on descending.

use std::borrow::Borrow;
use std::cmp::Ordering;

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use strum::{Display, EnumString};

use crate::model::Record;

/// Sort direction.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    pub fn flipped(self) -> Self {
        match self {
            Self::Asc => Self::Desc,
            Self::Desc => Self::Asc,
        }
    }

    /// Orient an ascending comparison result.
    pub fn apply(self, ordering: Ordering) -> Ordering {
        match self {
            Self::Asc => ordering,
            Self::Desc => ordering.reverse(),
        }
    }

    pub fn arrow(self) -> &'static str {
        match self {
            Self::Asc => "▲",
            Self::Desc => "▼",
        }
    }
}

/// Active sort column and direction. `key: None` leaves input order alone.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortSpec {
    pub key: Option<String>,
    pub direction: SortDirection,
}

impl SortSpec {
    pub fn new(key: impl Into<String>, direction: SortDirection) -> Self {
        Self {
            key: Some(key.into()),
            direction,
        }
    }

    /// The pass-through spec, `{ key: None, direction: Asc }`.
    pub fn unsorted() -> Self {
        Self::default()
    }

    pub fn is_sorted_by(&self, key: &str) -> bool {
        self.key.as_deref() == Some(key)
    }

    /// Spec after clicking the header for `clicked`.
    ///
    /// Clicking the active ascending column flips it to descending; any
    /// other click (a new column, or the active column while descending)
    /// sorts `clicked` ascending.
    pub fn toggled(&self, clicked: &str) -> Self {
        let direction = if self.is_sorted_by(clicked) && self.direction == SortDirection::Asc {
            SortDirection::Desc
        } else {
            SortDirection::Asc
        };
        Self::new(clicked, direction)
    }

    pub fn toggle(&mut self, clicked: &str) {
        *self = self.toggled(clicked);
    }
}

// ── Comparator ───────────────────────────────────────────────────────

/// Ordering key for one field value.
///
/// Variant order is the cross-type rank. A string that reads as a date
/// keeps its raw text: it only compares chronologically against another
/// date, and lexically against any other string.
#[derive(Debug)]
enum SortKey<'a> {
    Missing,
    Bool(bool),
    Number(f64),
    Date(NaiveDateTime, &'a str),
    Text(&'a str),
    Nested,
}

impl SortKey<'_> {
    fn rank(&self) -> u8 {
        match self {
            Self::Missing => 0,
            Self::Bool(_) => 1,
            Self::Number(_) => 2,
            Self::Date(..) | Self::Text(_) => 3,
            Self::Nested => 4,
        }
    }
}

impl<'a> SortKey<'a> {
    fn of(value: Option<&'a Value>) -> Self {
        match value {
            None | Some(Value::Null) => Self::Missing,
            Some(Value::Bool(b)) => Self::Bool(*b),
            Some(Value::Number(n)) => n.as_f64().map_or(Self::Missing, Self::Number),
            Some(Value::String(s)) => match parse_date(s) {
                Some(date) => Self::Date(date, s.as_str()),
                None => Self::Text(s.as_str()),
            },
            Some(Value::Array(_) | Value::Object(_)) => Self::Nested,
        }
    }
}

impl Ord for SortKey<'_> {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Self::Bool(a), Self::Bool(b)) => a.cmp(b),
            (Self::Number(a), Self::Number(b)) => a.total_cmp(b),
            (Self::Date(a, _), Self::Date(b, _)) => a.cmp(b),
            (Self::Text(a) | Self::Date(_, a), Self::Text(b) | Self::Date(_, b)) => a.cmp(b),
            _ => self.rank().cmp(&other.rank()),
        }
    }
}

impl PartialOrd for SortKey<'_> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for SortKey<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for SortKey<'_> {}

/// Read a date-like string: RFC 3339, ISO datetime without offset
/// (`T` or space separated), or a bare `YYYY-MM-DD`.
fn parse_date(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();
    if s.len() < 10 || !s.as_bytes().first().is_some_and(u8::is_ascii_digit) {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.naive_utc());
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, format) {
            return Some(dt);
        }
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .map(|d| d.and_time(NaiveTime::MIN))
}

/// Ascending three-way comparison of two field values.
///
/// Numbers compare numerically, booleans `false < true`, strings
/// lexicographically unless both read as dates (then chronologically).
/// Null and missing are lowest. Values of different kinds order by kind.
pub fn compare_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    SortKey::of(a).cmp(&SortKey::of(b))
}

// ── Engine ───────────────────────────────────────────────────────────

/// Records ordered by `spec`. Stable in both directions: records with
/// equal keys keep their input order.
pub fn sort<R>(records: &[R], spec: &SortSpec) -> Vec<R>
where
    R: Borrow<Record> + Clone,
{
    let Some(key) = spec.key.as_deref() else {
        return records.to_vec();
    };

    let mut keyed: Vec<(SortKey<'_>, &R)> = records
        .iter()
        .map(|r| {
            let record: &Record = Borrow::borrow(r);
            (SortKey::of(record.get(key)), r)
        })
        .collect();
    // `sort_by` is stable; descending reverses the comparator, not the output.
    keyed.sort_by(|(a, _), (b, _)| spec.direction.apply(a.cmp(b)));
    keyed.into_iter().map(|(_, r)| r.clone()).collect()
}
