// ── Role / status classification ──
//
// Categorical codes arrive as integers, numeric strings, or names.
// Each table maps them to a fixed label and display tone; anything
// outside the table becomes `Unknown` (muted) instead of an error.

use serde::Serialize;
use serde_json::Value;
use strum::{Display, EnumIter, EnumString, IntoEnumIterator};

/// Display tone of a classified value. Front ends map tones to colors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Display, EnumIter)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Tone {
    Success,
    Warning,
    Danger,
    Info,
    Accent,
    Muted,
}

/// Label and tone for one raw code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Classification {
    pub label: &'static str,
    pub tone: Tone,
}

impl Classification {
    pub const UNKNOWN: Self = Self {
        label: "Unknown",
        tone: Tone::Muted,
    };
}

/// A closed table of categorical codes.
pub trait CodeTable: Copy + IntoEnumIterator + 'static {
    fn code(self) -> i64;
    fn label(self) -> &'static str;
    fn tone(self) -> Tone;

    fn from_code(code: i64) -> Option<Self> {
        Self::iter().find(|v| v.code() == code)
    }

    fn from_label(name: &str) -> Option<Self> {
        let name = name.trim();
        Self::iter().find(|v| v.label().eq_ignore_ascii_case(name))
    }

    /// Read a raw field value: an integer (or integral float), a numeric
    /// string, or a label in any ASCII case.
    fn from_value(raw: &Value) -> Option<Self> {
        match raw {
            Value::Number(n) => n
                .as_i64()
                .or_else(|| {
                    n.as_f64()
                        .filter(|f| f.fract() == 0.0)
                        .and_then(|f| format!("{f:.0}").parse().ok())
                })
                .and_then(Self::from_code),
            Value::String(s) => match s.trim().parse::<i64>() {
                Ok(code) => Self::from_code(code),
                Err(_) => Self::from_label(s),
            },
            _ => None,
        }
    }

    fn classification(self) -> Classification {
        Classification {
            label: self.label(),
            tone: self.tone(),
        }
    }

    /// Total mapping: unknown or missing codes classify as `Unknown`.
    fn classify(raw: Option<&Value>) -> Classification {
        raw.and_then(Self::from_value)
            .map_or(Classification::UNKNOWN, Self::classification)
    }
}

// ── Tables ───────────────────────────────────────────────────────────

/// Account role.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Display, EnumIter, EnumString,
)]
#[strum(ascii_case_insensitive)]
pub enum Role {
    Admin,
    Manager,
    Staff,
    Supplier,
    Customer,
}

impl CodeTable for Role {
    fn code(self) -> i64 {
        match self {
            Self::Admin => 1,
            Self::Manager => 2,
            Self::Staff => 3,
            Self::Supplier => 4,
            Self::Customer => 5,
        }
    }

    fn label(self) -> &'static str {
        match self {
            Self::Admin => "Admin",
            Self::Manager => "Manager",
            Self::Staff => "Staff",
            Self::Supplier => "Supplier",
            Self::Customer => "Customer",
        }
    }

    fn tone(self) -> Tone {
        match self {
            Self::Admin => Tone::Danger,
            Self::Manager => Tone::Accent,
            Self::Staff => Tone::Info,
            Self::Supplier => Tone::Warning,
            Self::Customer => Tone::Success,
        }
    }
}

/// Workflow status shared by accounts, storages, lots, and requests.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Display, EnumIter, EnumString,
)]
#[strum(ascii_case_insensitive)]
pub enum Status {
    Pending,
    Approved,
    Rejected,
    Completed,
    Cancelled,
}

impl CodeTable for Status {
    fn code(self) -> i64 {
        match self {
            Self::Pending => 0,
            Self::Approved => 1,
            Self::Rejected => 2,
            Self::Completed => 3,
            Self::Cancelled => 4,
        }
    }

    fn label(self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::Approved => "Approved",
            Self::Rejected => "Rejected",
            Self::Completed => "Completed",
            Self::Cancelled => "Cancelled",
        }
    }

    fn tone(self) -> Tone {
        match self {
            Self::Pending => Tone::Warning,
            Self::Approved => Tone::Success,
            Self::Rejected => Tone::Danger,
            Self::Completed => Tone::Info,
            Self::Cancelled => Tone::Muted,
        }
    }
}

/// Inventory transaction type on lot requests.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Display, EnumIter, EnumString,
)]
#[strum(ascii_case_insensitive)]
pub enum TransactionKind {
    Import,
    Export,
    Transfer,
    Adjustment,
}

impl CodeTable for TransactionKind {
    fn code(self) -> i64 {
        match self {
            Self::Import => 0,
            Self::Export => 1,
            Self::Transfer => 2,
            Self::Adjustment => 3,
        }
    }

    fn label(self) -> &'static str {
        match self {
            Self::Import => "Import",
            Self::Export => "Export",
            Self::Transfer => "Transfer",
            Self::Adjustment => "Adjustment",
        }
    }

    fn tone(self) -> Tone {
        match self {
            Self::Import => Tone::Success,
            Self::Export => Tone::Accent,
            Self::Transfer => Tone::Info,
            Self::Adjustment => Tone::Warning,
        }
    }
}

// ── Field dispatch ───────────────────────────────────────────────────

/// Which table classifies a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter)]
pub enum Classifier {
    Role,
    Status,
    TransactionKind,
}

impl Classifier {
    /// Table for a field name (`role`, `status`, `type`), if any.
    pub fn for_field(field: &str) -> Option<Self> {
        match field {
            "role" => Some(Self::Role),
            "status" => Some(Self::Status),
            "type" => Some(Self::TransactionKind),
            _ => None,
        }
    }

    pub fn classify(self, raw: Option<&Value>) -> Classification {
        match self {
            Self::Role => Role::classify(raw),
            Self::Status => Status::classify(raw),
            Self::TransactionKind => TransactionKind::classify(raw),
        }
    }

    /// Every declared `(code, label)` pair, in table order.
    pub fn entries(self) -> Vec<(i64, &'static str)> {
        fn collect<T: CodeTable>() -> Vec<(i64, &'static str)> {
            T::iter().map(|v| (v.code(), v.label())).collect()
        }
        match self {
            Self::Role => collect::<Role>(),
            Self::Status => collect::<Status>(),
            Self::TransactionKind => collect::<TransactionKind>(),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use serde_json::json;

    use super::*;

    fn assert_table_is_total<T: CodeTable + std::fmt::Debug>() {
        let mut codes = HashSet::new();
        let mut labels = HashSet::new();
        for variant in T::iter() {
            assert!(codes.insert(variant.code()), "duplicate code {variant:?}");
            assert!(labels.insert(variant.label()), "duplicate label {variant:?}");
            assert_eq!(T::from_code(variant.code()).map(T::code), Some(variant.code()));
            let by_code = T::classify(Some(&json!(variant.code())));
            assert_eq!(by_code.label, variant.label());
            assert_eq!(by_code.tone, variant.tone());
            let by_name = T::classify(Some(&json!(variant.label().to_uppercase())));
            assert_eq!(by_name.label, variant.label());
        }
    }

    #[test]
    fn every_table_maps_every_variant() {
        assert_table_is_total::<Role>();
        assert_table_is_total::<Status>();
        assert_table_is_total::<TransactionKind>();
    }

    #[test]
    fn documented_role_labels() {
        let labels: Vec<_> = (1..=5)
            .map(|code| Role::classify(Some(&json!(code))).label)
            .collect();
        assert_eq!(
            labels,
            vec!["Admin", "Manager", "Staff", "Supplier", "Customer"]
        );
    }

    #[test]
    fn documented_status_labels() {
        let labels: Vec<_> = (0..=4)
            .map(|code| Status::classify(Some(&json!(code))).label)
            .collect();
        assert_eq!(
            labels,
            vec!["Pending", "Approved", "Rejected", "Completed", "Cancelled"]
        );
    }

    #[test]
    fn unknown_codes_fall_back() {
        for raw in [
            json!(999),
            json!(-1),
            json!("999"),
            json!("superuser"),
            json!(1.5),
            json!(null),
            json!(true),
            json!([1]),
        ] {
            assert_eq!(Role::classify(Some(&raw)), Classification::UNKNOWN, "{raw}");
        }
        assert_eq!(Status::classify(None), Classification::UNKNOWN);
    }

    #[test]
    fn numeric_strings_and_integral_floats_are_codes() {
        assert_eq!(Status::classify(Some(&json!(" 2 "))).label, "Rejected");
        assert_eq!(Status::classify(Some(&json!(3.0))).label, "Completed");
    }

    #[test]
    fn classifier_dispatch_by_field() {
        assert_eq!(Classifier::for_field("role"), Some(Classifier::Role));
        assert_eq!(Classifier::for_field("type"), Some(Classifier::TransactionKind));
        assert_eq!(Classifier::for_field("name"), None);
        assert_eq!(
            Classifier::TransactionKind.classify(Some(&json!("export"))),
            Classification {
                label: "Export",
                tone: Tone::Accent
            }
        );
        assert_eq!(Classifier::Status.entries().len(), 5);
    }

    #[test]
    fn enum_names_parse_like_labels() {
        assert_eq!("manager".parse::<Role>().ok(), Some(Role::Manager));
        assert_eq!(Role::Manager.to_string(), Role::Manager.label());
    }
}
