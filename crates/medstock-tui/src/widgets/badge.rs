//! Cell rendering: classified codes become colored badges, everything
//! else prints as plain text.

use ratatui::style::Style;
use ratatui::text::{Line, Span};
use serde_json::Value;

use medstock_core::query::ALL;
use medstock_core::{Classification, Classifier, Column, Record};

use crate::theme;

const EMPTY: &str = "─";

/// Tone-colored label for a classified code.
pub fn badge(class: Classification) -> Span<'static> {
    Span::styled(
        format!("● {}", class.label),
        Style::default().fg(theme::tone_color(class.tone)),
    )
}

/// One table cell for `column` of `record`.
pub fn cell_line(record: &Record, column: &Column) -> Line<'static> {
    match (column.classifier(), record.value(column.key)) {
        (_, None) => Line::from(Span::styled(EMPTY, theme::empty_cell())),
        (Some(classifier), Some(raw)) => Line::from(badge(classifier.classify(Some(raw)))),
        (None, Some(_)) => Line::from(Span::styled(record.display(column.key), theme::table_row())),
    }
}

/// Short text for a filter value: the code label for classified fields,
/// strings unquoted, `all` for the sentinel.
pub fn value_text(field: &str, value: &Value) -> String {
    match (value, Classifier::for_field(field)) {
        (Value::String(s), _) if s == ALL => ALL.to_owned(),
        (_, Some(classifier)) => classifier.classify(Some(value)).label.to_owned(),
        (Value::String(s), None) => s.clone(),
        (other, None) => other.to_string(),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use medstock_core::{Resource, resource};

    use super::*;

    fn text(line: &Line<'_>) -> String {
        line.spans.iter().map(|s| s.content.as_ref()).collect()
    }

    #[test]
    fn status_cells_show_labels() {
        let spec = resource::spec(Resource::ItemLots);
        let status = spec.column("status").unwrap();
        let record = Record::try_from(json!({ "status": "1" })).unwrap();
        assert_eq!(text(&cell_line(&record, status)), "● Approved");

        let record = Record::try_from(json!({ "status": 999 })).unwrap();
        assert_eq!(text(&cell_line(&record, status)), "● Unknown");
    }

    #[test]
    fn missing_values_render_a_dash() {
        let spec = resource::spec(Resource::Items);
        let record = Record::try_from(json!({ "name": "Gauze", "unit": null })).unwrap();
        assert_eq!(text(&cell_line(&record, spec.column("unit").unwrap())), EMPTY);
        assert_eq!(text(&cell_line(&record, spec.column("name").unwrap())), "Gauze");
    }

    #[test]
    fn filter_values_read_naturally() {
        assert_eq!(value_text("status", &json!(ALL)), "all");
        assert_eq!(value_text("status", &json!(2)), "Rejected");
        assert_eq!(value_text("categoryName", &json!("PPE")), "PPE");
        assert_eq!(value_text("quantity", &json!(12)), "12");
    }
}
