//! One-line bar of categorical filter chips for a table screen.
//!
//! Each chip reads `Title: value`. The field that `Space` cycles is
//! bracketed and highlighted; constrained fields are colored even when
//! not selected.

use ratatui::style::Modifier;
use ratatui::text::{Line, Span};

use medstock_core::{FilterSet, ResourceSpec};

use super::badge;
use crate::theme;

pub fn filter_bar(spec: &ResourceSpec, filters: &FilterSet, active: Option<&str>) -> Line<'static> {
    if spec.categorical.is_empty() {
        return Line::from(Span::styled("  no filters on this screen", theme::key_hint()));
    }

    let mut spans = vec![Span::styled("  ", theme::key_hint())];
    for (i, &field) in spec.categorical.iter().enumerate() {
        if i > 0 {
            spans.push(Span::styled("  ", theme::key_hint()));
        }
        let title = spec.column(field).map_or(field, |c| c.title);
        let value = filters.get(field);
        let chip = format!("{title}: {}", badge::value_text(field, &value));
        let constrained = filters.active().any(|(f, _)| f == field);

        let span = if active == Some(field) {
            Span::styled(
                format!("[{chip}]"),
                theme::tab_active().add_modifier(Modifier::BOLD),
            )
        } else if constrained {
            Span::styled(chip, theme::key_hint_key())
        } else {
            Span::styled(chip, theme::tab_inactive())
        };
        spans.push(span);
    }

    Line::from(spans)
}
