//! Table screen shared by every resource.
//!
//! Free-text search, categorical filter chips, header-click sorting, and
//! a detail panel, all driven by one core `TableView` per screen.

use std::sync::Arc;

use color_eyre::eyre::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};
use ratatui::Frame;
use ratatui::layout::{Constraint, Flex, Layout, Rect};
use ratatui::style::Style;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Borders, Cell, Paragraph, Row, Table, TableState};
use serde_json::Value;

use medstock_core::query::{self, ALL, filter::values_equal};
use medstock_core::{Classifier, Record, Resource, ResourceSpec, TableView, resource};

use crate::action::{Action, Notification, Rows};
use crate::component::Component;
use crate::theme;
use crate::widgets::{badge, filter_bar};

const PAGE: isize = 10;
const SCROLL: isize = 3;
const COLUMN_SPACING: u16 = 1;

#[derive(Debug, Clone, PartialEq, Eq)]
enum LoadState {
    Loading,
    Ready,
    Failed(String),
}

pub struct RecordsScreen {
    spec: &'static ResourceSpec,
    focused: bool,
    rows: Rows,
    view: TableView,
    shown: Vec<Arc<Record>>,
    table_state: TableState,
    /// Column under the header cursor; `s` sorts by it.
    column: usize,
    /// Index into the categorical fields; `Space` cycles its value.
    filter_field: usize,
    detail_open: bool,
    load: LoadState,
    /// Table area from the last render, for mouse hit-testing.
    table_area: std::cell::Cell<Rect>,
    table_offset: std::cell::Cell<usize>,
}

impl RecordsScreen {
    pub fn new(resource: Resource) -> Self {
        let spec = resource::spec(resource);
        Self {
            spec,
            focused: false,
            rows: Rows::default(),
            view: TableView::for_resource(spec),
            shown: Vec::new(),
            table_state: TableState::default().with_selected(Some(0)),
            column: 0,
            filter_field: 0,
            detail_open: false,
            load: LoadState::Loading,
            table_area: std::cell::Cell::new(Rect::default()),
            table_offset: std::cell::Cell::new(0),
        }
    }

    fn recompute(&mut self) {
        self.shown = self.view.apply(self.rows.as_slice());
        self.clamp_selection();
    }

    // ── Selection ────────────────────────────────────────────────────

    fn selected_index(&self) -> usize {
        self.table_state.selected().unwrap_or(0)
    }

    fn selected(&self) -> Option<&Arc<Record>> {
        self.shown.get(self.selected_index())
    }

    fn select(&mut self, idx: usize) {
        let clamped = idx.min(self.shown.len().saturating_sub(1));
        self.table_state.select(Some(clamped));
    }

    fn clamp_selection(&mut self) {
        self.select(self.selected_index());
    }

    fn move_selection(&mut self, delta: isize) {
        if self.shown.is_empty() {
            return;
        }
        self.select(self.selected_index().saturating_add_signed(delta));
    }

    // ── Sorting ──────────────────────────────────────────────────────

    fn move_column(&mut self, delta: isize) {
        let last = self.spec.columns.len().saturating_sub(1);
        self.column = self.column.saturating_add_signed(delta).min(last);
    }

    /// Header click on column `idx`.
    fn sort_column(&mut self, idx: usize) {
        if let Some(column) = self.spec.columns.get(idx) {
            self.column = idx;
            self.view.click_header(column.key);
            self.recompute();
        }
    }

    // ── Filters ──────────────────────────────────────────────────────

    fn active_filter_field(&self) -> Option<&'static str> {
        self.spec.categorical.get(self.filter_field).copied()
    }

    fn cycle_filter_field(&mut self) -> Option<Action> {
        let count = self.spec.categorical.len();
        if count == 0 {
            return Some(Action::Notify(Notification::info(format!(
                "No filters on {}",
                self.spec.resource.label()
            ))));
        }
        self.filter_field = (self.filter_field + 1) % count;
        None
    }

    /// `all` followed by every distinct value of `field` in the fetched
    /// rows, in ascending sort order.
    fn filter_choices(&self, field: &str) -> Vec<Value> {
        let mut values: Vec<Value> = query::tally(self.rows.as_slice(), field)
            .into_iter()
            .map(|(value, _)| value)
            .collect();
        values.sort_by(|a, b| query::compare_values(Some(a), Some(b)));
        std::iter::once(Value::from(ALL)).chain(values).collect()
    }

    fn cycle_filter_value(&mut self) {
        let Some(field) = self.active_filter_field() else {
            return;
        };
        let choices = self.filter_choices(field);
        let idx = {
            let current = self.view.filters().get(field);
            choices
                .iter()
                .position(|v| values_equal(v, &current))
                .unwrap_or(0)
        };
        let next = choices
            .get((idx + 1) % choices.len())
            .cloned()
            .unwrap_or_else(|| Value::from(ALL));
        self.view.set_filter(field, next);
        self.recompute();
        self.select(0);
    }

    // ── Writes ───────────────────────────────────────────────────────

    fn request_delete(&self) -> Option<Action> {
        let resource = self.spec.resource;
        if !resource.is_writable() {
            return Some(Action::Notify(Notification::warning(format!(
                "{} are read-only",
                resource.label()
            ))));
        }
        let record = self.selected()?;
        let Some(id) = record.id() else {
            return Some(Action::Notify(Notification::error("Selected record has no id")));
        };
        Some(Action::RequestDelete {
            resource,
            id,
            name: record_name(record),
        })
    }

    // ── Mouse ────────────────────────────────────────────────────────

    fn click(&mut self, x: u16, y: u16) {
        let area = self.table_area.get();
        if area.width == 0 || x < area.x || x >= area.right() || y < area.y || y >= area.bottom() {
            return;
        }
        if y == area.y {
            if let Some(idx) = column_at(area, &column_widths(self.spec), x) {
                self.sort_column(idx);
            }
        } else {
            let row = self.table_offset.get() + usize::from(y - area.y - 1);
            if row < self.shown.len() {
                self.select(row);
            }
        }
    }

    // ── Rendering ────────────────────────────────────────────────────

    fn bar_line(&self) -> Line<'static> {
        let mut line = filter_bar::filter_bar(self.spec, self.view.filters(), self.active_filter_field());
        let summary = self.view.summary(self.rows.as_slice(), self.shown.as_slice());
        for (field, n) in summary.distinct {
            line.spans
                .push(Span::styled(format!("   {n} distinct {field}"), theme::key_hint()));
        }
        if !self.view.query().is_empty() {
            line.spans.push(Span::styled(
                format!("   / {}", self.view.query()),
                Style::default().fg(theme::ELECTRIC_PURPLE),
            ));
        }
        line
    }

    fn render_table(&self, frame: &mut Frame, area: Rect) {
        self.table_area.set(area);
        let sort = self.view.sort_spec();

        let header = Row::new(self.spec.columns.iter().enumerate().map(|(i, column)| {
            let text = if sort.is_sorted_by(column.key) {
                format!("{} {}", column.title, sort.direction.arrow())
            } else {
                column.title.to_owned()
            };
            let style = if i == self.column {
                theme::table_header_cursor()
            } else {
                theme::table_header()
            };
            Cell::from(text).style(style)
        }));

        let rows = self.shown.iter().map(|record| {
            Row::new(
                self.spec
                    .columns
                    .iter()
                    .map(|column| Cell::from(badge::cell_line(record, column))),
            )
            .style(theme::table_row())
        });

        let table = Table::new(rows, column_widths(self.spec))
            .header(header)
            .column_spacing(COLUMN_SPACING)
            .flex(Flex::Start)
            .row_highlight_style(theme::table_selected());

        let mut state = self.table_state;
        frame.render_stateful_widget(table, area, &mut state);
        self.table_offset.set(state.offset());

        if self.shown.is_empty() && area.height > 1 {
            let noun = self.spec.resource.label().to_lowercase();
            let message = match &self.load {
                LoadState::Loading => Span::styled("  Loading…", theme::key_hint()),
                LoadState::Failed(e) => Span::styled(
                    format!("  Could not load {noun}: {e}"),
                    Style::default().fg(theme::ERROR_RED),
                ),
                LoadState::Ready if self.rows.is_empty() => {
                    Span::styled(format!("  No {noun} yet"), theme::key_hint())
                }
                LoadState::Ready => Span::styled(format!("  No {noun} match"), theme::key_hint()),
            };
            let body = Rect {
                y: area.y + 1,
                height: area.height - 1,
                ..area
            };
            frame.render_widget(Paragraph::new(Line::from(message)), body);
        }
    }

    fn render_detail(frame: &mut Frame, area: Rect, record: &Record) {
        let block = Block::default()
            .title(format!(" {} ", record_name(record)))
            .title_style(theme::title_style())
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(theme::border_focused());
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let width = record.fields().map(str::len).max().unwrap_or(0).min(20);
        let lines: Vec<Line> = record
            .iter()
            .map(|(field, value)| {
                Line::from(vec![
                    Span::styled(format!(" {field:<width$}  "), Style::default().fg(theme::DIM_WHITE)),
                    detail_value(field, value),
                ])
            })
            .collect();
        frame.render_widget(Paragraph::new(lines), inner);
    }

    fn hints(&self) -> Line<'static> {
        let mut pairs = vec![
            ("/", "search"),
            ("f", "field"),
            ("Space", "value"),
            ("c", "clear"),
            ("←→", "column"),
            ("s", "sort"),
            ("Enter", "detail"),
        ];
        if self.spec.resource.is_writable() {
            pairs.push(("d", "delete"));
        }
        pairs.push(("r", "refresh"));

        let mut spans = vec![Span::raw(" ")];
        for (key, text) in pairs {
            spans.push(Span::styled(format!(" {key} "), theme::key_hint_key()));
            spans.push(Span::styled(format!("{text} "), theme::key_hint()));
        }
        Line::from(spans)
    }
}

impl Component for RecordsScreen {
    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        if self.detail_open && matches!(key.code, KeyCode::Esc | KeyCode::Enter) {
            self.detail_open = false;
            return Ok(Some(Action::CloseDetail));
        }

        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        let action = match key.code {
            KeyCode::Char('j') | KeyCode::Down => {
                self.move_selection(1);
                None
            }
            KeyCode::Char('k') | KeyCode::Up => {
                self.move_selection(-1);
                None
            }
            KeyCode::Char('d') if ctrl => {
                self.move_selection(PAGE);
                None
            }
            KeyCode::Char('u') if ctrl => {
                self.move_selection(-PAGE);
                None
            }
            KeyCode::PageDown => {
                self.move_selection(PAGE);
                None
            }
            KeyCode::PageUp => {
                self.move_selection(-PAGE);
                None
            }
            KeyCode::Char('g') | KeyCode::Home => {
                self.select(0);
                None
            }
            KeyCode::Char('G') | KeyCode::End => {
                self.select(self.shown.len().saturating_sub(1));
                None
            }
            KeyCode::Char('h') | KeyCode::Left => {
                self.move_column(-1);
                None
            }
            KeyCode::Char('l') | KeyCode::Right => {
                self.move_column(1);
                None
            }
            KeyCode::Char('s') => {
                self.sort_column(self.column);
                None
            }
            KeyCode::Char('f') => self.cycle_filter_field(),
            KeyCode::Char(' ') => {
                self.cycle_filter_value();
                None
            }
            KeyCode::Char('c') => {
                self.view.clear_filters();
                self.recompute();
                None
            }
            KeyCode::Char('r') => Some(Action::Refresh(self.spec.resource)),
            KeyCode::Char('d') => self.request_delete(),
            KeyCode::Enter => {
                self.detail_open = self.selected().is_some();
                None
            }
            _ => None,
        };
        Ok(action)
    }

    fn handle_mouse_event(&mut self, mouse: MouseEvent) -> Result<Option<Action>> {
        match mouse.kind {
            MouseEventKind::Down(MouseButton::Left) => self.click(mouse.column, mouse.row),
            MouseEventKind::ScrollDown => self.move_selection(SCROLL),
            MouseEventKind::ScrollUp => self.move_selection(-SCROLL),
            _ => {}
        }
        Ok(None)
    }

    fn update(&mut self, action: &Action) -> Result<Option<Action>> {
        match action {
            Action::RecordsLoaded { resource, rows, .. } if *resource == self.spec.resource => {
                self.rows = Arc::clone(rows);
                self.load = LoadState::Ready;
                self.recompute();
            }
            Action::FetchFailed {
                resource, message, ..
            } if *resource == self.spec.resource => {
                self.load = LoadState::Failed(message.clone());
            }
            Action::SearchInput(query) => {
                self.view.set_query(query.as_str());
                self.recompute();
                self.select(0);
            }
            _ => {}
        }
        Ok(None)
    }

    fn render(&self, frame: &mut Frame, area: Rect) {
        let title = format!(
            " {}  ·  {} of {} ",
            self.spec.resource.label(),
            self.shown.len(),
            self.rows.len()
        );
        let block = Block::default()
            .title(title)
            .title_style(theme::title_style())
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(if self.focused {
                theme::border_focused()
            } else {
                theme::border_default()
            });
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let [bar_area, body_area, hints_area] = Layout::vertical([
            Constraint::Length(1),
            Constraint::Min(1),
            Constraint::Length(1),
        ])
        .areas(inner);

        frame.render_widget(Paragraph::new(self.bar_line()), bar_area);

        let detail = self.selected().filter(|_| self.detail_open);
        if let Some(record) = detail {
            let [table_area, detail_area] =
                Layout::horizontal([Constraint::Percentage(60), Constraint::Percentage(40)])
                    .areas(body_area);
            self.render_table(frame, table_area);
            Self::render_detail(frame, detail_area, record);
        } else {
            self.render_table(frame, body_area);
        }

        frame.render_widget(Paragraph::new(self.hints()), hints_area);
    }

    fn set_focused(&mut self, focused: bool) {
        self.focused = focused;
    }

    fn search_query(&self) -> Option<&str> {
        Some(self.view.query())
    }
}

/// Column widths: fixed for short codes and counts, the rest share the
/// remaining space.
fn column_widths(spec: &ResourceSpec) -> Vec<Constraint> {
    spec.columns
        .iter()
        .map(|column| match column.key {
            "id" => Constraint::Length(6),
            "quantity" | "capacity" => Constraint::Length(9),
            "status" | "role" | "type" => Constraint::Length(13),
            _ => Constraint::Fill(1),
        })
        .collect()
}

/// Index of the column whose header spans `x`, laid out the way the
/// table lays out its columns.
fn column_at(area: Rect, widths: &[Constraint], x: u16) -> Option<usize> {
    Layout::horizontal(widths.iter().copied())
        .flex(Flex::Start)
        .spacing(COLUMN_SPACING)
        .split(Rect { height: 1, ..area })
        .iter()
        .position(|col| x >= col.x && x < col.right())
}

/// Name used in toasts and the confirm dialog.
fn record_name(record: &Record) -> String {
    ["name", "lotNumber", "itemName", "email"]
        .iter()
        .map(|field| record.display(field))
        .find(|s| !s.is_empty())
        .or_else(|| record.id().map(|id| format!("#{id}")))
        .unwrap_or_else(|| "record".to_owned())
}

fn detail_value(field: &str, value: &Value) -> Span<'static> {
    let plain = Style::default().fg(theme::NEON_CYAN);
    match (value, Classifier::for_field(field)) {
        (Value::Null, _) => Span::styled("─", theme::empty_cell()),
        (_, Some(classifier)) => badge::badge(classifier.classify(Some(value))),
        (Value::String(s), None) => Span::styled(s.clone(), plain),
        (other, None) => Span::styled(other.to_string(), plain),
    }
}
