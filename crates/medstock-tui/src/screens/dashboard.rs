//! Dashboard screen: who is signed in and how much of each resource there is.
//!
//! Layout:
//! ┌─ Dashboard ─────────────────────────────────────────────────────────┐
//! │ Signed in as / role / storage / session expiry                      │
//! │ ┌─ Overview ──────────────────────────────────────────────────────┐ │
//! │ │ Resource │ Records │ Distinct │ Breakdown (status badges)       │ │
//! │ └─────────────────────────────────────────────────────────────────┘ │
//! │ key hints                                                           │
//! └─────────────────────────────────────────────────────────────────────┘

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use color_eyre::eyre::Result;
use crossterm::event::{KeyCode, KeyEvent, MouseEvent, MouseEventKind};
use indexmap::IndexMap;
use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::Style;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Borders, Cell, Paragraph, Row, Table, TableState};

use medstock_core::query::distinct_count;
use medstock_core::{Classification, Classifier, Resource, SessionUser, resource};

use crate::action::{Action, Rows};
use crate::component::Component;
use crate::screen::ScreenId;
use crate::theme;
use crate::widgets::badge;

/// Per-resource counters shown in the overview table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceStats {
    /// `None` until the first fetch lands.
    pub total: Option<usize>,
    /// Distinct values per categorical field, keyed by column title.
    pub distinct: Vec<(&'static str, usize)>,
    /// Rows per classified label of the first coded filter field, largest first.
    pub breakdown: Vec<(Classification, usize)>,
}

pub fn stats_for(resource: Resource, rows: Option<&Rows>) -> ResourceStats {
    let spec = resource::spec(resource);
    let Some(rows) = rows else {
        return ResourceStats {
            total: None,
            distinct: Vec::new(),
            breakdown: Vec::new(),
        };
    };

    let distinct = spec
        .categorical
        .iter()
        .map(|&field| {
            let title = spec.column(field).map_or(field, |c| c.title);
            (title, distinct_count(rows.as_slice(), field))
        })
        .collect();

    let mut breakdown = Vec::new();
    let coded = spec
        .categorical
        .iter()
        .find_map(|&field| Classifier::for_field(field).map(|c| (field, c)));
    if let Some((field, classifier)) = coded {
        let mut merged: IndexMap<&'static str, (Classification, usize)> = IndexMap::new();
        for (value, n) in medstock_core::query::tally(rows.as_slice(), field) {
            let class = classifier.classify(Some(&value));
            merged.entry(class.label).or_insert((class, 0)).1 += n;
        }
        breakdown = merged.into_values().collect();
        breakdown.sort_by(|a, b| b.1.cmp(&a.1));
    }

    ResourceStats {
        total: Some(rows.len()),
        distinct,
        breakdown,
    }
}

/// Session line: "expires in 2h 5m", "expired", or "no expiry".
pub fn expiry_text(expires_at: Option<DateTime<Utc>>, now: DateTime<Utc>) -> String {
    let Some(exp) = expires_at else {
        return "no expiry".into();
    };
    let secs = (exp - now).num_seconds();
    if secs <= 0 {
        return "expired".into();
    }
    if secs < 60 {
        return "expires in under a minute".into();
    }
    let minutes = u64::try_from(secs / 60).unwrap_or(0);
    format!(
        "expires in {}",
        humantime::format_duration(std::time::Duration::from_secs(minutes * 60))
    )
}

pub struct DashboardScreen {
    focused: bool,
    resources: Vec<Resource>,
    session: Option<SessionUser>,
    data: HashMap<Resource, Rows>,
    failed: HashMap<Resource, String>,
    table_state: TableState,
}

impl DashboardScreen {
    pub fn new(resources: &[Resource], session: Option<SessionUser>) -> Self {
        Self {
            focused: false,
            resources: resources.to_vec(),
            session,
            data: HashMap::new(),
            failed: HashMap::new(),
            table_state: TableState::default().with_selected(Some(0)),
        }
    }

    fn selected_resource(&self) -> Option<Resource> {
        self.resources
            .get(self.table_state.selected().unwrap_or(0))
            .copied()
    }

    fn move_selection(&mut self, delta: isize) {
        let last = self.resources.len().saturating_sub(1);
        let current = self.table_state.selected().unwrap_or(0);
        self.table_state
            .select(Some(current.saturating_add_signed(delta).min(last)));
    }

    fn session_lines(&self) -> Vec<Line<'static>> {
        let label = Style::default().fg(theme::DIM_WHITE);
        let value = Style::default().fg(theme::NEON_CYAN);
        let Some(user) = &self.session else {
            return vec![Line::from(Span::styled(
                "  Not signed in: showing public data only",
                theme::key_hint(),
            ))];
        };

        let who = match (&user.name, &user.email) {
            (Some(name), Some(email)) => format!("{name} <{email}>"),
            (Some(name), None) => name.clone(),
            (None, Some(email)) => email.clone(),
            (None, None) => user.subject.clone().unwrap_or_else(|| "unknown user".into()),
        };
        let expiry = expiry_text(user.expires_at, Utc::now());
        let expiry_style = if user.is_expired() {
            Style::default().fg(theme::ERROR_RED)
        } else {
            value
        };

        let mut details = vec![
            Span::styled("  Role ", label),
            Span::styled(user.role_label(), value),
        ];
        if let Some(storage) = &user.storage_name {
            details.push(Span::styled("   Storage ", label));
            details.push(Span::styled(storage.clone(), value));
        }
        details.push(Span::styled("   Session ", label));
        details.push(Span::styled(expiry, expiry_style));

        vec![
            Line::from(vec![
                Span::styled("  Signed in as ", label),
                Span::styled(who, theme::title_style()),
            ]),
            Line::from(details),
        ]
    }

    fn overview_row(&self, resource: Resource) -> Row<'static> {
        let stats = stats_for(resource, self.data.get(&resource));
        let name = Cell::from(resource.label());

        let (total, distinct, breakdown) = match (stats.total, self.failed.get(&resource)) {
            (None, Some(err)) => (
                Line::from(Span::styled("!", Style::default().fg(theme::ERROR_RED))),
                Line::from(Span::styled(err.clone(), Style::default().fg(theme::ERROR_RED))),
                Line::default(),
            ),
            (None, None) => (
                Line::from(Span::styled("…", theme::key_hint())),
                Line::default(),
                Line::default(),
            ),
            (Some(total), _) => {
                let distinct = stats
                    .distinct
                    .iter()
                    .map(|(title, n)| format!("{title} {n}"))
                    .collect::<Vec<_>>()
                    .join("  ");
                let mut spans = Vec::new();
                for (class, n) in stats.breakdown {
                    spans.push(badge::badge(class));
                    spans.push(Span::styled(format!(" {n}  "), theme::table_row()));
                }
                (
                    Line::from(total.to_string()),
                    Line::from(Span::styled(distinct, theme::key_hint())),
                    Line::from(spans),
                )
            }
        };

        Row::new(vec![
            name,
            Cell::from(total),
            Cell::from(distinct),
            Cell::from(breakdown),
        ])
        .style(theme::table_row())
    }
}

impl Component for DashboardScreen {
    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        let action = match key.code {
            KeyCode::Char('j') | KeyCode::Down => {
                self.move_selection(1);
                None
            }
            KeyCode::Char('k') | KeyCode::Up => {
                self.move_selection(-1);
                None
            }
            KeyCode::Enter => self
                .selected_resource()
                .map(|r| Action::SwitchScreen(ScreenId::Records(r))),
            KeyCode::Char('r') => Some(Action::RefreshAll),
            _ => None,
        };
        Ok(action)
    }

    fn handle_mouse_event(&mut self, mouse: MouseEvent) -> Result<Option<Action>> {
        match mouse.kind {
            MouseEventKind::ScrollDown => self.move_selection(1),
            MouseEventKind::ScrollUp => self.move_selection(-1),
            _ => {}
        }
        Ok(None)
    }

    fn update(&mut self, action: &Action) -> Result<Option<Action>> {
        match action {
            Action::RecordsLoaded { resource, rows, .. } => {
                self.failed.remove(resource);
                self.data.insert(*resource, std::sync::Arc::clone(rows));
            }
            Action::FetchFailed {
                resource, message, ..
            } => {
                self.failed.insert(*resource, message.clone());
            }
            _ => {}
        }
        Ok(None)
    }

    fn render(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default()
            .title(" Dashboard ")
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

        let [session_area, overview_area, hints_area] = Layout::vertical([
            Constraint::Length(3),
            Constraint::Min(3),
            Constraint::Length(1),
        ])
        .areas(inner);

        frame.render_widget(Paragraph::new(self.session_lines()), session_area);

        let header = Row::new(["Resource", "Records", "Distinct", "Breakdown"])
            .style(theme::table_header());
        let rows: Vec<Row> = self
            .resources
            .iter()
            .map(|&r| self.overview_row(r))
            .collect();
        let table = Table::new(
            rows,
            [
                Constraint::Length(20),
                Constraint::Length(9),
                Constraint::Fill(1),
                Constraint::Fill(2),
            ],
        )
        .header(header)
        .column_spacing(1)
        .row_highlight_style(theme::table_selected())
        .block(
            Block::default()
                .title(" Overview ")
                .title_style(theme::title_style())
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .border_style(theme::border_default()),
        );
        let mut state = self.table_state;
        frame.render_stateful_widget(table, overview_area, &mut state);

        let hints = Line::from(vec![
            Span::styled("  j/k ", theme::key_hint_key()),
            Span::styled("select  ", theme::key_hint()),
            Span::styled("Enter ", theme::key_hint_key()),
            Span::styled("open  ", theme::key_hint()),
            Span::styled("r ", theme::key_hint_key()),
            Span::styled("refresh all", theme::key_hint()),
        ]);
        frame.render_widget(Paragraph::new(hints), hints_area);
    }

    fn set_focused(&mut self, focused: bool) {
        self.focused = focused;
    }
}
