//! Application core: event loop, screen management, action dispatch.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use color_eyre::eyre::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseEvent};
use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph, Tabs},
};
use tokio::sync::mpsc;
use tracing::{debug, info};
use tui_input::{Input, InputRequest};

use medstock_core::{Inventory, Resource, SessionUser};

use crate::action::{Action, ConfirmAction, Notification, NotificationLevel};
use crate::component::Component;
use crate::event::{Event, EventReader};
use crate::fetch::{self, Generations};
use crate::screen::{ScreenId, TabOrder};
use crate::screens::create_screens;
use crate::theme;
use crate::tui::Tui;

const TOAST_TTL: Duration = Duration::from_secs(3);
const NARROW_WIDTH: u16 = 100;
/// Tabs for a client without a session.
const ANONYMOUS_RESOURCES: &[Resource] = &[Resource::Items];

/// Top-level application state and event loop.
pub struct App {
    inventory: Inventory,
    /// Config profile the session came from, shown in the status bar.
    profile: String,
    session: Option<SessionUser>,
    tabs: TabOrder,
    active_screen: ScreenId,
    /// Previous screen for GoBack.
    previous_screen: Option<ScreenId>,
    screens: HashMap<ScreenId, Box<dyn Component>>,
    running: bool,
    help_visible: bool,
    /// Search bar contents while the bar is open.
    search: Option<Input>,
    generations: Generations,
    /// Pending confirmation dialog (blocks other input while active).
    pending_confirm: Option<ConfirmAction>,
    /// Active notification toast with display timestamp.
    notification: Option<(Notification, Instant)>,
    action_tx: mpsc::UnboundedSender<Action>,
    action_rx: mpsc::UnboundedReceiver<Action>,
}

impl App {
    pub fn new(inventory: Inventory, profile: String) -> Self {
        let (action_tx, action_rx) = mpsc::unbounded_channel();
        let session = inventory.session();
        let visible = session
            .as_ref()
            .map_or(ANONYMOUS_RESOURCES, SessionUser::visible_resources);

        let screens = create_screens(visible, session.clone()).into_iter().collect();

        Self {
            inventory,
            profile,
            session,
            tabs: TabOrder::for_resources(visible),
            active_screen: ScreenId::Dashboard,
            previous_screen: None,
            screens,
            running: true,
            help_visible: false,
            search: None,
            generations: Generations::default(),
            pending_confirm: None,
            notification: None,
            action_tx,
            action_rx,
        }
    }

    fn init_screens(&mut self) -> Result<()> {
        for screen in self.screens.values_mut() {
            screen.init(self.action_tx.clone())?;
        }
        if let Some(screen) = self.screens.get_mut(&self.active_screen) {
            screen.set_focused(true);
        }
        Ok(())
    }

    /// Run the main event loop until the user quits.
    pub async fn run(&mut self) -> Result<()> {
        let mut tui = Tui::new()?;
        tui.enter()?;
        self.init_screens()?;
        self.action_tx.send(Action::RefreshAll)?;

        let mut events = EventReader::new(
            Duration::from_millis(250), // 4 Hz tick
            Duration::from_millis(33),  // ~30 FPS render
        );

        info!(profile = %self.profile, "TUI event loop started");

        while self.running {
            let Some(event) = events.next().await else {
                break;
            };

            match event {
                Event::Key(key) => {
                    if let Some(action) = self.handle_key_event(key)? {
                        self.action_tx.send(action)?;
                    }
                }
                Event::Mouse(mouse) => {
                    if let Some(action) = self.handle_mouse_event(mouse)? {
                        self.action_tx.send(action)?;
                    }
                }
                Event::Tick => self.action_tx.send(Action::Tick)?,
                Event::Resize | Event::Render => self.action_tx.send(Action::Render)?,
            }

            while let Ok(action) = self.action_rx.try_recv() {
                self.process_action(&action)?;

                if let Action::Render = action {
                    tui.draw(|frame| self.render(frame))?;
                }
            }
        }

        events.stop();
        tui.exit();
        info!("TUI event loop ended");
        Ok(())
    }

    // ── Input ────────────────────────────────────────────────────────

    /// Map a key event to an action. Overlays and the search bar capture
    /// input first, then global keys, then the active screen.
    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        if key.modifiers == KeyModifiers::CONTROL && key.code == KeyCode::Char('c') {
            return Ok(Some(Action::Quit));
        }

        if self.pending_confirm.is_some() {
            return Ok(match key.code {
                KeyCode::Char('y' | 'Y') => Some(Action::ConfirmYes),
                KeyCode::Char('n' | 'N') | KeyCode::Esc => Some(Action::ConfirmNo),
                _ => None,
            });
        }

        if let Some(input) = self.search.as_mut() {
            return Ok(match key.code {
                KeyCode::Esc => Some(Action::CancelSearch),
                KeyCode::Enter => Some(Action::CloseSearch),
                _ => {
                    let changed = input_request(key)
                        .and_then(|req| input.handle(req))
                        .is_some_and(|state| state.value);
                    changed.then(|| Action::SearchInput(input.value().to_owned()))
                }
            });
        }

        if self.help_visible {
            return Ok(match key.code {
                KeyCode::Esc | KeyCode::Char('?') => Some(Action::ToggleHelp),
                _ => None,
            });
        }

        match (key.modifiers, key.code) {
            (KeyModifiers::NONE, KeyCode::Char('q')) => return Ok(Some(Action::Quit)),
            (_, KeyCode::Char('?')) => return Ok(Some(Action::ToggleHelp)),
            (KeyModifiers::NONE, KeyCode::Char('/')) => return Ok(Some(Action::OpenSearch)),

            (KeyModifiers::NONE, KeyCode::Char(c @ '1'..='9')) => {
                let target = c
                    .to_digit(10)
                    .and_then(|n| usize::try_from(n).ok())
                    .and_then(|n| self.tabs.from_number(n));
                return Ok(target.map(Action::SwitchScreen));
            }

            (KeyModifiers::NONE, KeyCode::Tab) => {
                return Ok(Some(Action::SwitchScreen(self.tabs.next(self.active_screen))));
            }
            (_, KeyCode::BackTab) => {
                return Ok(Some(Action::SwitchScreen(self.tabs.prev(self.active_screen))));
            }

            _ => {}
        }

        let Some(screen) = self.screens.get_mut(&self.active_screen) else {
            return Ok(None);
        };
        let action = screen.handle_key_event(key)?;
        if action.is_none() && key.code == KeyCode::Esc {
            return Ok(Some(Action::GoBack));
        }
        Ok(action)
    }

    fn handle_mouse_event(&mut self, mouse: MouseEvent) -> Result<Option<Action>> {
        if self.pending_confirm.is_some() || self.help_visible {
            return Ok(None);
        }
        if let Some(screen) = self.screens.get_mut(&self.active_screen) {
            return screen.handle_mouse_event(mouse);
        }
        Ok(None)
    }

    // ── Dispatch ─────────────────────────────────────────────────────

    /// Process a single action: update app state and propagate to components.
    fn process_action(&mut self, action: &Action) -> Result<()> {
        match action {
            Action::Quit => {
                self.running = false;
            }

            Action::Render | Action::CloseDetail => {}

            Action::Tick => {
                if self
                    .notification
                    .as_ref()
                    .is_some_and(|(_, shown)| shown.elapsed() > TOAST_TTL)
                {
                    self.notification = None;
                }
            }

            Action::SwitchScreen(target) => self.switch_to(*target),

            Action::GoBack => {
                if let Some(prev) = self.previous_screen.take() {
                    self.switch_to(prev);
                    self.previous_screen = None;
                }
            }

            // ── Data ──────────────────────────────────────────────
            Action::Refresh(resource) => self.fetch(*resource),

            Action::RefreshAll => {
                let resources: Vec<Resource> = self
                    .tabs
                    .screens()
                    .iter()
                    .filter_map(|id| match id {
                        ScreenId::Records(resource) => Some(*resource),
                        ScreenId::Dashboard => None,
                    })
                    .collect();
                for resource in resources {
                    self.fetch(resource);
                }
            }

            Action::RecordsLoaded {
                resource,
                generation,
                ..
            }
            | Action::FetchFailed {
                resource,
                generation,
                ..
            } => {
                if !self.generations.is_current(*resource, *generation) {
                    debug!(%resource, generation, "dropping stale fetch result");
                    return Ok(());
                }
                if let Action::FetchFailed { message, .. } = action {
                    self.action_tx.send(Action::Notify(Notification::error(format!(
                        "{}: {message}",
                        resource.label()
                    ))))?;
                }
                // Data updates go to ALL screens so they stay in sync
                for screen in self.screens.values_mut() {
                    if let Some(follow_up) = screen.update(action)? {
                        self.action_tx.send(follow_up)?;
                    }
                }
            }

            // ── Writes ────────────────────────────────────────────
            Action::RequestDelete { resource, id, name } => {
                self.action_tx
                    .send(Action::ShowConfirm(ConfirmAction::DeleteRecord {
                        resource: *resource,
                        id: id.clone(),
                        name: name.clone(),
                    }))?;
            }

            Action::ShowConfirm(confirm) => {
                self.pending_confirm = Some(confirm.clone());
            }

            Action::ConfirmYes => {
                if let Some(confirm) = self.pending_confirm.take() {
                    self.execute_confirm(confirm);
                }
            }

            Action::ConfirmNo => {
                self.pending_confirm = None;
            }

            // ── Search ────────────────────────────────────────────
            Action::OpenSearch => {
                match self
                    .screens
                    .get(&self.active_screen)
                    .and_then(|screen| screen.search_query())
                {
                    Some(query) => self.search = Some(Input::new(query.to_owned())),
                    None => {
                        self.action_tx.send(Action::Notify(Notification::info(
                            "Nothing to search on this screen",
                        )))?;
                    }
                }
            }

            Action::CloseSearch => {
                self.search = None;
            }

            Action::CancelSearch => {
                self.search = None;
                self.forward_to_active(&Action::SearchInput(String::new()))?;
            }

            Action::SearchInput(_) => self.forward_to_active(action)?,

            // ── Overlays ──────────────────────────────────────────
            Action::ToggleHelp => {
                self.help_visible = !self.help_visible;
            }

            Action::Notify(n) => {
                self.notification = Some((n.clone(), Instant::now()));
            }
        }

        Ok(())
    }

    fn switch_to(&mut self, target: ScreenId) {
        if target == self.active_screen || !self.screens.contains_key(&target) {
            return;
        }
        debug!("switching screen: {} → {}", self.active_screen, target);
        if let Some(screen) = self.screens.get_mut(&self.active_screen) {
            screen.set_focused(false);
        }
        self.search = None;
        self.previous_screen = Some(self.active_screen);
        self.active_screen = target;
        if let Some(screen) = self.screens.get_mut(&self.active_screen) {
            screen.set_focused(true);
        }
    }

    fn forward_to_active(&mut self, action: &Action) -> Result<()> {
        if let Some(screen) = self.screens.get_mut(&self.active_screen) {
            if let Some(follow_up) = screen.update(action)? {
                self.action_tx.send(follow_up)?;
            }
        }
        Ok(())
    }

    /// Issue a new generation and list `resource` in the background.
    fn fetch(&mut self, resource: Resource) {
        let generation = self.generations.issue(resource);
        debug!(%resource, generation, "fetching");
        fetch::spawn_list(
            self.inventory.clone(),
            resource,
            generation,
            self.action_tx.clone(),
        );
    }

    fn execute_confirm(&self, confirm: ConfirmAction) {
        let ConfirmAction::DeleteRecord { resource, id, name } = confirm;
        info!(%resource, id, "deleting record");
        fetch::spawn_delete(
            self.inventory.clone(),
            resource,
            id,
            name,
            self.action_tx.clone(),
        );
    }

    // ── Rendering ────────────────────────────────────────────────────

    fn render(&self, frame: &mut Frame) {
        let area = frame.area();

        let [content_area, tab_area, status_area] = Layout::vertical([
            Constraint::Min(1),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .areas(area);

        if let Some(screen) = self.screens.get(&self.active_screen) {
            screen.render(frame, content_area);
        }

        self.render_tab_bar(frame, tab_area);
        self.render_status_bar(frame, status_area);

        // Overlays on top (last = topmost)
        if let Some((ref notif, _)) = self.notification {
            render_notification(frame, area, notif);
        }

        if let Some(ref confirm) = self.pending_confirm {
            render_confirm_dialog(frame, area, confirm);
        }

        if self.help_visible {
            render_help_overlay(frame, area);
        }
    }

    fn render_tab_bar(&self, frame: &mut Frame, area: Rect) {
        let narrow = area.width < NARROW_WIDTH;
        let titles: Vec<Line> = self
            .tabs
            .screens()
            .iter()
            .map(|&id| {
                let style = if id == self.active_screen {
                    theme::tab_active()
                } else {
                    theme::tab_inactive()
                };
                let label = if narrow { id.label_short() } else { id.label() };
                let n = self.tabs.number(id).unwrap_or_default();
                Line::from(Span::styled(format!(" {n} {label} "), style))
            })
            .collect();

        let tabs = Tabs::new(titles)
            .divider(Span::styled(" ", theme::key_hint()))
            .select(self.tabs.position(self.active_screen).unwrap_or(0));

        frame.render_widget(tabs, area);
    }

    fn render_status_bar(&self, frame: &mut Frame, area: Rect) {
        if let Some(input) = &self.search {
            let value = input.value();
            let byte = value
                .char_indices()
                .nth(input.cursor())
                .map_or(value.len(), |(i, _)| i);
            let (before, after) = value.split_at(byte);
            let line = Line::from(vec![
                Span::styled(" / ", Style::default().fg(theme::ELECTRIC_PURPLE)),
                Span::styled(before, Style::default().fg(theme::NEON_CYAN)),
                Span::styled("█", Style::default().fg(theme::NEON_CYAN)),
                Span::styled(after, Style::default().fg(theme::NEON_CYAN)),
                Span::styled("  Esc clear  Enter keep", theme::key_hint()),
            ]);
            frame.render_widget(Paragraph::new(line), area);
            return;
        }

        let profile = Span::styled(
            format!("● {}", self.profile),
            Style::default().fg(theme::SUCCESS_GREEN),
        );
        let who = match &self.session {
            Some(user) if user.is_expired() => Span::styled(
                "  ○ session expired",
                Style::default().fg(theme::ERROR_RED),
            ),
            Some(user) => Span::styled(
                format!(
                    "  {} ({})",
                    user.name
                        .as_deref()
                        .or(user.email.as_deref())
                        .unwrap_or("signed in"),
                    user.role_label()
                ),
                Style::default().fg(theme::DIM_WHITE),
            ),
            None => Span::styled("  anonymous", theme::key_hint()),
        };
        let hints = Span::styled(" │ ? help  / search  r refresh  q quit", theme::key_hint());

        let line = Line::from(vec![Span::raw(" "), profile, who, hints]);
        frame.render_widget(Paragraph::new(line), area);
    }
}

/// Search-bar editing request for a key, if it edits.
fn input_request(key: KeyEvent) -> Option<InputRequest> {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    match key.code {
        KeyCode::Char('u') if ctrl => Some(InputRequest::DeleteLine),
        KeyCode::Char('w') if ctrl => Some(InputRequest::DeletePrevWord),
        KeyCode::Char('a') if ctrl => Some(InputRequest::GoToStart),
        KeyCode::Char('e') if ctrl => Some(InputRequest::GoToEnd),
        KeyCode::Char(c) if !ctrl => Some(InputRequest::InsertChar(c)),
        KeyCode::Backspace => Some(InputRequest::DeletePrevChar),
        KeyCode::Delete => Some(InputRequest::DeleteNextChar),
        KeyCode::Left => Some(InputRequest::GoToPrevChar),
        KeyCode::Right => Some(InputRequest::GoToNextChar),
        KeyCode::Home => Some(InputRequest::GoToStart),
        KeyCode::End => Some(InputRequest::GoToEnd),
        _ => None,
    }
}

fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width.saturating_sub(4));
    let height = height.min(area.height.saturating_sub(4));
    let x = (area.width.saturating_sub(width)) / 2;
    let y = (area.height.saturating_sub(height)) / 2;
    Rect::new(area.x + x, area.y + y, width, height)
}

fn render_help_overlay(frame: &mut Frame, area: Rect) {
    let help_area = centered(area, 60, 26);

    frame.render_widget(
        Block::default().style(Style::default().bg(theme::BG_DARK)),
        help_area,
    );

    let block = Block::default()
        .title(" Keyboard Shortcuts ")
        .title_style(theme::title_style())
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(theme::border_focused());

    let inner = block.inner(help_area);
    frame.render_widget(block, help_area);

    let section = |title: &'static str| {
        [
            Line::from(Span::styled(
                format!("  {title}"),
                Style::default().fg(theme::NEON_CYAN),
            )),
            Line::from(Span::styled(
                format!("  {}", "─".repeat(title.chars().count())),
                theme::key_hint(),
            )),
        ]
    };
    let key = |keys: &'static str, text: &'static str| {
        Line::from(vec![
            Span::styled(format!("  {keys:<10}"), theme::key_hint_key()),
            Span::styled(text, theme::key_hint()),
        ])
    };

    let mut help_text = vec![Line::from("")];
    help_text.extend(section("Navigation"));
    help_text.extend([
        key("1-9", "Jump to screen"),
        key("Tab", "Next screen"),
        key("j/k ↑/↓", "Move up/down"),
        key("g/G", "Top / bottom"),
        key("Ctrl+d/u", "Page down / up"),
        key("Enter", "Open / detail"),
        key("Esc", "Back / close"),
        Line::from(""),
    ]);
    help_text.extend(section("Tables"));
    help_text.extend([
        key("/", "Search (filters as you type)"),
        key("f", "Next filter field"),
        key("Space", "Next filter value"),
        key("c", "Clear filters"),
        key("←/→", "Move column cursor"),
        key("s / click", "Sort column (again: reverse)"),
        key("d", "Delete record"),
        key("r", "Refresh"),
        Line::from(""),
    ]);
    help_text.extend(section("Global"));
    help_text.extend([key("?", "This help"), key("q", "Quit")]);
    help_text.push(Line::from(""));
    help_text.push(Line::from(Span::styled(
        "                         Esc or ? to close",
        theme::key_hint(),
    )));

    frame.render_widget(Paragraph::new(help_text), inner);
}

fn render_confirm_dialog(frame: &mut Frame, area: Rect, confirm: &ConfirmAction) {
    let dialog_area = centered(area, 56, 5);

    frame.render_widget(
        Block::default().style(Style::default().bg(theme::BG_DARK)),
        dialog_area,
    );

    let block = Block::default()
        .title(" Confirm ")
        .title_style(theme::title_style())
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(theme::ELECTRIC_YELLOW));

    let inner = block.inner(dialog_area);
    frame.render_widget(block, dialog_area);

    let text = vec![
        Line::from(Span::styled(
            format!("  {confirm}"),
            Style::default().fg(theme::DIM_WHITE),
        )),
        Line::from(""),
        Line::from(vec![
            Span::styled("  y ", theme::key_hint_key()),
            Span::styled("confirm    ", theme::key_hint()),
            Span::styled("n ", theme::key_hint_key()),
            Span::styled("cancel", theme::key_hint()),
        ]),
    ];
    frame.render_widget(Paragraph::new(text), inner);
}

/// Toast in the bottom-right corner, above the status bar.
fn render_notification(frame: &mut Frame, area: Rect, notif: &Notification) {
    let (border_color, icon) = match notif.level {
        NotificationLevel::Success => (theme::SUCCESS_GREEN, "✓"),
        NotificationLevel::Error => (theme::ERROR_RED, "✗"),
        NotificationLevel::Warning => (theme::ELECTRIC_YELLOW, "!"),
        NotificationLevel::Info => (theme::NEON_CYAN, "·"),
    };
    let line = Line::from(vec![
        Span::styled(format!(" {icon} "), Style::default().fg(border_color)),
        Span::styled(notif.message.as_str(), Style::default().fg(theme::DIM_WHITE)),
    ]);

    let width = u16::try_from(line.width() + 3)
        .unwrap_or(u16::MAX)
        .clamp(20, 60)
        .min(area.width);
    let height = 3u16;
    let x = area.width.saturating_sub(width + 1);
    let y = area.height.saturating_sub(height + 2);
    let toast_area = Rect::new(area.x + x, area.y + y, width, height);

    frame.render_widget(
        Block::default().style(Style::default().bg(theme::BG_DARK)),
        toast_area,
    );

    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(border_color));

    let inner = block.inner(toast_area);
    frame.render_widget(block, toast_area);
    frame.render_widget(Paragraph::new(line), inner);
}
