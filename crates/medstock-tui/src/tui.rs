//! Terminal session: raw mode and the alternate screen while the
//! dashboard runs, and a shell handed back intact on exit, error, or panic.

use std::io::{self, Stdout, Write};
use std::path::Path;

use color_eyre::config::HookBuilder;
use color_eyre::eyre::Result;
use crossterm::{
    cursor,
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{self, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{Frame, Terminal, backend::CrosstermBackend};

/// The real terminal. `active` is set from the moment raw mode is on
/// until it has been restored.
pub struct Tui {
    terminal: Terminal<CrosstermBackend<Stdout>>,
    active: bool,
}

impl Tui {
    pub fn new() -> Result<Self> {
        let terminal = Terminal::new(CrosstermBackend::new(io::stdout()))?;
        Ok(Self {
            terminal,
            active: false,
        })
    }

    pub fn enter(&mut self) -> Result<()> {
        terminal::enable_raw_mode()?;
        self.active = true;
        execute!(
            io::stdout(),
            EnterAlternateScreen,
            EnableMouseCapture,
            cursor::Hide
        )?;
        self.terminal.clear()?;
        Ok(())
    }

    /// Give the terminal back. Only the first call does anything, so the
    /// drop after an explicit exit is a no-op.
    pub fn exit(&mut self) {
        if std::mem::take(&mut self.active) {
            restore(&mut io::stdout());
        }
    }

    pub fn draw(&mut self, render: impl FnOnce(&mut Frame)) -> Result<()> {
        self.terminal.draw(render)?;
        Ok(())
    }
}

impl Drop for Tui {
    fn drop(&mut self) {
        self.exit();
    }
}

fn restore(out: &mut impl Write) {
    let _ = execute!(out, cursor::Show, DisableMouseCapture, LeaveAlternateScreen);
    let _ = terminal::disable_raw_mode();
}

/// Install color-eyre hooks. Panics restore the terminal first and point
/// at the log file. Call before [`Tui::enter`].
pub fn install_hooks(log_file: &Path) -> Result<()> {
    let (panic_hook, eyre_hook) = HookBuilder::default()
        .display_env_section(false)
        .panic_section(crash_note(log_file))
        .into_hooks();

    eyre_hook.install()?;

    let panic_hook = panic_hook.into_panic_hook();
    std::panic::set_hook(Box::new(move |info| {
        restore(&mut io::stdout());
        panic_hook(info);
    }));

    Ok(())
}

fn crash_note(log_file: &Path) -> String {
    format!(
        "medstock-tui stopped unexpectedly. Recent fetches and key handling are logged in {}; \
         include it when reporting the problem.",
        log_file.display()
    )
}
