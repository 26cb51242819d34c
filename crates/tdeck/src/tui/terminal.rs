//! Terminal lifecycle: raw mode, alternate screen, and a panic hook that
//! puts the terminal back before the panic message is printed.

use std::io::{self, Stdout};
use std::panic;

use anyhow::{Context, Result};
use crossterm::cursor::{Hide, Show};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;

use crate::invoke;

pub type Tui = Terminal<CrosstermBackend<Stdout>>;

/// Enter raw mode and the alternate screen.
///
/// Call [`install_panic_hook`] first so a panic anywhere restores the
/// terminal.
pub fn setup_terminal() -> Result<Tui> {
    enable_raw_mode().context("Failed to enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, Hide).context("Failed to enter alternate screen")?;
    let backend = CrosstermBackend::new(stdout);
    let terminal = Terminal::new(backend).context("Failed to create terminal")?;
    Ok(terminal)
}

/// Leave the alternate screen and raw mode. Safe to call more than once.
pub fn restore_terminal() -> Result<()> {
    execute!(io::stdout(), Show, LeaveAlternateScreen)
        .context("Failed to leave alternate screen")?;
    disable_raw_mode().context("Failed to disable raw mode")?;
    Ok(())
}

/// Restore the terminal on panic, except for panics raised by slide
/// content, which are caught and shown on the slide instead.
pub fn install_panic_hook() {
    let original_hook = panic::take_hook();
    panic::set_hook(Box::new(move |panic_info| {
        if invoke::is_containing() {
            tracing::debug!(%panic_info, "contained slide panic");
            return;
        }
        let _ = restore_terminal();
        original_hook(panic_info);
    }));
}
