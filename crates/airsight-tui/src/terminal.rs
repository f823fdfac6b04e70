//! Terminal lifecycle.
//!
//! The terminal is restored on normal exit, on error returns from the event
//! loop and on panic.

use crate::error::{Result, TuiError};
use crossterm::event::{DisableBracketedPaste, EnableBracketedPaste};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use std::io::{self, Stdout};
use std::panic;

pub type CrosstermTerminal = Terminal<CrosstermBackend<Stdout>>;

/// Enter raw mode and the alternate screen.
///
/// Call [`install_panic_hook`] first so a panic restores the terminal.
pub fn setup_terminal() -> Result<CrosstermTerminal> {
    enable_raw_mode().map_err(|e| TuiError::TerminalInitFailed {
        reason: format!("raw mode: {e}"),
    })?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableBracketedPaste).map_err(|e| {
        TuiError::TerminalInitFailed {
            reason: format!("alternate screen: {e}"),
        }
    })?;
    Terminal::new(CrosstermBackend::new(stdout)).map_err(|e| TuiError::TerminalInitFailed {
        reason: e.to_string(),
    })
}

/// Leave the alternate screen and raw mode. Safe to call more than once.
pub fn restore_terminal() -> Result<()> {
    let _ = execute!(io::stdout(), DisableBracketedPaste);
    execute!(io::stdout(), LeaveAlternateScreen).map_err(|e| {
        TuiError::TerminalRestoreFailed {
            reason: format!("alternate screen: {e}"),
        }
    })?;
    disable_raw_mode().map_err(|e| TuiError::TerminalRestoreFailed {
        reason: format!("raw mode: {e}"),
    })
}

/// Restore the terminal before the default panic output is printed.
pub fn install_panic_hook() {
    let original_hook = panic::take_hook();
    panic::set_hook(Box::new(move |panic_info| {
        let _ = restore_terminal();
        original_hook(panic_info);
    }));
}
