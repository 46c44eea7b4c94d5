//! Raw mode and alternate screen for the lifetime of the board.

use crossterm::{
    cursor::Show,
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use log::error;
use std::io::{self, Write};

/// Puts the terminal back the way it was when dropped, however the caller
/// leaves, including a failed setup.
pub struct TerminalSession<W: Write> {
    out: W,
    raw_mode: bool,
}

impl<W: Write> TerminalSession<W> {
    /// Enables raw mode and switches `out` to the alternate screen.
    pub fn enter(out: W) -> io::Result<Self> {
        enable_raw_mode()?;
        Self::on_screen(out, true)
    }

    fn on_screen(out: W, raw_mode: bool) -> io::Result<Self> {
        let mut session = Self { out, raw_mode };
        execute!(session.out, EnterAlternateScreen)?;
        Ok(session)
    }
}

impl<W: Write> Drop for TerminalSession<W> {
    fn drop(&mut self) {
        if self.raw_mode {
            if let Err(err) = disable_raw_mode() {
                error!("failed to leave raw mode: {err}");
            }
        }
        if let Err(err) = execute!(self.out, LeaveAlternateScreen, Show) {
            error!("failed to restore screen: {err}");
        }
    }
}
