use crossterm::terminal;
use log::{debug, warn};
use std::io;

/// Keeps the terminal in raw mode while alive.
///
/// Raw mode delivers every key press immediately and without echo, CTRL-C included, which
/// then arrives as a key event instead of a signal. Dropping the session restores the terminal,
/// on a normal halt as well as on errors, interrupts and panics unwinding through it.
#[derive(Debug)]
pub struct ConsoleSession {
    raw: bool,
}

impl ConsoleSession {
    /// Set terminal to raw in best-effort mode, only log on failure, since it does not work
    /// without a terminal attached, e.g. for tests or with redirected input.
    #[must_use]
    pub fn acquire() -> Self {
        match terminal::enable_raw_mode() {
            Ok(()) => {
                debug!("Terminal switched to raw mode");
                Self { raw: true }
            }
            Err(e) => {
                handle_set_raw_error(&e);
                Self { raw: false }
            }
        }
    }
}

fn handle_set_raw_error(e: &io::Error) {
    warn!("Could not set terminal to raw mode: {e}");
}

impl Drop for ConsoleSession {
    fn drop(&mut self) {
        if !self.raw {
            return;
        }
        // terminal stays in raw mode but no means to repair
        if let Err(e) = terminal::disable_raw_mode() {
            eprintln!("Error resetting terminal {e}");
        } else {
            debug!("Terminal restored");
        }
    }
}
