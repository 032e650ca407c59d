use crossterm::event::{Event, KeyCode, KeyEvent, KeyModifiers, poll, read};
use log::{debug, warn};
use std::collections::VecDeque;
use std::io;
use std::io::{Stdout, Write};
use std::time::Duration;

/// Character I/O the LC-3 is attached to, independent of an implementation.
pub trait Console {
    /// Checks if input is available, never blocks.
    ///
    /// Failing to poll is treated like no key being pressed.
    fn poll_key_available(&mut self) -> bool;
    /// Reads one character, blocking until one is available.
    /// A character already seen by [`Console::poll_key_available`] is returned first.
    ///
    /// # Errors
    /// - the underlying input failed or ended
    fn read_char(&mut self) -> io::Result<u8>;
    /// # Errors
    /// - the underlying output failed
    fn write_char(&mut self, c: u8) -> io::Result<()>;
    /// # Errors
    /// - the underlying output failed
    fn flush(&mut self) -> io::Result<()>;
    /// True if the user asked to stop the program (CTRL-C).
    fn is_interrupted(&self) -> bool;
    /// Looks for a CTRL-C still waiting in the input, never blocks.
    ///
    /// Keys read on the way stay available to [`Console::read_char`].
    fn check_interrupt(&mut self) -> bool {
        self.is_interrupted()
    }
}

/// [`Console`] on the process terminal, expects raw mode to be enabled,
/// see [`crate::terminal::ConsoleSession`].
pub struct TerminalConsole {
    pending: VecDeque<u8>,
    is_interrupted: bool,
    stdout: Stdout,
}
impl Default for TerminalConsole {
    fn default() -> Self {
        Self::new()
    }
}
impl TerminalConsole {
    #[must_use]
    pub fn new() -> Self {
        Self {
            pending: VecDeque::new(),
            is_interrupted: false,
            stdout: io::stdout(),
        }
    }

    /// Turns a terminal event into a character for the LC-3, remembering CTRL-C.
    fn accept_event(&mut self, event: &Event) -> Option<u8> {
        let key = event.as_key_press_event()?;
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            self.is_interrupted = true;
            return None;
        }
        key_to_byte(&key)
    }

    fn queue_event(&mut self, event: &Event) {
        if let Some(c) = self.accept_event(event) {
            self.pending.push_back(c);
        }
    }

    fn drain_events(&mut self) -> io::Result<()> {
        while poll(Duration::ZERO)? {
            self.queue_event(&read()?);
        }
        Ok(())
    }

    fn try_poll(&mut self) -> io::Result<bool> {
        while poll(Duration::ZERO)? {
            if let Some(c) = self.accept_event(&read()?) {
                self.pending.push_back(c);
                return Ok(true);
            }
        }
        Ok(false)
    }
}

fn key_to_byte(key: &KeyEvent) -> Option<u8> {
    match key.code {
        KeyCode::Enter => Some(b'\n'),
        KeyCode::Tab => Some(b'\t'),
        KeyCode::Backspace => Some(0x08),
        KeyCode::Esc => Some(0x1B),
        KeyCode::Char(c) if c.is_ascii() => u8::try_from(c).ok(),
        _ => None,
    }
}

impl Console for TerminalConsole {
    fn poll_key_available(&mut self) -> bool {
        if !self.pending.is_empty() {
            return true;
        }
        self.try_poll().unwrap_or_else(|e| {
            warn!("Polling keyboard failed: {e}");
            false
        })
    }
    fn read_char(&mut self) -> io::Result<u8> {
        if let Some(c) = self.pending.pop_front() {
            return Ok(c);
        }
        loop {
            let event = read()?;
            if let Some(c) = self.accept_event(&event) {
                return Ok(c);
            }
            if self.is_interrupted {
                return Err(io::Error::new(
                    io::ErrorKind::Interrupted,
                    "interrupted while waiting for input",
                ));
            }
        }
    }
    fn write_char(&mut self, c: u8) -> io::Result<()> {
        // raw mode does not return the carriage on line feed
        if c == b'\n' {
            self.stdout.write_all(b"\r\n")
        } else {
            self.stdout.write_all(&[c])
        }
    }
    fn flush(&mut self) -> io::Result<()> {
        self.stdout.flush()
    }
    fn is_interrupted(&self) -> bool {
        self.is_interrupted
    }
    fn check_interrupt(&mut self) -> bool {
        // no terminal attached, nothing to drain
        if let Err(e) = self.drain_events() {
            debug!("Checking for CTRL-C failed: {e}");
        }
        self.is_interrupted
    }
}
