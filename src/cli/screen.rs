//! Alternate-screen handling
//!
//! Progress is drawn on the terminal's alternate screen so the user's
//! scrollback survives the run. The primary screen is restored when the
//! guard drops, on panic and on Ctrl-C.
//!
//! While the alternate screen is up, only the render tick may write to the
//! terminal. Log records are held in a [`LogGate`] and written to stderr
//! once the primary screen is back.

use std::io::{self, Write};
use std::sync::{Mutex, MutexGuard, Once, PoisonError};

use crossterm::{
    cursor::{Hide, Show},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen},
};

static PANIC_HOOK: Once = Once::new();

/// Log gate used by the process-wide subscriber
pub static TERMINAL_LOGS: LogGate = LogGate::new();

/// Passes log output through, or holds it while the terminal is taken over
#[derive(Debug)]
pub struct LogGate {
    held: Mutex<Option<Vec<u8>>>,
}

impl LogGate {
    /// Gate that passes everything through
    pub const fn new() -> Self {
        Self {
            held: Mutex::new(None),
        }
    }

    fn held(&self) -> MutexGuard<'_, Option<Vec<u8>>> {
        self.held.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Start holding output
    pub fn hold(&self) {
        self.held().get_or_insert_with(Vec::new);
    }

    /// Whether output is currently held
    pub fn is_holding(&self) -> bool {
        self.held().is_some()
    }

    /// Stop holding output and return what was held
    pub fn release(&self) -> Vec<u8> {
        self.held().take().unwrap_or_default()
    }

    /// Hold `buf`, or write it to `out` when the gate is open
    pub fn write_to<W: Write>(&self, buf: &[u8], out: &mut W) -> io::Result<()> {
        let mut held = self.held();
        match held.as_mut() {
            Some(pending) => {
                pending.extend_from_slice(buf);
                Ok(())
            }
            None => {
                drop(held);
                out.write_all(buf)
            }
        }
    }
}

impl Default for LogGate {
    fn default() -> Self {
        Self::new()
    }
}

/// Stderr writer behind [`TERMINAL_LOGS`], for `tracing_subscriber::fmt`
#[derive(Debug, Default, Clone, Copy)]
pub struct GatedStderr;

impl Write for GatedStderr {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        TERMINAL_LOGS.write_to(buf, &mut io::stderr())?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        io::stderr().flush()
    }
}

fn release_held_logs() {
    let pending = TERMINAL_LOGS.release();
    if !pending.is_empty() {
        let _ = io::stderr().write_all(&pending);
    }
}

/// Switch back to the primary screen, show the cursor and flush held logs
///
/// Safe to call when the alternate screen is not active.
pub fn restore_terminal() {
    let result = execute!(io::stdout(), LeaveAlternateScreen, Show);
    release_held_logs();
    if let Err(e) = result {
        tracing::debug!("failed to restore terminal: {e}");
    }
}

fn install_panic_hook() {
    PANIC_HOOK.call_once(|| {
        let previous = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |info| {
            restore_terminal();
            previous(info);
        }));
    });
}

/// Keeps the alternate screen active until dropped
#[must_use = "the primary screen is restored as soon as the guard drops"]
#[derive(Debug)]
pub struct ScreenGuard {
    _private: (),
}

impl ScreenGuard {
    /// Enter the alternate screen and hide the cursor
    pub fn enter() -> io::Result<Self> {
        install_panic_hook();
        tracing::debug!("entering alternate screen");
        TERMINAL_LOGS.hold();
        if let Err(e) = execute!(io::stdout(), EnterAlternateScreen, Hide) {
            release_held_logs();
            return Err(e);
        }
        Ok(Self { _private: () })
    }
}

impl Drop for ScreenGuard {
    fn drop(&mut self) {
        restore_terminal();
        tracing::debug!("left alternate screen");
    }
}

/// Restore the terminal and exit when Ctrl-C arrives
///
/// Child build processes share the terminal's process group and receive the
/// interrupt themselves.
pub fn restore_on_interrupt() {
    tokio::spawn(async {
        if tokio::signal::ctrl_c().await.is_ok() {
            restore_terminal();
            eprintln!("Interrupted");
            std::process::exit(130);
        }
    });
}
