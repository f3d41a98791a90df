//! Console progress renderer
//!
//! Keeps one display slot per build: a spinner frame and the last status
//! message. Each slot is written only by its own worker, possibly from both
//! of its output readers at once, and read by the render tick, so slots
//! never share a lock. The slot table itself is built once from the
//! project's build order and never changes.

use std::collections::HashMap;
use std::io::{self, Write};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use crossterm::cursor::MoveTo;
use crossterm::queue;
use crossterm::terminal::{Clear, ClearType};

use crate::config::defaults::{PLACEHOLDER_MESSAGE, SPINNER_SYMBOLS};
use crate::core::progress::ProgressReporter;
use crate::core::project::Project;

#[derive(Debug)]
struct BuildSlot {
    build_id: String,
    frame: AtomicUsize,
    message: Mutex<String>,
}

impl BuildSlot {
    fn new(build_id: &str) -> Self {
        Self {
            build_id: build_id.to_string(),
            frame: AtomicUsize::new(0),
            message: Mutex::new(PLACEHOLDER_MESSAGE.to_string()),
        }
    }

    fn message(&self) -> MutexGuard<'_, String> {
        self.message.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn line(&self) -> String {
        let symbol = SPINNER_SYMBOLS[self.frame.load(Ordering::Relaxed) % SPINNER_SYMBOLS.len()];
        format!("[{}][{symbol}] {}", self.build_id, self.message())
    }
}

/// Per-build spinner lines drawn to the terminal on demand
#[derive(Debug)]
pub struct ConsoleRenderer {
    slots: Vec<BuildSlot>,
    index: HashMap<String, usize>,
    last_printed: Mutex<Vec<Option<String>>>,
}

impl ConsoleRenderer {
    /// Renderer with one line per build of `project`, in project order
    pub fn new(project: &Project) -> Self {
        Self::from_ids(project.builds().iter().map(|b| b.build_id.as_str()))
    }

    /// Renderer for the given build ids, in order
    ///
    /// A repeated id keeps its first position.
    pub fn from_ids<'a>(ids: impl IntoIterator<Item = &'a str>) -> Self {
        let mut slots = Vec::new();
        let mut index = HashMap::new();
        for id in ids {
            if !index.contains_key(id) {
                index.insert(id.to_string(), slots.len());
                slots.push(BuildSlot::new(id));
            }
        }
        let last_printed = Mutex::new(vec![None; slots.len()]);
        Self {
            slots,
            index,
            last_printed,
        }
    }

    fn slot(&self, build_id: &str) -> Option<&BuildSlot> {
        let slot = self.index.get(build_id).map(|&i| &self.slots[i]);
        if slot.is_none() {
            tracing::debug!("progress update for unknown build '{build_id}'");
        }
        slot
    }

    /// Current spinner frame of a build
    pub fn frame(&self, build_id: &str) -> Option<usize> {
        self.slot(build_id)
            .map(|s| s.frame.load(Ordering::Relaxed))
    }

    /// Last status message of a build
    pub fn message(&self, build_id: &str) -> Option<String> {
        self.slot(build_id).map(|s| s.message().clone())
    }

    /// One display line per build, in project order
    pub fn lines(&self) -> Vec<String> {
        self.slots.iter().map(BuildSlot::line).collect()
    }

    /// Write every line to `out`
    pub fn render_to<W: Write>(&self, out: &mut W) -> io::Result<()> {
        for line in self.lines() {
            writeln!(out, "{line}")?;
        }
        out.flush()
    }

    /// Clear the terminal and draw every line
    pub fn render(&self) {
        let mut stdout = io::stdout().lock();
        let result = queue!(stdout, MoveTo(0, 0), Clear(ClearType::All))
            .and_then(|()| self.render_to(&mut stdout));
        if let Err(e) = result {
            tracing::warn!("failed to render progress: {e}");
        }
    }

    /// Print the lines whose message changed since the previous call
    ///
    /// Used when the terminal is not taken over, so output scrolls like a log.
    pub fn render_changes(&self) {
        let mut last = self
            .last_printed
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        let mut stdout = io::stdout().lock();
        for (slot, printed) in self.slots.iter().zip(last.iter_mut()) {
            let message = slot.message().clone();
            if printed.as_deref() == Some(message.as_str()) {
                continue;
            }
            if let Err(e) = writeln!(stdout, "[{}] {message}", slot.build_id) {
                tracing::warn!("failed to render progress: {e}");
                return;
            }
            *printed = Some(message);
        }
    }
}

impl ProgressReporter for ConsoleRenderer {
    fn step(&self, build_id: &str) {
        if let Some(slot) = self.slot(build_id) {
            // stdout and stderr readers may step the same slot concurrently
            let _ = slot
                .frame
                .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |frame| {
                    Some((frame + 1) % SPINNER_SYMBOLS.len())
                });
        }
    }

    fn print(&self, build_id: &str, message: &str) {
        if let Some(slot) = self.slot(build_id) {
            let first_line = message.lines().next().unwrap_or_default();
            let mut current = slot.message();
            current.clear();
            current.push_str(first_line);
        }
    }
}
