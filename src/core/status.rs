//! Live-status coordination
//!
//! [`LiveStatus`] counts the workers that are still running and drives a
//! render callback at a fixed cadence until that count drops to zero. The
//! counter is the only state shared by every worker; it sits behind a mutex
//! that is never held while rendering or sleeping.

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

type RenderFn = Box<dyn Fn() + Send + Sync>;

/// Active-worker counter plus the render loop that observes it
pub struct LiveStatus {
    active: Mutex<usize>,
    render: RenderFn,
    delay: Duration,
}

impl fmt::Debug for LiveStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LiveStatus")
            .field("active", &self.active())
            .field("delay", &self.delay)
            .finish_non_exhaustive()
    }
}

impl LiveStatus {
    /// Create a coordinator with no active workers
    pub fn new<F>(render: F, delay: Duration) -> Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        Self {
            active: Mutex::new(0),
            render: Box::new(render),
            delay,
        }
    }

    /// Render cadence
    pub fn delay(&self) -> Duration {
        self.delay
    }

    fn counter(&self) -> MutexGuard<'_, usize> {
        // A panicking worker cannot leave the counter half-updated.
        self.active.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Number of workers currently running
    pub fn active(&self) -> usize {
        *self.counter()
    }

    /// Record that a worker started
    pub fn increment(&self) {
        let mut active = self.counter();
        *active += 1;
        tracing::trace!(active = *active, "worker registered");
    }

    /// Record that a worker exited
    pub fn decrement(&self) {
        let mut active = self.counter();
        if *active == 0 {
            tracing::warn!("worker count decremented below zero; ignoring");
            return;
        }
        *active -= 1;
        tracing::trace!(active = *active, "worker released");
    }

    /// Increment the counter and return a guard that decrements it on drop
    pub fn register(self: &Arc<Self>) -> WorkerGuard {
        self.increment();
        WorkerGuard {
            status: Arc::clone(self),
        }
    }

    /// Render until no worker is active, then render once more
    pub async fn run(&self) {
        while self.active() > 0 {
            (self.render)();
            tokio::time::sleep(self.delay).await;
        }
        (self.render)();
        tracing::debug!("all workers finished");
    }
}

/// Keeps one worker slot of a [`LiveStatus`] occupied
///
/// Dropping the guard releases the slot, whichever way the worker exits.
#[must_use = "dropping the guard immediately releases the worker slot"]
#[derive(Debug)]
pub struct WorkerGuard {
    status: Arc<LiveStatus>,
}

impl Drop for WorkerGuard {
    fn drop(&mut self) {
        self.status.decrement();
    }
}
