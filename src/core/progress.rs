//! Progress reporting interface
//!
//! Workers post progress through a [`ProgressReporter`]. Both calls are
//! fire-and-forget: they never block and never fail.

/// Sink for per-build progress updates
pub trait ProgressReporter: Send + Sync {
    /// Advance the progress indicator of `build_id` by one position
    fn step(&self, build_id: &str);

    /// Replace the last status message of `build_id`
    fn print(&self, build_id: &str, message: &str);
}

/// Reporter that discards everything
#[derive(Debug, Default, Clone, Copy)]
pub struct NullReporter;

impl ProgressReporter for NullReporter {
    fn step(&self, _build_id: &str) {}

    fn print(&self, _build_id: &str, _message: &str) {}
}
