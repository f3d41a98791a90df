//! Default configuration values

use std::time::Duration;

/// Default configuration file, resolved against the working directory
pub const DEFAULT_CONFIG_FILE: &str = "input.toml";

/// Render cadence of the interactive live-status loop
pub const INTERACTIVE_RENDER_DELAY: Duration = Duration::from_millis(100);

/// Render cadence when the alternate screen is disabled
pub const POLL_RENDER_DELAY: Duration = Duration::from_millis(500);

/// Pause between spawning workers and starting the render loop
pub const WORKER_STARTUP_GRACE: Duration = Duration::from_millis(200);

/// Spinner frames cycled by `step`
pub const SPINNER_SYMBOLS: [char; 8] = ['/', '-', '\\', '|', '/', '-', '\\', '|'];

/// Message shown for a build that has not posted anything yet
pub const PLACEHOLDER_MESSAGE: &str = "None";

/// Directory (under the project root) holding per-build output
pub const BUILD_ROOT: &str = "build";

/// File (inside a build directory) receiving profiling results
pub const PROFILE_REPORT_FILE: &str = "profile.json";

/// Default perf events collected by `perf stat`
pub const DEFAULT_PERF_EVENTS: &[&str] = &[
    "task-clock",
    "cycles",
    "instructions",
    "cache-misses",
    "branch-misses",
];
