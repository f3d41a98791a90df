//! Profiling capability
//!
//! A [`Profiler`] runs three independent checks against a completed build.
//! Each returns `true` on success; `false` is a soft failure that ends only
//! the owning worker.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::core::progress::ProgressReporter;
use crate::core::project::{Build, Project};

/// One hardware or software counter reported by `perf stat`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerfCounter {
    /// Event name (e.g. "cycles")
    pub event: String,
    /// Counter value
    pub value: f64,
    /// Unit reported by perf, empty for plain counts
    #[serde(default)]
    pub unit: String,
}

/// Measurements gathered for one build
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProfileStats {
    /// Build the measurements belong to
    pub build_id: String,
    /// Wall-clock execution time in seconds
    pub execution_time_secs: Option<f64>,
    /// Collected perf counters
    #[serde(default)]
    pub counters: Vec<PerfCounter>,
}

impl ProfileStats {
    /// Empty stats for a build
    pub fn new(build_id: impl Into<String>) -> Self {
        Self {
            build_id: build_id.into(),
            ..Self::default()
        }
    }

    /// Look up a counter by event name
    pub fn counter(&self, event: &str) -> Option<&PerfCounter> {
        self.counters.iter().find(|c| c.event == event)
    }
}

/// Profiling operations for one build
pub trait Profiler: Send {
    /// Whether the produced artifact exists and runs
    fn test_executable(&mut self) -> bool;

    /// Time one execution of the artifact
    fn execution_time(&mut self) -> bool;

    /// Collect performance counters for one execution of the artifact
    fn perf_stat_collect(&mut self) -> bool;

    /// Measurements gathered so far
    fn stats(&self) -> &ProfileStats;
}

/// Creates a [`Profiler`] for each worker
pub trait ProfilerFactory: Send + Sync {
    /// Profiler bound to `build`
    fn create(
        &self,
        project: &Project,
        build: &Build,
        reporter: Arc<dyn ProgressReporter>,
    ) -> Box<dyn Profiler>;
}
