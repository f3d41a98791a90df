//! Build-profile pipeline orchestration
//!
//! One worker runs per build: build, then test the executable, time it and
//! collect perf counters. A profiling check that returns `false` ends only
//! that worker; a build-system error ends the worker and is returned from
//! [`Pipeline::run`] once every worker has finished. While the workers run,
//! the invoking task drives [`LiveStatus::run`] so progress keeps rendering.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use crate::config::defaults::WORKER_STARTUP_GRACE;
use crate::core::profiler::{ProfileStats, ProfilerFactory};
use crate::core::progress::ProgressReporter;
use crate::core::project::{Build, Project};
use crate::core::status::{LiveStatus, WorkerGuard};
use crate::error::{AmixisError, BuildError};

/// Which halves of the pipeline run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Stages {
    /// Run the build stage
    pub build: bool,
    /// Run the three profiling stages
    pub profile: bool,
}

impl Stages {
    /// Build and profile
    pub const ALL: Self = Self {
        build: true,
        profile: true,
    };

    /// Build only
    pub const BUILD_ONLY: Self = Self {
        build: true,
        profile: false,
    };

    /// Profile existing artifacts only
    pub const PROFILE_ONLY: Self = Self {
        build: false,
        profile: true,
    };
}

impl Default for Stages {
    fn default() -> Self {
        Self::ALL
    }
}

/// A profiling step of a worker
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// Artifact validity check
    TestExecutable,
    /// Execution timing
    ExecutionTime,
    /// Perf counter collection
    PerfStat,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::TestExecutable => "test executable",
            Stage::ExecutionTime => "execution time",
            Stage::PerfStat => "perf stat",
        };
        f.write_str(name)
    }
}

/// Profiling stages, in execution order
const PROFILE_STAGES: [Stage; 3] = [Stage::TestExecutable, Stage::ExecutionTime, Stage::PerfStat];

/// How a worker ended
#[derive(Debug, Clone, PartialEq)]
pub enum WorkerOutcome {
    /// Every selected stage succeeded
    Completed {
        /// Measurements, when profiling ran
        stats: Option<ProfileStats>,
    },
    /// A profiling check reported failure; later stages were skipped
    Aborted {
        /// The stage that failed
        stage: Stage,
    },
}

impl WorkerOutcome {
    /// Whether every selected stage succeeded
    pub fn is_completed(&self) -> bool {
        matches!(self, WorkerOutcome::Completed { .. })
    }
}

/// Outcome of every worker, in project order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PipelineReport {
    /// `(build_id, outcome)` pairs
    pub outcomes: Vec<(String, WorkerOutcome)>,
}

impl PipelineReport {
    /// Outcome of one build
    pub fn outcome(&self, build_id: &str) -> Option<&WorkerOutcome> {
        self.outcomes
            .iter()
            .find(|(id, _)| id == build_id)
            .map(|(_, outcome)| outcome)
    }

    /// Number of workers that completed every stage
    pub fn completed_count(&self) -> usize {
        self.outcomes.iter().filter(|(_, o)| o.is_completed()).count()
    }
}

/// Runs one worker per build of a project
pub struct Pipeline {
    project: Arc<Project>,
    reporter: Arc<dyn ProgressReporter>,
    profilers: Arc<dyn ProfilerFactory>,
    status: Arc<LiveStatus>,
    startup_grace: Duration,
}

impl Pipeline {
    /// Create a pipeline over `project`
    pub fn new(
        project: Arc<Project>,
        reporter: Arc<dyn ProgressReporter>,
        profilers: Arc<dyn ProfilerFactory>,
        status: Arc<LiveStatus>,
    ) -> Self {
        Self {
            project,
            reporter,
            profilers,
            status,
            startup_grace: WORKER_STARTUP_GRACE,
        }
    }

    /// Override the pause between spawning workers and rendering
    #[must_use]
    pub fn with_startup_grace(mut self, grace: Duration) -> Self {
        self.startup_grace = grace;
        self
    }

    /// Live-status coordinator shared with the workers
    pub fn status(&self) -> &Arc<LiveStatus> {
        &self.status
    }

    /// Run every build to completion or first failure
    pub async fn run(&self, stages: Stages) -> Result<PipelineReport, AmixisError> {
        let builds = self.project.builds();
        tracing::info!(
            "Starting {} workers (build: {}, profile: {})",
            builds.len(),
            stages.build,
            stages.profile
        );

        let mut handles = Vec::with_capacity(builds.len());
        for build in builds {
            // Registered before spawning so the render loop cannot observe
            // zero workers while a worker is still starting.
            let guard = self.status.register();
            let project = Arc::clone(&self.project);
            let reporter = Arc::clone(&self.reporter);
            let profilers = Arc::clone(&self.profilers);
            let build = build.clone();

            handles.push(tokio::task::spawn_blocking(move || {
                run_worker(&project, &build, reporter, profilers.as_ref(), stages, guard)
            }));
        }

        tokio::time::sleep(self.startup_grace).await;
        self.status.run().await;

        let results = futures::future::join_all(handles).await;

        let mut report = PipelineReport::default();
        let mut first_error = None;
        for (build, joined) in builds.iter().zip(results) {
            match joined {
                Ok(Ok(outcome)) => {
                    tracing::info!(build = %build.build_id, ?outcome, "worker finished");
                    report.outcomes.push((build.build_id.clone(), outcome));
                }
                Ok(Err(e)) => {
                    tracing::error!(build = %build.build_id, "worker failed: {e}");
                    first_error.get_or_insert(AmixisError::Build(e));
                }
                Err(e) => {
                    tracing::error!(build = %build.build_id, "worker panicked: {e}");
                    first_error.get_or_insert(AmixisError::Worker {
                        build: build.build_id.clone(),
                        error: e.to_string(),
                    });
                }
            }
        }

        match first_error {
            Some(e) => Err(e),
            None => Ok(report),
        }
    }
}

/// Run the selected stages for one build
///
/// `_guard` keeps the worker counted as active until this returns.
pub fn run_worker(
    project: &Project,
    build: &Build,
    reporter: Arc<dyn ProgressReporter>,
    profilers: &dyn ProfilerFactory,
    stages: Stages,
    _guard: WorkerGuard,
) -> Result<WorkerOutcome, BuildError> {
    let span = tracing::info_span!("worker", build = %build.build_id);
    let _entered = span.enter();
    let id = build.build_id.as_str();

    if stages.build {
        reporter.print(id, "building");
        let build_system = project.build_system(build.build_system);
        tracing::debug!("building with {}", build_system.name());
        if let Err(e) = build_system.build(project, build, reporter.as_ref()) {
            reporter.print(id, &format!("build failed: {e}"));
            return Err(e);
        }
        reporter.print(id, "build finished");
    }

    if !stages.profile {
        return Ok(WorkerOutcome::Completed { stats: None });
    }

    let mut profiler = profilers.create(project, build, Arc::clone(&reporter));

    for stage in PROFILE_STAGES {
        reporter.print(id, &format!("{stage}..."));
        let passed = match stage {
            Stage::TestExecutable => profiler.test_executable(),
            Stage::ExecutionTime => profiler.execution_time(),
            Stage::PerfStat => profiler.perf_stat_collect(),
        };
        if !passed {
            tracing::warn!("{stage} failed, skipping remaining stages");
            reporter.print(id, &format!("{stage} failed"));
            return Ok(WorkerOutcome::Aborted { stage });
        }
    }

    reporter.print(id, "done");
    Ok(WorkerOutcome::Completed {
        stats: Some(profiler.stats().clone()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_profile_stages_order() {
        assert_eq!(
            PROFILE_STAGES,
            [Stage::TestExecutable, Stage::ExecutionTime, Stage::PerfStat]
        );
        assert_eq!(Stage::PerfStat.to_string(), "perf stat");
    }

    #[test]
    fn test_report_counts_completed() {
        let report = PipelineReport {
            outcomes: vec![
                ("a".to_string(), WorkerOutcome::Completed { stats: None }),
                (
                    "b".to_string(),
                    WorkerOutcome::Aborted {
                        stage: Stage::ExecutionTime,
                    },
                ),
            ],
        };

        assert_eq!(report.completed_count(), 1);
        assert!(report.outcome("b").is_some_and(|o| !o.is_completed()));
        assert!(report.outcome("c").is_none());
    }
}
