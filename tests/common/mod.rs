//! Common test utilities and helpers
//!
//! This module provides shared utilities for integration tests: a temporary
//! project directory, sample input files and fake pipeline collaborators
//! that record every call per build.

use std::collections::{HashMap, HashSet};
use std::path::PathBuf;
use std::process::{Command, Output};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use amixis::core::build_system::BuildSystem;
use amixis::core::pipeline::Stage;
use amixis::core::profiler::{PerfCounter, ProfileStats, Profiler, ProfilerFactory};
use amixis::core::progress::ProgressReporter;
use amixis::core::project::{Build, Project};
use amixis::error::BuildError;
use tempfile::TempDir;

/// Test project context
///
/// Creates a temporary directory for test projects and provides
/// utilities for setting up test scenarios.
pub struct TestProject {
    /// Temporary directory for the test project
    pub dir: TempDir,
}

impl TestProject {
    /// Create a new test project in a temporary directory
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().expect("Failed to create temp directory"),
        }
    }

    /// Get the path to the test project directory
    pub fn path(&self) -> PathBuf {
        self.dir.path().to_path_buf()
    }

    /// Create a file in the test project
    pub fn create_file(&self, name: &str, content: &str) {
        let path = self.dir.path().join(name);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("Failed to create parent directories");
        }
        std::fs::write(path, content).expect("Failed to write file");
    }

    /// Create a directory in the test project
    #[allow(dead_code)]
    pub fn create_dir(&self, name: &str) {
        let path = self.dir.path().join(name);
        std::fs::create_dir_all(path).expect("Failed to create directory");
    }

    /// Check if a file exists in the test project
    #[allow(dead_code)]
    pub fn file_exists(&self, name: &str) -> bool {
        self.dir.path().join(name).exists()
    }
}

impl Default for TestProject {
    fn default() -> Self {
        Self::new()
    }
}

/// Run the amixis binary in `cwd`
#[allow(dead_code)]
pub fn run_amixis(cwd: &std::path::Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_amixis"))
        .current_dir(cwd)
        .args(args)
        .output()
        .expect("Failed to execute amixis")
}

/// Input file with three local builds
#[allow(dead_code)]
pub const SAMPLE_INPUT: &str = r#"
[[builds]]
id = "native"
arch = "x86"
build_system = "make"
executable = "app"

[[builds]]
id = "arm"
arch = "arm"
build_system = "cmake"
executable = "bin/app"
config_flags = ["-DCMAKE_BUILD_TYPE=Release"]

[[builds]]
id = "riscv"
arch = "riscv"
build_system = "make"
executable = "app"
args = ["--quick"]

[profile]
events = ["cycles", "instructions"]
"#;

/// Input file with an unsupported architecture
#[allow(dead_code)]
pub const INVALID_INPUT: &str = r#"
[[builds]]
id = "mips"
arch = "mips"
build_system = "make"
executable = "app"
"#;

/// Calls made by fake collaborators, in call order
#[derive(Debug, Default)]
pub struct CallLog {
    calls: Mutex<Vec<(String, &'static str)>>,
}

#[allow(dead_code)]
impl CallLog {
    /// Record `op` for `build_id`
    pub fn record(&self, build_id: &str, op: &'static str) {
        self.calls
            .lock()
            .unwrap()
            .push((build_id.to_string(), op));
    }

    /// Operations recorded for one build, in order
    pub fn ops(&self, build_id: &str) -> Vec<&'static str> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|(id, _)| id == build_id)
            .map(|(_, op)| *op)
            .collect()
    }

    /// How many times `op` ran for `build_id`
    pub fn count(&self, build_id: &str, op: &str) -> usize {
        self.ops(build_id).iter().filter(|o| **o == op).count()
    }

    /// Total number of recorded calls
    pub fn len(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

/// Build system that records calls and fails for selected builds
#[derive(Debug, Default)]
pub struct FakeBuildSystem {
    log: Arc<CallLog>,
    failing: HashSet<String>,
    panicking: HashSet<String>,
    delay: Duration,
}

#[allow(dead_code)]
impl FakeBuildSystem {
    pub fn new(log: Arc<CallLog>) -> Self {
        Self {
            log,
            ..Self::default()
        }
    }

    /// Return a build error for `build_id`
    pub fn failing(mut self, build_id: &str) -> Self {
        self.failing.insert(build_id.to_string());
        self
    }

    /// Panic while building `build_id`
    pub fn panicking(mut self, build_id: &str) -> Self {
        self.panicking.insert(build_id.to_string());
        self
    }

    /// Sleep this long inside every build
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

impl BuildSystem for FakeBuildSystem {
    fn name(&self) -> &str {
        "fake"
    }

    fn build(
        &self,
        _project: &Project,
        build: &Build,
        reporter: &dyn ProgressReporter,
    ) -> Result<(), BuildError> {
        let id = build.build_id.as_str();
        self.log.record(id, "build");
        reporter.step(id);
        std::thread::sleep(self.delay);

        if self.panicking.contains(id) {
            panic!("fake build system panicked for {id}");
        }
        if self.failing.contains(id) {
            return Err(BuildError::Failed {
                build: id.to_string(),
                tool: "fake".to_string(),
                status: "exit status: 2".to_string(),
            });
        }
        Ok(())
    }
}

/// Creates [`FakeProfiler`]s that fail at a chosen stage per build
#[derive(Debug, Default)]
pub struct FakeProfilerFactory {
    log: Arc<CallLog>,
    failures: HashMap<String, Stage>,
}

#[allow(dead_code)]
impl FakeProfilerFactory {
    pub fn new(log: Arc<CallLog>) -> Self {
        Self {
            log,
            failures: HashMap::new(),
        }
    }

    /// Make `stage` report failure for `build_id`
    pub fn failing_at(mut self, build_id: &str, stage: Stage) -> Self {
        self.failures.insert(build_id.to_string(), stage);
        self
    }
}

impl ProfilerFactory for FakeProfilerFactory {
    fn create(
        &self,
        _project: &Project,
        build: &Build,
        reporter: Arc<dyn ProgressReporter>,
    ) -> Box<dyn Profiler> {
        Box::new(FakeProfiler {
            log: Arc::clone(&self.log),
            fail_at: self.failures.get(&build.build_id).copied(),
            reporter,
            stats: ProfileStats::new(&build.build_id),
        })
    }
}

/// Profiler that records calls instead of running anything
pub struct FakeProfiler {
    log: Arc<CallLog>,
    fail_at: Option<Stage>,
    reporter: Arc<dyn ProgressReporter>,
    stats: ProfileStats,
}

impl FakeProfiler {
    fn check(&self, stage: Stage, op: &'static str) -> bool {
        self.log.record(&self.stats.build_id, op);
        self.reporter.step(&self.stats.build_id);
        self.fail_at != Some(stage)
    }
}

impl Profiler for FakeProfiler {
    fn test_executable(&mut self) -> bool {
        self.check(Stage::TestExecutable, "test_executable")
    }

    fn execution_time(&mut self) -> bool {
        let passed = self.check(Stage::ExecutionTime, "execution_time");
        if passed {
            self.stats.execution_time_secs = Some(0.25);
        }
        passed
    }

    fn perf_stat_collect(&mut self) -> bool {
        let passed = self.check(Stage::PerfStat, "perf_stat");
        if passed {
            self.stats.counters.push(PerfCounter {
                event: "cycles".to_string(),
                value: 1000.0,
                unit: String::new(),
            });
        }
        passed
    }

    fn stats(&self) -> &ProfileStats {
        &self.stats
    }
}
