//! Profiling with `perf stat`
//!
//! [`PerfProfiler`] checks that a build's artifact runs, times one execution
//! and collects perf counters for another. Results are written as JSON next
//! to the build output.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use crate::config::defaults::{DEFAULT_PERF_EVENTS, PROFILE_REPORT_FILE};
use crate::core::profiler::{PerfCounter, ProfileStats, Profiler, ProfilerFactory};
use crate::core::progress::ProgressReporter;
use crate::core::project::{Build, Project};
use crate::infra::process::{self, CommandSpec};

/// Profiler backed by the `perf` tool
pub struct PerfProfiler {
    project_root: PathBuf,
    build: Build,
    events: Vec<String>,
    reporter: Arc<dyn ProgressReporter>,
    stats: ProfileStats,
}

impl PerfProfiler {
    /// Create a profiler for `build`
    pub fn new(
        project: &Project,
        build: &Build,
        events: Vec<String>,
        reporter: Arc<dyn ProgressReporter>,
    ) -> Self {
        Self {
            project_root: project.path().to_path_buf(),
            build: build.clone(),
            events,
            reporter,
            stats: ProfileStats::new(&build.build_id),
        }
    }

    fn id(&self) -> &str {
        &self.build.build_id
    }

    fn local_executable(&self) -> PathBuf {
        self.build.executable_path(&self.project_root)
    }

    fn machine_executable(&self) -> PathBuf {
        process::machine_path(
            &self.project_root,
            &self.local_executable(),
            &self.build.machine,
        )
    }

    fn machine_build_dir(&self) -> PathBuf {
        process::machine_path(
            &self.project_root,
            &self.build.build_dir(&self.project_root),
            &self.build.machine,
        )
    }

    fn executable_command(&self) -> CommandSpec {
        CommandSpec::new(
            self.machine_executable().to_string_lossy(),
            self.machine_build_dir(),
        )
        .args(self.build.args.iter().cloned())
    }

    /// Run the artifact once, returning whether it exited successfully
    fn run_once(&self) -> bool {
        let spec = self.executable_command();
        match process::run_captured(&spec, &self.build.machine, self.build.auth.as_ref()) {
            Ok(output) if output.status.success() => true,
            Ok(output) => {
                tracing::warn!(
                    "{} exited with {}: {}",
                    spec.program,
                    output.status,
                    String::from_utf8_lossy(&output.stderr).trim()
                );
                false
            }
            Err(e) => {
                tracing::warn!("failed to run {}: {e}", spec.program);
                false
            }
        }
    }

    fn artifact_present(&self) -> bool {
        if !self.build.machine.is_local() {
            let spec = CommandSpec::new("test", "/")
                .arg("-x")
                .arg(self.machine_executable().to_string_lossy());
            return process::run_captured(&spec, &self.build.machine, self.build.auth.as_ref())
                .is_ok_and(|o| o.status.success());
        }
        is_executable_file(&self.local_executable())
    }

    fn write_report(&self) {
        let path = self
            .build
            .build_dir(&self.project_root)
            .join(PROFILE_REPORT_FILE);
        let result = serde_json::to_string_pretty(&self.stats)
            .map_err(|e| e.to_string())
            .and_then(|json| {
                if let Some(parent) = path.parent() {
                    std::fs::create_dir_all(parent).map_err(|e| e.to_string())?;
                }
                std::fs::write(&path, json).map_err(|e| e.to_string())
            });
        match result {
            Ok(()) => tracing::info!("Wrote {}", path.display()),
            Err(e) => tracing::warn!("Failed to write {}: {e}", path.display()),
        }
    }
}

#[cfg(unix)]
fn is_executable_file(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    std::fs::metadata(path).is_ok_and(|m| m.is_file() && m.permissions().mode() & 0o111 != 0)
}

#[cfg(not(unix))]
fn is_executable_file(path: &Path) -> bool {
    path.is_file()
}

impl Profiler for PerfProfiler {
    fn test_executable(&mut self) -> bool {
        self.reporter.print(self.id(), "checking executable");
        if !self.artifact_present() {
            tracing::warn!("executable {} not found", self.local_executable().display());
            self.reporter.print(self.id(), "executable not found");
            return false;
        }
        self.reporter.step(self.id());
        self.run_once()
    }

    fn execution_time(&mut self) -> bool {
        self.reporter.print(self.id(), "timing execution");
        let start = Instant::now();
        if !self.run_once() {
            return false;
        }
        let elapsed = start.elapsed().as_secs_f64();
        self.reporter.step(self.id());
        self.reporter
            .print(self.id(), &format!("execution time {elapsed:.3}s"));
        self.stats.execution_time_secs = Some(elapsed);
        true
    }

    fn perf_stat_collect(&mut self) -> bool {
        if self.build.machine.is_local() && which::which("perf").is_err() {
            tracing::warn!("perf not found in PATH");
            self.reporter.print(self.id(), "perf not found");
            return false;
        }

        self.reporter.print(self.id(), "collecting perf counters");
        let exe = self.executable_command();
        let spec = CommandSpec::new("perf", exe.cwd.clone())
            .arg("stat")
            .arg("-x,")
            .arg("-e")
            .arg(self.events.join(","))
            .arg("--")
            .arg(exe.program)
            .args(exe.args);

        let output = match process::run_captured(&spec, &self.build.machine, self.build.auth.as_ref())
        {
            Ok(output) => output,
            Err(e) => {
                tracing::warn!("failed to run perf: {e}");
                return false;
            }
        };
        if !output.status.success() {
            tracing::warn!(
                "perf stat exited with {}: {}",
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            );
            return false;
        }

        self.stats.counters = parse_perf_csv(&String::from_utf8_lossy(&output.stderr));
        self.reporter.step(self.id());
        self.reporter.print(
            self.id(),
            &format!("collected {} counters", self.stats.counters.len()),
        );
        self.write_report();
        true
    }

    fn stats(&self) -> &ProfileStats {
        &self.stats
    }
}

/// Parse `perf stat -x,` output
///
/// Each data line is `value,unit,event,...`. Comment lines and counters perf
/// could not read are skipped.
pub fn parse_perf_csv(output: &str) -> Vec<PerfCounter> {
    output
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .filter_map(|line| {
            let mut fields = line.split(',');
            let value = fields.next()?.trim();
            let unit = fields.next()?.trim();
            let event = fields.next()?.trim();
            if event.is_empty() {
                return None;
            }
            let value: f64 = value.parse().ok()?;
            Some(PerfCounter {
                event: event.to_string(),
                value,
                unit: unit.to_string(),
            })
        })
        .collect()
}

/// Creates a [`PerfProfiler`] per build
#[derive(Debug, Clone)]
pub struct PerfProfilerFactory {
    events: Vec<String>,
}

impl PerfProfilerFactory {
    /// Factory collecting the given perf events
    pub fn new(events: Vec<String>) -> Self {
        Self { events }
    }
}

impl Default for PerfProfilerFactory {
    fn default() -> Self {
        Self::new(DEFAULT_PERF_EVENTS.iter().map(ToString::to_string).collect())
    }
}

impl ProfilerFactory for PerfProfilerFactory {
    fn create(
        &self,
        project: &Project,
        build: &Build,
        reporter: Arc<dyn ProgressReporter>,
    ) -> Box<dyn Profiler> {
        Box::new(PerfProfiler::new(project, build, self.events.clone(), reporter))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::build_system::NoopBuildSystem;
    use crate::core::progress::NullReporter;
    use crate::core::project::{Arch, BuildSystemKind};
    use tempfile::TempDir;

    const PERF_OUTPUT: &str = "\
# started on Mon Oct 12 10:00:00 2026

12.34,msec,task-clock,12340000,100.00,0.987,CPUs utilized
45678901,,cycles,12340000,100.00,3.702,GHz
<not counted>,,cache-misses,0,0.00,,
<not supported>,,branch-misses,0,0.00,,
98765432,,instructions,12340000,100.00,2.16,insn per cycle
";

    fn project(dir: &TempDir) -> Project {
        Project::new(
            dir.path(),
            Arc::new(NoopBuildSystem::new("make")),
            Arc::new(NoopBuildSystem::new("cmake")),
        )
    }

    #[test]
    fn test_parse_perf_csv() {
        let counters = parse_perf_csv(PERF_OUTPUT);

        assert_eq!(counters.len(), 3);
        assert_eq!(counters[0].event, "task-clock");
        assert_eq!(counters[0].unit, "msec");
        assert!((counters[0].value - 12.34).abs() < f64::EPSILON);
        assert_eq!(counters[1].event, "cycles");
        assert_eq!(counters[2].event, "instructions");
    }

    #[test]
    fn test_parse_perf_csv_ignores_garbage() {
        assert!(parse_perf_csv("not,a\nfoo\n").is_empty());
    }

    #[test]
    fn test_missing_executable_fails_check() {
        let dir = TempDir::new().unwrap();
        let build =
            Build::new("native", Arch::X86, BuildSystemKind::Make).with_executable("bin/missing");
        let mut profiler =
            PerfProfiler::new(&project(&dir), &build, vec![], Arc::new(NullReporter));

        assert!(!profiler.test_executable());
    }

    #[cfg(unix)]
    #[test]
    fn test_runs_and_times_executable() {
        use std::os::unix::fs::PermissionsExt;

        let dir = TempDir::new().unwrap();
        let build = Build::new("native", Arch::X86, BuildSystemKind::Make).with_executable("app");
        let exe = build.executable_path(dir.path());
        std::fs::create_dir_all(exe.parent().unwrap()).unwrap();
        std::fs::write(&exe, "#!/bin/sh\nexit 0\n").unwrap();
        std::fs::set_permissions(&exe, std::fs::Permissions::from_mode(0o755)).unwrap();

        let mut profiler =
            PerfProfiler::new(&project(&dir), &build, vec![], Arc::new(NullReporter));

        assert!(profiler.test_executable());
        assert!(profiler.execution_time());
        assert!(profiler.stats().execution_time_secs.is_some());
    }

    #[cfg(unix)]
    #[test]
    fn test_failing_executable_fails_check() {
        use std::os::unix::fs::PermissionsExt;

        let dir = TempDir::new().unwrap();
        let build = Build::new("native", Arch::X86, BuildSystemKind::Make).with_executable("app");
        let exe = build.executable_path(dir.path());
        std::fs::create_dir_all(exe.parent().unwrap()).unwrap();
        std::fs::write(&exe, "#!/bin/sh\nexit 3\n").unwrap();
        std::fs::set_permissions(&exe, std::fs::Permissions::from_mode(0o755)).unwrap();

        let mut profiler =
            PerfProfiler::new(&project(&dir), &build, vec![], Arc::new(NullReporter));

        assert!(!profiler.test_executable());
    }
}
