//! Project analysis
//!
//! Walks the project tree and detects CI configuration, test suites,
//! benchmarks and build-system entry points.

use std::path::{Path, PathBuf};

use walkdir::{DirEntry, WalkDir};

use crate::config::defaults::BUILD_ROOT;
use crate::core::project::Project;
use crate::error::AnalysisError;

/// Directories never descended into
const SKIPPED_DIRS: &[&str] = &[".git", ".hg", ".svn", "target", "node_modules", BUILD_ROOT];

/// Files and directories that indicate a CI setup
const CI_MARKERS: &[&str] = &[
    ".gitlab-ci.yml",
    ".travis.yml",
    "Jenkinsfile",
    "azure-pipelines.yml",
    ".circleci",
    "appveyor.yml",
];

/// What the analysis found, as paths relative to the project root
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnalysisReport {
    /// CI configuration files or directories
    pub ci: Vec<PathBuf>,
    /// Test directories and test source files
    pub tests: Vec<PathBuf>,
    /// Benchmark directories
    pub benchmarks: Vec<PathBuf>,
    /// Makefiles and CMakeLists.txt files
    pub build_files: Vec<PathBuf>,
}

impl AnalysisReport {
    /// Whether any CI configuration was found
    pub fn has_ci(&self) -> bool {
        !self.ci.is_empty()
    }

    /// Whether any tests were found
    pub fn has_tests(&self) -> bool {
        !self.tests.is_empty()
    }

    /// Whether any benchmarks were found
    pub fn has_benchmarks(&self) -> bool {
        !self.benchmarks.is_empty()
    }
}

fn is_skipped(entry: &DirEntry) -> bool {
    entry.depth() > 0
        && entry.file_type().is_dir()
        && entry
            .file_name()
            .to_str()
            .is_some_and(|name| SKIPPED_DIRS.contains(&name))
}

fn is_ci_marker(relative: &Path, name: &str) -> bool {
    if CI_MARKERS.contains(&name) {
        return true;
    }
    // .github/workflows/<file>
    let mut components = relative.components();
    matches!(
        (components.next(), components.next(), components.next()),
        (Some(a), Some(b), Some(_))
            if a.as_os_str() == ".github" && b.as_os_str() == "workflows"
    ) && components.next().is_none()
}

fn is_test_dir(name: &str) -> bool {
    matches!(name, "test" | "tests" | "testing" | "unittests")
}

fn is_test_file(name: &str) -> bool {
    let stem = name.split('.').next().unwrap_or(name);
    stem.starts_with("test_") || stem.ends_with("_test") || stem.ends_with("_tests")
}

fn is_bench_dir(name: &str) -> bool {
    matches!(name, "bench" | "benches" | "benchmark" | "benchmarks")
}

/// Analyze the tree rooted at `project`'s path
pub fn analyze(project: &Project) -> Result<AnalysisReport, AnalysisError> {
    analyze_path(project.path())
}

/// Analyze the tree rooted at `root`
pub fn analyze_path(root: &Path) -> Result<AnalysisReport, AnalysisError> {
    if !root.is_dir() {
        return Err(AnalysisError::ProjectNotFound {
            path: root.to_path_buf(),
        });
    }

    let mut report = AnalysisReport::default();
    let walker = WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| !is_skipped(e));

    for entry in walker {
        let entry = entry.map_err(|e| AnalysisError::Walk {
            path: e.path().unwrap_or(root).to_path_buf(),
            error: e.to_string(),
        })?;
        if entry.depth() == 0 {
            continue;
        }

        let Ok(relative) = entry.path().strip_prefix(root) else {
            continue;
        };
        let Some(name) = entry.file_name().to_str() else {
            continue;
        };
        let is_dir = entry.file_type().is_dir();

        if is_ci_marker(relative, name) {
            report.ci.push(relative.to_path_buf());
        } else if is_dir && is_test_dir(name) {
            report.tests.push(relative.to_path_buf());
        } else if is_dir && is_bench_dir(name) {
            report.benchmarks.push(relative.to_path_buf());
        } else if !is_dir && (name == "Makefile" || name == "CMakeLists.txt") {
            report.build_files.push(relative.to_path_buf());
        } else if !is_dir && is_test_file(name) {
            report.tests.push(relative.to_path_buf());
        }
    }

    tracing::info!(
        ci = report.ci.len(),
        tests = report.tests.len(),
        benchmarks = report.benchmarks.len(),
        build_files = report.build_files.len(),
        "Analyzed {}",
        root.display()
    );

    Ok(report)
}
