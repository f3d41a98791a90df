//! Analyze command implementation
//!
//! Implements `amixis --analyze PATH`, which reports the CI setup, tests,
//! benchmarks and build files of a project without building it.

use anyhow::{Context, Result};
use std::path::Path;
use std::sync::Arc;

use crate::cli::output::{create_spinner, print_analysis};
use crate::core::analyze::{self, AnalysisReport};
use crate::core::project::Project;
use crate::infra::cmake::CMake;
use crate::infra::make::Make;

/// Project rooted at `project_dir` with the real build strategies
pub fn open_project(project_dir: &Path) -> Project {
    Project::new(project_dir, Arc::new(Make), Arc::new(CMake))
}

/// Scan the project and log the findings
pub fn scan(project: &Project) -> Result<AnalysisReport> {
    let report = analyze::analyze(project)
        .with_context(|| format!("Failed to analyze {}", project.path().display()))?;

    tracing::info!(
        ci = report.has_ci(),
        tests = report.has_tests(),
        benchmarks = report.has_benchmarks(),
        build_files = report.build_files.len(),
        "analysis finished"
    );
    Ok(report)
}

/// Execute the analyze command
pub async fn execute(project_dir: &Path) -> Result<()> {
    let project = open_project(project_dir);
    let spinner = create_spinner(&format!("Analyzing {}...", project_dir.display()));
    let result = scan(&project);
    spinner.finish_and_clear();

    print_analysis(&result?);
    Ok(())
}
