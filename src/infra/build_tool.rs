//! Shared plumbing for build-system strategies
//!
//! Creates build directories and runs a build tool while forwarding its
//! output to the progress reporter.

use std::path::{Path, PathBuf};

use crate::core::progress::ProgressReporter;
use crate::core::project::{Build, Project};
use crate::error::BuildError;
use crate::infra::process::{self, CommandSpec};

/// Paths of `build` as seen by the machine it runs on
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildPaths {
    /// Project root
    pub source_dir: PathBuf,
    /// Build output directory
    pub build_dir: PathBuf,
}

impl BuildPaths {
    /// Resolve the paths of `build` within `project`
    pub fn resolve(project: &Project, build: &Build) -> Self {
        let root = project.path();
        Self {
            source_dir: process::machine_path(root, root, &build.machine),
            build_dir: process::machine_path(root, &build.build_dir(root), &build.machine),
        }
    }
}

/// Fail early when a local build tool is missing
pub fn ensure_tool(build: &Build, tool: &str) -> Result<(), BuildError> {
    if build.machine.is_local() && which::which(tool).is_err() {
        return Err(BuildError::ToolNotFound {
            tool: tool.to_string(),
        });
    }
    Ok(())
}

/// Create the build output directory on the build's machine
pub fn prepare_build_dir(build: &Build, paths: &BuildPaths) -> Result<(), BuildError> {
    if build.machine.is_local() {
        return std::fs::create_dir_all(&paths.build_dir).map_err(|e| BuildError::BuildDir {
            path: paths.build_dir.clone(),
            error: e.to_string(),
        });
    }

    let spec = CommandSpec::new("mkdir", "/")
        .arg("-p")
        .arg(paths.build_dir.to_string_lossy());
    let output = process::run_captured(&spec, &build.machine, build.auth.as_ref()).map_err(|e| {
        BuildError::BuildDir {
            path: paths.build_dir.clone(),
            error: e.to_string(),
        }
    })?;
    if !output.status.success() {
        return Err(BuildError::BuildDir {
            path: paths.build_dir.clone(),
            error: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }
    Ok(())
}

/// Run one build-tool invocation, stepping the progress indicator per line
pub fn run_tool(
    build: &Build,
    spec: &CommandSpec,
    reporter: &dyn ProgressReporter,
) -> Result<(), BuildError> {
    let id = build.build_id.as_str();
    let status = process::run_streaming(spec, &build.machine, build.auth.as_ref(), &|line: &str| {
        reporter.step(id);
        let line = line.trim();
        if !line.is_empty() {
            reporter.print(id, line);
        }
    })
    .map_err(|e| BuildError::Spawn {
        build: id.to_string(),
        tool: spec.program.clone(),
        error: e.to_string(),
    })?;

    if status.success() {
        Ok(())
    } else {
        Err(BuildError::Failed {
            build: id.to_string(),
            tool: spec.program.clone(),
            status: status.to_string(),
        })
    }
}

/// Path argument for a tool invocation
pub fn path_arg(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}
