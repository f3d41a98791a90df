//! Make build strategy
//!
//! Runs `make` in the project root. The build directory is passed as both
//! `O=` and `BUILD_DIR=` so out-of-tree aware makefiles place their output
//! under `build/<id>`.

use crate::core::build_env::BuildEnvironment;
use crate::core::build_system::BuildSystem;
use crate::core::progress::ProgressReporter;
use crate::core::project::{Build, Project};
use crate::error::BuildError;
use crate::infra::build_tool::{self, path_arg, BuildPaths};
use crate::infra::process::CommandSpec;

/// `make` strategy
#[derive(Debug, Clone, Default)]
pub struct Make;

impl Make {
    /// Command line for `build`
    pub fn command(project: &Project, build: &Build) -> CommandSpec {
        let paths = BuildPaths::resolve(project, build);
        let env = BuildEnvironment::for_build(build);
        let build_dir = path_arg(&paths.build_dir);

        CommandSpec::new("make", paths.source_dir)
            .arg(format!("-j{}", env.jobs))
            .arg(format!("O={build_dir}"))
            .arg(format!("BUILD_DIR={build_dir}"))
            .args(build.build_args.iter().cloned())
            .envs(env.to_env_map())
    }
}

impl BuildSystem for Make {
    fn name(&self) -> &str {
        "make"
    }

    fn build(
        &self,
        project: &Project,
        build: &Build,
        reporter: &dyn ProgressReporter,
    ) -> Result<(), BuildError> {
        build_tool::ensure_tool(build, "make")?;
        build_tool::prepare_build_dir(build, &BuildPaths::resolve(project, build))?;

        reporter.print(&build.build_id, "make");
        tracing::info!("Running make for {}", build.build_id);
        build_tool::run_tool(build, &Self::command(project, build), reporter)
    }
}
