//! CMake build strategy
//!
//! Configures `build/<id>` with the build's toolchain, then builds it.

use crate::core::build_env::BuildEnvironment;
use crate::core::build_system::BuildSystem;
use crate::core::progress::ProgressReporter;
use crate::core::project::{Arch, Build, Project};
use crate::error::BuildError;
use crate::infra::build_tool::{self, path_arg, BuildPaths};
use crate::infra::process::CommandSpec;

/// `cmake` strategy
#[derive(Debug, Clone, Default)]
pub struct CMake;

fn system_processor(arch: Arch) -> &'static str {
    match arch {
        Arch::X86 => "x86_64",
        Arch::Arm => "arm",
        Arch::Arm64 => "aarch64",
        Arch::Riscv => "riscv64",
    }
}

impl CMake {
    /// Configure step for `build`
    pub fn configure_command(project: &Project, build: &Build) -> CommandSpec {
        let paths = BuildPaths::resolve(project, build);
        let env = BuildEnvironment::for_build(build);

        let mut spec = CommandSpec::new("cmake", paths.source_dir.clone())
            .arg("-S")
            .arg(path_arg(&paths.source_dir))
            .arg("-B")
            .arg(path_arg(&paths.build_dir))
            .arg(format!("-DCMAKE_C_COMPILER={}", env.cc))
            .arg(format!("-DCMAKE_CXX_COMPILER={}", env.cxx));

        if env.cross {
            spec = spec.arg("-DCMAKE_SYSTEM_NAME=Linux").arg(format!(
                "-DCMAKE_SYSTEM_PROCESSOR={}",
                system_processor(build.arch)
            ));
        }

        spec.args(build.config_flags.iter().cloned())
    }

    /// Build step for `build`
    pub fn build_command(project: &Project, build: &Build) -> CommandSpec {
        let paths = BuildPaths::resolve(project, build);
        let env = BuildEnvironment::for_build(build);

        CommandSpec::new("cmake", paths.source_dir)
            .arg("--build")
            .arg(path_arg(&paths.build_dir))
            .arg("-j")
            .arg(env.jobs.to_string())
            .args(build.build_args.iter().cloned())
    }
}

impl BuildSystem for CMake {
    fn name(&self) -> &str {
        "cmake"
    }

    fn build(
        &self,
        project: &Project,
        build: &Build,
        reporter: &dyn ProgressReporter,
    ) -> Result<(), BuildError> {
        build_tool::ensure_tool(build, "cmake")?;
        build_tool::prepare_build_dir(build, &BuildPaths::resolve(project, build))?;

        reporter.print(&build.build_id, "cmake configure");
        tracing::info!("Configuring {} with cmake", build.build_id);
        build_tool::run_tool(build, &Self::configure_command(project, build), reporter)?;

        reporter.print(&build.build_id, "cmake build");
        tracing::info!("Building {} with cmake", build.build_id);
        build_tool::run_tool(build, &Self::build_command(project, build), reporter)
    }
}
