//! Project and build definitions
//!
//! A [`Project`] is the root unit of work: a directory, the builds configured
//! for it and the build-system strategies those builds can use.

use std::collections::HashSet;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::config::defaults::BUILD_ROOT;
use crate::core::build_system::BuildSystem;
use crate::error::ConfigError;

/// Target architecture of a build
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Arch {
    /// 32/64-bit x86
    X86,
    /// 32-bit ARM (hard float)
    Arm,
    /// AArch64
    Arm64,
    /// RISC-V 64
    Riscv,
}

impl Arch {
    /// Name used in configuration files
    pub fn as_str(self) -> &'static str {
        match self {
            Arch::X86 => "x86",
            Arch::Arm => "arm",
            Arch::Arm64 => "arm64",
            Arch::Riscv => "riscv",
        }
    }
}

impl fmt::Display for Arch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Arch {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "x86" | "x86_64" | "amd64" => Ok(Arch::X86),
            "arm" | "armhf" => Ok(Arch::Arm),
            "arm64" | "aarch64" => Ok(Arch::Arm64),
            "riscv" | "riscv64" => Ok(Arch::Riscv),
            other => Err(other.to_string()),
        }
    }
}

/// Which build-system strategy a build uses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BuildSystemKind {
    /// Plain make
    Make,
    /// CMake configure + build
    Cmake,
}

impl BuildSystemKind {
    /// Name used in configuration files
    pub fn as_str(self) -> &'static str {
        match self {
            BuildSystemKind::Make => "make",
            BuildSystemKind::Cmake => "cmake",
        }
    }
}

impl fmt::Display for BuildSystemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BuildSystemKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "make" => Ok(BuildSystemKind::Make),
            "cmake" => Ok(BuildSystemKind::Cmake),
            other => Err(other.to_string()),
        }
    }
}

/// Identity of the machine a build runs on
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MachineInfo {
    /// Host name or address; `None` means the local machine
    #[serde(default)]
    pub address: Option<String>,

    /// SSH port
    #[serde(default = "default_ssh_port")]
    pub port: u16,

    /// Project location on the remote machine (defaults to the local path)
    #[serde(default)]
    pub project_path: Option<PathBuf>,
}

fn default_ssh_port() -> u16 {
    22
}

impl MachineInfo {
    /// The local machine
    pub fn local() -> Self {
        Self {
            address: None,
            port: default_ssh_port(),
            project_path: None,
        }
    }

    /// Whether commands for this machine run without ssh
    pub fn is_local(&self) -> bool {
        match self.address.as_deref() {
            None => true,
            Some(addr) => matches!(addr.trim(), "" | "localhost" | "127.0.0.1" | "::1"),
        }
    }
}

impl Default for MachineInfo {
    fn default() -> Self {
        Self::local()
    }
}

/// Credentials used to reach a remote machine
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MachineAuthenticationInfo {
    /// Login name
    pub username: String,

    /// Password (handed to `sshpass` through the environment)
    #[serde(default)]
    pub password: Option<String>,

    /// Private key passed to `ssh -i`
    #[serde(default)]
    pub identity_file: Option<PathBuf>,
}

impl fmt::Debug for MachineAuthenticationInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MachineAuthenticationInfo")
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("identity_file", &self.identity_file)
            .finish()
    }
}

/// One configured target to build, test, time and profile
#[derive(Debug, Clone, PartialEq)]
pub struct Build {
    /// Unique id within the project
    pub build_id: String,
    /// Target architecture
    pub arch: Arch,
    /// Build-system strategy
    pub build_system: BuildSystemKind,
    /// Machine the build and its profiling run on
    pub machine: MachineInfo,
    /// Credentials for `machine`
    pub auth: Option<MachineAuthenticationInfo>,
    /// Artifact to profile, relative to the build directory
    pub executable: PathBuf,
    /// Arguments passed to the artifact when it is run
    pub args: Vec<String>,
    /// Extra arguments for the build tool
    pub build_args: Vec<String>,
    /// Extra arguments for the configure step (cmake only)
    pub config_flags: Vec<String>,
    /// Compiler prefix overriding the architecture default
    pub toolchain: Option<String>,
}

impl Build {
    /// Create a local build with default settings
    pub fn new(build_id: impl Into<String>, arch: Arch, build_system: BuildSystemKind) -> Self {
        Self {
            build_id: build_id.into(),
            arch,
            build_system,
            machine: MachineInfo::local(),
            auth: None,
            executable: PathBuf::new(),
            args: Vec::new(),
            build_args: Vec::new(),
            config_flags: Vec::new(),
            toolchain: None,
        }
    }

    /// Set the artifact path
    #[must_use]
    pub fn with_executable(mut self, executable: impl Into<PathBuf>) -> Self {
        self.executable = executable.into();
        self
    }

    /// Directory receiving this build's output
    pub fn build_dir(&self, project_root: &Path) -> PathBuf {
        project_root.join(BUILD_ROOT).join(&self.build_id)
    }

    /// Full path of the artifact to profile
    pub fn executable_path(&self, project_root: &Path) -> PathBuf {
        self.build_dir(project_root).join(&self.executable)
    }
}

/// The root unit of work
#[derive(Clone)]
pub struct Project {
    path: PathBuf,
    builds: Vec<Build>,
    make: Arc<dyn BuildSystem>,
    cmake: Arc<dyn BuildSystem>,
}

impl fmt::Debug for Project {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Project")
            .field("path", &self.path)
            .field("builds", &self.builds)
            .field("make", &self.make.name())
            .field("cmake", &self.cmake.name())
            .finish()
    }
}

impl Project {
    /// Create a project with no builds yet
    pub fn new(
        path: impl Into<PathBuf>,
        make: Arc<dyn BuildSystem>,
        cmake: Arc<dyn BuildSystem>,
    ) -> Self {
        Self {
            path: path.into(),
            builds: Vec::new(),
            make,
            cmake,
        }
    }

    /// Project root
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Configured builds, in display order
    pub fn builds(&self) -> &[Build] {
        &self.builds
    }

    /// Replace the configured builds
    ///
    /// Fails without modifying the project when two builds share an id.
    pub fn set_builds(&mut self, builds: Vec<Build>) -> Result<(), ConfigError> {
        let mut seen = HashSet::new();
        for build in &builds {
            if !seen.insert(build.build_id.as_str()) {
                return Err(ConfigError::DuplicateBuildId {
                    id: build.build_id.clone(),
                });
            }
        }
        self.builds = builds;
        Ok(())
    }

    /// Look up a build by id
    pub fn build(&self, build_id: &str) -> Option<&Build> {
        self.builds.iter().find(|b| b.build_id == build_id)
    }

    /// Strategy for the given build-system kind
    pub fn build_system(&self, kind: BuildSystemKind) -> &Arc<dyn BuildSystem> {
        match kind {
            BuildSystemKind::Make => &self.make,
            BuildSystemKind::Cmake => &self.cmake,
        }
    }
}
