//! Input configuration (input.toml) parsing and validation
//!
//! The input file lists the builds of a project. Parsing fills a
//! [`Project`]'s build list; validation performs the same checks without a
//! project so a file can be checked in isolation.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::config::defaults::DEFAULT_PERF_EVENTS;
use crate::core::project::{
    Arch, Build, BuildSystemKind, MachineAuthenticationInfo, MachineInfo, Project,
};
use crate::error::ConfigError;

/// Contents of an input file
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct InputConfig {
    /// Configured builds, in display order
    #[serde(default)]
    pub builds: Vec<BuildEntry>,

    /// Profiling settings
    #[serde(default)]
    pub profile: ProfileSection,
}

/// One `[[builds]]` entry
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct BuildEntry {
    /// Build id, unique within the file
    pub id: String,

    /// Target architecture name
    pub arch: String,

    /// Build system name ("make" or "cmake")
    pub build_system: String,

    /// Artifact to profile, relative to the build directory
    pub executable: String,

    /// Arguments for the artifact
    #[serde(default)]
    pub args: Vec<String>,

    /// Extra build-tool arguments
    #[serde(default)]
    pub build_args: Vec<String>,

    /// Extra configure arguments
    #[serde(default)]
    pub config_flags: Vec<String>,

    /// Compiler prefix override
    #[serde(default)]
    pub toolchain: Option<String>,

    /// Target machine (local when absent)
    #[serde(default)]
    pub machine: Option<MachineInfo>,

    /// Credentials for the target machine
    #[serde(default)]
    pub auth: Option<MachineAuthenticationInfo>,
}

/// `[profile]` section
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ProfileSection {
    /// Events passed to `perf stat -e`
    #[serde(default = "default_events")]
    pub events: Vec<String>,
}

fn default_events() -> Vec<String> {
    DEFAULT_PERF_EVENTS.iter().map(ToString::to_string).collect()
}

impl Default for ProfileSection {
    fn default() -> Self {
        Self {
            events: default_events(),
        }
    }
}

fn build_id_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[A-Za-z0-9][A-Za-z0-9_.-]*$").expect("valid build id regex"))
}

impl InputConfig {
    /// Parse from a TOML string
    pub fn from_toml(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Read and parse an input file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.is_file() {
            return Err(ConfigError::NotFound {
                path: path.to_path_buf(),
            });
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        Self::from_toml(&content).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            error: e.message().to_string(),
        })
    }

    /// Check the configuration for semantic errors
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.to_builds().map(|_| ())
    }

    /// Convert the entries into builds, validating along the way
    pub fn to_builds(&self) -> Result<Vec<Build>, ConfigError> {
        if self.builds.is_empty() {
            return Err(ConfigError::Invalid {
                message: "no builds configured".to_string(),
            });
        }

        if self.profile.events.iter().any(|e| e.trim().is_empty()) {
            return Err(ConfigError::Invalid {
                message: "profile.events must not contain empty event names".to_string(),
            });
        }

        let mut seen = HashSet::new();
        let mut builds = Vec::with_capacity(self.builds.len());
        for entry in &self.builds {
            if !seen.insert(entry.id.as_str()) {
                return Err(ConfigError::DuplicateBuildId {
                    id: entry.id.clone(),
                });
            }
            builds.push(entry.to_build()?);
        }
        Ok(builds)
    }
}

impl BuildEntry {
    /// Convert into a [`Build`]
    pub fn to_build(&self) -> Result<Build, ConfigError> {
        if !build_id_regex().is_match(&self.id) {
            return Err(ConfigError::Invalid {
                message: format!(
                    "build id '{}' must start with a letter or digit and contain only letters, digits, '_', '.' or '-'",
                    self.id
                ),
            });
        }

        let arch: Arch = self.arch.parse().map_err(|name| ConfigError::UnknownArch {
            build: self.id.clone(),
            name,
        })?;

        let build_system: BuildSystemKind =
            self.build_system
                .parse()
                .map_err(|name| ConfigError::UnknownBuildSystem {
                    build: self.id.clone(),
                    name,
                })?;

        if self.executable.trim().is_empty() {
            return Err(ConfigError::Invalid {
                message: format!("build '{}' has an empty executable path", self.id),
            });
        }

        let executable = PathBuf::from(&self.executable);
        if executable.is_absolute() {
            return Err(ConfigError::Invalid {
                message: format!(
                    "build '{}': executable must be relative to the build directory",
                    self.id
                ),
            });
        }

        let machine = self.machine.clone().unwrap_or_default();
        if !machine.is_local() && self.auth.is_none() {
            return Err(ConfigError::Invalid {
                message: format!(
                    "build '{}' targets remote machine '{}' but has no [auth] section",
                    self.id,
                    machine.address.as_deref().unwrap_or_default()
                ),
            });
        }

        Ok(Build {
            build_id: self.id.clone(),
            arch,
            build_system,
            machine,
            auth: self.auth.clone().map(|mut auth| {
                auth.identity_file = auth.identity_file.as_deref().map(expand_home);
                auth
            }),
            executable,
            args: self.args.clone(),
            build_args: self.build_args.clone(),
            config_flags: self.config_flags.clone(),
            toolchain: self.toolchain.clone().filter(|t| !t.trim().is_empty()),
        })
    }
}

/// Expand a leading `~` to the home directory
pub fn expand_home(path: &Path) -> PathBuf {
    let Ok(rest) = path.strip_prefix("~") else {
        return path.to_path_buf();
    };
    match std::env::var_os("HOME") {
        Some(home) => PathBuf::from(home).join(rest),
        None => path.to_path_buf(),
    }
}

/// Populate `project`'s builds from the input file at `path`
///
/// Returns the parsed file so callers can read the remaining sections.
pub fn parse_config(project: &mut Project, path: &Path) -> Result<InputConfig, ConfigError> {
    let config = InputConfig::load(path)?;
    let builds = config.to_builds()?;
    tracing::info!("Loaded {} builds from {}", builds.len(), path.display());
    project.set_builds(builds)?;
    Ok(config)
}

/// Check the input file at `path` in isolation
///
/// Returns the number of configured builds.
pub fn validate(path: &Path) -> Result<usize, ConfigError> {
    let config = InputConfig::load(path)?;
    let builds = config.to_builds()?;
    Ok(builds.len())
}
