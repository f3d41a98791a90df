//! Build environment setup
//!
//! Maps a build's architecture to a compiler toolchain and collects the
//! environment variables handed to make or cmake.

use std::collections::HashMap;

use crate::core::project::{Arch, Build};

/// Build environment for one build.
///
/// Native x86 builds use the host compiler; every other architecture uses a
/// GNU cross toolchain prefix unless the build overrides it.
#[derive(Debug, Clone, PartialEq)]
pub struct BuildEnvironment {
    /// C compiler (e.g. "aarch64-linux-gnu-gcc")
    pub cc: String,
    /// C++ compiler
    pub cxx: String,
    /// Toolchain prefix, empty for the host compiler
    pub prefix: String,
    /// Whether the target differs from the host
    pub cross: bool,
    /// Number of parallel jobs
    pub jobs: usize,
}

/// Default GNU toolchain prefix for an architecture
pub fn default_toolchain_prefix(arch: Arch) -> &'static str {
    match arch {
        Arch::X86 => "",
        Arch::Arm => "arm-linux-gnueabihf-",
        Arch::Arm64 => "aarch64-linux-gnu-",
        Arch::Riscv => "riscv64-linux-gnu-",
    }
}

impl BuildEnvironment {
    /// Environment for a given toolchain prefix
    pub fn with_prefix(prefix: &str) -> Self {
        Self {
            cc: format!("{prefix}gcc"),
            cxx: format!("{prefix}g++"),
            prefix: prefix.to_string(),
            cross: !prefix.is_empty(),
            jobs: num_cpus::get(),
        }
    }

    /// Environment for `build`
    pub fn for_build(build: &Build) -> Self {
        let prefix = build
            .toolchain
            .as_deref()
            .unwrap_or_else(|| default_toolchain_prefix(build.arch));
        Self::with_prefix(prefix)
    }

    /// Convert to environment variable map for process execution
    pub fn to_env_map(&self) -> HashMap<String, String> {
        let mut env = HashMap::new();
        env.insert("CC".to_string(), self.cc.clone());
        env.insert("CXX".to_string(), self.cxx.clone());
        if self.cross {
            env.insert("CROSS_COMPILE".to_string(), self.prefix.clone());
        }
        env
    }
}
