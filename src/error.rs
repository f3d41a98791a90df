//! Error types for amixis
//!
//! Domain-specific error types using thiserror.

use std::path::PathBuf;
use thiserror::Error;

/// Configuration file errors
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Configuration file does not exist
    #[error("Configuration file not found: {path}")]
    NotFound { path: PathBuf },

    /// Configuration file could not be read
    #[error("Failed to read configuration file '{path}': {error}")]
    Read { path: PathBuf, error: String },

    /// Configuration file is not valid TOML or has the wrong shape
    #[error("Failed to parse configuration file '{path}': {error}")]
    Parse { path: PathBuf, error: String },

    /// Configuration is well-formed but semantically wrong
    #[error("Invalid configuration: {message}")]
    Invalid { message: String },

    /// Unknown build system name
    #[error("Build '{build}' references unknown build system '{name}' (expected make or cmake)")]
    UnknownBuildSystem { build: String, name: String },

    /// Unknown target architecture
    #[error("Build '{build}' references unknown architecture '{name}' (expected x86, arm, arm64 or riscv)")]
    UnknownArch { build: String, name: String },

    /// Two builds share the same id
    #[error("Duplicate build id '{id}'")]
    DuplicateBuildId { id: String },
}

/// Build stage errors
#[derive(Error, Debug)]
pub enum BuildError {
    /// Build tool exited with a failure status
    #[error("Build '{build}' failed: {tool} exited with {status}")]
    Failed {
        build: String,
        tool: String,
        status: String,
    },

    /// Build tool could not be started
    #[error("Failed to run '{tool}' for build '{build}': {error}")]
    Spawn {
        build: String,
        tool: String,
        error: String,
    },

    /// Build tool not found in PATH
    #[error("Build tool not found: {tool}")]
    ToolNotFound { tool: String },

    /// Build directory could not be prepared
    #[error("Failed to prepare build directory '{path}': {error}")]
    BuildDir { path: PathBuf, error: String },
}

/// Project analysis errors
#[derive(Error, Debug)]
pub enum AnalysisError {
    /// Project root does not exist or is not a directory
    #[error("Project directory not found: {path}")]
    ProjectNotFound { path: PathBuf },

    /// Directory walk failed
    #[error("Failed to scan '{path}': {error}")]
    Walk { path: PathBuf, error: String },
}

/// Error returned by a pipeline run
///
/// Configuration and analysis failures surface before any worker starts and
/// keep their own types.
#[derive(Error, Debug)]
pub enum AmixisError {
    /// Build error
    #[error("Build error: {0}")]
    Build(#[from] BuildError),

    /// A worker panicked or could not be joined
    #[error("Worker for build '{build}' terminated abnormally: {error}")]
    Worker { build: String, error: String },
}
