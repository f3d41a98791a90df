//! amixis - concurrent build and profile pipeline
//!
//! This library reads a list of build configurations for a C/C++ project,
//! builds each one with make or CMake on its own worker, then checks, times
//! and profiles the produced executables while a live per-build status is
//! rendered to the terminal.
//!
//! # Architecture
//!
//! The crate is organized into several modules:
//!
//! - [`cli`] - Command-line parsing, progress rendering and output
//! - [`core`] - Domain types, collaborator traits and the pipeline
//! - [`infra`] - Build tools, profilers and process execution
//! - [`config`] - Constants and defaults
//! - [`error`] - Error types and handling

pub mod cli;
pub mod config;
pub mod core;
pub mod error;
pub mod infra;

#[cfg(test)]
pub mod test_utils;
