//! Core pipeline logic
//!
//! Domain types, the collaborator traits and the pipeline that drives them.
//! Concrete build tools and profilers live in [`crate::infra`].
//!
//! # Submodules
//!
//! - [`project`] - Project and build definitions
//! - [`config`] - Input file parsing and validation
//! - [`build_env`] - Toolchain environment for a build
//! - [`build_system`] - Build-system strategy trait
//! - [`profiler`] - Profiler trait and measurements
//! - [`progress`] - Progress reporting trait
//! - [`status`] - Active-worker counter and render loop
//! - [`pipeline`] - Per-build worker orchestration
//! - [`analyze`] - Project source tree analysis

pub mod analyze;
pub mod build_env;
pub mod build_system;
pub mod config;
pub mod pipeline;
pub mod profiler;
pub mod progress;
pub mod project;
pub mod status;
