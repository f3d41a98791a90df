//! Infrastructure layer
//!
//! Runs external processes: build tools, the artifacts they produce and
//! `perf`, either locally or over ssh.

pub mod build_tool;
pub mod cmake;
pub mod make;
pub mod perf;
pub mod process;
