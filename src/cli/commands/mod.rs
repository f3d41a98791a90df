//! CLI command implementations
//!
//! Each mode of the command line is implemented in its own submodule.

pub mod analyze;
pub mod run;
pub mod validate;
