//! Validate command implementation
//!
//! Implements `amixis --validate FILE` to check an input file without
//! touching a project.

use anyhow::{Context, Result};
use std::path::Path;

use crate::cli::output::create_spinner;
use crate::core::config;

/// Execute the validate command
pub async fn execute(file: &Path) -> Result<()> {
    let spinner = create_spinner(&format!("Validating {}...", file.display()));
    let result = config::validate(file);
    spinner.finish_and_clear();

    let builds = result.with_context(|| format!("{} is not a valid input file", file.display()))?;
    tracing::info!("{} defines {builds} builds", file.display());

    println!("{} is correct!", file.display());
    Ok(())
}
