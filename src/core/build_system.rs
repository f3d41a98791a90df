//! Build-system capability
//!
//! A build system turns the project sources into an artifact for one
//! [`Build`]. Implementations are stateless and shared read-only across
//! workers; the concrete make and cmake strategies live in
//! [`crate::infra`].

use crate::core::progress::ProgressReporter;
use crate::core::project::{Build, Project};
use crate::error::BuildError;

/// A named build strategy
pub trait BuildSystem: Send + Sync {
    /// Strategy name (e.g. "make")
    fn name(&self) -> &str;

    /// Build `build` of `project`, reporting progress through `reporter`
    fn build(
        &self,
        project: &Project,
        build: &Build,
        reporter: &dyn ProgressReporter,
    ) -> Result<(), BuildError>;
}

/// Build system that succeeds without doing anything
///
/// Counterpart of [`crate::core::progress::NullReporter`] for projects that
/// need build-system references without a toolchain.
#[derive(Debug, Clone)]
pub struct NoopBuildSystem {
    name: String,
}

impl NoopBuildSystem {
    /// Create a no-op strategy reporting the given name
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl BuildSystem for NoopBuildSystem {
    fn name(&self) -> &str {
        &self.name
    }

    fn build(
        &self,
        _project: &Project,
        build: &Build,
        reporter: &dyn ProgressReporter,
    ) -> Result<(), BuildError> {
        reporter.print(&build.build_id, "nothing to build");
        Ok(())
    }
}
