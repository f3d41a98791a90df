//! Integration tests for input file loading
//!
//! Loads input files from a temporary project into a [`Project`] and checks
//! the resulting build list.

mod common;

use std::sync::Arc;

use amixis::core::build_system::NoopBuildSystem;
use amixis::core::config::{parse_config, validate};
use amixis::core::project::{Arch, BuildSystemKind, Project};
use amixis::error::ConfigError;
use common::{TestProject, INVALID_INPUT, SAMPLE_INPUT};

fn empty_project(test: &TestProject) -> Project {
    Project::new(
        test.path(),
        Arc::new(NoopBuildSystem::new("make")),
        Arc::new(NoopBuildSystem::new("cmake")),
    )
}

#[test]
fn test_sample_input_populates_builds_in_order() {
    let test = TestProject::new();
    test.create_file("input.toml", SAMPLE_INPUT);
    let mut project = empty_project(&test);

    let input = parse_config(&mut project, &test.path().join("input.toml")).unwrap();

    let ids: Vec<_> = project.builds().iter().map(|b| b.build_id.as_str()).collect();
    assert_eq!(ids, vec!["native", "arm", "riscv"]);
    assert_eq!(input.profile.events, vec!["cycles", "instructions"]);

    let arm = project.build("arm").unwrap();
    assert_eq!(arm.arch, Arch::Arm);
    assert_eq!(arm.build_system, BuildSystemKind::Cmake);
    assert_eq!(
        arm.executable_path(project.path()),
        test.path().join("build/arm/bin/app")
    );
    assert_eq!(project.build("riscv").unwrap().args, vec!["--quick"]);
}

#[test]
fn test_invalid_input_leaves_project_empty() {
    let test = TestProject::new();
    test.create_file("input.toml", INVALID_INPUT);
    let mut project = empty_project(&test);

    let err = parse_config(&mut project, &test.path().join("input.toml")).unwrap_err();

    assert!(matches!(err, ConfigError::UnknownArch { .. }));
    assert!(project.builds().is_empty());
}

#[test]
fn test_validate_matches_parse() {
    let test = TestProject::new();
    test.create_file("input.toml", SAMPLE_INPUT);

    assert_eq!(validate(&test.path().join("input.toml")).unwrap(), 3);
}

#[test]
fn test_duplicate_ids_rejected() {
    let test = TestProject::new();
    test.create_file(
        "input.toml",
        r#"
[[builds]]
id = "same"
arch = "x86"
build_system = "make"
executable = "app"

[[builds]]
id = "same"
arch = "arm"
build_system = "make"
executable = "app"
"#,
    );

    let err = validate(&test.path().join("input.toml")).unwrap_err();
    assert!(matches!(err, ConfigError::DuplicateBuildId { ref id } if id == "same"));
}
