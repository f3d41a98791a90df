//! Command-line interface module
//!
//! This module handles argument parsing, terminal output and progress
//! rendering. Pipeline logic belongs in [`crate::core`].

pub mod commands;
pub mod console;
pub mod output;
pub mod screen;

use std::io::IsTerminal;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{ArgGroup, Parser};

use crate::config::defaults::DEFAULT_CONFIG_FILE;
use crate::core::config::expand_home;
use crate::core::pipeline::Stages;
use crate::error::AnalysisError;
use commands::run::RunOptions;

const BANNER: &str = "\
*****************************************************************

     amixis - build automation and profiling tool

*****************************************************************";

const EXAMPLES: &str = "\
Examples:

  amixis ~/proj
      Analyze the project, build every configuration, then profile it.

  amixis --analyze ~/proj
      Only analyze: report CI files, tests, benchmarks and build files.

  amixis --build ~/proj
      Only build every configuration listed in input.toml.

  amixis --profile ~/proj
      Only profile executables produced by an earlier --build.

  amixis --config builds.toml ~/proj
      Run everything with a different input file (default: input.toml
      in the working directory).

  amixis --validate input.toml
      Check an input file and exit.";

/// amixis - build and profile a project across many configurations
///
/// Builds every configuration listed in the input file concurrently, then
/// checks, times and profiles the produced executables.
#[derive(Parser, Debug)]
#[command(name = "amixis")]
#[command(author, version, about, long_about = None)]
#[command(before_help = BANNER, after_help = EXAMPLES)]
#[command(group(ArgGroup::new("mode").args(["validate", "analyze", "build", "profile"])))]
pub struct Cli {
    /// Project directory
    #[arg(required_unless_present = "validate")]
    pub path: Option<PathBuf>,

    /// Check an input file and exit
    #[arg(short = 'v', long, value_name = "FILE")]
    pub validate: Option<PathBuf>,

    /// Input file describing the builds
    #[arg(
        long,
        value_name = "CONFIG",
        num_args = 0..=1,
        default_value = DEFAULT_CONFIG_FILE,
        default_missing_value = DEFAULT_CONFIG_FILE
    )]
    pub config: PathBuf,

    /// Only analyze the project
    #[arg(short, long)]
    pub analyze: bool,

    /// Only build the project
    #[arg(short, long)]
    pub build: bool,

    /// Only profile previously built executables
    #[arg(short, long)]
    pub profile: bool,

    /// Enable verbose logging (--verbose for info, twice for debug)
    #[arg(long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Print progress as plain lines instead of using the alternate screen
    #[arg(long)]
    pub no_tui: bool,

    /// Leave the alternate screen without waiting for Enter
    #[arg(long)]
    pub no_wait: bool,
}

/// What an invocation does
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mode {
    /// Check an input file
    Validate(PathBuf),
    /// Analyze the project only
    Analyze,
    /// Configure and run the selected pipeline stages
    Pipeline {
        /// Analyze before configuring
        analyze: bool,
        /// Stages to run
        stages: Stages,
    },
}

impl Cli {
    /// Mode selected by the flags
    pub fn mode(&self) -> Mode {
        if let Some(file) = &self.validate {
            return Mode::Validate(expand_home(file));
        }
        if self.analyze {
            return Mode::Analyze;
        }
        let (analyze, stages) = match (self.build, self.profile) {
            (true, _) => (false, Stages::BUILD_ONLY),
            (_, true) => (false, Stages::PROFILE_ONLY),
            _ => (true, Stages::ALL),
        };
        Mode::Pipeline { analyze, stages }
    }

    /// Log level requested by `--verbose`
    pub fn log_level(&self) -> tracing::Level {
        match self.verbose {
            0 => tracing::Level::WARN,
            1 => tracing::Level::INFO,
            2 => tracing::Level::DEBUG,
            _ => tracing::Level::TRACE,
        }
    }

    fn project_dir(&self) -> Result<PathBuf> {
        let path = expand_home(self.path.as_deref().unwrap_or(Path::new(".")));
        if !path.is_dir() {
            return Err(AnalysisError::ProjectNotFound { path }.into());
        }
        path.canonicalize()
            .with_context(|| format!("Failed to resolve {}", path.display()))
    }

    /// Execute the selected mode
    pub async fn run(self) -> Result<()> {
        match self.mode() {
            Mode::Validate(file) => commands::validate::execute(&file).await,
            Mode::Analyze => commands::analyze::execute(&self.project_dir()?).await,
            Mode::Pipeline { analyze, stages } => {
                let options = RunOptions {
                    project_dir: self.project_dir()?,
                    config: expand_home(&self.config),
                    stages,
                    analyze,
                    tui: !self.no_tui && std::io::stdout().is_terminal(),
                    wait: !self.no_wait,
                };
                commands::run::execute(options).await
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("amixis").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn test_default_mode_runs_everything() {
        let cli = parse(&["proj"]);
        assert_eq!(
            cli.mode(),
            Mode::Pipeline {
                analyze: true,
                stages: Stages::ALL
            }
        );
        assert_eq!(cli.config, PathBuf::from(DEFAULT_CONFIG_FILE));
    }

    #[test]
    fn test_mode_flags() {
        assert_eq!(parse(&["-a", "proj"]).mode(), Mode::Analyze);
        assert_eq!(
            parse(&["-b", "proj"]).mode(),
            Mode::Pipeline {
                analyze: false,
                stages: Stages::BUILD_ONLY
            }
        );
        assert_eq!(
            parse(&["--profile", "proj"]).mode(),
            Mode::Pipeline {
                analyze: false,
                stages: Stages::PROFILE_ONLY
            }
        );
    }

    #[test]
    fn test_validate_needs_no_path() {
        let cli = parse(&["-v", "input.toml"]);
        assert_eq!(cli.mode(), Mode::Validate(PathBuf::from("input.toml")));
    }

    #[test]
    fn test_path_required_without_validate() {
        assert!(Cli::try_parse_from(["amixis"]).is_err());
    }

    #[test]
    fn test_modes_conflict() {
        assert!(Cli::try_parse_from(["amixis", "-a", "-b", "proj"]).is_err());
    }

    #[test]
    fn test_bare_config_flag_uses_default() {
        let cli = parse(&["proj", "--config"]);
        assert_eq!(cli.config, PathBuf::from(DEFAULT_CONFIG_FILE));

        let cli = parse(&["--config", "other.toml", "proj"]);
        assert_eq!(cli.config, PathBuf::from("other.toml"));
    }

    #[test]
    fn test_verbose_levels() {
        assert_eq!(parse(&["proj"]).log_level(), tracing::Level::WARN);
        assert_eq!(
            parse(&["--verbose", "--verbose", "proj"]).log_level(),
            tracing::Level::DEBUG
        );
    }

    #[test]
    fn test_help_has_banner_and_examples() {
        let help = Cli::command().render_help().to_string();

        let banner = help.find("build automation and profiling tool");
        let usage = help.find("Usage:");
        let examples = help.find("Examples:");
        assert!(banner.is_some() && usage.is_some() && examples.is_some(), "help: {help}");
        assert!(banner < usage && usage < examples, "help: {help}");
        for line in [
            "amixis ~/proj",
            "amixis --analyze ~/proj",
            "amixis --build ~/proj",
            "amixis --profile ~/proj",
            "amixis --config builds.toml ~/proj",
            "amixis --validate input.toml",
        ] {
            assert!(help.contains(line), "missing {line:?} in help: {help}");
        }
    }

    #[test]
    fn test_expand_home() {
        let plain = Path::new("relative/input.toml");
        assert_eq!(expand_home(plain), plain);

        if let Some(home) = std::env::var_os("HOME") {
            assert_eq!(
                expand_home(Path::new("~/.ssh/id")),
                PathBuf::from(home).join(".ssh/id")
            );
        }
    }
}
