//! Output formatting and progress indicators
//!
//! Spinners for short single-task operations, status prefixes and the
//! final summaries printed once the terminal is back in normal mode.

use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};

use crate::core::analyze::AnalysisReport;
use crate::core::pipeline::{PipelineReport, WorkerOutcome};

/// Create a spinner for operations with unknown duration
pub fn create_spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner()
        .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏")
        .template("{spinner:.blue} {msg}")
    {
        pb.set_style(style);
    }
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(80));
    pb
}

/// Status message prefixes
pub mod status {
    /// Success prefix (green checkmark)
    pub const SUCCESS: &str = "✓";

    /// Error prefix (red X)
    pub const ERROR: &str = "✗";

    /// Warning prefix (yellow triangle)
    pub const WARNING: &str = "⚠";

    /// Info prefix (blue circle)
    pub const INFO: &str = "ℹ";
}

/// Print an error with its cause chain to stderr
pub fn display_error(error: &anyhow::Error) {
    eprintln!("{} Error: {error}", status::ERROR);
    for cause in error.chain().skip(1) {
        eprintln!("  caused by: {cause}");
    }
}

/// Format one pipeline outcome line
pub fn outcome_line(build_id: &str, outcome: &WorkerOutcome) -> String {
    match outcome {
        WorkerOutcome::Completed { stats: None } => {
            format!("{} {build_id}: built", status::SUCCESS)
        }
        WorkerOutcome::Completed { stats: Some(stats) } => {
            let time = stats
                .execution_time_secs
                .map_or_else(|| "n/a".to_string(), |t| format!("{t:.3}s"));
            format!(
                "{} {build_id}: profiled (execution time {time}, {} counters)",
                status::SUCCESS,
                stats.counters.len()
            )
        }
        WorkerOutcome::Aborted { stage } => {
            format!("{} {build_id}: stopped at {stage}", status::WARNING)
        }
    }
}

/// Print the outcome of every worker
pub fn print_pipeline_summary(report: &PipelineReport) {
    println!(
        "\n{} {}/{} builds completed",
        status::INFO,
        report.completed_count(),
        report.outcomes.len()
    );
    for (build_id, outcome) in &report.outcomes {
        println!("  {}", outcome_line(build_id, outcome));
    }
}

fn print_findings(label: &str, found: &[std::path::PathBuf]) {
    if found.is_empty() {
        println!("{} No {label} found", status::WARNING);
        return;
    }
    println!("{} {label}:", status::SUCCESS);
    for path in found {
        println!("  • {}", path.display());
    }
}

/// Print what project analysis found
pub fn print_analysis(report: &AnalysisReport) {
    println!("Project analysis:\n");
    print_findings("CI configuration", &report.ci);
    print_findings("tests", &report.tests);
    print_findings("benchmarks", &report.benchmarks);
    print_findings("build files", &report.build_files);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::pipeline::Stage;
    use crate::core::profiler::ProfileStats;

    #[test]
    fn test_outcome_lines() {
        let built = outcome_line("native", &WorkerOutcome::Completed { stats: None });
        assert_eq!(built, "✓ native: built");

        let mut stats = ProfileStats::new("arm");
        stats.execution_time_secs = Some(1.5);
        let profiled = outcome_line("arm", &WorkerOutcome::Completed { stats: Some(stats) });
        assert!(profiled.contains("execution time 1.500s"));
        assert!(profiled.contains("0 counters"));

        let aborted = outcome_line(
            "rv",
            &WorkerOutcome::Aborted {
                stage: Stage::TestExecutable,
            },
        );
        assert_eq!(aborted, "⚠ rv: stopped at test executable");
    }
}
