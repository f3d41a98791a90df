//! Run command implementation
//!
//! Loads the input file, then drives one worker per build while the
//! console renderer shows per-build progress.

use anyhow::{Context, Result};
use std::io::{self, BufRead, IsTerminal, Write};
use std::path::PathBuf;
use std::sync::Arc;

use crate::cli::commands::analyze;
use crate::cli::console::ConsoleRenderer;
use crate::cli::output::print_pipeline_summary;
use crate::cli::screen::{restore_on_interrupt, ScreenGuard};
use crate::config::defaults::{INTERACTIVE_RENDER_DELAY, POLL_RENDER_DELAY};
use crate::core::config;
use crate::core::pipeline::{Pipeline, Stages};
use crate::core::progress::ProgressReporter;
use crate::core::status::LiveStatus;
use crate::infra::perf::PerfProfilerFactory;

/// Options for a pipeline run
#[derive(Debug, Clone)]
pub struct RunOptions {
    /// Project root
    pub project_dir: PathBuf,
    /// Input file
    pub config: PathBuf,
    /// Pipeline halves to run
    pub stages: Stages,
    /// Scan the project before configuring it
    pub analyze: bool,
    /// Draw progress on the alternate screen
    pub tui: bool,
    /// Prompt before leaving the alternate screen
    pub wait: bool,
}

fn live_status(renderer: &Arc<ConsoleRenderer>, tui: bool) -> Arc<LiveStatus> {
    let renderer = Arc::clone(renderer);
    let status = if tui {
        LiveStatus::new(move || renderer.render(), INTERACTIVE_RENDER_DELAY)
    } else {
        LiveStatus::new(move || renderer.render_changes(), POLL_RENDER_DELAY)
    };
    Arc::new(status)
}

async fn wait_for_enter() {
    print!("\nPress enter to exit...");
    let _ = io::stdout().flush();
    let read = tokio::task::spawn_blocking(|| {
        let mut line = String::new();
        io::stdin().lock().read_line(&mut line).map(|_| ())
    })
    .await;
    if let Ok(Err(e)) = read {
        tracing::debug!("failed to read from stdin: {e}");
    }
}

/// Execute a pipeline run
pub async fn execute(options: RunOptions) -> Result<()> {
    let mut project = analyze::open_project(&options.project_dir);
    if options.analyze {
        analyze::scan(&project)?;
    }

    let input = config::parse_config(&mut project, &options.config)
        .with_context(|| format!("Failed to load {}", options.config.display()))?;
    let project = Arc::new(project);

    let renderer = Arc::new(ConsoleRenderer::new(&project));
    let reporter: Arc<dyn ProgressReporter> = renderer.clone();
    let pipeline = Pipeline::new(
        Arc::clone(&project),
        reporter,
        Arc::new(PerfProfilerFactory::new(input.profile.events)),
        live_status(&renderer, options.tui),
    );

    let screen = if options.tui {
        restore_on_interrupt();
        Some(ScreenGuard::enter().context("Failed to enter the alternate screen")?)
    } else {
        None
    };

    let result = pipeline.run(options.stages).await;

    if screen.is_some() && options.wait && io::stdin().is_terminal() {
        wait_for_enter().await;
    }
    drop(screen);

    let report = result.context("Pipeline failed")?;
    print_pipeline_summary(&report);
    Ok(())
}
