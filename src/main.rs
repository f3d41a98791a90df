//! amixis CLI - concurrent build and profile pipeline
//!
//! Entry point for the amixis command-line application.

use anyhow::Result;
use clap::Parser;

use amixis::cli::output::display_error;
use amixis::cli::screen::GatedStderr;
use amixis::cli::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr and are held back while the alternate screen is up
    tracing_subscriber::fmt()
        .with_writer(|| GatedStderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(cli.log_level().into()),
        )
        .init();

    match cli.run().await {
        Ok(()) => Ok(()),
        Err(e) => {
            display_error(&e);
            std::process::exit(1);
        }
    }
}
