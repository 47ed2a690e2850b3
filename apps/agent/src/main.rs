//! picservice agent entry point.

mod app;
mod args;
mod config;

use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use args::Args;

fn main() -> ExitCode {
    // Initialize structured logging.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    match run(Args::parse()) {
        Ok(()) => {
            tracing::info!("agent shut down cleanly");
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!("fatal error, exiting: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: Args) -> anyhow::Result<()> {
    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        "starting picservice agent"
    );

    let path = config::resolve_path(args.config)?;
    let settings = config::load(&path)?;
    tracing::info!(
        folder = %settings.folder_to_monitor.display(),
        dest = %settings.dest_location,
        interval_secs = settings.interval.as_secs(),
        username = %settings.username,
        program = %settings.program_to_invoke.display(),
        transfer_timeout_secs = settings.transfer_timeout.as_secs(),
        "configuration loaded"
    );

    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(app::run(settings))
}
