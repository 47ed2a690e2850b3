//! Application orchestrator: wires the drain loop to process signals.

use anyhow::Context;
use picservice_drain::{CurlTool, FileTransferEngine, Scheduler, Settings};
use tokio_util::sync::CancellationToken;

/// Runs the drain loop until a shutdown signal arrives or it fails fatally.
pub async fn run(settings: Settings) -> anyhow::Result<()> {
    let cancel = CancellationToken::new();

    let tool = CurlTool::new(settings.program_to_invoke.clone());
    let scheduler = Scheduler::new(FileTransferEngine::new(settings, tool));

    let mut drain = tokio::spawn({
        let cancel = cancel.clone();
        async move { scheduler.run(cancel).await }
    });

    let joined = tokio::select! {
        joined = &mut drain => joined,
        signal = shutdown_signal() => {
            match signal {
                Ok(()) => {
                    tracing::info!("shutdown signal received, finishing current upload");
                    cancel.cancel();
                }
                Err(e) => {
                    tracing::warn!(error = %e, "cannot listen for shutdown signals");
                }
            }
            drain.await
        }
    };

    joined.context("drain task aborted")??;
    Ok(())
}

/// Resolves on SIGINT or SIGTERM (Ctrl-C elsewhere).
async fn shutdown_signal() -> std::io::Result<()> {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        let mut sigterm = signal(SignalKind::terminate())?;
        let mut sigint = signal(SignalKind::interrupt())?;

        tokio::select! {
            _ = sigterm.recv() => {},
            _ = sigint.recv() => {},
        }
        Ok(())
    }

    #[cfg(not(unix))]
    {
        tokio::signal::ctrl_c().await
    }
}
