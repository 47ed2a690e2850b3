//! Fixed-period driver for the transfer engine.

use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::engine::FileTransferEngine;
use crate::error::DrainError;
use crate::tool::TransferTool;

/// Runs a scan cycle immediately, then once per interval.
///
/// Cycles never overlap: the next tick is only awaited after the previous
/// cycle returns. If a cycle overruns the interval the cadence shifts
/// instead of bursting.
pub struct Scheduler<T> {
    engine: FileTransferEngine<T>,
    interval: Duration,
}

impl<T: TransferTool> Scheduler<T> {
    /// Creates a scheduler ticking at the engine's configured interval.
    pub fn new(engine: FileTransferEngine<T>) -> Self {
        let interval = engine.settings().interval;
        Self { engine, interval }
    }

    /// Drives the engine until `cancel` fires or a cycle fails fatally.
    ///
    /// Returns `Ok(())` only after cancellation. An unreadable monitored
    /// directory ends the loop with `Err` without retrying.
    pub async fn run(&self, cancel: CancellationToken) -> Result<(), DrainError> {
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        info!(interval_secs = self.interval.as_secs(), "drain loop started");

        loop {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                // The first tick completes immediately.
                _ = ticker.tick() => {
                    self.engine.scan_and_process(&cancel).await?;
                }
            }
        }

        debug!("drain loop stopped");
        Ok(())
    }
}
