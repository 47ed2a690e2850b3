//! Drain error types.

use std::path::PathBuf;

/// Fatal errors that end the drain loop.
///
/// Per-file failures never surface here; they are reported as
/// [`TransferOutcome`](crate::TransferOutcome) values.
#[derive(Debug, thiserror::Error)]
pub enum DrainError {
    #[error("failed to read monitored directory {}: {source}", .path.display())]
    ReadDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// A settings field that failed validation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SettingsError {
    #[error("interval must be greater than zero")]
    ZeroInterval,

    #[error("transfer timeout must be greater than zero")]
    ZeroTransferTimeout,

    #[error("{0} must not be empty")]
    Empty(&'static str),
}
