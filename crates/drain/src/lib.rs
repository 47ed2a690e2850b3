//! Drop-folder drain: poll a local directory, upload every file through an
//! external transfer tool, and delete each file only after its upload is
//! confirmed.
//!
//! # Pipeline
//!
//! 1. **Tick**: [`Scheduler`] fires immediately, then once per interval
//! 2. **Scan**: [`FileTransferEngine`] lists the monitored directory
//! 3. **Upload**: each candidate is handed to a [`TransferTool`]
//! 4. **Classify**: the captured output becomes a [`TransferOutcome`]
//! 5. **Delete**: only on [`TransferOutcome::Success`]
//!
//! Files that fail stay in place; the next scan is the retry.

mod engine;
mod error;
mod naming;
mod scheduler;
mod settings;
mod tool;

pub use engine::{CycleReport, FileResult, FileTransferEngine, TransferOutcome};
pub use error::{DrainError, SettingsError};
pub use naming::{remote_name, target_url};
pub use scheduler::Scheduler;
pub use settings::{DEFAULT_TRANSFER_TIMEOUT, Settings};
pub use tool::{CurlTool, ToolFuture, ToolOutput, TransferRequest, TransferTool};
