//! Scan-upload-confirm-delete for one cycle.

use std::path::{Path, PathBuf};

use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::error::DrainError;
use crate::naming::target_url;
use crate::settings::Settings;
use crate::tool::{ToolOutput, TransferRequest, TransferTool};

/// Classification of one upload attempt. Only `Success` unlocks deletion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransferOutcome {
    Success,
    /// The tool could not be launched, exited non-zero, was killed,
    /// or overran its deadline.
    ToolInvocationFailed { reason: String },
    /// The tool exited cleanly but wrote to stdout.
    RemoteError { output: String },
}

impl TransferOutcome {
    /// Maps the raw tool result onto an outcome.
    ///
    /// Any stdout at all counts as a failure signal, even when the exit
    /// status is 0. Stderr is ignored.
    pub fn classify(result: std::io::Result<ToolOutput>) -> Self {
        let output = match result {
            Ok(output) => output,
            Err(e) => {
                return Self::ToolInvocationFailed {
                    reason: format!("failed to launch transfer tool: {e}"),
                };
            }
        };

        if !output.exited_ok() {
            let reason = match output.exit_code {
                Some(code) => format!("transfer tool exited with status {code}"),
                None => "transfer tool terminated by signal".to_string(),
            };
            return Self::ToolInvocationFailed { reason };
        }

        if !output.stdout.is_empty() {
            return Self::RemoteError {
                output: String::from_utf8_lossy(&output.stdout).trim().to_string(),
            };
        }

        Self::Success
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success)
    }
}

/// Result of processing one candidate file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileResult {
    pub outcome: TransferOutcome,
    /// `true` once the local file has been removed.
    pub deleted: bool,
}

/// Tally of a single scan cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CycleReport {
    /// Candidates handed to the transfer tool.
    pub attempted: usize,
    /// Uploads classified `Success` (whether or not the delete worked).
    pub uploaded: usize,
    /// Uploads that did not succeed; the files stay for the next cycle.
    pub failed: usize,
    /// Successful uploads whose local delete failed.
    pub delete_failed: usize,
}

impl CycleReport {
    fn record(&mut self, result: &FileResult) {
        self.attempted += 1;
        if result.outcome.is_success() {
            self.uploaded += 1;
            if !result.deleted {
                self.delete_failed += 1;
            }
        } else {
            self.failed += 1;
        }
    }
}

/// A non-directory entry seen during one scan. Never kept across cycles.
#[derive(Debug)]
struct CandidateFile {
    name: String,
    path: PathBuf,
}

/// Drains the monitored directory through a [`TransferTool`].
pub struct FileTransferEngine<T> {
    settings: Settings,
    tool: T,
}

impl<T: TransferTool> FileTransferEngine<T> {
    pub fn new(settings: Settings, tool: T) -> Self {
        Self { settings, tool }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    #[cfg(test)]
    pub(crate) fn tool(&self) -> &T {
        &self.tool
    }

    /// Runs one scan cycle.
    ///
    /// Every candidate is attempted once, in file-name order, and one
    /// file's failure never stops the rest. Returns `Err` only when the
    /// directory cannot be listed. Cancellation is checked between files;
    /// an upload already running is allowed to finish.
    pub async fn scan_and_process(
        &self,
        cancel: &CancellationToken,
    ) -> Result<CycleReport, DrainError> {
        let candidates = self.list_candidates().await?;
        debug!(candidates = candidates.len(), "scan cycle started");

        let mut report = CycleReport::default();
        for candidate in &candidates {
            if cancel.is_cancelled() {
                debug!("cancelled mid-cycle, leaving remaining files for later");
                break;
            }
            let result = self.transfer_and_delete(&candidate.name, &candidate.path).await;
            report.record(&result);
        }

        if report.attempted > 0 {
            info!(
                attempted = report.attempted,
                uploaded = report.uploaded,
                failed = report.failed,
                delete_failed = report.delete_failed,
                "scan cycle complete"
            );
        } else {
            debug!("scan cycle complete, nothing to upload");
        }

        Ok(report)
    }

    /// Uploads one file and deletes it only if the upload is confirmed.
    pub async fn transfer_and_delete(&self, local_name: &str, local_path: &Path) -> FileResult {
        let request = TransferRequest {
            source: local_path.to_path_buf(),
            target_url: target_url(&self.settings.dest_location, local_name),
            username: self.settings.username.clone(),
            password: self.settings.password.clone(),
        };

        let outcome = self.run_tool(&request).await;

        match &outcome {
            TransferOutcome::Success => {}
            TransferOutcome::ToolInvocationFailed { reason } => {
                warn!(file = %local_path.display(), error = %reason, "upload failed, keeping file");
                return FileResult {
                    outcome,
                    deleted: false,
                };
            }
            TransferOutcome::RemoteError { output } => {
                warn!(
                    file = %local_path.display(),
                    output = %output,
                    "transfer tool reported an error, keeping file"
                );
                return FileResult {
                    outcome,
                    deleted: false,
                };
            }
        }

        info!(file = %local_path.display(), target = %request.target_url, "uploaded");

        // Already delivered: a failed delete only means a re-upload next cycle.
        let deleted = match tokio::fs::remove_file(local_path).await {
            Ok(()) => {
                debug!(file = %local_path.display(), "deleted local file");
                true
            }
            Err(e) => {
                warn!(file = %local_path.display(), error = %e, "failed to delete uploaded file");
                false
            }
        };

        FileResult { outcome, deleted }
    }

    async fn run_tool(&self, request: &TransferRequest) -> TransferOutcome {
        let deadline = self.settings.transfer_timeout;
        match tokio::time::timeout(deadline, self.tool.upload(request)).await {
            Ok(result) => {
                if let Ok(output) = &result
                    && !output.stderr.is_empty()
                {
                    let stderr = String::from_utf8_lossy(&output.stderr);
                    debug!(
                        file = %request.source.display(),
                        stderr = %stderr.trim(),
                        "transfer tool stderr"
                    );
                }
                TransferOutcome::classify(result)
            }
            Err(_) => TransferOutcome::ToolInvocationFailed {
                reason: format!("transfer timed out after {}s", deadline.as_secs_f64()),
            },
        }
    }

    /// Lists the monitored directory, skipping subdirectories and names
    /// that are not valid UTF-8.
    async fn list_candidates(&self) -> Result<Vec<CandidateFile>, DrainError> {
        let dir = &self.settings.folder_to_monitor;
        let read_dir_err = |source: std::io::Error| DrainError::ReadDir {
            path: dir.clone(),
            source,
        };

        let mut entries = tokio::fs::read_dir(dir).await.map_err(read_dir_err)?;
        let mut candidates = Vec::new();

        while let Some(entry) = entries.next_entry().await.map_err(read_dir_err)? {
            let path = entry.path();
            match entry.file_type().await {
                Ok(ft) if ft.is_dir() => {
                    debug!(path = %path.display(), "skipping directory");
                }
                Ok(_) => match entry.file_name().into_string() {
                    Ok(name) => candidates.push(CandidateFile { name, path }),
                    // No faithful remote name exists, so the file is never uploaded or deleted.
                    Err(_) => {
                        warn!(path = %path.display(), "file name is not valid UTF-8, skipping");
                    }
                },
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "cannot stat entry, skipping");
                }
            }
        }

        candidates.sort_by(|a, b| a.path.file_name().cmp(&b.path.file_name()));
        Ok(candidates)
    }
}
