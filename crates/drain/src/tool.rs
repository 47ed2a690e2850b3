//! External transfer tool invocation.
//!
//! The engine never speaks HTTP itself. It hands each upload to a
//! [`TransferTool`] and only looks at the exit status and the captured
//! output streams.

use std::ffi::OsString;
use std::fmt;
use std::future::Future;
use std::path::PathBuf;
use std::pin::Pin;
use std::process::Stdio;

/// Boxed future returned by [`TransferTool::upload`].
pub type ToolFuture<'a> = Pin<Box<dyn Future<Output = std::io::Result<ToolOutput>> + Send + 'a>>;

/// One upload to perform.
#[derive(Clone, PartialEq, Eq)]
pub struct TransferRequest {
    /// Local file whose content is sent.
    pub source: PathBuf,
    /// Full remote URL, remote name included.
    pub target_url: String,
    pub username: String,
    pub password: String,
}

impl fmt::Debug for TransferRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransferRequest")
            .field("source", &self.source)
            .field("target_url", &self.target_url)
            .field("username", &self.username)
            .finish_non_exhaustive()
    }
}

/// What the tool left behind once it exited.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ToolOutput {
    /// Exit code, `None` when the process was terminated by a signal.
    pub exit_code: Option<i32>,
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
}

impl ToolOutput {
    /// Returns `true` if the process exited with status 0.
    pub fn exited_ok(&self) -> bool {
        self.exit_code == Some(0)
    }
}

/// Abstract upload mechanism.
///
/// [`CurlTool`] runs the configured executable; tests substitute a mock.
/// An `Err` means the tool could not be run at all.
pub trait TransferTool: Send + Sync {
    fn upload<'a>(&'a self, request: &'a TransferRequest) -> ToolFuture<'a>;
}

/// Runs a curl-compatible executable as a subprocess.
///
/// Invocation: `<program> -k -u <user>:<password> -T <source> <target>`,
/// i.e. skip TLS verification, basic auth, PUT the file to the target.
#[derive(Debug, Clone)]
pub struct CurlTool {
    program: PathBuf,
}

impl CurlTool {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// Builds the argument vector for one upload.
    pub fn args(request: &TransferRequest) -> Vec<OsString> {
        vec![
            "-k".into(),
            "-u".into(),
            format!("{}:{}", request.username, request.password).into(),
            "-T".into(),
            request.source.clone().into_os_string(),
            request.target_url.clone().into(),
        ]
    }

    /// [`args`](Self::args) with the password masked, for logging.
    fn redacted_args(request: &TransferRequest) -> Vec<String> {
        let masked = TransferRequest {
            password: "********".into(),
            ..request.clone()
        };
        Self::args(&masked)
            .iter()
            .map(|arg| arg.to_string_lossy().into_owned())
            .collect()
    }
}

impl TransferTool for CurlTool {
    fn upload<'a>(&'a self, request: &'a TransferRequest) -> ToolFuture<'a> {
        Box::pin(async move {
            tracing::trace!(
                program = %self.program.display(),
                args = ?Self::redacted_args(request),
                "invoking transfer tool"
            );

            // Dropping the future (deadline elapsed, shutdown) kills the child.
            let output = tokio::process::Command::new(&self.program)
                .args(Self::args(request))
                .stdin(Stdio::null())
                .stdout(Stdio::piped())
                .stderr(Stdio::piped())
                .kill_on_drop(true)
                .output()
                .await?;

            Ok(ToolOutput {
                exit_code: output.status.code(),
                stdout: output.stdout,
                stderr: output.stderr,
            })
        })
    }
}

/// Writes an executable `/bin/sh` script standing in for curl.
#[cfg(all(test, unix))]
pub(crate) fn shell_script(dir: &std::path::Path, name: &str, body: &str) -> PathBuf {
    use std::os::unix::fs::PermissionsExt;

    let path = dir.join(name);
    std::fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
    path
}
