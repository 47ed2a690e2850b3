//! Validated runtime settings shared by the scheduler and the engine.

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use crate::error::SettingsError;

/// Deadline for a single transfer-tool invocation when none is configured.
pub const DEFAULT_TRANSFER_TIMEOUT: Duration = Duration::from_secs(300);

/// Everything the drain loop needs, injected at construction.
#[derive(Clone, PartialEq, Eq)]
pub struct Settings {
    /// Period between scan cycles.
    pub interval: Duration,
    /// Directory drained by every cycle.
    pub folder_to_monitor: PathBuf,
    /// Remote base URL; files land at `dest_location/<remote name>`.
    pub dest_location: String,
    /// Transfer tool executable (curl or a compatible program).
    pub program_to_invoke: PathBuf,
    pub username: String,
    pub password: String,
    /// Upper bound on one upload before the tool is killed.
    pub transfer_timeout: Duration,
}

impl Settings {
    /// Checks that every field is non-empty and every duration positive.
    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.interval.is_zero() {
            return Err(SettingsError::ZeroInterval);
        }
        if self.transfer_timeout.is_zero() {
            return Err(SettingsError::ZeroTransferTimeout);
        }
        if self.folder_to_monitor.as_os_str().is_empty() {
            return Err(SettingsError::Empty("folder_to_monitor"));
        }
        if self.dest_location.trim().is_empty() {
            return Err(SettingsError::Empty("dest_location"));
        }
        if self.program_to_invoke.as_os_str().is_empty() {
            return Err(SettingsError::Empty("program_to_invoke"));
        }
        if self.username.is_empty() {
            return Err(SettingsError::Empty("username"));
        }
        if self.password.is_empty() {
            return Err(SettingsError::Empty("password"));
        }
        Ok(())
    }
}

// Hand-written so the password never ends up in a log line.
impl fmt::Debug for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Settings")
            .field("interval", &self.interval)
            .field("folder_to_monitor", &self.folder_to_monitor)
            .field("dest_location", &self.dest_location)
            .field("program_to_invoke", &self.program_to_invoke)
            .field("username", &self.username)
            .field("password", &"********")
            .field("transfer_timeout", &self.transfer_timeout)
            .finish()
    }
}

#[cfg(test)]
pub(crate) fn sample(folder: &std::path::Path) -> Settings {
    Settings {
        interval: Duration::from_secs(60),
        folder_to_monitor: folder.to_path_buf(),
        dest_location: "https://cloud.example.com/remote.php/webdav/mypics".into(),
        program_to_invoke: PathBuf::from("/usr/bin/curl"),
        username: "peter".into(),
        password: "s3cret".into(),
        transfer_timeout: DEFAULT_TRANSFER_TIMEOUT,
    }
}
