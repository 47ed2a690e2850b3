//! Agent configuration loading.
//!
//! The config file is looked up as:
//! - the path given on the command line, or
//! - `~/picservice.conf`
//!
//! Files ending in `.toml` are parsed as TOML. Anything else uses the flat
//! `key = value` format:
//!
//! ```text
//! interval_secs = 60
//! program_to_invoke = /usr/bin/curl
//! folder_to_monitor = /home/peter/Pictures/trippics
//! dest_location = https://cloud.example.com/remote.php/webdav/mypics
//! username = peter
//! password = your-password-goes-here
//! ```

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, bail};
use picservice_drain::{DEFAULT_TRANSFER_TIMEOUT, Settings};
use serde::Deserialize;

/// Default config file name, looked up in the home directory.
pub const DEFAULT_CONFIG_NAME: &str = "picservice.conf";

/// Config file contents before validation. Unknown keys are ignored.
#[derive(Debug, Default, Deserialize)]
struct RawConfig {
    interval_secs: Option<u64>,
    program_to_invoke: Option<String>,
    folder_to_monitor: Option<String>,
    dest_location: Option<String>,
    username: Option<String>,
    password: Option<String>,
    transfer_timeout_secs: Option<u64>,
}

impl RawConfig {
    fn from_properties(content: &str) -> anyhow::Result<Self> {
        let mut props = parse_properties(content);

        let interval_secs = match props.remove("interval_secs") {
            Some(v) => Some(v.parse::<u64>().ok().with_context(|| {
                format!("interval_secs property unparseable in the conf file: {v:?}")
            })?),
            None => None,
        };
        let transfer_timeout_secs = match props.remove("transfer_timeout_secs") {
            Some(v) => Some(v.parse::<u64>().ok().with_context(|| {
                format!("transfer_timeout_secs property unparseable in the conf file: {v:?}")
            })?),
            None => None,
        };

        Ok(Self {
            interval_secs,
            program_to_invoke: props.remove("program_to_invoke"),
            folder_to_monitor: props.remove("folder_to_monitor"),
            dest_location: props.remove("dest_location"),
            username: props.remove("username"),
            password: props.remove("password"),
            transfer_timeout_secs,
        })
    }

    fn into_settings(self) -> anyhow::Result<Settings> {
        let Some(interval_secs) = self.interval_secs else {
            bail!("interval_secs property missing in the conf file");
        };

        let settings = Settings {
            interval: Duration::from_secs(interval_secs),
            program_to_invoke: PathBuf::from(required("program_to_invoke", self.program_to_invoke)?),
            folder_to_monitor: PathBuf::from(required("folder_to_monitor", self.folder_to_monitor)?),
            dest_location: required("dest_location", self.dest_location)?,
            username: required("username", self.username)?,
            password: required("password", self.password)?,
            transfer_timeout: self
                .transfer_timeout_secs
                .map(Duration::from_secs)
                .unwrap_or(DEFAULT_TRANSFER_TIMEOUT),
        };

        settings.validate()?;
        Ok(settings)
    }
}

fn required(key: &str, value: Option<String>) -> anyhow::Result<String> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => bail!("{key} property missing in the conf file"),
    }
}

/// Parses `key = value` lines.
///
/// Each line is split at its first `=`; key and value are trimmed. Lines
/// without `=`, with an empty key, or starting with `#` are skipped. A
/// repeated key keeps its last value.
pub fn parse_properties(content: &str) -> HashMap<String, String> {
    content
        .lines()
        .filter(|line| !line.trim_start().starts_with('#'))
        .filter_map(|line| line.split_once('='))
        .map(|(key, value)| (key.trim(), value.trim()))
        .filter(|(key, _)| !key.is_empty())
        .map(|(key, value)| (key.to_string(), value.to_string()))
        .collect()
}

/// Picks the config file: the explicit argument, else `~/picservice.conf`.
pub fn resolve_path(arg: Option<PathBuf>) -> anyhow::Result<PathBuf> {
    resolve_path_with_home(arg, home_dir().as_deref())
}

/// Inner implementation that accepts a home directory for testability.
fn resolve_path_with_home(arg: Option<PathBuf>, home: Option<&Path>) -> anyhow::Result<PathBuf> {
    match arg {
        Some(path) => {
            if !path.is_file() {
                bail!("Config file {} not found", path.display());
            }
            tracing::info!(path = %path.display(), "using config file");
            Ok(path)
        }
        None => {
            let Some(home) = home else {
                bail!("cannot locate home directory; pass the config file as an argument");
            };
            let path = home.join(DEFAULT_CONFIG_NAME);
            if !path.is_file() {
                bail!(
                    "{DEFAULT_CONFIG_NAME} file must exist in {} or be passed as an argument",
                    home.display()
                );
            }
            Ok(path)
        }
    }
}

/// Reads and validates the settings stored at `path`.
pub fn load(path: &Path) -> anyhow::Result<Settings> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config file {}", path.display()))?;

    let is_toml = path.extension().is_some_and(|ext| ext == "toml");
    let raw = if is_toml {
        toml::from_str(&content)
            .with_context(|| format!("invalid TOML in {}", path.display()))?
    } else {
        RawConfig::from_properties(&content)?
    };

    raw.into_settings()
        .with_context(|| format!("invalid configuration in {}", path.display()))
}

/// Returns the user's home directory.
fn home_dir() -> Option<PathBuf> {
    std::env::var_os("HOME")
        .or_else(|| std::env::var_os("USERPROFILE"))
        .map(PathBuf::from)
}

#[cfg(test)]
mod tests {
    use super::*;

    const LEGACY: &str = "\
interval_secs = 60
program_to_invoke = /usr/bin/curl
folder_to_monitor = /home/peter/Pictures/trippics
dest_location = https://cloud.example.com/remote.php/webdav/mypics
username = peter
password = pa=ss word
";

    fn write(dir: &Path, name: &str, content: &str) -> PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn properties_split_at_first_equals() {
        let props = parse_properties(LEGACY);
        assert_eq!(props["interval_secs"], "60");
        assert_eq!(props["password"], "pa=ss word");
        assert_eq!(
            props["dest_location"],
            "https://cloud.example.com/remote.php/webdav/mypics"
        );
    }

    #[test]
    fn properties_skip_noise() {
        let props = parse_properties("# comment = yes\nno equals here\n = orphan\n\nkey=\nk = 1\nk = 2\n");
        assert_eq!(props.len(), 2);
        assert_eq!(props["key"], "");
        assert_eq!(props["k"], "2");
    }

    #[test]
    fn load_legacy_format() {
        let tmp = tempfile::tempdir().unwrap();
        let path = write(tmp.path(), "picservice.conf", LEGACY);

        let settings = load(&path).unwrap();
        assert_eq!(settings.interval, Duration::from_secs(60));
        assert_eq!(settings.program_to_invoke, PathBuf::from("/usr/bin/curl"));
        assert_eq!(
            settings.folder_to_monitor,
            PathBuf::from("/home/peter/Pictures/trippics")
        );
        assert_eq!(settings.username, "peter");
        assert_eq!(settings.password, "pa=ss word");
        assert_eq!(settings.transfer_timeout, DEFAULT_TRANSFER_TIMEOUT);
    }

    #[test]
    fn load_toml_format() {
        let tmp = tempfile::tempdir().unwrap();
        let path = write(
            tmp.path(),
            "picservice.toml",
            r#"
interval_secs = 15
program_to_invoke = "/usr/local/bin/curl"
folder_to_monitor = "/srv/drop"
dest_location = "https://dav.example.org/in/"
username = "svc"
password = "hunter2"
transfer_timeout_secs = 30
extra_key = "ignored"
"#,
        );

        let settings = load(&path).unwrap();
        assert_eq!(settings.interval, Duration::from_secs(15));
        assert_eq!(settings.transfer_timeout, Duration::from_secs(30));
        assert_eq!(settings.dest_location, "https://dav.example.org/in/");
    }

    #[test]
    fn missing_interval_is_fatal() {
        let tmp = tempfile::tempdir().unwrap();
        let content = LEGACY.replace("interval_secs = 60\n", "");
        let path = write(tmp.path(), "a.conf", &content);

        let err = format!("{:#}", load(&path).unwrap_err());
        assert!(err.contains("interval_secs property missing"), "{err}");
    }

    #[test]
    fn unparseable_interval_is_fatal() {
        let tmp = tempfile::tempdir().unwrap();
        let content = LEGACY.replace("= 60", "= sixty");
        let path = write(tmp.path(), "a.conf", &content);

        let err = format!("{:#}", load(&path).unwrap_err());
        assert!(err.contains("interval_secs property unparseable"), "{err}");
    }

    #[test]
    fn zero_interval_is_fatal() {
        let tmp = tempfile::tempdir().unwrap();
        let content = LEGACY.replace("= 60", "= 0");
        let path = write(tmp.path(), "a.conf", &content);

        let err = format!("{:#}", load(&path).unwrap_err());
        assert!(err.contains("interval must be greater than zero"), "{err}");
    }

    #[test]
    fn empty_required_key_is_fatal() {
        let tmp = tempfile::tempdir().unwrap();
        let content = LEGACY.replace("username = peter", "username =");
        let path = write(tmp.path(), "a.conf", &content);

        let err = format!("{:#}", load(&path).unwrap_err());
        assert!(err.contains("username property missing"), "{err}");
    }

    #[test]
    fn explicit_path_must_exist() {
        let tmp = tempfile::tempdir().unwrap();
        let missing = tmp.path().join("nope.conf");

        let err = resolve_path_with_home(Some(missing), Some(tmp.path())).unwrap_err();
        assert!(err.to_string().contains("not found"));
    }

    #[test]
    fn explicit_path_wins_over_home() {
        let tmp = tempfile::tempdir().unwrap();
        let explicit = write(tmp.path(), "custom.conf", LEGACY);
        write(tmp.path(), DEFAULT_CONFIG_NAME, LEGACY);

        let path = resolve_path_with_home(Some(explicit.clone()), Some(tmp.path())).unwrap();
        assert_eq!(path, explicit);
    }

    #[test]
    fn default_path_in_home() {
        let tmp = tempfile::tempdir().unwrap();
        let expected = write(tmp.path(), DEFAULT_CONFIG_NAME, LEGACY);

        let path = resolve_path_with_home(None, Some(tmp.path())).unwrap();
        assert_eq!(path, expected);
    }

    #[test]
    fn default_path_missing_is_fatal() {
        let tmp = tempfile::tempdir().unwrap();

        let err = resolve_path_with_home(None, Some(tmp.path())).unwrap_err();
        assert!(err.to_string().contains("must exist in"));
    }
}
