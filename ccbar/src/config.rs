//! User configuration.
//!
//! Read from `$XDG_CONFIG_HOME/ccbar/config.toml` (falling back to
//! `~/.config/ccbar/config.toml`). Every key is optional; a missing file means
//! all defaults. Problems reading or parsing the file are soft failures: the
//! caller logs the [`ConfigError`] and continues with [`Config::default`].

use std::path::{Path, PathBuf};
use std::time::Duration;

use ccbar_core::rescan::RescanConfig;
use serde::Deserialize;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file '{}': {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config file '{}': {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Config {
    /// `dark` or `catppuccin-mocha`.
    pub theme: String,
    /// Preference database; the log file is written next to it.
    pub db_path: PathBuf,
    pub poll_interval_ms: u64,
    pub debounce_ms: u64,
    pub navigation_retry_ms: Vec<u64>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            theme: "catppuccin-mocha".to_owned(),
            db_path: PathBuf::from(".ccbar/prefs.db"),
            poll_interval_ms: 1000,
            debounce_ms: 100,
            navigation_retry_ms: vec![500, 1000, 2000],
        }
    }
}

impl Config {
    /// Loads `path`, treating a missing file as "all defaults".
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = match std::fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(source) => {
                return Err(ConfigError::Read {
                    path: path.to_owned(),
                    source,
                })
            }
        };
        toml::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_owned(),
            source,
        })
    }

    pub fn rescan(&self) -> RescanConfig {
        RescanConfig {
            poll_interval: Duration::from_millis(self.poll_interval_ms.max(1)),
            debounce: Duration::from_millis(self.debounce_ms),
            navigation_retries: self
                .navigation_retry_ms
                .iter()
                .copied()
                .map(Duration::from_millis)
                .collect(),
        }
    }

    /// `ccbar.log` in the database's directory.
    pub fn log_path(&self) -> PathBuf {
        self.db_path
            .parent()
            .filter(|parent| !parent.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."))
            .join("ccbar.log")
    }
}

/// Returns the path to the ccbar config file.
///
/// Prefers `$XDG_CONFIG_HOME/ccbar/config.toml`; falls back to
/// `~/.config/ccbar/config.toml` when the env var is absent.
pub fn config_path() -> PathBuf {
    let base = std::env::var("XDG_CONFIG_HOME")
        .ok()
        .map(PathBuf::from)
        .or_else(|| {
            std::env::var("HOME")
                .ok()
                .map(|h| PathBuf::from(h).join(".config"))
        })
        .unwrap_or_else(|| PathBuf::from(".config"));
    base.join("ccbar").join("config.toml")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::TempDir::new().unwrap();
        let config = Config::load(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn partial_file_overrides_only_its_keys() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "theme = \"dark\"\ndebounce_ms = 250\n").unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.theme, "dark");
        assert_eq!(config.debounce_ms, 250);
        assert_eq!(config.poll_interval_ms, 1000);
        assert_eq!(
            config.rescan().navigation_retries,
            vec![
                Duration::from_millis(500),
                Duration::from_millis(1000),
                Duration::from_millis(2000)
            ]
        );
    }

    #[test]
    fn malformed_file_is_a_parse_error() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "poll_interval_ms = \"soon\"").unwrap();

        let err = Config::load(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
        assert!(err.to_string().contains("invalid config file"));
    }

    #[test]
    fn log_lives_next_to_the_database() {
        let config = Config {
            db_path: PathBuf::from("/tmp/ccbar/prefs.db"),
            ..Config::default()
        };
        assert_eq!(config.log_path(), PathBuf::from("/tmp/ccbar/ccbar.log"));

        let bare = Config {
            db_path: PathBuf::from("prefs.db"),
            ..Config::default()
        };
        assert_eq!(bare.log_path(), PathBuf::from("./ccbar.log"));
    }
}
