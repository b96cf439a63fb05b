//! Application configuration loaded from a TOML file.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};

/// Top-level application configuration.
///
/// All fields have sensible defaults so TideFM works without a config file.
/// Call [`Config::load`] to read from a TOML path.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub watcher: WatcherConfig,
    #[serde(default)]
    pub history: HistoryConfig,
    #[serde(default)]
    pub vcs: VcsConfig,
}

impl Config {
    /// Loads configuration from a TOML file at `path`.
    ///
    /// # Errors
    ///
    /// - [`CoreError::NotFound`] if the file does not exist.
    /// - [`CoreError::PermissionDenied`] if the file is not readable.
    /// - [`CoreError::ConfigParse`] if the TOML is malformed.
    pub fn load(path: &Path) -> CoreResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => CoreError::NotFound(path.to_path_buf()),
            std::io::ErrorKind::PermissionDenied => CoreError::PermissionDenied(path.to_path_buf()),
            _ => CoreError::Io(e),
        })?;
        toml::from_str(&content).map_err(|e| CoreError::ConfigParse(e.to_string()))
    }
}

/// Directory watcher sampling.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WatcherConfig {
    /// Delay between two snapshots, in milliseconds.
    #[serde(default = "default_interval_ms")]
    pub interval_ms: u64,
    /// Pair a deleted and a created file with equal size and modification
    /// time into one move event.
    #[serde(default)]
    pub detect_moves: bool,
}

impl WatcherConfig {
    /// The sampling interval. Zero is raised to one millisecond so the loop
    /// still yields.
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms.max(1))
    }
}

impl Default for WatcherConfig {
    fn default() -> Self {
        Self {
            interval_ms: default_interval_ms(),
            detect_moves: false,
        }
    }
}

/// Undo history limits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryConfig {
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            max_depth: default_max_depth(),
        }
    }
}

/// Version-control integration settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VcsConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Remote used by push and pull.
    #[serde(default = "default_remote")]
    pub remote: String,
}

impl Default for VcsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            remote: default_remote(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_interval_ms() -> u64 {
    1000
}

fn default_max_depth() -> usize {
    crate::ops::history::DEFAULT_MAX_DEPTH
}

fn default_remote() -> String {
    "origin".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn default_config_values() {
        let config = Config::default();

        assert_eq!(config.watcher.interval_ms, 1000);
        assert!(!config.watcher.detect_moves);
        assert_eq!(config.history.max_depth, 100);
        assert!(config.vcs.enabled);
        assert_eq!(config.vcs.remote, "origin");
    }

    #[test]
    fn load_full_toml() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("config.toml");
        fs::write(
            &path,
            r#"
[watcher]
interval_ms = 250
detect_moves = true

[history]
max_depth = 20

[vcs]
enabled = false
remote = "upstream"
"#,
        )
        .unwrap();

        let config = Config::load(&path).unwrap();

        assert_eq!(config.watcher.interval(), Duration::from_millis(250));
        assert!(config.watcher.detect_moves);
        assert_eq!(config.history.max_depth, 20);
        assert!(!config.vcs.enabled);
        assert_eq!(config.vcs.remote, "upstream");
    }

    #[test]
    fn load_partial_toml_uses_defaults() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("config.toml");
        fs::write(&path, "[watcher]\ndetect_moves = true\n").unwrap();

        let config = Config::load(&path).unwrap();

        assert!(config.watcher.detect_moves);
        assert_eq!(config.watcher.interval_ms, 1000);
        assert_eq!(config.history, HistoryConfig::default());
        assert_eq!(config.vcs, VcsConfig::default());
    }

    #[test]
    fn load_empty_toml_uses_all_defaults() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("config.toml");
        fs::write(&path, "").unwrap();

        assert_eq!(Config::load(&path).unwrap(), Config::default());
    }

    #[test]
    fn zero_interval_is_clamped() {
        let config = WatcherConfig {
            interval_ms: 0,
            detect_moves: false,
        };
        assert_eq!(config.interval(), Duration::from_millis(1));
    }

    #[test]
    fn load_nonexistent_returns_not_found() {
        let tmp = TempDir::new().unwrap();
        let result = Config::load(&tmp.path().join("nonexistent.toml"));
        assert!(matches!(result.unwrap_err(), CoreError::NotFound(_)));
    }

    #[test]
    fn load_invalid_toml_returns_config_parse() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("config.toml");
        fs::write(&path, "this is not valid [[[toml").unwrap();

        let result = Config::load(&path);
        assert!(matches!(result.unwrap_err(), CoreError::ConfigParse(_)));
    }

    #[test]
    fn wrong_value_type_returns_config_parse() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("config.toml");
        fs::write(&path, "[history]\nmax_depth = \"deep\"\n").unwrap();

        assert!(matches!(
            Config::load(&path).unwrap_err(),
            CoreError::ConfigParse(_)
        ));
    }
}
