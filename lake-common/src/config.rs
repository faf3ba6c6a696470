//! Configuration loading and store path resolution
//!
//! Root folder resolution priority:
//! 1. Command-line argument (highest priority)
//! 2. `LAKE_ROOT_FOLDER` environment variable
//! 3. TOML config file `root_folder`
//! 4. OS-dependent compiled default (fallback)
//!
//! A missing config file is not an error; defaults are used and a warning is logged.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Environment variable overriding the root folder
pub const ROOT_FOLDER_ENV: &str = "LAKE_ROOT_FOLDER";

/// Bootstrap configuration loaded from TOML
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TomlConfig {
    /// Folder holding the tier databases (optional)
    #[serde(default)]
    pub root_folder: Option<PathBuf>,

    /// Tier database file names
    #[serde(default)]
    pub stores: StoreConfig,

    /// Object-created trigger filter
    #[serde(default)]
    pub trigger: TriggerConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Tier database locations; relative paths resolve against the root folder
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoreConfig {
    #[serde(default = "default_bronze_db")]
    pub bronze: PathBuf,
    #[serde(default = "default_silver_db")]
    pub silver: PathBuf,
    #[serde(default = "default_gold_db")]
    pub gold: PathBuf,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            bronze: default_bronze_db(),
            silver: default_silver_db(),
            gold: default_gold_db(),
        }
    }
}

/// Key filter for object-created notifications
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TriggerConfig {
    #[serde(default = "default_trigger_prefix")]
    pub prefix: String,
    #[serde(default = "default_trigger_suffix")]
    pub suffix: String,
}

impl Default for TriggerConfig {
    fn default() -> Self {
        Self {
            prefix: default_trigger_prefix(),
            suffix: default_trigger_suffix(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log file path (optional, logs to stderr if not specified)
    #[serde(default)]
    pub file: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: None,
        }
    }
}

fn default_bronze_db() -> PathBuf {
    PathBuf::from("bronze_raw.db")
}

fn default_silver_db() -> PathBuf {
    PathBuf::from("silver_raw.db")
}

fn default_gold_db() -> PathBuf {
    PathBuf::from("gold_raw.db")
}

fn default_trigger_prefix() -> String {
    "bronze_".to_string()
}

fn default_trigger_suffix() -> String {
    ".csv".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

impl TomlConfig {
    /// Parse a TOML config file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("Read {} failed: {}", path.display(), e)))?;
        toml::from_str(&content)
            .map_err(|e| Error::Config(format!("Parse {} failed: {}", path.display(), e)))
    }

    /// Load config from `explicit` or the default locations
    ///
    /// An explicit path must exist. Default locations are optional. Nothing is
    /// logged here since tracing is configured from the result; callers log the
    /// returned `ConfigSource` once the subscriber is installed.
    pub fn load(explicit: Option<&Path>) -> Result<(Self, ConfigSource)> {
        if let Some(path) = explicit {
            let config = Self::from_file(path)?;
            return Ok((config, ConfigSource::File(path.to_path_buf())));
        }

        match default_config_file() {
            Some(path) => {
                let config = Self::from_file(&path)?;
                Ok((config, ConfigSource::File(path)))
            }
            None => Ok((Self::default(), ConfigSource::Defaults)),
        }
    }

    /// Resolve the root folder following the documented priority order
    pub fn resolve_root_folder(&self, cli_arg: Option<&Path>) -> PathBuf {
        // Priority 1: Command-line argument
        if let Some(path) = cli_arg {
            return path.to_path_buf();
        }

        // Priority 2: Environment variable
        if let Ok(path) = std::env::var(ROOT_FOLDER_ENV) {
            if !path.trim().is_empty() {
                return PathBuf::from(path);
            }
        }

        // Priority 3: TOML config file
        if let Some(path) = &self.root_folder {
            return path.clone();
        }

        // Priority 4: OS-dependent compiled default
        default_root_folder()
    }

    /// Resolve tier database paths against the root folder
    pub fn store_paths(&self, cli_root: Option<&Path>) -> StorePaths {
        let root = self.resolve_root_folder(cli_root);
        StorePaths {
            bronze: root.join(&self.stores.bronze),
            silver: root.join(&self.stores.silver),
            gold: root.join(&self.stores.gold),
        }
    }
}

/// Where `TomlConfig::load` found its configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    File(PathBuf),
    /// No config file found; built-in defaults
    Defaults,
}

impl ConfigSource {
    pub fn log(&self) {
        match self {
            ConfigSource::File(path) => info!("Loaded config from {}", path.display()),
            ConfigSource::Defaults => warn!("No config file found, using built-in defaults"),
        }
    }
}

/// Fully resolved tier database files
#[derive(Debug, Clone, PartialEq)]
pub struct StorePaths {
    pub bronze: PathBuf,
    pub silver: PathBuf,
    pub gold: PathBuf,
}

impl StorePaths {
    /// All three stores inside `root` with default file names
    pub fn in_folder(root: &Path) -> Self {
        let stores = StoreConfig::default();
        Self {
            bronze: root.join(stores.bronze),
            silver: root.join(stores.silver),
            gold: root.join(stores.gold),
        }
    }
}

/// First existing config file: ~/.config/lake/config.toml, then /etc/lake/config.toml
fn default_config_file() -> Option<PathBuf> {
    let user_config = dirs::config_dir().map(|d| d.join("lake").join("config.toml"));
    if let Some(path) = user_config {
        if path.exists() {
            return Some(path);
        }
    }

    let system_config = PathBuf::from("/etc/lake/config.toml");
    if cfg!(unix) && system_config.exists() {
        return Some(system_config);
    }

    None
}

/// Get OS-dependent default root folder path
pub fn default_root_folder() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join("lake"))
        .unwrap_or_else(|| PathBuf::from("./lake_data"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_toml_uses_defaults() {
        let config: TomlConfig = toml::from_str("").unwrap();
        assert_eq!(config, TomlConfig::default());
        assert_eq!(config.stores.bronze, PathBuf::from("bronze_raw.db"));
        assert_eq!(config.trigger.prefix, "bronze_");
        assert_eq!(config.trigger.suffix, ".csv");
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_partial_toml_keeps_other_defaults() {
        let config: TomlConfig = toml::from_str(
            r#"
            root_folder = "/data/lake"

            [stores]
            silver = "tiers/silver.db"

            [logging]
            level = "debug"
            "#,
        )
        .unwrap();

        assert_eq!(config.root_folder, Some(PathBuf::from("/data/lake")));
        assert_eq!(config.stores.bronze, PathBuf::from("bronze_raw.db"));
        assert_eq!(config.stores.silver, PathBuf::from("tiers/silver.db"));
        assert_eq!(config.logging.level, "debug");
        assert!(config.logging.file.is_none());
    }

    #[test]
    fn test_cli_root_wins_and_paths_join() {
        let config = TomlConfig {
            root_folder: Some(PathBuf::from("/from/toml")),
            ..Default::default()
        };
        let paths = config.store_paths(Some(Path::new("/from/cli")));
        assert_eq!(paths.bronze, PathBuf::from("/from/cli/bronze_raw.db"));
        assert_eq!(paths.silver, PathBuf::from("/from/cli/silver_raw.db"));
        assert_eq!(paths.gold, PathBuf::from("/from/cli/gold_raw.db"));
    }

    #[test]
    fn test_absolute_store_path_ignores_root() {
        let config = TomlConfig {
            stores: StoreConfig {
                gold: PathBuf::from("/elsewhere/gold.db"),
                ..Default::default()
            },
            ..Default::default()
        };
        let paths = config.store_paths(Some(Path::new("/root")));
        assert_eq!(paths.gold, PathBuf::from("/elsewhere/gold.db"));
    }

    #[test]
    fn test_invalid_toml_is_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "stores = 12").unwrap();

        let err = TomlConfig::from_file(&path).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_explicit_missing_file_is_error() {
        let err = TomlConfig::load(Some(Path::new("/nonexistent/lake.toml"))).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }
}
