//! # vendctl Configuration
//!
//! ## Configuration File (vendctl.toml)
//! ```toml
//! [machine]
//! supported_denominations = [200, 100, 50, 25, 10, 5, 1]
//! max_slots = 20
//!
//! [database]
//! path = "/var/lib/vend/vend.db"
//! max_connections = 5
//! lock_timeout_ms = 5000
//! busy_timeout_ms = 5000
//!
//! [logging]
//! filter = "info"
//! ```
//!
//! ## Environment Variable Overrides
//! - `VEND_DATABASE_PATH` - database file
//! - `VEND_DENOMINATIONS` - comma-separated, e.g. `100,50,10`
//! - `VEND_MAX_SLOTS` - slot limit
//! - `VEND_LOCK_TIMEOUT_MS` - item lock wait
//! - `VEND_LOG` - tracing filter directive

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info};

use vend_core::{Denominations, MachineConfig};
use vend_db::DbConfig;

const CONFIG_FILE_NAME: &str = "vendctl.toml";
const DATABASE_FILE_NAME: &str = "vend.db";

/// Errors while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid value for {var}: '{value}' ({reason})")]
    InvalidEnv {
        var: &'static str,
        value: String,
        reason: String,
    },

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

// =============================================================================
// Database Settings
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatabaseSettings {
    /// SQLite file path. `:memory:` is accepted for throwaway runs.
    #[serde(default = "default_database_path")]
    pub path: PathBuf,

    #[serde(default = "default_max_connections")]
    pub max_connections: u32,

    /// How long a purchase waits for its item lock.
    #[serde(default = "default_timeout_ms")]
    pub lock_timeout_ms: u64,

    /// How long SQLite waits on the database write lock.
    #[serde(default = "default_timeout_ms")]
    pub busy_timeout_ms: u64,
}

fn default_database_path() -> PathBuf {
    directories::ProjectDirs::from("com", "vend", "vendctl")
        .map(|dirs| dirs.data_dir().join(DATABASE_FILE_NAME))
        .unwrap_or_else(|| PathBuf::from(DATABASE_FILE_NAME))
}

fn default_max_connections() -> u32 {
    5
}

fn default_timeout_ms() -> u64 {
    5000
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        DatabaseSettings {
            path: default_database_path(),
            max_connections: default_max_connections(),
            lock_timeout_ms: default_timeout_ms(),
            busy_timeout_ms: default_timeout_ms(),
        }
    }
}

impl DatabaseSettings {
    /// Builds the storage configuration.
    pub fn db_config(&self) -> DbConfig {
        let base = if self.path == Path::new(":memory:") {
            DbConfig::in_memory()
        } else {
            DbConfig::new(&self.path).max_connections(self.max_connections)
        };

        base.lock_timeout(Duration::from_millis(self.lock_timeout_ms))
            .busy_timeout(Duration::from_millis(self.busy_timeout_ms))
    }
}

// =============================================================================
// Logging Settings
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingSettings {
    /// `tracing_subscriber::EnvFilter` directive.
    #[serde(default = "default_log_filter")]
    pub filter: String,
}

fn default_log_filter() -> String {
    "info".to_string()
}

impl Default for LoggingSettings {
    fn default() -> Self {
        LoggingSettings {
            filter: default_log_filter(),
        }
    }
}

// =============================================================================
// App Config
// =============================================================================

/// Complete vendctl configuration.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub machine: MachineConfig,

    #[serde(default)]
    pub database: DatabaseSettings,

    #[serde(default)]
    pub logging: LoggingSettings,
}

impl AppConfig {
    /// Loads configuration from file, environment, and defaults.
    ///
    /// ## Load Order (later overrides earlier)
    /// 1. Default values
    /// 2. Config file (`config_path`, else the platform config dir)
    /// 3. `VEND_*` environment variables
    ///
    /// An explicit `config_path` must exist; the default one may be absent.
    pub fn load(config_path: Option<PathBuf>) -> ConfigResult<Self> {
        let explicit = config_path.is_some();
        let mut config = Self::default();

        if let Some(path) = config_path.or_else(Self::default_config_path) {
            if explicit || path.exists() {
                info!(?path, "Loading config from file");
                let contents = std::fs::read_to_string(&path).map_err(|source| {
                    ConfigError::Read {
                        path: path.clone(),
                        source,
                    }
                })?;
                config = Self::from_toml(&contents)?;
            } else {
                debug!(?path, "Config file not found, using defaults");
            }
        }

        config.apply_overrides(|name| std::env::var(name).ok())?;
        config.validate()?;

        Ok(config)
    }

    /// Parses a TOML document; missing sections fall back to defaults.
    pub fn from_toml(contents: &str) -> ConfigResult<Self> {
        Ok(toml::from_str(contents)?)
    }

    /// Validates the configuration.
    pub fn validate(&self) -> ConfigResult<()> {
        self.machine
            .validate()
            .map_err(|e| ConfigError::Invalid(e.to_string()))?;

        if self.database.max_connections == 0 {
            return Err(ConfigError::Invalid(
                "database.max_connections must be greater than 0".into(),
            ));
        }

        if self.database.lock_timeout_ms == 0 {
            return Err(ConfigError::Invalid(
                "database.lock_timeout_ms must be greater than 0".into(),
            ));
        }

        Ok(())
    }

    /// Applies `VEND_*` overrides read through `var`.
    fn apply_overrides<F>(&mut self, var: F) -> ConfigResult<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(path) = var("VEND_DATABASE_PATH") {
            debug!(path = %path, "Overriding database path from environment");
            self.database.path = PathBuf::from(path);
        }

        if let Some(value) = var("VEND_DENOMINATIONS") {
            self.machine.supported_denominations =
                value
                    .parse::<Denominations>()
                    .map_err(|e| ConfigError::InvalidEnv {
                        var: "VEND_DENOMINATIONS",
                        value: value.clone(),
                        reason: e.to_string(),
                    })?;
        }

        if let Some(value) = var("VEND_MAX_SLOTS") {
            self.machine.max_slots = parse_env("VEND_MAX_SLOTS", &value)?;
        }

        if let Some(value) = var("VEND_LOCK_TIMEOUT_MS") {
            self.database.lock_timeout_ms = parse_env("VEND_LOCK_TIMEOUT_MS", &value)?;
        }

        if let Some(filter) = var("VEND_LOG") {
            self.logging.filter = filter;
        }

        Ok(())
    }

    /// Returns the default config file path.
    fn default_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("com", "vend", "vendctl")
            .map(|dirs| dirs.config_dir().join(CONFIG_FILE_NAME))
    }
}

fn parse_env<T>(var: &'static str, value: &str) -> ConfigResult<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    value
        .trim()
        .parse::<T>()
        .map_err(|e| ConfigError::InvalidEnv {
            var,
            value: value.to_string(),
            reason: e.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.machine.max_slots, 20);
        assert_eq!(config.database.lock_timeout_ms, 5000);
        assert_eq!(config.logging.filter, "info");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_from_toml() {
        let config = AppConfig::from_toml(
            r#"
            [machine]
            supported_denominations = [100, 25, 5]
            max_slots = 8

            [database]
            path = "/tmp/machine.db"
            lock_timeout_ms = 250
            "#,
        )
        .unwrap();

        assert_eq!(config.machine.max_slots, 8);
        assert_eq!(
            config.machine.supported_denominations.descending(),
            &[100, 25, 5]
        );
        assert_eq!(config.database.path, PathBuf::from("/tmp/machine.db"));
        assert_eq!(config.database.lock_timeout_ms, 250);
        assert_eq!(config.database.max_connections, 5);
        assert_eq!(config.logging, LoggingSettings::default());
    }

    #[test]
    fn test_env_overrides() {
        let mut config = AppConfig::default();
        config
            .apply_overrides(env(&[
                ("VEND_DATABASE_PATH", ":memory:"),
                ("VEND_DENOMINATIONS", "10, 50,5"),
                ("VEND_MAX_SLOTS", "3"),
                ("VEND_LOCK_TIMEOUT_MS", "75"),
                ("VEND_LOG", "debug"),
            ]))
            .unwrap();

        assert_eq!(config.database.path, PathBuf::from(":memory:"));
        assert_eq!(config.machine.supported_denominations.descending(), &[50, 10, 5]);
        assert_eq!(config.machine.max_slots, 3);
        assert_eq!(config.database.lock_timeout_ms, 75);
        assert_eq!(config.logging.filter, "debug");

        let db = config.database.db_config();
        assert!(db.is_in_memory());
        assert_eq!(db.lock_timeout, Duration::from_millis(75));
    }

    #[test]
    fn test_bad_env_values() {
        let mut config = AppConfig::default();
        let err = config
            .apply_overrides(env(&[("VEND_MAX_SLOTS", "many")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnv { var: "VEND_MAX_SLOTS", .. }));

        let err = config
            .apply_overrides(env(&[("VEND_DENOMINATIONS", "25,-1")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnv { var: "VEND_DENOMINATIONS", .. }));
    }

    #[test]
    fn test_validation_failures() {
        let mut config = AppConfig::default();
        config.machine.max_slots = 0;
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.database.max_connections = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_missing_explicit_file_is_an_error() {
        let err = AppConfig::load(Some(PathBuf::from("/nonexistent/vendctl.toml"))).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }
}
