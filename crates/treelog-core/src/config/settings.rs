//! YAML configuration for building a log
//!
//! Looked up at `~/.config/treelog/config.yaml` unless a path is given;
//! environment variables override file values.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::backends::{create_log_backend, FilterLog};
use crate::error::LogResult;
use crate::log::SharedLog;
use crate::types::Level;

/// Errors that can occur while loading configuration
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Unknown log backend: {0}")]
    UnknownBackend(String),

    #[error("Missing configuration field: {0}")]
    MissingField(String),

    #[error("Invalid value {value:?} for {key}")]
    InvalidValue { key: String, value: String },
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// Environment variable selecting the backend
pub const ENV_BACKEND: &str = "TREELOG_BACKEND";
/// Environment variable setting the minimum level
pub const ENV_MIN_LEVEL: &str = "TREELOG_MIN_LEVEL";
/// Environment variable setting the data directory
pub const ENV_DIR: &str = "TREELOG_DIR";

/// Settings used to build the application's log
///
/// ```
/// use treelog_core::config::TreelogConfig;
/// use treelog_core::Level;
///
/// let config = TreelogConfig::from_yaml("backend: noop\nmin_level: warning\n").unwrap();
/// assert_eq!(config.backend, "noop");
/// assert_eq!(config.min_level, Some(Level::Warning));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TreelogConfig {
    /// Registered backend name
    pub backend: String,
    /// Drop messages and files below this level
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_level: Option<Level>,
    /// Output directory for the `data` backend
    #[serde(skip_serializing_if = "Option::is_none")]
    pub directory: Option<PathBuf>,
    /// Line prefix for the `console` backend
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prefix: Option<String>,
}

impl Default for TreelogConfig {
    fn default() -> Self {
        Self {
            backend: "console".to_string(),
            min_level: None,
            directory: None,
            prefix: None,
        }
    }
}

impl TreelogConfig {
    pub fn from_yaml(yaml: &str) -> ConfigResult<Self> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    pub fn to_yaml(&self) -> ConfigResult<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Load a config file
    pub fn load(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// User-level config path (~/.config/treelog/config.yaml)
    pub fn user_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("treelog").join("config.yaml"))
    }

    /// Load the user config if present, else defaults, then apply the environment
    pub fn discover() -> ConfigResult<Self> {
        let config = match Self::user_config_path() {
            Some(path) if path.exists() => Self::load(path)?,
            _ => Self::default(),
        };
        config.with_overrides(|key| std::env::var(key).ok())
    }

    /// Apply `TREELOG_*` overrides using `lookup` to read variables
    pub fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> ConfigResult<Self> {
        if let Some(backend) = lookup(ENV_BACKEND) {
            self.backend = backend;
        }
        if let Some(value) = lookup(ENV_MIN_LEVEL) {
            let level = value.parse::<Level>().map_err(|_| ConfigError::InvalidValue {
                key: ENV_MIN_LEVEL.to_string(),
                value,
            })?;
            self.min_level = Some(level);
        }
        if let Some(dir) = lookup(ENV_DIR) {
            self.directory = Some(PathBuf::from(dir));
        }
        Ok(self)
    }

    /// Create the configured log
    pub fn build_log(&self) -> LogResult<SharedLog> {
        let log = create_log_backend(&self.backend, self)?;
        Ok(match self.min_level {
            Some(level) => Arc::new(FilterLog::new(log, level)),
            None => log,
        })
    }
}
