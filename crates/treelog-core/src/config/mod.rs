//! Configuration for building a log from a file or the environment

mod settings;

pub use settings::{ConfigError, ConfigResult, TreelogConfig, ENV_BACKEND, ENV_DIR, ENV_MIN_LEVEL};
