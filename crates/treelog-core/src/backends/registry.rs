//! Log backend registry for creating backends by name

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use once_cell::sync::Lazy;

use crate::config::{ConfigError, TreelogConfig};
use crate::error::LogResult;
use crate::log::SharedLog;

use super::{CaptureLog, ConsoleLog, DataLog, NoOpLog};

/// Factory function type for creating log backends
pub type BackendFactory = Box<dyn Fn(&TreelogConfig) -> LogResult<SharedLog> + Send + Sync>;

/// Definition of a registered backend
pub struct BackendDefinition {
    /// Unique name for this backend
    pub name: String,
    /// Human-readable description
    pub description: String,
    /// Factory function to create instances
    pub factory: BackendFactory,
}

impl std::fmt::Debug for BackendDefinition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BackendDefinition")
            .field("name", &self.name)
            .field("description", &self.description)
            .finish()
    }
}

fn builtin(name: &str, description: &str, factory: BackendFactory) -> (String, BackendDefinition) {
    (
        name.to_string(),
        BackendDefinition {
            name: name.to_string(),
            description: description.to_string(),
            factory,
        },
    )
}

/// Global registry of log backends
static REGISTRY: Lazy<RwLock<HashMap<String, BackendDefinition>>> = Lazy::new(|| {
    let map = HashMap::from([
        builtin(
            "console",
            "Render contexts and messages as lines on stdout",
            Box::new(|config| {
                let log = match &config.prefix {
                    Some(prefix) => ConsoleLog::new().with_prefix(prefix.clone()),
                    None => ConsoleLog::new(),
                };
                Ok(Arc::new(log) as SharedLog)
            }),
        ),
        builtin(
            "noop",
            "Discard everything",
            Box::new(|_| Ok(Arc::new(NoOpLog::new()) as SharedLog)),
        ),
        builtin(
            "capture",
            "Keep events in memory",
            Box::new(|_| Ok(Arc::new(CaptureLog::new()) as SharedLog)),
        ),
        builtin(
            "data",
            "Store files in a directory, ignore messages",
            Box::new(|config| {
                let dir = config
                    .directory
                    .clone()
                    .ok_or_else(|| ConfigError::MissingField("directory".to_string()))?;
                Ok(Arc::new(DataLog::new(dir)) as SharedLog)
            }),
        ),
    ]);
    RwLock::new(map)
});

/// Register a new backend type, replacing any backend with the same name
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use treelog_core::backends::register_log_backend;
/// use treelog_core::{NoOpLog, SharedLog};
///
/// register_log_backend(
///     "silent",
///     "Alias for noop",
///     Box::new(|_| Ok(Arc::new(NoOpLog::new()) as SharedLog)),
/// );
/// ```
pub fn register_log_backend(name: &str, description: &str, factory: BackendFactory) {
    let mut registry = REGISTRY.write().unwrap_or_else(|e| e.into_inner());
    let (key, definition) = builtin(name, description, factory);
    registry.insert(key, definition);
}

/// Create a backend by name
pub fn create_log_backend(name: &str, config: &TreelogConfig) -> LogResult<SharedLog> {
    let registry = REGISTRY.read().unwrap_or_else(|e| e.into_inner());
    let definition = registry
        .get(name)
        .ok_or_else(|| ConfigError::UnknownBackend(name.to_string()))?;
    (definition.factory)(config)
}

/// List all registered backends as (name, description) pairs, sorted by name
pub fn list_log_backends() -> Vec<(String, String)> {
    let registry = REGISTRY.read().unwrap_or_else(|e| e.into_inner());
    let mut backends: Vec<_> = registry
        .values()
        .map(|def| (def.name.clone(), def.description.clone()))
        .collect();
    backends.sort();
    backends
}

/// Check if a backend is registered
pub fn has_log_backend(name: &str) -> bool {
    let registry = REGISTRY.read().unwrap_or_else(|e| e.into_inner());
    registry.contains_key(name)
}

/// Unregister a backend (mainly for testing)
pub fn unregister_log_backend(name: &str) -> bool {
    let mut registry = REGISTRY.write().unwrap_or_else(|e| e.into_inner());
    registry.remove(name).is_some()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LogError;

    #[test]
    fn test_builtin_backends_registered() {
        for name in ["console", "noop", "capture", "data"] {
            assert!(has_log_backend(name), "{} should be registered", name);
        }
    }

    #[test]
    fn test_create_unknown_backend() {
        let err = create_log_backend("nonexistent_xyz", &TreelogConfig::default()).err().expect("expected error");
        assert!(matches!(err, LogError::Config(ConfigError::UnknownBackend(ref n)) if n == "nonexistent_xyz"));
    }

    #[test]
    fn test_data_requires_directory() {
        let err = create_log_backend("data", &TreelogConfig::default()).err().expect("expected error");
        assert!(matches!(err, LogError::Config(ConfigError::MissingField(_))));
    }

    #[test]
    fn test_register_custom_backend() {
        register_log_backend(
            "test_custom_backend",
            "A test backend",
            Box::new(|_| Ok(Arc::new(NoOpLog::new()) as SharedLog)),
        );
        assert!(has_log_backend("test_custom_backend"));
        assert!(create_log_backend("test_custom_backend", &TreelogConfig::default()).is_ok());
        assert!(list_log_backends()
            .iter()
            .any(|(name, _)| name == "test_custom_backend"));

        // Clean up
        assert!(unregister_log_backend("test_custom_backend"));
        assert!(!has_log_backend("test_custom_backend"));
    }
}
