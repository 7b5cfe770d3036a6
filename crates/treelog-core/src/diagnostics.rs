//! Internal diagnostics for treelog itself
//!
//! Logs produced by the facade are user output; this module is where the
//! facade reports on its own behavior (leaked scopes, replay progress, errors
//! that surfaced inside `Drop` and could not be returned). Lines are appended
//! to a file so they never interleave with a console backend.
//!
//! Disabled unless `TREELOG_DEBUG` is `1` or `true`.

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::PathBuf;
use std::time::SystemTime;

use once_cell::sync::Lazy;
use parking_lot::Mutex;

/// Diagnostic severities
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum DiagLevel {
    Trace = 0,
    Debug = 1,
    Info = 2,
    Warn = 3,
    Error = 4,
}

impl DiagLevel {
    fn parse(value: &str) -> Option<Self> {
        match value.to_lowercase().as_str() {
            "trace" => Some(DiagLevel::Trace),
            "debug" => Some(DiagLevel::Debug),
            "info" => Some(DiagLevel::Info),
            "warn" | "warning" => Some(DiagLevel::Warn),
            "error" => Some(DiagLevel::Error),
            _ => None,
        }
    }
}

impl std::fmt::Display for DiagLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DiagLevel::Trace => write!(f, "TRACE"),
            DiagLevel::Debug => write!(f, "DEBUG"),
            DiagLevel::Info => write!(f, "INFO "),
            DiagLevel::Warn => write!(f, "WARN "),
            DiagLevel::Error => write!(f, "ERROR"),
        }
    }
}

struct DiagnosticsState {
    file: Option<File>,
    min_level: DiagLevel,
    enabled: bool,
}

impl DiagnosticsState {
    fn from_env() -> Self {
        let enabled = std::env::var("TREELOG_DEBUG")
            .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
            .unwrap_or(false);
        let min_level = std::env::var("TREELOG_LOG_LEVEL")
            .ok()
            .and_then(|v| DiagLevel::parse(&v))
            .unwrap_or(DiagLevel::Debug);

        // Only touch the filesystem when someone asked for diagnostics
        let file = if enabled {
            OpenOptions::new()
                .create(true)
                .append(true)
                .open(Self::default_path())
                .ok()
        } else {
            None
        };

        Self {
            file,
            min_level,
            enabled,
        }
    }

    fn default_path() -> PathBuf {
        let mut path = std::env::temp_dir();
        path.push("treelog-debug.log");
        path
    }

    fn write(&mut self, level: DiagLevel, module: &str, message: &str) {
        if !self.enabled || level < self.min_level {
            return;
        }

        if let Some(ref mut file) = self.file {
            let timestamp = SystemTime::now()
                .duration_since(SystemTime::UNIX_EPOCH)
                .map(|d| {
                    let secs = d.as_secs();
                    let millis = d.subsec_millis();
                    let hours = (secs % 86400) / 3600;
                    let mins = (secs % 3600) / 60;
                    let secs = secs % 60;
                    format!("{:02}:{:02}:{:02}.{:03}", hours, mins, secs, millis)
                })
                .unwrap_or_else(|_| "??:??:??.???".to_string());

            let _ = writeln!(file, "[{}] [{}] [{}] {}", timestamp, level, module, message);
            let _ = file.flush();
        }
    }
}

static STATE: Lazy<Mutex<DiagnosticsState>> = Lazy::new(|| Mutex::new(DiagnosticsState::from_env()));

/// Record a diagnostic line
pub fn log(level: DiagLevel, module: &str, message: &str) {
    STATE.lock().write(level, module, message);
}

/// Whether diagnostics are currently written anywhere
pub fn is_enabled() -> bool {
    STATE.lock().enabled
}

/// Turn diagnostics on or off at runtime, opening the file if needed
pub fn set_enabled(enabled: bool) {
    let mut state = STATE.lock();
    if enabled && state.file.is_none() {
        state.file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(DiagnosticsState::default_path())
            .ok();
    }
    state.enabled = enabled;
}

/// Path of the diagnostics file
pub fn diagnostics_path() -> PathBuf {
    DiagnosticsState::default_path()
}

#[macro_export]
macro_rules! diag_trace {
    ($($arg:tt)*) => {
        $crate::diagnostics::log($crate::diagnostics::DiagLevel::Trace, module_path!(), &format!($($arg)*))
    };
}

#[macro_export]
macro_rules! diag_debug {
    ($($arg:tt)*) => {
        $crate::diagnostics::log($crate::diagnostics::DiagLevel::Debug, module_path!(), &format!($($arg)*))
    };
}

#[macro_export]
macro_rules! diag_info {
    ($($arg:tt)*) => {
        $crate::diagnostics::log($crate::diagnostics::DiagLevel::Info, module_path!(), &format!($($arg)*))
    };
}

#[macro_export]
macro_rules! diag_warn {
    ($($arg:tt)*) => {
        $crate::diagnostics::log($crate::diagnostics::DiagLevel::Warn, module_path!(), &format!($($arg)*))
    };
}

#[macro_export]
macro_rules! diag_error {
    ($($arg:tt)*) => {
        $crate::diagnostics::log($crate::diagnostics::DiagLevel::Error, module_path!(), &format!($($arg)*))
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_levels_ordered() {
        assert!(DiagLevel::Debug > DiagLevel::Trace);
        assert!(DiagLevel::Info > DiagLevel::Debug);
        assert!(DiagLevel::Warn > DiagLevel::Info);
        assert!(DiagLevel::Error > DiagLevel::Warn);
    }

    #[test]
    fn test_parse() {
        assert_eq!(DiagLevel::parse("WARNING"), Some(DiagLevel::Warn));
        assert_eq!(DiagLevel::parse("trace"), Some(DiagLevel::Trace));
        assert_eq!(DiagLevel::parse("loud"), None);
    }

    #[test]
    fn test_macros_do_not_panic() {
        diag_debug!("replaying {} commands", 3);
        diag_warn!("unclosed {}", "ClosingIter");
    }
}
