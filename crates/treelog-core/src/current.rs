//! Process-wide current log
//!
//! The application installs the log that ambient call sites and
//! [`RecordLog::replay`](crate::RecordLog::replay) fall back to. Nothing in
//! this crate installs or resets it on its own.

use std::sync::Arc;

use once_cell::sync::Lazy;
use parking_lot::RwLock;

use crate::backends::TeeLog;
use crate::log::{Log, SharedLog};

static CURRENT: Lazy<RwLock<Option<SharedLog>>> = Lazy::new(|| RwLock::new(None));

/// The currently installed log, if any
pub fn current() -> Option<SharedLog> {
    CURRENT.read().clone()
}

/// Install `log` as the current log, returning the previous one
pub fn set_current(log: SharedLog) -> Option<SharedLog> {
    CURRENT.write().replace(log)
}

/// Remove the current log, returning it
pub fn clear_current() -> Option<SharedLog> {
    CURRENT.write().take()
}

/// Install `log` until the returned guard is dropped
///
/// ```
/// use std::sync::Arc;
/// use treelog_core::{current, NoOpLog};
///
/// {
///     let _guard = current::use_log(Arc::new(NoOpLog::new()));
///     assert!(current::current().is_some());
/// }
/// ```
pub fn use_log(log: SharedLog) -> CurrentGuard {
    CurrentGuard {
        previous: set_current(log),
    }
}

/// Send output to `log` in addition to the current log until the guard drops
///
/// Without a current log this behaves like [`use_log`].
pub fn add_log(log: SharedLog) -> CurrentGuard {
    let combined: SharedLog = match current() {
        Some(existing) => Arc::new(TeeLog::new(existing, log)),
        None => log,
    };
    use_log(combined)
}

/// Restores the previously installed log on drop
#[must_use = "the previous log is restored as soon as the guard is dropped"]
pub struct CurrentGuard {
    previous: Option<SharedLog>,
}

impl Drop for CurrentGuard {
    fn drop(&mut self) {
        let mut slot = CURRENT.write();
        *slot = self.previous.take();
    }
}

impl std::fmt::Debug for CurrentGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CurrentGuard")
            .field("has_previous", &self.previous.is_some())
            .finish()
    }
}

/// Helper for call sites that log through whatever is installed
///
/// Runs `f` with the current log, or returns `None` when none is installed.
pub fn with_current<R>(f: impl FnOnce(&dyn Log) -> R) -> Option<R> {
    current().map(|log| f(log.as_ref()))
}
