//! Level filtering wrapper

use crate::error::LogResult;
use crate::log::{Log, LogFileBox, NullFile, SharedLog};
use crate::types::{FileId, FileMode, Level};

/// Log that drops messages and files below a minimum level
///
/// Contexts are always forwarded.
pub struct FilterLog {
    inner: SharedLog,
    min_level: Level,
}

impl FilterLog {
    pub fn new(inner: SharedLog, min_level: Level) -> Self {
        Self { inner, min_level }
    }

    pub fn min_level(&self) -> Level {
        self.min_level
    }

    fn passes(&self, level: Level) -> bool {
        level >= self.min_level
    }
}

impl std::fmt::Debug for FilterLog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FilterLog")
            .field("min_level", &self.min_level)
            .finish_non_exhaustive()
    }
}

impl Log for FilterLog {
    fn push_context(&self, title: &str) -> LogResult<()> {
        self.inner.push_context(title)
    }

    fn pop_context(&self) -> LogResult<()> {
        self.inner.pop_context()
    }

    fn write(&self, text: &str, level: Level) -> LogResult<()> {
        if self.passes(level) {
            self.inner.write(text, level)
        } else {
            Ok(())
        }
    }

    fn open(
        &self,
        filename: &str,
        mode: FileMode,
        level: Level,
        id: Option<&FileId>,
    ) -> LogResult<LogFileBox<'_>> {
        if self.passes(level) {
            self.inner.open(filename, mode, level, id)
        } else {
            Ok(Box::new(NullFile::new()))
        }
    }
}
