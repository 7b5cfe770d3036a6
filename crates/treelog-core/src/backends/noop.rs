//! No-op log implementation

use crate::error::LogResult;
use crate::log::{Log, LogFileBox, NullFile};
use crate::types::{FileId, FileMode, Level};

/// A log that does nothing
///
/// Useful for testing or when output is not needed. Files opened on it
/// accept and discard any content.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpLog;

impl NoOpLog {
    /// Create a new no-op log
    pub fn new() -> Self {
        Self
    }
}

impl Log for NoOpLog {
    fn push_context(&self, _title: &str) -> LogResult<()> {
        Ok(())
    }

    fn pop_context(&self) -> LogResult<()> {
        Ok(())
    }

    fn write(&self, _text: &str, _level: Level) -> LogResult<()> {
        Ok(())
    }

    fn open(
        &self,
        _filename: &str,
        _mode: FileMode,
        _level: Level,
        _id: Option<&FileId>,
    ) -> LogResult<LogFileBox<'_>> {
        Ok(Box::new(NullFile::new()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::log::LogExt;
    use std::io::Write;

    #[test]
    fn test_noop_log() {
        let log = NoOpLog::new();

        // These should all do nothing without failing
        let _ctx = log.context("ignored").unwrap();
        log.debug(["debug message"]).unwrap();
        log.error(["error message"]).unwrap();
        let mut file = log.info_file("x.bin", FileMode::Binary, None).unwrap();
        file.write_all(b"discarded").unwrap();
        assert!(file.close().unwrap());
    }
}
