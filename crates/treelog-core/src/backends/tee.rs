//! Forward to two logs

use std::io;

use crate::error::LogResult;
use crate::log::{Log, LogFile, LogFileBox, SharedLog};
use crate::types::{FileId, FileMode, Level};

/// Log that forwards every call to two logs
///
/// Files are written to both targets.
pub struct TeeLog {
    first: SharedLog,
    second: SharedLog,
}

impl TeeLog {
    pub fn new(first: SharedLog, second: SharedLog) -> Self {
        Self { first, second }
    }
}

impl std::fmt::Debug for TeeLog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TeeLog").finish_non_exhaustive()
    }
}

impl Log for TeeLog {
    fn push_context(&self, title: &str) -> LogResult<()> {
        self.first.push_context(title)?;
        self.second.push_context(title)
    }

    fn pop_context(&self) -> LogResult<()> {
        // Pop both even if the first fails so the stacks stay aligned
        let first = self.first.pop_context();
        let second = self.second.pop_context();
        first.and(second)
    }

    fn write(&self, text: &str, level: Level) -> LogResult<()> {
        self.first.write(text, level)?;
        self.second.write(text, level)
    }

    fn open(
        &self,
        filename: &str,
        mode: FileMode,
        level: Level,
        id: Option<&FileId>,
    ) -> LogResult<LogFileBox<'_>> {
        let first = self.first.open(filename, mode, level, id)?;
        let second = self.second.open(filename, mode, level, id)?;
        Ok(Box::new(TeeFile { first, second }))
    }
}

struct TeeFile<'a> {
    first: LogFileBox<'a>,
    second: LogFileBox<'a>,
}

impl io::Write for TeeFile<'_> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.first.write_all(buf)?;
        self.second.write_all(buf)?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.first.flush()?;
        self.second.flush()
    }
}

impl LogFile for TeeFile<'_> {
    fn close(&mut self) -> LogResult<bool> {
        let first = self.first.close();
        let second = self.second.close();
        Ok(first? | second?)
    }

    fn abort(&mut self) -> LogResult<bool> {
        let first = self.first.abort();
        let second = self.second.abort();
        Ok(first? | second?)
    }
}
