//! Log trait definition

use std::io;
use std::sync::Arc;

use crate::error::LogResult;
use crate::types::{FileId, FileMode, Level};

/// Boxed file resource borrowed from its log
pub type LogFileBox<'a> = Box<dyn LogFile + 'a>;

/// Type alias for an Arc-wrapped log
pub type SharedLog = Arc<dyn Log>;

/// Hierarchical log abstraction
///
/// Backends implement four primitives; everything else (context guards,
/// progress iteration, leveled messages and files) lives in
/// [`LogExt`](super::LogExt) and is shared by every backend.
///
/// Implementations:
/// - `RecordLog`: records calls for later replay
/// - `CaptureLog`: keeps events in memory
/// - `ConsoleLog`: renders to stdout or any writer
/// - `DataLog`: stores files in a directory
/// - `NoOpLog`, `TeeLog`, `FilterLog`: combinators
///
/// A log is meant to be driven sequentially from one logical call stack.
/// Logs are `Send + Sync` so they can be installed as the current log, but
/// interleaving calls from several threads produces unspecified nesting.
pub trait Log: Send + Sync {
    /// Enter a context titled `title`
    fn push_context(&self, title: &str) -> LogResult<()>;

    /// Leave the innermost context
    fn pop_context(&self) -> LogResult<()>;

    /// Write a message
    fn write(&self, text: &str, level: Level) -> LogResult<()>;

    /// Open a file in the log controlled output location
    ///
    /// `id` asserts the content: two opens with the same id produce the same
    /// bytes. Backends are free to ignore it.
    fn open(
        &self,
        filename: &str,
        mode: FileMode,
        level: Level,
        id: Option<&FileId>,
    ) -> LogResult<LogFileBox<'_>>;
}

/// Writable file resource returned by [`Log::open`]
///
/// Dropping the file finalizes it. Call [`LogFile::close`] instead to observe
/// finalization errors, or [`LogFile::abort`] when the code producing the
/// content failed.
pub trait LogFile: io::Write {
    /// Finalize the file
    ///
    /// Returns `true` if the file was still open. Idempotent.
    fn close(&mut self) -> LogResult<bool>;

    /// Finalize the file without keeping what was written
    ///
    /// Backends that capture or cache content discard the partial bytes;
    /// the rest simply close. Returns `true` if the file was still open.
    fn abort(&mut self) -> LogResult<bool> {
        self.close()
    }
}

impl<T: Log + ?Sized> Log for Arc<T> {
    fn push_context(&self, title: &str) -> LogResult<()> {
        (**self).push_context(title)
    }

    fn pop_context(&self) -> LogResult<()> {
        (**self).pop_context()
    }

    fn write(&self, text: &str, level: Level) -> LogResult<()> {
        (**self).write(text, level)
    }

    fn open(
        &self,
        filename: &str,
        mode: FileMode,
        level: Level,
        id: Option<&FileId>,
    ) -> LogResult<LogFileBox<'_>> {
        (**self).open(filename, mode, level, id)
    }
}

/// File that discards everything written to it
#[derive(Debug, Default)]
pub struct NullFile {
    closed: bool,
}

impl NullFile {
    pub fn new() -> Self {
        Self::default()
    }
}

impl io::Write for NullFile {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl LogFile for NullFile {
    fn close(&mut self) -> LogResult<bool> {
        Ok(!std::mem::replace(&mut self.closed, true))
    }
}
