//! Console log implementation

use std::io::{self, Write};

use parking_lot::Mutex;

use crate::error::{LogError, LogResult};
use crate::log::{Log, LogFileBox, NullFile};
use crate::types::{FileId, FileMode, Level};

struct ConsoleState {
    out: Box<dyn Write + Send>,
    stack: Vec<String>,
}

/// A log that renders `context > context > message` lines
///
/// Writes to stdout unless given another writer. Files are announced by name
/// and their content is discarded.
pub struct ConsoleLog {
    prefix: Option<String>,
    state: Mutex<ConsoleState>,
}

impl Default for ConsoleLog {
    fn default() -> Self {
        Self::new()
    }
}

impl ConsoleLog {
    /// Create a console log on stdout
    pub fn new() -> Self {
        Self::with_writer(io::stdout())
    }

    /// Create a console log on an arbitrary writer
    pub fn with_writer(out: impl Write + Send + 'static) -> Self {
        Self {
            prefix: None,
            state: Mutex::new(ConsoleState {
                out: Box::new(out),
                stack: Vec::new(),
            }),
        }
    }

    /// Prepend `prefix` to every line
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = Some(prefix.into());
        self
    }

    fn line(&self, text: &str) -> LogResult<()> {
        let mut state = self.state.lock();
        let mut line = String::new();
        if let Some(prefix) = &self.prefix {
            line.push_str(prefix);
            line.push(' ');
        }
        for title in &state.stack {
            line.push_str(title);
            line.push_str(" > ");
        }
        line.push_str(text);
        writeln!(state.out, "{}", line)?;
        state.out.flush()?;
        Ok(())
    }
}

impl std::fmt::Debug for ConsoleLog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConsoleLog")
            .field("prefix", &self.prefix)
            .field("depth", &self.state.lock().stack.len())
            .finish()
    }
}

impl Log for ConsoleLog {
    fn push_context(&self, title: &str) -> LogResult<()> {
        self.state.lock().stack.push(title.to_string());
        Ok(())
    }

    fn pop_context(&self) -> LogResult<()> {
        self.state
            .lock()
            .stack
            .pop()
            .map(|_| ())
            .ok_or(LogError::ContextUnderflow)
    }

    fn write(&self, text: &str, _level: Level) -> LogResult<()> {
        self.line(text)
    }

    fn open(
        &self,
        filename: &str,
        _mode: FileMode,
        _level: Level,
        _id: Option<&FileId>,
    ) -> LogResult<LogFileBox<'_>> {
        self.line(filename)?;
        Ok(Box::new(NullFile::new()))
    }
}
