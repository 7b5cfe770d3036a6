//! In-memory capturing log

use std::io;

use parking_lot::Mutex;

use crate::error::{LogError, LogResult};
use crate::log::{Log, LogFile, LogFileBox};
use crate::types::{FileId, FileMode, Level};

/// Something a [`CaptureLog`] observed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    ContextEnter(String),
    ContextExit,
    Write { text: String, level: Level },
    /// A file, recorded when it was finalized
    File {
        name: String,
        mode: FileMode,
        level: Level,
        data: Vec<u8>,
    },
}

#[derive(Debug, Default)]
struct CaptureState {
    events: Vec<Event>,
    stack: Vec<String>,
}

/// Log that keeps everything it receives in memory
///
/// Useful for testing, and for inspecting what a replay produces.
///
/// # Example
///
/// ```
/// use treelog_core::{CaptureLog, Event, Level, LogExt};
///
/// let log = CaptureLog::new();
/// log.user(["hello", "world"]).unwrap();
/// assert_eq!(
///     log.events(),
///     vec![Event::Write { text: "hello world".to_string(), level: Level::User }]
/// );
/// ```
#[derive(Debug, Default)]
pub struct CaptureLog {
    state: Mutex<CaptureState>,
}

impl CaptureLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// All events so far, in order
    pub fn events(&self) -> Vec<Event> {
        self.state.lock().events.clone()
    }

    /// Text of every written message
    pub fn messages(&self) -> Vec<String> {
        self.state
            .lock()
            .events
            .iter()
            .filter_map(|event| match event {
                Event::Write { text, .. } => Some(text.clone()),
                _ => None,
            })
            .collect()
    }

    /// Name and content of every finalized file
    pub fn files(&self) -> Vec<(String, Vec<u8>)> {
        self.state
            .lock()
            .events
            .iter()
            .filter_map(|event| match event {
                Event::File { name, data, .. } => Some((name.clone(), data.clone())),
                _ => None,
            })
            .collect()
    }

    /// Titles of the currently open contexts, outermost first
    pub fn contexts(&self) -> Vec<String> {
        self.state.lock().stack.clone()
    }

    /// Number of open contexts
    pub fn depth(&self) -> usize {
        self.state.lock().stack.len()
    }

    /// Forget all events (open contexts stay open)
    pub fn clear(&self) {
        self.state.lock().events.clear();
    }
}

impl Log for CaptureLog {
    fn push_context(&self, title: &str) -> LogResult<()> {
        let mut state = self.state.lock();
        state.stack.push(title.to_string());
        state.events.push(Event::ContextEnter(title.to_string()));
        Ok(())
    }

    fn pop_context(&self) -> LogResult<()> {
        let mut state = self.state.lock();
        state.stack.pop().ok_or(LogError::ContextUnderflow)?;
        state.events.push(Event::ContextExit);
        Ok(())
    }

    fn write(&self, text: &str, level: Level) -> LogResult<()> {
        self.state.lock().events.push(Event::Write {
            text: text.to_string(),
            level,
        });
        Ok(())
    }

    fn open(
        &self,
        filename: &str,
        mode: FileMode,
        level: Level,
        _id: Option<&FileId>,
    ) -> LogResult<LogFileBox<'_>> {
        Ok(Box::new(CaptureFile {
            log: self,
            name: filename.to_string(),
            mode,
            level,
            buffer: Vec::new(),
            closed: false,
        }))
    }
}

struct CaptureFile<'a> {
    log: &'a CaptureLog,
    name: String,
    mode: FileMode,
    level: Level,
    buffer: Vec<u8>,
    closed: bool,
}

impl io::Write for CaptureFile<'_> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.buffer.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl LogFile for CaptureFile<'_> {
    fn close(&mut self) -> LogResult<bool> {
        if std::mem::replace(&mut self.closed, true) {
            return Ok(false);
        }
        self.log.state.lock().events.push(Event::File {
            name: std::mem::take(&mut self.name),
            mode: self.mode,
            level: self.level,
            data: std::mem::take(&mut self.buffer),
        });
        Ok(true)
    }
}

impl Drop for CaptureFile<'_> {
    fn drop(&mut self) {
        let _ = self.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_pop_on_empty_stack() {
        let log = CaptureLog::new();
        assert!(matches!(log.pop_context(), Err(LogError::ContextUnderflow)));
        assert!(log.events().is_empty());
    }

    #[test]
    fn test_contexts_and_files() {
        let log = CaptureLog::new();
        log.push_context("a").unwrap();
        log.push_context("b").unwrap();
        assert_eq!(log.contexts(), vec!["a".to_string(), "b".to_string()]);

        let mut file = log.open("x.txt", FileMode::Text, Level::User, None).unwrap();
        file.write_all(b"hi").unwrap();
        drop(file);
        assert_eq!(log.files(), vec![("x.txt".to_string(), b"hi".to_vec())]);

        log.clear();
        assert!(log.events().is_empty());
        assert_eq!(log.depth(), 2);
    }
}
