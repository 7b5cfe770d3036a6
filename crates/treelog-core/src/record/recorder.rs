//! Recording log

use std::io;

use parking_lot::Mutex;

use crate::current;
use crate::error::{LogError, LogResult};
use crate::log::{Log, LogFile, LogFileBox};
use crate::types::{FileId, FileMode, Level};
use crate::{diag_debug, diag_trace};

use super::command::{Command, Recording};
use super::replay::replay_commands;

/// Log that records every call for later replay
///
/// Typical use is caching an expensive computation together with the log
/// output it produced:
///
/// ```
/// use std::io::Write;
/// use treelog_core::{CaptureLog, FileMode, LogExt, RecordLog};
///
/// // compute
/// let record = RecordLog::new();
/// {
///     let _ctx = record.context("solve").unwrap();
///     record.info(["converged"]).unwrap();
///     let mut plot = record.user_file("plot.txt", FileMode::Text, None).unwrap();
///     plot.write_all(b"1 2 3").unwrap();
/// }
/// let stored = record.recording().to_json().unwrap();
///
/// // reuse
/// let target = CaptureLog::new();
/// RecordLog::from_json(&stored).unwrap().replay(Some(&target)).unwrap();
/// assert_eq!(target.messages(), vec!["converged".to_string()]);
/// ```
///
/// Errors returned by code running inside a context are not recorded.
///
/// A file is captured when it is closed or dropped, including when a `?`
/// leaves its scope early, and the captured bytes enter the cache under the
/// file's id. Write files through [`LogExt::with_file`](crate::LogExt::with_file)
/// (or call [`LogFile::abort`]) so that a failed producer records no data
/// and caches nothing.
#[derive(Debug, Default)]
pub struct RecordLog {
    state: Mutex<Recording>,
}

impl RecordLog {
    /// Create an empty recording log
    pub fn new() -> Self {
        Self::default()
    }

    /// Resume from a previously captured recording
    pub fn from_recording(recording: Recording) -> Self {
        Self {
            state: Mutex::new(recording),
        }
    }

    pub fn from_json(json: &str) -> LogResult<Self> {
        Ok(Self::from_recording(Recording::from_json(json)?))
    }

    /// Snapshot of the recorded commands and cache
    pub fn recording(&self) -> Recording {
        self.state.lock().clone()
    }

    pub fn into_recording(self) -> Recording {
        self.state.into_inner()
    }

    /// Snapshot of the recorded commands
    pub fn commands(&self) -> Vec<Command> {
        self.state.lock().commands.clone()
    }

    /// Number of recorded commands
    pub fn len(&self) -> usize {
        self.state.lock().commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.lock().commands.is_empty()
    }

    /// Bytes captured for `id`, if any
    pub fn cached(&self, id: &FileId) -> Option<Vec<u8>> {
        self.state.lock().seen.get(id).cloned()
    }

    /// Number of distinct ids in the cache
    pub fn cache_len(&self) -> usize {
        self.state.lock().seen.len()
    }

    /// Replay onto `log`, or onto the current log when `None`
    ///
    /// Replays a snapshot of the commands taken when the call starts, so
    /// replaying a recording onto itself appends one copy of its commands.
    pub fn replay(&self, log: Option<&dyn Log>) -> LogResult<()> {
        match log {
            Some(log) => self.replay_onto(log),
            None => {
                let log = current::current().ok_or(LogError::NoCurrentLog)?;
                self.replay_onto(log.as_ref())
            }
        }
    }

    /// Replay onto a concrete log
    pub fn replay_onto<L: Log + ?Sized>(&self, log: &L) -> LogResult<()> {
        let commands = self.commands();
        diag_debug!("replaying {} recorded commands", commands.len());
        replay_commands(&commands, log)
    }

    fn append(&self, command: Command) {
        self.state.lock().commands.push(command);
    }
}

impl Log for RecordLog {
    fn push_context(&self, title: &str) -> LogResult<()> {
        self.append(Command::context_enter(title));
        Ok(())
    }

    fn pop_context(&self) -> LogResult<()> {
        let mut state = self.state.lock();
        // A context that saw nothing leaves no trace
        if matches!(state.commands.last(), Some(Command::ContextEnter { .. })) {
            state.commands.pop();
        } else {
            state.commands.push(Command::ContextExit);
        }
        Ok(())
    }

    fn write(&self, text: &str, level: Level) -> LogResult<()> {
        self.append(Command::write(text, level));
        Ok(())
    }

    fn open(
        &self,
        filename: &str,
        mode: FileMode,
        level: Level,
        id: Option<&FileId>,
    ) -> LogResult<LogFileBox<'_>> {
        let id = id.filter(|id| id.is_truthy()).cloned();
        let mut state = self.state.lock();
        state.commands.push(Command::OpenEnter {
            filename: filename.to_string(),
            mode,
            level,
            id: id.clone(),
        });

        let sink = match id.as_ref().and_then(|id| state.seen.get(id)) {
            Some(data) => {
                diag_trace!("{} already captured, discarding writes to {}", id_display(&id), filename);
                Sink::Cached(data.clone())
            }
            None => Sink::Buffer(Vec::new()),
        };

        Ok(Box::new(RecordFile {
            log: self,
            sink,
            id,
            finished: false,
        }))
    }
}

fn id_display(id: &Option<FileId>) -> &str {
    id.as_ref().map(FileId::as_str).unwrap_or("")
}

enum Sink {
    /// Content already known; writes are discarded
    Cached(Vec<u8>),
    /// Fresh capture buffer
    Buffer(Vec<u8>),
}

/// File handed out by [`RecordLog::open`]
struct RecordFile<'a> {
    log: &'a RecordLog,
    sink: Sink,
    id: Option<FileId>,
    finished: bool,
}

impl RecordFile<'_> {
    /// Append the exit record; `capture` is false for an aborted scope
    fn finish(&mut self, capture: bool) -> bool {
        if self.finished {
            return false;
        }
        self.finished = true;

        let mut state = self.log.state.lock();
        let data = match &mut self.sink {
            Sink::Cached(data) => Some(std::mem::take(data)),
            Sink::Buffer(_) if !capture => None,
            Sink::Buffer(buffer) => {
                let data = std::mem::take(buffer);
                if let Some(id) = &self.id {
                    // First writer wins
                    state.seen.entry(id.clone()).or_insert_with(|| data.clone());
                }
                Some(data)
            }
        };
        state.commands.push(Command::OpenExit { data });
        true
    }
}

impl io::Write for RecordFile<'_> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if self.finished {
            return Err(io::Error::new(io::ErrorKind::Other, "write to a closed log file"));
        }
        match &mut self.sink {
            Sink::Cached(_) => {}
            Sink::Buffer(buffer) => buffer.extend_from_slice(buf),
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl LogFile for RecordFile<'_> {
    fn close(&mut self) -> LogResult<bool> {
        Ok(self.finish(true))
    }

    fn abort(&mut self) -> LogResult<bool> {
        Ok(self.finish(false))
    }
}

impl Drop for RecordFile<'_> {
    fn drop(&mut self) {
        // Unwinding out of the file scope captures nothing
        self.finish(!std::thread::panicking());
    }
}
