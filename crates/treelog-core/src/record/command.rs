//! Recorded commands and the serializable recording

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::LogResult;
use crate::log::Log;
use crate::types::{FileId, FileMode, Level};

/// One recorded call on a [`RecordLog`](super::RecordLog)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "cmd", rename_all = "snake_case")]
pub enum Command {
    /// `push_context(title)`
    ContextEnter { title: String },
    /// `pop_context()` of a non-empty context
    ContextExit,
    /// `open(...)`, the file is open until the matching `OpenExit`
    OpenEnter {
        filename: String,
        mode: FileMode,
        level: Level,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        id: Option<FileId>,
    },
    /// File finalized; `data` is what the file received, if anything
    OpenExit {
        #[serde(default)]
        data: Option<Vec<u8>>,
    },
    /// `write(text, level)`
    Write { text: String, level: Level },
}

impl Command {
    /// Command name as used in the serialized form
    pub fn name(&self) -> &'static str {
        match self {
            Command::ContextEnter { .. } => "context_enter",
            Command::ContextExit => "context_exit",
            Command::OpenEnter { .. } => "open_enter",
            Command::OpenExit { .. } => "open_exit",
            Command::Write { .. } => "write",
        }
    }

    pub fn context_enter(title: impl Into<String>) -> Self {
        Command::ContextEnter {
            title: title.into(),
        }
    }

    pub fn write(text: impl Into<String>, level: Level) -> Self {
        Command::Write {
            text: text.into(),
            level,
        }
    }
}

/// Plain data captured by a [`RecordLog`](super::RecordLog)
///
/// Holds no live handles, so it can be persisted next to a cached result and
/// replayed in another process.
///
/// # Example
///
/// ```
/// use treelog_core::{CaptureLog, LogExt, RecordLog, Recording};
///
/// let record = RecordLog::new();
/// record.info(["cached", "result"]).unwrap();
///
/// let json = record.recording().to_json().unwrap();
/// let restored = Recording::from_json(&json).unwrap();
///
/// let target = CaptureLog::new();
/// restored.replay(&target).unwrap();
/// assert_eq!(target.messages(), vec!["cached result".to_string()]);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recording {
    /// Ordered command sequence
    #[serde(default)]
    pub commands: Vec<Command>,
    /// Bytes captured the first time each truthy id was opened
    #[serde(default)]
    pub seen: BTreeMap<FileId, Vec<u8>>,
}

impl Recording {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    pub fn to_json(&self) -> LogResult<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn to_json_pretty(&self) -> LogResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> LogResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Write the recording to a JSON file
    pub fn save(&self, path: impl AsRef<Path>) -> LogResult<()> {
        fs::write(path, self.to_json()?)?;
        Ok(())
    }

    /// Read a recording from a JSON file
    pub fn load(path: impl AsRef<Path>) -> LogResult<Self> {
        let json = fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Replay the commands onto `log`
    pub fn replay<L: Log + ?Sized>(&self, log: &L) -> LogResult<()> {
        super::replay::replay_commands(&self.commands, log)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_serialization() {
        let json = serde_json::to_string(&Command::context_enter("build")).unwrap();
        assert_eq!(json, r#"{"cmd":"context_enter","title":"build"}"#);

        let json = serde_json::to_string(&Command::ContextExit).unwrap();
        assert_eq!(json, r#"{"cmd":"context_exit"}"#);

        let json = serde_json::to_string(&Command::write("start", Level::Info)).unwrap();
        assert_eq!(json, r#"{"cmd":"write","text":"start","level":"info"}"#);
    }

    #[test]
    fn test_open_enter_without_id() {
        let command: Command = serde_json::from_str(
            r#"{"cmd":"open_enter","filename":"out.txt","mode":"w","level":"user"}"#,
        )
        .unwrap();
        assert_eq!(
            command,
            Command::OpenEnter {
                filename: "out.txt".to_string(),
                mode: FileMode::Text,
                level: Level::User,
                id: None,
            }
        );
        assert_eq!(command.name(), "open_enter");
    }

    #[test]
    fn test_recording_file_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");

        let mut recording = Recording::new();
        recording.commands.push(Command::OpenEnter {
            filename: "a.bin".to_string(),
            mode: FileMode::Binary,
            level: Level::Debug,
            id: Some(FileId::new("abc")),
        });
        recording.commands.push(Command::OpenExit {
            data: Some(vec![0, 159, 255]),
        });
        recording.seen.insert(FileId::new("abc"), vec![0, 159, 255]);

        recording.save(&path).unwrap();
        assert_eq!(Recording::load(&path).unwrap(), recording);
    }
}
