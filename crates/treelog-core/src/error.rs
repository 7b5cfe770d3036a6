//! Error types

use thiserror::Error;

/// Errors that can occur while logging, recording or replaying
#[derive(Error, Debug)]
pub enum LogError {
    /// I/O error raised by a backend or a file resource
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// `pop_context` was called with no open context
    #[error("context stack underflow: pop_context without a matching push_context")]
    ContextUnderflow,

    /// A recorded command sequence is not well nested
    #[error("malformed recording at command {index}: {detail}")]
    MalformedRecording { index: usize, detail: String },

    /// Replay without an explicit target and no current log installed
    #[error("no current log is installed")]
    NoCurrentLog,

    /// Unknown file mode string
    #[error("invalid file mode {0:?}, expected \"w\" or \"wb\"")]
    InvalidMode(String),

    /// Unknown level name
    #[error("invalid level {0:?}, expected one of debug, info, user, warning, error")]
    InvalidLevel(String),

    /// Recording (de)serialization failed
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Configuration could not be loaded
    #[error("configuration error: {0}")]
    Config(#[from] crate::config::ConfigError),

    /// Backend specific failure
    #[error("{0}")]
    Backend(String),
}

impl LogError {
    /// Create a malformed recording error
    pub fn malformed(index: usize, detail: impl Into<String>) -> Self {
        Self::MalformedRecording {
            index,
            detail: detail.into(),
        }
    }

    /// Create a backend error
    pub fn backend(message: impl Into<String>) -> Self {
        Self::Backend(message.into())
    }
}

pub type LogResult<T> = Result<T, LogError>;
