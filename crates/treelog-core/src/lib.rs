//! Treelog Core
//!
//! Hierarchical logging with nested contexts, leveled messages and
//! log-controlled files, plus recording of whole logging sessions for later
//! replay onto another log.
//!
//! ## Record and replay
//!
//! A [`RecordLog`] turns every call into a command. The resulting
//! [`Recording`] is plain data that can be stored next to the result of an
//! expensive computation and replayed later, reproducing the original log
//! output without recomputing anything.
//!
//! ```rust
//! use std::io::Write;
//! use treelog_core::{CaptureLog, Closing, FileId, FileMode, LogExt, RecordLog};
//!
//! let record = RecordLog::new();
//! for step in record.iter("step", 0..2, None).enter() {
//!     let step = step?;
//!     treelog_core::log_info!(record, "solving", step)?;
//!     let mut out = record.user_file("matrix.bin", FileMode::Binary, Some(&FileId::new("m")))?;
//!     out.write_all(&[1, 2, 3])?;
//! }
//!
//! let target = CaptureLog::new();
//! record.replay(Some(&target))?;
//! assert_eq!(target.messages(), vec!["solving 0", "solving 1"]);
//! assert_eq!(target.files().len(), 2);
//! # Ok::<(), treelog_core::LogError>(())
//! ```

pub mod backends;
pub mod closing;
pub mod config;
pub mod current;
pub mod diagnostics;
pub mod error;
pub mod log;
pub mod record;
pub mod types;

// Re-export commonly used types
pub use types::{FileId, FileMode, Level};

pub use error::{LogError, LogResult};

pub use closing::{Closing, ClosingIter, Scoped};

pub use log::{ContextGuard, Log, LogExt, LogFile, LogFileBox, LogIter, NullFile, SharedLog};

pub use record::{Command, RecordLog, Recording};

pub use backends::{CaptureLog, ConsoleLog, DataLog, Event, FilterLog, NoOpLog, TeeLog};

pub use config::{ConfigError, TreelogConfig};
