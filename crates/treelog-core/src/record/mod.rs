//! Session recording and replay
//!
//! [`RecordLog`] turns every log call into a [`Command`]. The resulting
//! [`Recording`] can be stored and later replayed onto any other log, which
//! reproduces the original output without redoing the work that produced it.

mod command;
mod recorder;
mod replay;

pub use command::{Command, Recording};
pub use recorder::RecordLog;
