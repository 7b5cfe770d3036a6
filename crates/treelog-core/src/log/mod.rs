//! The log contract and everything derived from it

mod traits;
mod ext;

pub use traits::{Log, LogFile, LogFileBox, NullFile, SharedLog};
pub use ext::{ContextGuard, LogExt, LogIter};
