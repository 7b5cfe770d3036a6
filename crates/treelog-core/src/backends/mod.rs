//! Concrete log implementations
//!
//! - `CaptureLog`: in-memory events, used by tests
//! - `ConsoleLog`: `context > message` lines on stdout
//! - `DataLog`: files in a directory
//! - `NoOpLog`: discards everything
//! - `TeeLog`, `FilterLog`: combine and filter other logs

mod capture;
mod console;
mod data;
mod filter;
mod noop;
mod registry;
mod tee;

pub use capture::{CaptureLog, Event};
pub use console::ConsoleLog;
pub use data::DataLog;
pub use filter::FilterLog;
pub use noop::NoOpLog;
pub use registry::{
    create_log_backend, has_log_backend, list_log_backends, register_log_backend,
    unregister_log_backend, BackendDefinition, BackendFactory,
};
pub use tee::TeeLog;
