//! Core value types shared by every log
//!
//! This module contains the tags attached to messages and files.

mod level;
mod file;

pub use level::Level;
pub use file::{FileId, FileMode};
