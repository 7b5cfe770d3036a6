//! File mode and file identity

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::LogError;

/// How a log file is written
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FileMode {
    /// Text content (`"w"`), expected to be UTF-8
    #[serde(rename = "w")]
    Text,
    /// Raw bytes (`"wb"`)
    #[serde(rename = "wb")]
    Binary,
}

impl FileMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            FileMode::Text => "w",
            FileMode::Binary => "wb",
        }
    }

    pub fn is_binary(&self) -> bool {
        matches!(self, FileMode::Binary)
    }
}

impl fmt::Display for FileMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FileMode {
    type Err = LogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "w" => Ok(FileMode::Text),
            "wb" => Ok(FileMode::Binary),
            other => Err(LogError::InvalidMode(other.to_string())),
        }
    }
}

/// Caller supplied fingerprint of a file's content
///
/// Two `open` calls with the same id assert that they would produce the same
/// bytes, which lets a recording capture the content once. An empty id is
/// treated like no id at all and is never cached.
///
/// # Example
///
/// ```
/// use treelog_core::FileId;
///
/// let id = FileId::from_bytes(&[0xde, 0xad]);
/// assert_eq!(id.as_str(), "dead");
/// assert!(id.is_truthy());
/// assert!(!FileId::new("").is_truthy());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FileId(String);

impl FileId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Build an id from raw digest bytes, encoded as lowercase hex
    pub fn from_bytes(bytes: &[u8]) -> Self {
        let mut hex = String::with_capacity(bytes.len() * 2);
        for byte in bytes {
            hex.push_str(&format!("{:02x}", byte));
        }
        Self(hex)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether this id takes part in caching
    pub fn is_truthy(&self) -> bool {
        !self.0.is_empty()
    }
}

impl fmt::Display for FileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for FileId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for FileId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_parse() {
        assert_eq!("w".parse::<FileMode>().unwrap(), FileMode::Text);
        assert_eq!("wb".parse::<FileMode>().unwrap(), FileMode::Binary);
        assert!(matches!("a".parse::<FileMode>(), Err(LogError::InvalidMode(_))));
        assert!(FileMode::Binary.is_binary());
    }

    #[test]
    fn test_mode_serde() {
        assert_eq!(serde_json::to_string(&FileMode::Binary).unwrap(), "\"wb\"");
        let mode: FileMode = serde_json::from_str("\"w\"").unwrap();
        assert_eq!(mode, FileMode::Text);
    }

    #[test]
    fn test_file_id() {
        let id = FileId::from_bytes(&[0x00, 0xff, 0x10]);
        assert_eq!(id.as_str(), "00ff10");
        assert_eq!(FileId::from("abc"), FileId::new("abc".to_string()));
        assert!(!FileId::new("").is_truthy());
    }
}
