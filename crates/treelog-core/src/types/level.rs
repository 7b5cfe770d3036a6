//! Message severity

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::LogError;

/// Severity attached to a message or file
///
/// Levels only tag output; they never change control flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Debug = 0,
    Info = 1,
    User = 2,
    Warning = 3,
    Error = 4,
}

impl Level {
    /// All levels, lowest first
    pub const ALL: [Level; 5] = [
        Level::Debug,
        Level::Info,
        Level::User,
        Level::Warning,
        Level::Error,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Level::Debug => "debug",
            Level::Info => "info",
            Level::User => "user",
            Level::Warning => "warning",
            Level::Error => "error",
        }
    }

    /// Numeric severity, `debug` = 0 through `error` = 4
    pub fn severity(&self) -> u8 {
        *self as u8
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Level {
    type Err = LogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Level::ALL
            .iter()
            .copied()
            .find(|level| level.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| LogError::InvalidLevel(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_order() {
        assert!(Level::Debug < Level::Info);
        assert!(Level::Info < Level::User);
        assert!(Level::User < Level::Warning);
        assert!(Level::Warning < Level::Error);
        assert_eq!(Level::Warning.severity(), 3);
    }

    #[test]
    fn test_parse() {
        assert_eq!("user".parse::<Level>().unwrap(), Level::User);
        assert_eq!("WARNING".parse::<Level>().unwrap(), Level::Warning);
        assert!(matches!("warn".parse::<Level>(), Err(LogError::InvalidLevel(_))));
    }

    #[test]
    fn test_serde_lowercase() {
        let json = serde_json::to_string(&Level::Error).unwrap();
        assert_eq!(json, "\"error\"");
        let level: Level = serde_json::from_str("\"info\"").unwrap();
        assert_eq!(level, Level::Info);
    }
}
