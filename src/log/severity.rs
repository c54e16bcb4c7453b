//! Severity levels.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Urgency of a log record, ordered from least to most urgent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Severity {
    Debug,
    Info,
    Warn,
    Error,
    Fatal,
    Panic,
}

impl Severity {
    /// Severities that own a dedicated plain file, with the file name.
    pub const FILE_SPLIT: [(Severity, &'static str); 5] = [
        (Severity::Debug, "debug.log"),
        (Severity::Info, "info.log"),
        (Severity::Warn, "warn.log"),
        (Severity::Error, "error.log"),
        (Severity::Fatal, "fatal.log"),
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Severity::Debug => "debug",
            Severity::Info => "info",
            Severity::Warn => "warning",
            Severity::Error => "error",
            Severity::Fatal => "fatal",
            Severity::Panic => "panic",
        }
    }

    /// Whether records of this severity reach the file destinations.
    /// Panic records only go to the console stream.
    pub fn is_file_routed(self) -> bool {
        self != Severity::Panic
    }
}

impl Default for Severity {
    fn default() -> Self {
        Severity::Info
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a string does not name a severity.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("not a valid log level: {0:?}")]
pub struct ParseSeverityError(pub String);

impl FromStr for Severity {
    type Err = ParseSeverityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "debug" => Ok(Severity::Debug),
            "info" => Ok(Severity::Info),
            "warn" | "warning" => Ok(Severity::Warn),
            "error" => Ok(Severity::Error),
            "fatal" => Ok(Severity::Fatal),
            "panic" => Ok(Severity::Panic),
            _ => Err(ParseSeverityError(s.to_string())),
        }
    }
}

impl TryFrom<String> for Severity {
    type Error = ParseSeverityError;

    fn try_from(s: String) -> Result<Self, ParseSeverityError> {
        s.parse()
    }
}

impl From<Severity> for String {
    fn from(severity: Severity) -> Self {
        severity.as_str().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ordering() {
        assert!(Severity::Debug < Severity::Info);
        assert!(Severity::Warn < Severity::Error);
        assert!(Severity::Fatal < Severity::Panic);
    }

    #[test]
    fn test_parse() {
        assert_eq!("WARNING".parse::<Severity>(), Ok(Severity::Warn));
        assert_eq!(" panic ".parse::<Severity>(), Ok(Severity::Panic));
        assert!("trace".parse::<Severity>().is_err());
    }

    #[test]
    fn test_deserialize_from_toml() {
        #[derive(Debug, Deserialize)]
        struct Wrapper {
            level: Severity,
        }
        let w: Wrapper = toml::from_str("level = \"error\"").unwrap();
        assert_eq!(w.level, Severity::Error);

        let bad = toml::from_str::<Wrapper>("level = \"trace\"").unwrap_err();
        assert!(bad.to_string().contains("not a valid log level"));
        assert_eq!(Severity::try_from("Warning".to_string()), Ok(Severity::Warn));
    }
}
