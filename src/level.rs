use std::{fmt, str::FromStr};

use thiserror::Error;

/// Verbosity of the launcher's informational logging.
///
/// Only affects which log lines are emitted; control flow never depends on
/// the configured level.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
    Silent,
}

impl LogLevel {
    /// Whether a message at `message_level` passes the configured level.
    pub(crate) fn allows(self, message_level: LogLevel) -> bool {
        self != LogLevel::Silent && message_level >= self
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown log level '{0}'")]
pub struct ParseLogLevelError(String);

impl FromStr for LogLevel {
    type Err = ParseLogLevelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "trace" => Ok(Self::Trace),
            "debug" => Ok(Self::Debug),
            "info" => Ok(Self::Info),
            "warn" => Ok(Self::Warn),
            "error" => Ok(Self::Error),
            "silent" => Ok(Self::Silent),
            other => Err(ParseLogLevelError(other.to_owned())),
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Trace => write!(f, "trace"),
            Self::Debug => write!(f, "debug"),
            Self::Info => write!(f, "info"),
            Self::Warn => write!(f, "warn"),
            Self::Error => write!(f, "error"),
            Self::Silent => write!(f, "silent"),
        }
    }
}
