//! Severity levels.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use crate::errors::{LogtreeError, Result};

/// Severity of a log event.
///
/// Levels carry their classic numeric values and are ordered by them:
/// `NotSet(0) < Debug(10) < Info(20) < Warn(30) < Error(40) < Fatal(50)`.
/// `NotSet` is a sentinel for "no explicit threshold", not a severity to
/// log at.
///
/// # Example
///
/// ```
/// use logtree_types::Level;
///
/// assert!(Level::Debug < Level::Info);
/// assert_eq!(Level::WARNING, Level::Warn);
/// assert_eq!(Level::from_value(40), Level::Error);
/// assert_eq!(Level::from_value(35), Level::NotSet);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum Level {
    /// No explicit threshold configured
    #[default]
    NotSet = 0,
    /// Diagnostic detail
    Debug = 10,
    /// Informational messages
    Info = 20,
    /// Something unexpected that did not stop the operation
    Warn = 30,
    /// An operation failed
    Error = 40,
    /// The process cannot continue
    Fatal = 50,
}

impl Level {
    /// Alternate name for [`Level::Warn`]; both share the numeric value 30.
    pub const WARNING: Level = Level::Warn;

    /// Every known level, lowest first.
    pub const ALL: [Level; 6] = [
        Level::NotSet,
        Level::Debug,
        Level::Info,
        Level::Warn,
        Level::Error,
        Level::Fatal,
    ];

    /// Numeric severity.
    pub fn value(self) -> u8 {
        self as u8
    }

    /// Map a numeric severity back to a level.
    ///
    /// Values outside the known set normalize to `NotSet`.
    pub fn from_value(value: i64) -> Level {
        match value {
            10 => Level::Debug,
            20 => Level::Info,
            30 => Level::Warn,
            40 => Level::Error,
            50 => Level::Fatal,
            _ => Level::NotSet,
        }
    }

    /// Display name used by formatters; empty for `NotSet`.
    pub fn name(self) -> &'static str {
        match self {
            Level::NotSet => "",
            Level::Debug => "DEBUG",
            Level::Info => "INFO",
            Level::Warn => "WARN",
            Level::Error => "ERROR",
            Level::Fatal => "FATAL",
        }
    }

    /// Look up a level by name, case-insensitively.
    pub fn lookup(name: &str) -> Option<Level> {
        match name.trim().to_uppercase().as_str() {
            "NOTSET" => Some(Level::NotSet),
            "DEBUG" => Some(Level::Debug),
            "INFO" => Some(Level::Info),
            "WARN" | "WARNING" => Some(Level::Warn),
            "ERROR" => Some(Level::Error),
            "FATAL" => Some(Level::Fatal),
            _ => None,
        }
    }

    /// Look up a level by name, treating anything unknown as `NotSet`.
    pub fn normalize(name: &str) -> Level {
        Self::lookup(name).unwrap_or(Level::NotSet)
    }

    fn label(self) -> &'static str {
        match self {
            Level::NotSet => "NOTSET",
            other => other.name(),
        }
    }
}

impl FromStr for Level {
    type Err = LogtreeError;

    fn from_str(s: &str) -> Result<Self> {
        Self::lookup(s)
            .ok_or_else(|| LogtreeError::Validation(format!("Invalid log level: {}", s)))
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl From<Level> for u8 {
    fn from(level: Level) -> u8 {
        level.value()
    }
}

impl Serialize for Level {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label())
    }
}

impl<'de> Deserialize<'de> for Level {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Value(i64),
            Name(String),
        }

        Ok(match Option::<Raw>::deserialize(deserializer)? {
            Some(Raw::Value(v)) => Level::from_value(v),
            Some(Raw::Name(name)) => Level::normalize(&name),
            None => Level::NotSet,
        })
    }
}
