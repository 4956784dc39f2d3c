//! Configuration types and structures.
//!
//! These describe a logger tree declaratively: a set of named sinks and
//! the loggers they attach to. Loading and applying them lives in
//! `logtree-core`.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use crate::Level;

/// Top-level logging configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Named sink definitions, referenced from `loggers`
    #[serde(default)]
    pub sinks: IndexMap<String, SinkConfig>,

    /// Per-logger settings, keyed by dotted logger name
    #[serde(default)]
    pub loggers: IndexMap<String, LoggerConfig>,

    /// Report "no handler found" once per logger when an event reaches no sink
    #[serde(default)]
    pub no_handler_warning: bool,
}

/// Settings applied to one logger.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggerConfig {
    /// Explicit level for this logger
    #[serde(default)]
    pub level: Level,

    /// Whether events continue to the parent logger
    #[serde(default = "default_propagate")]
    pub propagate: bool,

    /// Names of sinks (keys of `LoggingConfig::sinks`) to attach
    #[serde(default)]
    pub sinks: Vec<String>,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            level: Level::NotSet,
            propagate: true,
            sinks: Vec::new(),
        }
    }
}

fn default_propagate() -> bool {
    true
}

/// Sink definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum SinkConfig {
    /// Write to standard output or standard error
    Console {
        /// Sink threshold
        #[serde(default)]
        level: Level,
        /// Which standard stream to use
        #[serde(default)]
        stream: ConsoleStream,
        /// Whether to colour lines by level
        #[serde(default)]
        color: ColorMode,
        /// Output layout
        #[serde(flatten)]
        format: FormatConfig,
    },
    /// Append to a file
    File {
        /// File path template (supports `~` and strftime substitution)
        path: String,
        /// Sink threshold
        #[serde(default)]
        level: Level,
        /// Output layout
        #[serde(flatten)]
        format: FormatConfig,
    },
    /// Discard everything
    Null {
        /// Sink threshold
        #[serde(default)]
        level: Level,
    },
}

/// Formatter settings shared by text sinks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormatConfig {
    /// Record template, e.g. `%(asctime)s [%(levelName)s] %(message)s`
    #[serde(default = "default_format")]
    pub format: String,

    /// strftime pattern used for `%(asctime)s`
    #[serde(default = "default_datefmt")]
    pub datefmt: String,
}

impl Default for FormatConfig {
    fn default() -> Self {
        Self {
            format: default_format(),
            datefmt: default_datefmt(),
        }
    }
}

fn default_format() -> String {
    "%(asctime)s [%(levelName)s] %(process)s [%(name)s] %(message)s".to_string()
}

fn default_datefmt() -> String {
    "%Y-%m-%dT%H:%M:%S".to_string()
}

/// Standard stream selection for console sinks.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConsoleStream {
    /// Standard output
    Stdout,
    /// Standard error
    #[default]
    Stderr,
}

/// When to colour console output.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorMode {
    /// Colour only when attached to a terminal
    #[default]
    Auto,
    /// Always colour
    Always,
    /// Never colour
    Never,
}
