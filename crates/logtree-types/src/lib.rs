//! # logtree Types
//!
//! Core types shared across the logtree crates.
//!
//! This crate provides the fundamental building blocks for the logtree
//! logging facility:
//!
//! - The ordered [`Level`] enumeration with its name-lookup table
//! - Error types and result aliases
//! - Declarative configuration structures for sinks and loggers
//!
//! ## Example
//!
//! ```
//! use logtree_types::Level;
//!
//! let level = Level::normalize("warning");
//! assert_eq!(level, Level::Warn);
//! assert_eq!(level.value(), 30);
//!
//! // Unknown names never fail, they fall back to NOTSET
//! assert_eq!(Level::normalize("chatty"), Level::NotSet);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod errors;
pub mod level;
pub mod config;

// Re-export common types for convenience
pub use errors::{LogtreeError, Result};
pub use level::Level;
pub use config::{ColorMode, ConsoleStream, FormatConfig, LoggerConfig, LoggingConfig, SinkConfig};
