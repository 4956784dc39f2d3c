//! # logtree core
//!
//! Hierarchical, level-filtered logging: named loggers form a dotted-name
//! tree, each with zero or more sinks, and events propagate from the
//! logger they were emitted on up through its ancestors.
//!
//! This crate provides:
//!
//! - **Registry**: one logger per dotted name, ancestors created lazily
//! - **Logger**: level admission, propagation, call-site capture
//! - **Sinks**: stream/file, async, in-memory, null, and a `tracing` bridge
//! - **Formatting**: `%(field)s` templates with strftime timestamps
//! - **Configuration**: layered YAML config applied onto a registry
//!
//! ## Example
//!
//! ```no_run
//! use logtree_core::{args, get_logger, Level, StreamSink};
//! use std::sync::Arc;
//!
//! let root = logtree_core::root();
//! root.add_sink(Arc::new(StreamSink::stderr(Level::Info)));
//!
//! let log = get_logger("app.db");
//! log.info("connected to %s in %dms", args!["primary", 12]);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod callsite;
pub mod config;
pub mod context;
pub mod diagnostics;
pub mod format;
pub mod logger;
pub mod record;
pub mod registry;
pub mod sinks;
pub mod term;
pub mod time;
pub mod util;

// Re-export commonly used items
pub use callsite::{CallSite, FrameFilter, TraceSource};
pub use context::LoggerContext;
pub use format::{Formatter, Render};
pub use logger::Logger;
pub use logtree_types::{Level, LogtreeError, Result};
pub use record::{ErrorInfo, Event, Extra};
pub use registry::{
    debug, error, exception, fatal, get_logger, get_logger_with, info, root, warning, Registry,
};
pub use sinks::{AsyncSink, MemorySink, NullSink, Sink, SinkRef, StreamSink, TracingSink};

#[doc(hidden)]
pub use serde_json as __json;

/// logtree version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Build the `&[Value]` argument slice for an emission call.
///
/// ```
/// let args = logtree_core::args!["disk", 93.5];
/// assert_eq!(args.len(), 2);
/// ```
#[macro_export]
macro_rules! args {
    () => {
        &[] as &[$crate::__json::Value]
    };
    ($($arg:expr),+ $(,)?) => {
        &[$($crate::__json::json!($arg)),+]
    };
}
