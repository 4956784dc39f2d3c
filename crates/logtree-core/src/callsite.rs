//! Call-site resolution.
//!
//! Acquiring a stack trace is host specific and lives behind
//! [`TraceSource`]. Turning trace text into a [`CallSite`] is portable:
//! [`parse_frames`] reads the frames, [`FrameFilter`] drops the ones that
//! belong to the logging machinery itself, and [`resolve`] picks the first
//! survivor.
//!
//! Resolution is best effort. An empty or unreadable trace yields
//! [`CallSite::default()`], whose fields all render as empty strings.

use once_cell::sync::Lazy;
use regex::Regex;
use std::backtrace::Backtrace;
use std::fmt;
use std::panic::Location;

/// Source location attributed to a logging call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CallSite {
    /// Calling function, empty when unknown
    pub function: String,
    /// Source file, empty when unknown
    pub file: String,
    /// Line number
    pub line: Option<u32>,
    /// Column number
    pub column: Option<u32>,
}

impl CallSite {
    /// Whether nothing could be resolved.
    pub fn is_empty(&self) -> bool {
        self.function.is_empty()
            && self.file.is_empty()
            && self.line.is_none()
            && self.column.is_none()
    }

    /// Line rendered for templates, empty when unknown.
    pub fn line_str(&self) -> String {
        self.line.map(|l| l.to_string()).unwrap_or_default()
    }

    /// Column rendered for templates, empty when unknown.
    pub fn column_str(&self) -> String {
        self.column.map(|c| c.to_string()).unwrap_or_default()
    }

    /// Call-site from a compiler-provided location; the function is unknown.
    pub fn from_location(location: &Location<'_>) -> Self {
        Self {
            function: String::new(),
            file: location.file().to_string(),
            line: Some(location.line()),
            column: Some(location.column()),
        }
    }
}

impl From<Frame> for CallSite {
    fn from(frame: Frame) -> Self {
        Self {
            function: frame.function,
            file: frame.file,
            line: Some(frame.line),
            column: Some(frame.column),
        }
    }
}

impl fmt::Display for CallSite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.file, self.line_str(), self.column_str())?;
        if !self.function.is_empty() {
            write!(f, " ({})", self.function)?;
        }
        Ok(())
    }
}

/// One symbolized stack frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// Demangled function path
    pub function: String,
    /// Source file
    pub file: String,
    /// Line number
    pub line: u32,
    /// Column number
    pub column: u32,
}

/// Host capability producing the textual stack trace of the current thread.
pub trait TraceSource: Send + Sync {
    /// Capture a trace, innermost frame first.
    fn capture(&self) -> String;
}

/// Captures traces with [`std::backtrace::Backtrace`].
///
/// Capturing ignores `RUST_BACKTRACE`; it is as costly as a panic backtrace,
/// so latency sensitive programs may prefer [`NoTrace`].
#[derive(Debug, Clone, Copy, Default)]
pub struct BacktraceSource;

impl TraceSource for BacktraceSource {
    fn capture(&self) -> String {
        Backtrace::force_capture().to_string()
    }
}

/// Never captures; call-sites come from the compiler-provided caller location.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoTrace;

impl TraceSource for NoTrace {
    fn capture(&self) -> String {
        String::new()
    }
}

/// A fixed trace, handy for tests and for replaying foreign traces.
#[derive(Debug, Clone, Default)]
pub struct StaticTrace(pub String);

impl TraceSource for StaticTrace {
    fn capture(&self) -> String {
        self.0.clone()
    }
}

// `   3: app::handler::run` followed by `             at src/handler.rs:12:9`
static SYMBOL_LINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*\d+:\s+(\S.*?)\s*$").expect("symbol pattern is valid"));
static LOCATION_LINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*at\s+(.+):(\d+):(\d+)\s*$").expect("location pattern is valid"));
// `at function (file:line:col)`
static INLINE_FRAME: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*at\s+(\S+)\s.*\((.*):(\d+):(\d+)\)\s*$")
        .expect("inline frame pattern is valid")
});
static SYMBOL_HASH: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"::h[0-9a-f]{16}$").expect("hash pattern is valid"));

/// Parse trace text into frames, innermost first.
///
/// Understands both the two-line layout of Rust backtraces and single-line
/// `at function (file:line:col)` frames. Symbols without a source location
/// and lines of any other shape are skipped.
pub fn parse_frames(trace: &str) -> Vec<Frame> {
    let mut frames = Vec::new();
    let mut pending: Option<String> = None;

    for line in trace.lines() {
        if let Some(caps) = INLINE_FRAME.captures(line) {
            pending = None;
            if let Some(frame) = build_frame(&caps[1], &caps[2], &caps[3], &caps[4]) {
                frames.push(frame);
            }
        } else if let Some(caps) = LOCATION_LINE.captures(line) {
            // Inlined frames share one symbol line; only the first location counts.
            if let Some(function) = pending.take() {
                if let Some(frame) = build_frame(&function, &caps[1], &caps[2], &caps[3]) {
                    frames.push(frame);
                }
            }
        } else if let Some(caps) = SYMBOL_LINE.captures(line) {
            pending = Some(SYMBOL_HASH.replace(&caps[1], "").into_owned());
        } else {
            pending = None;
        }
    }

    frames
}

fn build_frame(function: &str, file: &str, line: &str, column: &str) -> Option<Frame> {
    Some(Frame {
        function: function.to_string(),
        file: file.to_string(),
        line: line.parse().ok()?,
        column: column.parse().ok()?,
    })
}

/// Decides which frames belong to the logging machinery rather than the caller.
#[derive(Debug, Clone)]
pub struct FrameFilter {
    markers: Vec<String>,
}

impl FrameFilter {
    /// Markers for logtree's own call chain, the Rust runtime, and backtrace capture.
    pub const DEFAULT_MARKERS: &'static [&'static str] = &[
        "logtree_core::logger::Logger::",
        "logtree_core::callsite::",
        "logtree_core::context::",
        "logtree_core::registry::",
        "<logtree_core::",
        "std::",
        "core::",
        "alloc::",
        "<std::",
        "<core::",
        "<alloc::",
        "backtrace::",
        "anyhow::",
        "<anyhow::",
        "__rust",
        "rust_begin_unwind",
    ];

    /// Filter with the default markers.
    pub fn new() -> Self {
        Self {
            markers: Self::DEFAULT_MARKERS.iter().map(|m| m.to_string()).collect(),
        }
    }

    /// Also skip frames whose function starts with `marker`, e.g. a logging facade.
    pub fn with_marker(mut self, marker: impl Into<String>) -> Self {
        self.markers.push(marker.into());
        self
    }

    /// Whether `frame` is part of the logging machinery.
    pub fn is_internal(&self, frame: &Frame) -> bool {
        self.markers.iter().any(|m| frame.function.starts_with(m.as_str()))
    }
}

impl Default for FrameFilter {
    fn default() -> Self {
        Self::new()
    }
}

/// Resolve the call-site described by `trace`.
///
/// Returns the first frame that parses and is not internal, or the empty
/// call-site when there is none.
pub fn resolve(trace: &str, filter: &FrameFilter) -> CallSite {
    parse_frames(trace)
        .into_iter()
        .find(|frame| !filter.is_internal(frame))
        .map(CallSite::from)
        .unwrap_or_default()
}
