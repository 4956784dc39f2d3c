//! Log events.
//!
//! An [`Event`] is built once per emission call and then only read: the
//! logger hands the same `&Event` to every sink on every node of the
//! propagation path.

use crate::callsite::CallSite;
use crate::util::printf;
use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use logtree_types::Level;
use once_cell::sync::Lazy;
use serde_json::Value;
use std::backtrace::BacktraceStatus;
use std::fmt;
use std::sync::Arc;

/// Caller-supplied key/value pairs carried alongside an event.
pub type Extra = IndexMap<String, Value>;

static PROCESS_NAME: Lazy<String> = Lazy::new(|| {
    std::env::current_exe()
        .ok()
        .and_then(|p| p.file_name().map(|n| n.to_string_lossy().into_owned()))
        .unwrap_or_default()
});

/// One logging call.
#[derive(Debug, Clone)]
pub struct Event {
    name: String,
    level: Level,
    callsite: CallSite,
    msg: String,
    args: Vec<Value>,
    error: Option<ErrorInfo>,
    process: u32,
    process_name: String,
    created: DateTime<Utc>,
    extra: Extra,
}

impl Event {
    /// Create an event stamped with the current process and time.
    pub fn new(
        name: impl Into<String>,
        level: Level,
        callsite: CallSite,
        msg: impl Into<String>,
        args: Vec<Value>,
    ) -> Self {
        Self {
            name: name.into(),
            level,
            callsite,
            msg: msg.into(),
            args,
            error: None,
            process: std::process::id(),
            process_name: PROCESS_NAME.clone(),
            created: Utc::now(),
            extra: Extra::new(),
        }
    }

    /// Attach the error this event reports.
    pub fn with_error(mut self, error: ErrorInfo) -> Self {
        self.error = Some(error);
        self
    }

    /// Attach extra key/value pairs.
    pub fn with_extra(mut self, extra: Extra) -> Self {
        self.extra = extra;
        self
    }

    /// Override the creation time.
    pub fn with_created(mut self, created: DateTime<Utc>) -> Self {
        self.created = created;
        self
    }

    /// Override the process id.
    pub fn with_process(mut self, process: u32) -> Self {
        self.process = process;
        self
    }

    /// Dotted name of the logger the event was emitted on.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Severity.
    pub fn level(&self) -> Level {
        self.level
    }

    /// Display name of the severity.
    pub fn level_name(&self) -> &'static str {
        self.level.name()
    }

    /// Where the logging call happened.
    pub fn callsite(&self) -> &CallSite {
        &self.callsite
    }

    /// Source file of the logging call, empty when unknown.
    pub fn pathname(&self) -> &str {
        &self.callsite.file
    }

    /// Calling function, empty when unknown.
    pub fn function(&self) -> &str {
        &self.callsite.function
    }

    /// Line of the logging call.
    pub fn line(&self) -> Option<u32> {
        self.callsite.line
    }

    /// Column of the logging call.
    pub fn column(&self) -> Option<u32> {
        self.callsite.column
    }

    /// Raw message template.
    pub fn msg(&self) -> &str {
        &self.msg
    }

    /// Positional substitution arguments.
    pub fn args(&self) -> &[Value] {
        &self.args
    }

    /// The template with its arguments substituted.
    pub fn message(&self) -> String {
        printf::format(&self.msg, &self.args)
    }

    /// Associated error, if any.
    pub fn error(&self) -> Option<&ErrorInfo> {
        self.error.as_ref()
    }

    /// Emitting process id.
    pub fn process(&self) -> u32 {
        self.process
    }

    /// Executable name of the emitting process.
    pub fn process_name(&self) -> &str {
        &self.process_name
    }

    /// Creation time.
    pub fn created(&self) -> &DateTime<Utc> {
        &self.created
    }

    /// Extra key/value pairs.
    pub fn extra(&self) -> &Extra {
        &self.extra
    }
}

/// An error attached to an event by [`Logger::exception`](crate::Logger::exception).
///
/// Cloning is cheap; every sink on the propagation path sees the same error.
#[derive(Clone)]
pub struct ErrorInfo {
    error: Arc<anyhow::Error>,
    trace: Option<String>,
}

impl ErrorInfo {
    /// Wrap an error. Its backtrace, when captured, locates the call-site.
    pub fn new(error: impl Into<anyhow::Error>) -> Self {
        Self {
            error: Arc::new(error.into()),
            trace: None,
        }
    }

    /// Wrap an error together with an explicit textual trace.
    ///
    /// Useful for errors that arrive with their own trace, e.g. from a
    /// child process or a foreign runtime.
    pub fn with_trace(error: impl Into<anyhow::Error>, trace: impl Into<String>) -> Self {
        Self {
            error: Arc::new(error.into()),
            trace: Some(trace.into()),
        }
    }

    /// The wrapped error.
    pub fn error(&self) -> &anyhow::Error {
        &self.error
    }

    /// Trace text used to attribute the call-site.
    pub fn trace(&self) -> String {
        self.carried_trace().unwrap_or_default()
    }

    /// The trace this error brought along, if it has one.
    ///
    /// `None` when there is no explicit trace and `anyhow` did not capture
    /// a backtrace, which is the default unless `RUST_BACKTRACE` is set.
    pub fn carried_trace(&self) -> Option<String> {
        match &self.trace {
            Some(trace) => Some(trace.clone()),
            None => {
                let backtrace = self.error.backtrace();
                match backtrace.status() {
                    BacktraceStatus::Captured => Some(backtrace.to_string()),
                    _ => None,
                }
            }
        }
    }

    /// Whether two handles refer to the same error.
    pub fn ptr_eq(&self, other: &ErrorInfo) -> bool {
        Arc::ptr_eq(&self.error, &other.error)
    }

    /// Trailing context appended after the rendered message.
    pub fn render(&self) -> String {
        match &self.trace {
            Some(trace) => trace.clone(),
            None => format!("{:?}", self.error),
        }
    }
}

impl fmt::Debug for ErrorInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ErrorInfo")
            .field("error", &self.error.to_string())
            .field("trace", &self.trace)
            .finish()
    }
}

impl fmt::Display for ErrorInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.error)
    }
}

impl From<anyhow::Error> for ErrorInfo {
    fn from(error: anyhow::Error) -> Self {
        Self::new(error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> Event {
        let callsite = CallSite {
            function: "testFunc".to_string(),
            file: "/some/file/path".to_string(),
            line: Some(31),
            column: Some(7),
        };
        let mut extra = Extra::new();
        extra.insert("bar".to_string(), json!("qux"));

        Event::new("testlogger", Level::Info, callsite, "a message \"%s\"", vec![json!("foo")])
            .with_error(ErrorInfo::new(anyhow::anyhow!("baz")))
            .with_extra(extra)
    }

    #[test]
    fn test_event_shape() {
        let event = sample();
        assert_eq!(event.name(), "testlogger");
        assert_eq!(event.level(), Level::Info);
        assert_eq!(event.level_name(), "INFO");
        assert_eq!(event.pathname(), "/some/file/path");
        assert_eq!(event.function(), "testFunc");
        assert_eq!(event.line(), Some(31));
        assert_eq!(event.column(), Some(7));
        assert_eq!(event.msg(), "a message \"%s\"");
        assert_eq!(event.args(), &[json!("foo")]);
        assert_eq!(event.process(), std::process::id());
        assert_eq!(event.extra()["bar"], json!("qux"));
        assert_eq!(event.error().unwrap().to_string(), "baz");
    }

    #[test]
    fn test_message_substitutes_args() {
        assert_eq!(sample().message(), "a message \"foo\"");
    }

    #[test]
    fn test_message_without_args() {
        let event = Event::new("x", Level::Warn, CallSite::default(), "hi", Vec::new());
        assert_eq!(event.message(), "hi");
    }

    #[test]
    fn test_error_clone_shares_identity() {
        let error = ErrorInfo::new(anyhow::anyhow!("boom"));
        let copy = error.clone();
        assert!(error.ptr_eq(&copy));
        assert!(!error.ptr_eq(&ErrorInfo::new(anyhow::anyhow!("boom"))));
    }

    #[test]
    fn test_explicit_trace() {
        let error = ErrorInfo::with_trace(anyhow::anyhow!("boom"), "a stack");
        assert_eq!(error.trace(), "a stack");
        assert_eq!(error.render(), "a stack");
    }

    #[test]
    fn test_carried_trace() {
        let explicit = ErrorInfo::with_trace(anyhow::anyhow!("boom"), "");
        assert_eq!(explicit.carried_trace(), Some(String::new()));

        // Captured only when the backtrace environment variables ask for it.
        let plain = ErrorInfo::new(anyhow::anyhow!("boom"));
        match plain.error().backtrace().status() {
            BacktraceStatus::Captured => assert!(plain.carried_trace().is_some()),
            _ => {
                assert_eq!(plain.carried_trace(), None);
                assert_eq!(plain.trace(), "");
            }
        }
    }

    #[test]
    fn test_from_std_error() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let error = ErrorInfo::new(io);
        assert_eq!(error.to_string(), "missing");

        let error: ErrorInfo = anyhow::anyhow!("wrapped").into();
        assert_eq!(error.to_string(), "wrapped");
    }
}
