//! Rendering events to text.
//!
//! A [`Formatter`] fills a `%(field)s` template from an event. Fields:
//!
//! | field | value |
//! |---|---|
//! | `name` | logger name |
//! | `levelName` / `levelname` | level name, e.g. `WARN` |
//! | `levelno` | numeric level |
//! | `pathname` | source file |
//! | `funcName` / `func` | calling function |
//! | `lineno`, `colno` | line and column |
//! | `msg` | raw template |
//! | `message` | substituted message |
//! | `process`, `processName` | process id and executable name |
//! | `asctime` | creation time rendered with `datefmt` (UTC) |
//! | `created` | creation time as Unix seconds |
//!
//! Any key of the event's extras is available too. Unknown fields render
//! empty. When the event carries an error, its rendering follows the
//! formatted line after a newline.

use crate::record::Event;
use crate::time;
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use serde_json::Value;

static FIELD: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"%\((\w+)\)s").expect("field pattern is valid"));

/// Turns an event into final text.
pub trait Render: Send + Sync {
    /// Render `event`.
    fn format(&self, event: &Event) -> String;
}

/// Template-driven renderer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Formatter {
    fmt: String,
    datefmt: String,
}

impl Formatter {
    /// Template of [`Formatter::detailed`].
    pub const DETAILED_FORMAT: &'static str =
        "%(asctime)s [%(levelName)s] %(process)s [%(name)s] %(message)s";
    /// Template of [`Formatter::standard`].
    pub const STANDARD_FORMAT: &'static str =
        "%(asctime)s [%(levelName)s] %(pathname)s:%(lineno)s [%(process)s] %(message)s";
    /// Default `datefmt`.
    pub const DEFAULT_DATEFMT: &'static str = "%Y-%m-%dT%H:%M:%S";

    /// Formatter with a custom template and date format.
    pub fn new(fmt: impl Into<String>, datefmt: impl Into<String>) -> Self {
        Self {
            fmt: fmt.into(),
            datefmt: datefmt.into(),
        }
    }

    /// Formatter with a custom template and the default date format.
    pub fn with_format(fmt: impl Into<String>) -> Self {
        Self::new(fmt, Self::DEFAULT_DATEFMT)
    }

    /// Time, level, pid, logger name, message. The stock sink layout.
    pub fn detailed() -> Self {
        Self::with_format(Self::DETAILED_FORMAT)
    }

    /// Time, level, source location, pid, message.
    pub fn standard() -> Self {
        Self::with_format(Self::STANDARD_FORMAT)
    }

    /// The record template.
    pub fn fmt(&self) -> &str {
        &self.fmt
    }

    /// The date pattern.
    pub fn datefmt(&self) -> &str {
        &self.datefmt
    }

    /// Whether the template references `%(asctime)s`.
    pub fn uses_time(&self) -> bool {
        self.fmt.contains("%(asctime)s")
    }

    fn field(&self, event: &Event, key: &str) -> String {
        match key {
            "name" => event.name().to_string(),
            "levelName" | "levelname" => event.level_name().to_string(),
            "levelno" => event.level().value().to_string(),
            "pathname" => event.pathname().to_string(),
            "funcName" | "func" => event.function().to_string(),
            "lineno" => event.callsite().line_str(),
            "colno" => event.callsite().column_str(),
            "msg" => event.msg().to_string(),
            "message" => event.message(),
            "process" => event.process().to_string(),
            "processName" => event.process_name().to_string(),
            "asctime" => time::format_timestamp(event.created(), &self.datefmt),
            "created" => time::epoch_seconds(event.created()).to_string(),
            other => match event.extra().get(other) {
                Some(Value::String(s)) => s.clone(),
                Some(value) => value.to_string(),
                None => String::new(),
            },
        }
    }
}

impl Default for Formatter {
    fn default() -> Self {
        Self::with_format("%(message)s")
    }
}

impl Render for Formatter {
    fn format(&self, event: &Event) -> String {
        let mut out = FIELD
            .replace_all(&self.fmt, |caps: &Captures<'_>| self.field(event, &caps[1]))
            .into_owned();
        if let Some(error) = event.error() {
            out.push('\n');
            out.push_str(&error.render());
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::callsite::CallSite;
    use crate::record::{ErrorInfo, Extra};
    use chrono::{TimeZone, Utc};
    use logtree_types::Level;
    use serde_json::json;

    fn event(name: &str, msg: &str, args: Vec<Value>) -> Event {
        let callsite = CallSite {
            function: "bar".to_string(),
            file: "foo".to_string(),
            line: Some(12),
            column: Some(3),
        };
        Event::new(name, Level::Info, callsite, msg, args)
    }

    #[test]
    fn test_default_is_message_only() {
        let record = event("root", "msg goes here", vec![]);
        assert_eq!(Formatter::default().format(&record), "msg goes here");
    }

    #[test]
    fn test_standard_layout() {
        let record = event("root", "msg goes here", vec![])
            .with_created(Utc.with_ymd_and_hms(2012, 11, 10, 9, 8, 7).unwrap())
            .with_process(401);
        assert_eq!(
            Formatter::standard().format(&record),
            "2012-11-10T09:08:07 [INFO] foo:12 [401] msg goes here"
        );
    }

    #[test]
    fn test_datefmt_respected() {
        let f = Formatter::new("%(asctime)s %(message)s", "%a, %b %d, %Y");
        let record = event("root", "msg goes here", vec![])
            .with_created(Utc.with_ymd_and_hms(2013, 12, 11, 10, 9, 8).unwrap());
        assert_eq!(f.format(&record), "Wed, Dec 11, 2013 msg goes here");
    }

    #[test]
    fn test_logger_name() {
        assert_eq!(Formatter::with_format("%(name)s").format(&event("test", "", vec![])), "test");
    }

    #[test]
    fn test_args_formatted_in() {
        let args = vec![json!("a"), json!(1), json!(2), json!({"b": 3})];
        let record = event("root", "%s %s %s %j", args);
        assert_eq!(Formatter::default().format(&record), "a 1 2 {\"b\":3}");
    }

    #[test]
    fn test_repeated_and_unknown_fields() {
        let mut extra = Extra::new();
        extra.insert("foo".to_string(), json!("bar"));
        extra.insert("n".to_string(), json!(5));
        let record = event("john", "", vec![]).with_extra(extra);
        let f = Formatter::with_format("hi %(name)s %(foo)s %(qux)s %(name)s %(n)s");
        assert_eq!(f.format(&record), "hi john bar  john 5");
    }

    #[test]
    fn test_error_appended() {
        let record = event("root", "a message", vec![])
            .with_error(ErrorInfo::with_trace(anyhow::anyhow!("boom"), "a stack"));
        assert_eq!(Formatter::default().format(&record), "a message\na stack");
    }

    #[test]
    fn test_uses_time() {
        assert!(Formatter::detailed().uses_time());
        assert!(!Formatter::default().uses_time());
    }
}
