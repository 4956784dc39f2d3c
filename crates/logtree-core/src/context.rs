//! Settings shared by every logger of one registry.

use crate::callsite::{self, BacktraceSource, CallSite, FrameFilter, TraceSource};
use crate::record::{ErrorInfo, Event};
use std::fmt;
use std::panic::Location;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Invoked after a `FATAL` event has been delivered and flushed.
pub type FatalHook = Arc<dyn Fn(&Event) + Send + Sync>;

/// How loggers resolve call-sites, terminate on `FATAL`, and report
/// unhandled events.
pub struct LoggerContext {
    trace_source: Arc<dyn TraceSource>,
    filter: FrameFilter,
    on_fatal: FatalHook,
    no_handler_warning: AtomicBool,
}

impl LoggerContext {
    /// Backtrace-based call-sites, exit status 1 on `FATAL`, no advisory.
    pub fn new() -> Self {
        Self {
            trace_source: Arc::new(BacktraceSource),
            filter: FrameFilter::new(),
            on_fatal: Arc::new(|_| std::process::exit(1)),
            no_handler_warning: AtomicBool::new(false),
        }
    }

    /// Use a different trace source.
    pub fn with_trace_source(mut self, source: impl TraceSource + 'static) -> Self {
        self.trace_source = Arc::new(source);
        self
    }

    /// Use a different internal-frame filter.
    pub fn with_frame_filter(mut self, filter: FrameFilter) -> Self {
        self.filter = filter;
        self
    }

    /// Replace what happens after a `FATAL` event.
    pub fn with_fatal_hook(mut self, hook: impl Fn(&Event) + Send + Sync + 'static) -> Self {
        self.on_fatal = Arc::new(hook);
        self
    }

    /// Enable or disable the no-handler advisory.
    pub fn with_no_handler_warning(self, enabled: bool) -> Self {
        self.set_no_handler_warning(enabled);
        self
    }

    /// Toggle the no-handler advisory on a live context.
    pub fn set_no_handler_warning(&self, enabled: bool) {
        self.no_handler_warning.store(enabled, Ordering::Relaxed);
    }

    /// Whether the no-handler advisory is enabled.
    pub fn no_handler_warning(&self) -> bool {
        self.no_handler_warning.load(Ordering::Relaxed)
    }

    /// Attribute a logging call.
    ///
    /// A trace carried by the error wins and is never second-guessed: when
    /// it has no usable frame the call-site stays empty. Otherwise a fresh
    /// trace is taken, and the compiler-provided `location` fills in when
    /// that trace yields nothing.
    pub(crate) fn resolve(&self, error: Option<&ErrorInfo>, location: &Location<'_>) -> CallSite {
        if let Some(trace) = error.and_then(ErrorInfo::carried_trace) {
            return callsite::resolve(&trace, &self.filter);
        }

        let site = callsite::resolve(&self.trace_source.capture(), &self.filter);
        if site.is_empty() {
            CallSite::from_location(location)
        } else {
            site
        }
    }

    pub(crate) fn terminate(&self, event: &Event) {
        (self.on_fatal)(event);
    }
}

impl Default for LoggerContext {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for LoggerContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoggerContext")
            .field("filter", &self.filter)
            .field("no_handler_warning", &self.no_handler_warning())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::callsite::{NoTrace, StaticTrace};

    const TRACE: &str = concat!(
        "   0: logtree_core::logger::Logger::info\n",
        "             at src/logger.rs:1:1\n",
        "   1: shop::checkout\n",
        "             at src/checkout.rs:20:5",
    );

    #[test]
    fn test_fresh_trace_used() {
        let ctx = LoggerContext::new().with_trace_source(StaticTrace(TRACE.to_string()));
        let site = ctx.resolve(None, Location::caller());
        assert_eq!(site.function, "shop::checkout");
        assert_eq!(site.file, "src/checkout.rs");
    }

    #[test]
    fn test_location_fallback() {
        let ctx = LoggerContext::new().with_trace_source(NoTrace);
        let site = ctx.resolve(None, Location::caller());
        assert!(site.file.ends_with("context.rs"));
        assert!(site.function.is_empty());
    }

    #[test]
    fn test_carrier_trace_wins_even_when_empty() {
        let ctx = LoggerContext::new().with_trace_source(StaticTrace(TRACE.to_string()));
        let error = ErrorInfo::with_trace(anyhow::anyhow!("boom"), "");
        assert!(ctx.resolve(Some(&error), Location::caller()).is_empty());

        let error = ErrorInfo::with_trace(anyhow::anyhow!("boom"), TRACE);
        assert_eq!(ctx.resolve(Some(&error), Location::caller()).line, Some(20));
    }

    #[test]
    fn test_no_handler_toggle() {
        let ctx = LoggerContext::new().with_no_handler_warning(true);
        assert!(ctx.no_handler_warning());
        ctx.set_no_handler_warning(false);
        assert!(!ctx.no_handler_warning());
    }
}
