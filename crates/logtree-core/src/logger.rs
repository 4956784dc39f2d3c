//! Named loggers and event propagation.
//!
//! A [`Logger`] is one node of the dotted-name tree. Emitting on a logger
//! builds an [`Event`] and walks it up the tree:
//!
//! 1. if the node's own level admits the event, every sink attached to the
//!    node gets it, in insertion order;
//! 2. if the node has a parent and propagation is on, the same event moves
//!    to the parent;
//! 3. the walk ends at the root or at the first node with propagation off.
//!
//! Nothing on this path returns an error to the caller. Sink failures and
//! sink panics are reported through [`diagnostics`](crate::diagnostics)
//! and the walk carries on.

use crate::context::LoggerContext;
use crate::diagnostics;
use crate::record::{ErrorInfo, Event, Extra};
use crate::sinks::{same_sink, SinkRef, Threshold};
use logtree_types::Level;
use parking_lot::RwLock;
use serde_json::Value;
use std::fmt;
use std::panic::{self, AssertUnwindSafe, Location};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Reserved name of the tree's root.
pub const ROOT: &str = "root";

/// A node in the logger tree.
///
/// Loggers are normally obtained from a [`Registry`](crate::Registry),
/// which guarantees one instance per name and a fully linked ancestor
/// chain. Constructing one directly is mostly useful in tests.
pub struct Logger {
    name: String,
    level: Threshold,
    parent: Option<Arc<Logger>>,
    propagate: AtomicBool,
    sinks: RwLock<Vec<SinkRef>>,
    context: Arc<LoggerContext>,
    reported_unhandled: AtomicBool,
}

impl Logger {
    /// Create a detached logger.
    ///
    /// It shares its parent's context, or gets a fresh default one.
    pub fn new(name: &str, level: Level, parent: Option<Arc<Logger>>, propagate: bool) -> Self {
        let context = parent
            .as_ref()
            .map(|p| p.context.clone())
            .unwrap_or_else(|| Arc::new(LoggerContext::new()));
        Self::with_context(name, level, parent, propagate, context)
    }

    /// Create a logger with an explicit context.
    pub fn with_context(
        name: &str,
        level: Level,
        parent: Option<Arc<Logger>>,
        propagate: bool,
        context: Arc<LoggerContext>,
    ) -> Self {
        let name = if name.is_empty() { ROOT } else { name };
        Self {
            name: name.to_string(),
            level: Threshold::new(level),
            parent,
            propagate: AtomicBool::new(propagate),
            sinks: RwLock::new(Vec::new()),
            context,
            reported_unhandled: AtomicBool::new(false),
        }
    }

    /// Dotted name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Parent node; `None` only for a root.
    pub fn parent(&self) -> Option<&Arc<Logger>> {
        self.parent.as_ref()
    }

    /// Shared context.
    pub fn context(&self) -> &Arc<LoggerContext> {
        &self.context
    }

    /// Explicit level of this node.
    pub fn level(&self) -> Level {
        self.level.get()
    }

    /// Change the explicit level.
    pub fn set_level(&self, level: Level) {
        self.level.set(level);
    }

    /// Whether events continue to the parent.
    pub fn propagate(&self) -> bool {
        self.propagate.load(Ordering::Acquire)
    }

    /// Turn propagation on or off.
    pub fn set_propagate(&self, propagate: bool) {
        self.propagate.store(propagate, Ordering::Release);
    }

    /// Attach a sink. Attaching the same sink twice is a no-op.
    pub fn add_sink(&self, sink: SinkRef) {
        let mut sinks = self.sinks.write();
        if !sinks.iter().any(|s| same_sink(s, &sink)) {
            sinks.push(sink);
        }
    }

    /// Detach a sink by identity. Unknown sinks are ignored.
    pub fn remove_sink(&self, sink: &SinkRef) {
        self.sinks.write().retain(|s| !same_sink(s, sink));
    }

    /// Sinks attached to this node, in insertion order.
    pub fn sinks(&self) -> Vec<SinkRef> {
        self.sinks.read().clone()
    }

    /// Whether any node on this logger's propagation path has a sink.
    pub fn has_sinks(&self) -> bool {
        self.path().any(|logger| !logger.sinks.read().is_empty())
    }

    /// Per-node admission check; `NotSet` admits everything.
    pub fn is_enabled_for(&self, level: Level) -> bool {
        level >= self.level()
    }

    /// First explicit level found walking towards the root, or `NotSet`.
    pub fn effective_level(&self) -> Level {
        let mut node = Some(self);
        while let Some(logger) = node {
            let level = logger.level();
            if level != Level::NotSet {
                return level;
            }
            node = logger.parent.as_deref();
        }
        Level::NotSet
    }

    /// Log at `DEBUG`.
    #[track_caller]
    pub fn debug(&self, msg: &str, args: &[Value]) {
        self.emit(Level::Debug, msg, args, None, None);
    }

    /// Log at `INFO`.
    #[track_caller]
    pub fn info(&self, msg: &str, args: &[Value]) {
        self.emit(Level::Info, msg, args, None, None);
    }

    /// Log at `WARN`.
    #[track_caller]
    pub fn warn(&self, msg: &str, args: &[Value]) {
        self.emit(Level::Warn, msg, args, None, None);
    }

    /// Log at `WARNING`, the same level as `WARN`.
    #[track_caller]
    pub fn warning(&self, msg: &str, args: &[Value]) {
        self.emit(Level::WARNING, msg, args, None, None);
    }

    /// Log at `ERROR`.
    #[track_caller]
    pub fn error(&self, msg: &str, args: &[Value]) {
        self.emit(Level::Error, msg, args, None, None);
    }

    /// Log an error at `ERROR`.
    ///
    /// When the error carries a trace, the call-site is taken from it, so
    /// the event points at where the error arose rather than where it was
    /// logged. Otherwise the logging call itself is attributed.
    #[track_caller]
    pub fn exception(&self, error: impl Into<ErrorInfo>, msg: &str, args: &[Value]) {
        self.emit(Level::Error, msg, args, Some(error.into()), None);
    }

    /// Log at `FATAL`, flush every sink on the path, then run the fatal hook.
    ///
    /// With the default context the hook exits the process with status 1.
    #[track_caller]
    pub fn fatal(&self, msg: &str, args: &[Value]) {
        if let Some(event) = self.emit(Level::Fatal, msg, args, None, None) {
            self.flush_path();
            self.context.terminate(&event);
        }
    }

    /// Log at an arbitrary level.
    #[track_caller]
    pub fn log(&self, level: Level, msg: &str, args: &[Value]) {
        self.emit(level, msg, args, None, None);
    }

    /// Log at an arbitrary level with extra key/value pairs.
    #[track_caller]
    pub fn log_extra(&self, level: Level, msg: &str, args: &[Value], extra: Extra) {
        self.emit(level, msg, args, None, Some(extra));
    }

    /// Run the propagation walk for an already built event.
    pub fn handle(&self, event: &Event) {
        self.deliver(event);
    }

    #[track_caller]
    fn emit(
        &self,
        level: Level,
        msg: &str,
        args: &[Value],
        error: Option<ErrorInfo>,
        extra: Option<Extra>,
    ) -> Option<Event> {
        // Resolving a call-site is costly; skip it when nothing would listen.
        if level != Level::Fatal && !self.wants(level) {
            self.note_unhandled(level);
            return None;
        }

        let callsite = self.context.resolve(error.as_ref(), Location::caller());
        let mut event = Event::new(self.name.as_str(), level, callsite, msg, args.to_vec());
        if let Some(error) = error {
            event = event.with_error(error);
        }
        if let Some(extra) = extra {
            event = event.with_extra(extra);
        }

        if self.deliver(&event) == 0 {
            self.note_unhandled(level);
        }
        Some(event)
    }

    /// Walk the propagation path; returns how many sinks admitted the event.
    fn deliver(&self, event: &Event) -> usize {
        self.path()
            .filter(|logger| logger.is_enabled_for(event.level()))
            .map(|logger| logger.dispatch(event))
            .sum()
    }

    fn dispatch(&self, event: &Event) -> usize {
        // Snapshot so sinks may log, or reconfigure this logger, without deadlocking.
        let sinks = self.sinks();
        let mut admitted = 0;

        for sink in &sinks {
            if sink.is_enabled_for(event.level()) {
                admitted += 1;
            }
            match panic::catch_unwind(AssertUnwindSafe(|| sink.handle(event))) {
                Ok(Ok(())) => {}
                Ok(Err(e)) => diagnostics::sink_failed(&self.name, &e),
                Err(_) => diagnostics::sink_panicked(&self.name),
            }
        }
        admitted
    }

    fn wants(&self, level: Level) -> bool {
        self.path().any(|logger| {
            logger.is_enabled_for(level)
                && logger.sinks.read().iter().any(|sink| sink.is_enabled_for(level))
        })
    }

    fn note_unhandled(&self, level: Level) {
        if !self.context.no_handler_warning() || !self.is_enabled_for(level) {
            return;
        }
        if !self.reported_unhandled.swap(true, Ordering::AcqRel) {
            diagnostics::no_handler(&self.name);
        }
    }

    fn flush_path(&self) {
        for logger in self.path() {
            for sink in logger.sinks() {
                match panic::catch_unwind(AssertUnwindSafe(|| sink.flush())) {
                    Ok(Ok(())) => {}
                    Ok(Err(e)) => diagnostics::sink_failed(&logger.name, &e),
                    Err(_) => diagnostics::sink_panicked(&logger.name),
                }
            }
        }
    }

    /// This node, then each ancestor an event would propagate to.
    fn path(&self) -> Path<'_> {
        Path { next: Some(self) }
    }
}

struct Path<'a> {
    next: Option<&'a Logger>,
}

impl<'a> Iterator for Path<'a> {
    type Item = &'a Logger;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next?;
        self.next = if current.propagate() {
            current.parent.as_deref()
        } else {
            None
        };
        Some(current)
    }
}

impl fmt::Debug for Logger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Logger")
            .field("name", &self.name)
            .field("level", &self.level())
            .field("parent", &self.parent.as_ref().map(|p| p.name()))
            .field("propagate", &self.propagate())
            .field("sinks", &self.sinks.read().len())
            .finish()
    }
}
