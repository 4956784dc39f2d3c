//! Name → logger resolution.
//!
//! A [`Registry`] owns one logger per dotted name and links every logger
//! to its parent: `"a.b.c"` → `"a.b"` → `"a"` → `"root"`. Loggers are
//! created on first request, ancestors included, and live as long as the
//! registry. Level and propagate arguments only apply when a name is first
//! seen; later calls return the existing logger unchanged.
//!
//! Most programs use the process-wide [`Registry::global`] through the free
//! functions of this module. Tests build their own isolated registries.

use crate::context::LoggerContext;
use crate::logger::{Logger, ROOT};
use crate::record::ErrorInfo;
use indexmap::IndexMap;
use logtree_types::Level;
use once_cell::sync::Lazy;
use parking_lot::Mutex;
use serde_json::Value;
use std::sync::Arc;

static GLOBAL: Lazy<Registry> = Lazy::new(Registry::new);

/// The logger tree.
#[derive(Debug)]
pub struct Registry {
    loggers: Mutex<IndexMap<String, Arc<Logger>>>,
    context: Arc<LoggerContext>,
}

impl Registry {
    /// Empty registry with the default context.
    pub fn new() -> Self {
        Self::with_context(LoggerContext::new())
    }

    /// Empty registry whose loggers share `context`.
    pub fn with_context(context: LoggerContext) -> Self {
        Self {
            loggers: Mutex::new(IndexMap::new()),
            context: Arc::new(context),
        }
    }

    /// The process-wide registry.
    pub fn global() -> &'static Registry {
        &GLOBAL
    }

    /// Context shared by this registry's loggers.
    pub fn context(&self) -> &Arc<LoggerContext> {
        &self.context
    }

    /// Logger for `name`, created with `NOTSET` and propagation on if new.
    pub fn get_logger(&self, name: &str) -> Arc<Logger> {
        self.get_logger_with(name, Level::NotSet, true)
    }

    /// Logger for `name`; `level` and `propagate` only apply on creation.
    pub fn get_logger_with(&self, name: &str, level: Level, propagate: bool) -> Arc<Logger> {
        let name = if name.is_empty() { ROOT } else { name };
        let mut loggers = self.loggers.lock();
        self.materialize(&mut loggers, name, level, propagate)
    }

    /// The root logger.
    pub fn root(&self) -> Arc<Logger> {
        self.get_logger(ROOT)
    }

    /// Names of every logger created so far, in creation order.
    pub fn names(&self) -> Vec<String> {
        self.loggers.lock().keys().cloned().collect()
    }

    /// Whether a logger named `name` has been created.
    pub fn contains(&self, name: &str) -> bool {
        self.loggers.lock().contains_key(name)
    }

    // Runs under the map lock so concurrent first access creates one instance.
    fn materialize(
        &self,
        loggers: &mut IndexMap<String, Arc<Logger>>,
        name: &str,
        level: Level,
        propagate: bool,
    ) -> Arc<Logger> {
        if let Some(logger) = loggers.get(name) {
            return logger.clone();
        }

        let parent = match name {
            ROOT => None,
            _ => Some(self.materialize(loggers, parent_name(name), Level::NotSet, true)),
        };
        let logger = Arc::new(Logger::with_context(
            name,
            level,
            parent,
            propagate,
            self.context.clone(),
        ));
        loggers.insert(name.to_string(), logger.clone());
        logger
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

/// `name` without its last dot-segment; single-segment names map to root.
fn parent_name(name: &str) -> &str {
    match name.rfind('.') {
        Some(0) | None => ROOT,
        Some(idx) => &name[..idx],
    }
}

/// Logger for `name` from the global registry.
pub fn get_logger(name: &str) -> Arc<Logger> {
    Registry::global().get_logger(name)
}

/// Logger for `name` from the global registry, with creation parameters.
pub fn get_logger_with(name: &str, level: Level, propagate: bool) -> Arc<Logger> {
    Registry::global().get_logger_with(name, level, propagate)
}

/// Root logger of the global registry.
pub fn root() -> Arc<Logger> {
    Registry::global().root()
}

/// `DEBUG` on the global root logger.
#[track_caller]
pub fn debug(msg: &str, args: &[Value]) {
    root().debug(msg, args);
}

/// `INFO` on the global root logger.
#[track_caller]
pub fn info(msg: &str, args: &[Value]) {
    root().info(msg, args);
}

/// `WARNING` on the global root logger.
#[track_caller]
pub fn warning(msg: &str, args: &[Value]) {
    root().warning(msg, args);
}

/// `ERROR` on the global root logger.
#[track_caller]
pub fn error(msg: &str, args: &[Value]) {
    root().error(msg, args);
}

/// Log an error on the global root logger.
#[track_caller]
pub fn exception(error: impl Into<ErrorInfo>, msg: &str, args: &[Value]) {
    root().exception(error, msg, args);
}

/// `FATAL` on the global root logger, then run the fatal hook.
#[track_caller]
pub fn fatal(msg: &str, args: &[Value]) {
    root().fatal(msg, args);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::callsite::NoTrace;
    use crate::sinks::MemorySink;
    use proptest::prelude::*;
    use std::thread;

    fn registry() -> Registry {
        Registry::with_context(LoggerContext::new().with_trace_source(NoTrace))
    }

    #[test]
    fn test_parent_name() {
        assert_eq!(parent_name("a"), ROOT);
        assert_eq!(parent_name("a.b"), "a");
        assert_eq!(parent_name("a.b.c"), "a.b");
        assert_eq!(parent_name(".a"), ROOT);
    }

    #[test]
    fn test_empty_name_is_root() {
        let reg = registry();
        let root = reg.get_logger("");
        assert_eq!(root.name(), ROOT);
        assert!(root.parent().is_none());
        assert!(Arc::ptr_eq(&root, &reg.root()));
    }

    #[test]
    fn test_identity_stable() {
        let reg = registry();
        let a = reg.get_logger("svc.db");
        let b = reg.get_logger("svc.db");
        assert!(Arc::ptr_eq(&a, &b));
    }

    #[test]
    fn test_ancestors_materialized() {
        let reg = registry();
        let abc = reg.get_logger("a.b.c");

        assert_eq!(reg.names(), vec!["root", "a", "a.b", "a.b.c"]);

        let ab = reg.get_logger("a.b");
        let a = reg.get_logger("a");
        assert!(Arc::ptr_eq(abc.parent().unwrap(), &ab));
        assert!(Arc::ptr_eq(ab.parent().unwrap(), &a));
        assert!(Arc::ptr_eq(a.parent().unwrap(), &reg.root()));
    }

    #[test]
    fn test_creation_params_apply_once() {
        let reg = registry();
        let first = reg.get_logger_with("x", Level::WARNING, false);
        let second = reg.get_logger_with("x", Level::Debug, true);

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(second.level(), Level::Warn);
        assert!(!second.propagate());
    }

    #[test]
    fn test_implicit_ancestors_use_defaults() {
        let reg = registry();
        reg.get_logger_with("a.b", Level::Error, false);
        let a = reg.get_logger_with("a", Level::Fatal, false);
        assert_eq!(a.level(), Level::NotSet);
        assert!(a.propagate());
    }

    #[test]
    fn test_root_seeded_by_first_access() {
        let reg = registry();
        assert!(!reg.contains(ROOT));
        let root = reg.get_logger_with("root", Level::Info, true);
        assert_eq!(root.level(), Level::Info);
        assert!(reg.contains(ROOT));
    }

    #[test]
    fn test_event_reaches_root_sink() {
        let reg = registry();
        let sink = Arc::new(MemorySink::new(Level::NotSet));
        reg.root().add_sink(sink.clone());

        reg.get_logger("app.http.router").info("GET %s", &["/health".into()]);

        let events = sink.events();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].name(), "app.http.router");
        assert_eq!(events[0].message(), "GET /health");
    }

    #[test]
    fn test_loggers_share_context() {
        let reg = registry();
        let ctx = reg.context().clone();
        let logger = reg.get_logger("a.b");
        assert!(Arc::ptr_eq(logger.context(), &ctx));
    }

    #[test]
    fn test_concurrent_first_access_yields_one_instance() {
        let reg = Arc::new(registry());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let reg = reg.clone();
                thread::spawn(move || reg.get_logger("race.to.create"))
            })
            .collect();

        let loggers: Vec<Arc<Logger>> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        for logger in &loggers[1..] {
            assert!(Arc::ptr_eq(&loggers[0], logger));
        }
        assert_eq!(reg.names().len(), 4);
    }

    #[test]
    fn test_global_registry_is_shared() {
        let a = get_logger("global.test.shared");
        let b = Registry::global().get_logger("global.test.shared");
        assert!(Arc::ptr_eq(&a, &b));
        assert!(Arc::ptr_eq(&root(), &Registry::global().root()));
    }

    proptest! {
        #[test]
        fn prop_chain_follows_dotted_prefixes(
            segments in prop::collection::vec("[a-z]{1,6}", 1..6)
        ) {
            prop_assume!(segments[0] != ROOT);
            let reg = registry();
            let name = segments.join(".");
            let mut node = reg.get_logger(&name);

            for depth in (1..segments.len()).rev() {
                let parent = node.parent().unwrap().clone();
                prop_assert_eq!(parent.name(), segments[..depth].join("."));
                prop_assert!(Arc::ptr_eq(&parent, &reg.get_logger(&segments[..depth].join("."))));
                node = parent;
            }

            let top = node.parent().unwrap();
            prop_assert_eq!(top.name(), ROOT);
            prop_assert!(top.parent().is_none());
        }
    }
}
