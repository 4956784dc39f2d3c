//! Bridge into the `tracing` ecosystem.

use super::{Sink, Threshold};
use crate::record::Event;
use logtree_types::{Level, Result};

/// Re-emits events as `tracing` events.
///
/// The logger name, source location, and calling function travel as
/// fields, so a `tracing-subscriber` layer can render or filter on them.
/// `FATAL` maps to `ERROR`, the highest `tracing` level.
#[derive(Debug, Default)]
pub struct TracingSink {
    level: Threshold,
}

impl TracingSink {
    /// Bridge with the given threshold.
    pub fn new(level: Level) -> Self {
        Self {
            level: Threshold::new(level),
        }
    }
}

impl Sink for TracingSink {
    fn level(&self) -> Level {
        self.level.get()
    }

    fn set_level(&self, level: Level) {
        self.level.set(level);
    }

    fn emit(&self, event: &Event) -> Result<()> {
        let message = event.message();
        let logger = event.name();
        let file = event.pathname();
        let line = event.line().unwrap_or_default();
        let function = event.function();
        let error = event.error().map(|e| e.to_string());
        let error = error.as_deref();

        match event.level() {
            Level::NotSet | Level::Debug => tracing::debug!(
                target: "logtree", logger, file, line, function, error, "{}", message
            ),
            Level::Info => tracing::info!(
                target: "logtree", logger, file, line, function, error, "{}", message
            ),
            Level::Warn => tracing::warn!(
                target: "logtree", logger, file, line, function, error, "{}", message
            ),
            Level::Error | Level::Fatal => tracing::error!(
                target: "logtree", logger, file, line, function, error, "{}", message
            ),
        }
        Ok(())
    }
}
