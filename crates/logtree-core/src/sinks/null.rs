//! Sink that discards everything.

use super::{Sink, Threshold};
use crate::record::Event;
use logtree_types::{Level, Result};

/// Accepts events and drops them.
///
/// Attaching one marks a logger as handled, which silences the
/// no-handler diagnostic for libraries that leave output to the host.
#[derive(Debug, Default)]
pub struct NullSink {
    level: Threshold,
}

impl NullSink {
    /// Null sink with the given threshold.
    pub fn new(level: Level) -> Self {
        Self {
            level: Threshold::new(level),
        }
    }
}

impl Sink for NullSink {
    fn level(&self) -> Level {
        self.level.get()
    }

    fn set_level(&self, level: Level) {
        self.level.set(level);
    }

    fn emit(&self, _event: &Event) -> Result<()> {
        Ok(())
    }
}
