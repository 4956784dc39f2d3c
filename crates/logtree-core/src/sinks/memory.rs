//! In-memory sink.

use super::{Sink, Threshold};
use crate::record::Event;
use logtree_types::{Level, Result};
use parking_lot::Mutex;

/// Keeps a copy of every admitted event.
///
/// Useful for tests and for surfacing recent events in an application.
#[derive(Debug, Default)]
pub struct MemorySink {
    level: Threshold,
    events: Mutex<Vec<Event>>,
}

impl MemorySink {
    /// Memory sink with the given threshold.
    pub fn new(level: Level) -> Self {
        Self {
            level: Threshold::new(level),
            events: Mutex::new(Vec::new()),
        }
    }

    /// Copies of the events received so far.
    pub fn events(&self) -> Vec<Event> {
        self.events.lock().clone()
    }

    /// Rendered messages received so far.
    pub fn messages(&self) -> Vec<String> {
        self.events.lock().iter().map(Event::message).collect()
    }

    /// Number of events received.
    pub fn len(&self) -> usize {
        self.events.lock().len()
    }

    /// Whether nothing was received.
    pub fn is_empty(&self) -> bool {
        self.events.lock().is_empty()
    }

    /// Drop everything received so far.
    pub fn clear(&self) {
        self.events.lock().clear();
    }
}

impl Sink for MemorySink {
    fn level(&self) -> Level {
        self.level.get()
    }

    fn set_level(&self, level: Level) {
        self.level.set(level);
    }

    fn emit(&self, event: &Event) -> Result<()> {
        self.events.lock().push(event.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::callsite::CallSite;
    use serde_json::json;

    #[test]
    fn test_collects_admitted_events() {
        let sink = MemorySink::new(Level::Info);
        let skipped = Event::new("a", Level::Debug, CallSite::default(), "skip", vec![]);
        let kept =
            Event::new("a", Level::Info, CallSite::default(), "hi %s", vec![json!("friend")]);
        sink.handle(&skipped).unwrap();
        sink.handle(&kept).unwrap();

        assert_eq!(sink.len(), 1);
        assert_eq!(sink.messages(), vec!["hi friend".to_string()]);
        assert_eq!(sink.events()[0].name(), "a");

        sink.clear();
        assert!(sink.is_empty());
    }
}
