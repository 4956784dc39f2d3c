//! Delivery endpoints.
//!
//! A [`Sink`] receives every event its logger admits and applies its own
//! threshold before rendering, so a sink attached below its level drops
//! events the logger passed through. Variants are composed, not layered:
//! a file sink is a [`StreamSink`] over a file with a `reopen` operation.

mod bridge;
mod channel;
mod memory;
mod null;
mod stream;

pub use bridge::TracingSink;
pub use channel::AsyncSink;
pub use memory::MemorySink;
pub use null::NullSink;
pub use stream::StreamSink;

use crate::record::Event;
use logtree_types::{Level, Result};
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;

/// Shared handle to a sink; identity is the allocation.
pub type SinkRef = Arc<dyn Sink>;

/// Capability every delivery endpoint provides.
pub trait Sink: Send + Sync {
    /// Current threshold.
    fn level(&self) -> Level;

    /// Change the threshold.
    fn set_level(&self, level: Level);

    /// Whether an event at `level` passes this sink's threshold.
    fn is_enabled_for(&self, level: Level) -> bool {
        level >= self.level()
    }

    /// Deliver `event` if it passes the threshold.
    fn handle(&self, event: &Event) -> Result<()> {
        if self.is_enabled_for(event.level()) {
            self.emit(event)?;
        }
        Ok(())
    }

    /// Deliver `event` unconditionally.
    fn emit(&self, event: &Event) -> Result<()>;

    /// Push buffered output towards its destination.
    fn flush(&self) -> Result<()> {
        Ok(())
    }
}

/// Whether two handles point at the same sink.
pub fn same_sink(a: &SinkRef, b: &SinkRef) -> bool {
    std::ptr::eq(Arc::as_ptr(a) as *const (), Arc::as_ptr(b) as *const ())
}

/// Lock-free storage for a level, shared by loggers and sinks.
#[derive(Debug, Default)]
pub struct Threshold(AtomicU8);

impl Threshold {
    /// Threshold starting at `level`.
    pub fn new(level: Level) -> Self {
        Self(AtomicU8::new(level.value()))
    }

    /// Current level.
    pub fn get(&self) -> Level {
        Level::from_value(i64::from(self.0.load(Ordering::Acquire)))
    }

    /// Replace the level.
    pub fn set(&self, level: Level) {
        self.0.store(level.value(), Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::callsite::CallSite;
    use parking_lot::Mutex;

    #[derive(Default)]
    struct Counting {
        level: Threshold,
        emitted: Mutex<usize>,
    }

    impl Sink for Counting {
        fn level(&self) -> Level {
            self.level.get()
        }

        fn set_level(&self, level: Level) {
            self.level.set(level);
        }

        fn emit(&self, _event: &Event) -> Result<()> {
            *self.emitted.lock() += 1;
            Ok(())
        }
    }

    fn at(level: Level) -> Event {
        Event::new("t", level, CallSite::default(), "m", Vec::new())
    }

    #[test]
    fn test_defaults_to_notset() {
        assert_eq!(Counting::default().level(), Level::NotSet);
    }

    #[test]
    fn test_handle_checks_threshold() {
        let sink = Counting::default();
        sink.set_level(Level::Info);

        sink.handle(&at(Level::Warn)).unwrap();
        sink.handle(&at(Level::Info)).unwrap();
        sink.handle(&at(Level::Debug)).unwrap();
        assert_eq!(*sink.emitted.lock(), 2);

        sink.set_level(Level::Error);
        sink.handle(&at(Level::Info)).unwrap();
        assert_eq!(*sink.emitted.lock(), 2);
    }

    #[test]
    fn test_same_sink_is_identity() {
        let a: SinkRef = Arc::new(Counting::default());
        let b: SinkRef = Arc::new(Counting::default());
        assert!(same_sink(&a, &a.clone()));
        assert!(!same_sink(&a, &b));
    }

    #[test]
    fn test_threshold_roundtrip() {
        let t = Threshold::new(Level::Warn);
        assert_eq!(t.get(), Level::Warn);
        t.set(Level::Fatal);
        assert_eq!(t.get(), Level::Fatal);
    }
}
