//! Core trait definitions
//!
//! `ChangeSink` is the seam between the store and the trigger runtime: the
//! store publishes document lifecycle events without knowing who consumes
//! them, and the runtime consumes them without knowing how documents are
//! stored.

use crate::event::ChangeEvent;

/// Consumer of document lifecycle events
///
/// Implementations must be cheap and non-blocking from the store's point of
/// view; delivery is fire-and-forget. An event published here may later be
/// handed to handlers more than once (at-least-once delivery), never zero
/// times while the sink is running.
pub trait ChangeSink: Send + Sync {
    /// Accept one lifecycle event for eventual handler dispatch
    fn publish(&self, event: ChangeEvent);
}

/// Sink that drops every event
///
/// Stands in when no trigger runtime is attached, e.g. in store-only tests.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl ChangeSink for NullSink {
    fn publish(&self, _event: ChangeEvent) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::ChangeKind;
    use crate::path::DocPath;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    struct CountingSink(AtomicUsize);

    impl ChangeSink for CountingSink {
        fn publish(&self, _event: ChangeEvent) {
            self.0.fetch_add(1, Ordering::Relaxed);
        }
    }

    #[test]
    fn test_null_sink_accepts_events() {
        let sink = NullSink;
        let path = DocPath::parse("users/u1").unwrap();
        sink.publish(ChangeEvent::new(path, ChangeKind::Created));
    }

    #[test]
    fn test_sink_is_object_safe() {
        let sink: Arc<dyn ChangeSink> = Arc::new(CountingSink(AtomicUsize::new(0)));
        let path = DocPath::parse("users/u1").unwrap();
        sink.publish(ChangeEvent::new(path, ChangeKind::Deleted));
    }
}
