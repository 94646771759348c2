//! Event tracker used by every call site.

use std::fmt;
use std::sync::Arc;

use funnel_core::events::{Payload, TrackedEvent};

use crate::sink::EventSink;

/// Records named events into a pluggable sink.
///
/// Tracking is a side concern of whatever UI action triggers it, so it never
/// returns an error: sink failures are logged at `warn` and dropped. Clones
/// share the same sink.
#[derive(Clone)]
pub struct EventTracker {
    sink: Arc<dyn EventSink>,
}

impl EventTracker {
    pub fn new(sink: Arc<dyn EventSink>) -> Self {
        Self { sink }
    }

    /// Track an event with an empty payload.
    pub fn track(&self, name: &str) {
        self.track_with(name, Payload::new());
    }

    /// Track an event with the given payload.
    pub fn track_with(&self, name: &str, payload: Payload) {
        let event = TrackedEvent::new(name, payload);
        if let Err(e) = self.sink.record(&event) {
            tracing::warn!(
                sink = self.sink.name(),
                event = %name,
                error = %e,
                "Failed to record event"
            );
        }
    }

    /// Name of the sink events go to.
    pub fn sink_name(&self) -> &'static str {
        self.sink.name()
    }
}

impl fmt::Debug for EventTracker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventTracker")
            .field("sink", &self.sink.name())
            .finish()
    }
}
