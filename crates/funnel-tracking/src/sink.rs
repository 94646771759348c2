//! Recording sinks for tracked events.
//!
//! A sink receives every event an `EventTracker` records. Implementations
//! must not block; failures are reported as `SinkError` and swallowed by the
//! tracker.

use std::fmt;
use std::sync::{Arc, Mutex};

use funnel_core::config::SinkKind;
use funnel_core::events::TrackedEvent;
use serde_json::Value;

use crate::error::SinkError;

/// Destination for tracked events.
pub trait EventSink: Send + Sync {
    /// Short name used in log fields.
    fn name(&self) -> &'static str;

    /// Record a single event.
    fn record(&self, event: &TrackedEvent) -> Result<(), SinkError>;
}

// =============================================================================
// Console
// =============================================================================

/// Writes every event to the log at `info` level.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsoleSink;

impl EventSink for ConsoleSink {
    fn name(&self) -> &'static str {
        "console"
    }

    fn record(&self, event: &TrackedEvent) -> Result<(), SinkError> {
        let payload = serde_json::to_string(event.payload())?;
        tracing::info!(
            target: "funnel::events",
            event = %event.name(),
            payload = %payload,
            timestamp = %event.timestamp().to_rfc3339(),
            "Event tracked"
        );
        Ok(())
    }
}

// =============================================================================
// Noop
// =============================================================================

/// Discards every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopSink;

impl EventSink for NoopSink {
    fn name(&self) -> &'static str {
        "noop"
    }

    fn record(&self, _event: &TrackedEvent) -> Result<(), SinkError> {
        Ok(())
    }
}

// =============================================================================
// Memory
// =============================================================================

/// Keeps recorded events in memory, in recording order.
///
/// Clones share the same buffer, so a test can hand one clone to a tracker
/// and inspect the other.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    events: Arc<Mutex<Vec<TrackedEvent>>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of every event recorded so far.
    pub fn events(&self) -> Vec<TrackedEvent> {
        self.events.lock().map(|e| e.clone()).unwrap_or_default()
    }

    /// Names of every event recorded so far.
    pub fn names(&self) -> Vec<String> {
        self.events
            .lock()
            .map(|e| e.iter().map(|ev| ev.name().to_string()).collect())
            .unwrap_or_default()
    }

    /// Events with the given name, in order.
    pub fn events_named(&self, name: &str) -> Vec<TrackedEvent> {
        self.events
            .lock()
            .map(|e| e.iter().filter(|ev| ev.name() == name).cloned().collect())
            .unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.events.lock().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        if let Ok(mut events) = self.events.lock() {
            events.clear();
        }
    }
}

impl EventSink for MemorySink {
    fn name(&self) -> &'static str {
        "memory"
    }

    fn record(&self, event: &TrackedEvent) -> Result<(), SinkError> {
        let mut events = self
            .events
            .lock()
            .map_err(|_| SinkError::Unavailable("memory sink lock poisoned".to_string()))?;
        events.push(event.clone());
        Ok(())
    }
}

// =============================================================================
// Remote
// =============================================================================

/// Third-party analytics provider a `RemoteSink` forwards to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RemoteProvider {
    /// Google Analytics 4: `gtag('event', name, data)`.
    Ga4,
    /// Facebook pixel: `fbq('track', name, data)`.
    Pixel,
}

impl RemoteProvider {
    /// Global function the provider's script exposes.
    pub fn function(&self) -> &'static str {
        match self {
            RemoteProvider::Ga4 => "gtag",
            RemoteProvider::Pixel => "fbq",
        }
    }

    /// First argument of the provider call.
    pub fn verb(&self) -> &'static str {
        match self {
            RemoteProvider::Ga4 => "event",
            RemoteProvider::Pixel => "track",
        }
    }
}

/// A provider call, ready to hand to whatever bridges to the provider script.
#[derive(Debug, Clone, PartialEq)]
pub struct RemoteCommand {
    pub function: &'static str,
    pub verb: &'static str,
    pub event_name: String,
    pub data: Value,
}

impl RemoteCommand {
    pub fn new(provider: RemoteProvider, event: &TrackedEvent) -> Self {
        Self {
            function: provider.function(),
            verb: provider.verb(),
            event_name: event.name().to_string(),
            data: event.payload().to_value(),
        }
    }
}

impl fmt::Display for RemoteCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = Value::String(self.event_name.clone());
        write!(
            f,
            "{}('{}', {}, {})",
            self.function, self.verb, name, self.data
        )
    }
}

/// Delivers provider calls. Hosts implement this over their script bridge.
pub trait RemoteTransport: Send + Sync {
    fn send(&self, command: &RemoteCommand) -> Result<(), SinkError>;
}

/// Forwards events to a third-party analytics provider.
///
/// Without a transport the provider is treated as not loaded (blocked by an
/// ad blocker, say) and events are skipped.
pub struct RemoteSink {
    provider: RemoteProvider,
    transport: Option<Arc<dyn RemoteTransport>>,
}

impl RemoteSink {
    /// A sink whose provider is not loaded.
    pub fn new(provider: RemoteProvider) -> Self {
        Self {
            provider,
            transport: None,
        }
    }

    pub fn with_transport(provider: RemoteProvider, transport: Arc<dyn RemoteTransport>) -> Self {
        Self {
            provider,
            transport: Some(transport),
        }
    }

    pub fn provider(&self) -> RemoteProvider {
        self.provider
    }

    pub fn is_available(&self) -> bool {
        self.transport.is_some()
    }
}

impl fmt::Debug for RemoteSink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RemoteSink")
            .field("provider", &self.provider)
            .field("available", &self.is_available())
            .finish()
    }
}

impl EventSink for RemoteSink {
    fn name(&self) -> &'static str {
        match self.provider {
            RemoteProvider::Ga4 => "ga4",
            RemoteProvider::Pixel => "pixel",
        }
    }

    fn record(&self, event: &TrackedEvent) -> Result<(), SinkError> {
        let Some(transport) = &self.transport else {
            tracing::debug!(
                provider = self.provider.function(),
                event = %event.name(),
                "Remote provider not loaded, event skipped"
            );
            return Ok(());
        };
        let command = RemoteCommand::new(self.provider, event);
        tracing::debug!(command = %command, "Forwarding event to remote provider");
        transport.send(&command)
    }
}

/// Build the sink selected by configuration.
///
/// `transport` is only used by the remote kinds.
pub fn build_sink(
    kind: SinkKind,
    transport: Option<Arc<dyn RemoteTransport>>,
) -> Arc<dyn EventSink> {
    let remote = |provider| match transport {
        Some(t) => RemoteSink::with_transport(provider, t),
        None => RemoteSink::new(provider),
    };
    match kind {
        SinkKind::Console => Arc::new(ConsoleSink),
        SinkKind::Noop => Arc::new(NoopSink),
        SinkKind::Ga4 => Arc::new(remote(RemoteProvider::Ga4)),
        SinkKind::Pixel => Arc::new(remote(RemoteProvider::Pixel)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use funnel_core::events::Payload;
    use serde_json::json;

    #[derive(Default)]
    struct CapturingTransport {
        commands: Mutex<Vec<RemoteCommand>>,
    }

    impl RemoteTransport for CapturingTransport {
        fn send(&self, command: &RemoteCommand) -> Result<(), SinkError> {
            self.commands.lock().unwrap().push(command.clone());
            Ok(())
        }
    }

    fn scroll_event() -> TrackedEvent {
        TrackedEvent::new(
            "scroll_depth",
            Payload::new().with("depth", 25).with("page_url", "https://a.test/"),
        )
    }

    #[test]
    fn test_console_sink_records() {
        assert!(ConsoleSink.record(&scroll_event()).is_ok());
        assert_eq!(ConsoleSink.name(), "console");
    }

    #[test]
    fn test_noop_sink_records_nothing() {
        assert!(NoopSink.record(&scroll_event()).is_ok());
        assert_eq!(NoopSink.name(), "noop");
    }

    #[test]
    fn test_memory_sink_keeps_order_and_shares_buffer() {
        let sink = MemorySink::new();
        let handle = sink.clone();
        sink.record(&TrackedEvent::new("page_view", Payload::new()))
            .unwrap();
        sink.record(&scroll_event()).unwrap();

        assert_eq!(handle.len(), 2);
        assert_eq!(handle.names(), vec!["page_view", "scroll_depth"]);
        assert_eq!(handle.events_named("scroll_depth").len(), 1);

        handle.clear();
        assert!(sink.is_empty());
    }

    #[test]
    fn test_remote_command_format() {
        let event = TrackedEvent::new("form_submit", Payload::new().with("form_id", "signup"));
        let cmd = RemoteCommand::new(RemoteProvider::Ga4, &event);
        assert_eq!(cmd.function, "gtag");
        assert_eq!(cmd.verb, "event");
        assert_eq!(cmd.data, json!({"form_id": "signup"}));
        assert_eq!(
            cmd.to_string(),
            r#"gtag('event', "form_submit", {"form_id":"signup"})"#
        );

        let cmd = RemoteCommand::new(RemoteProvider::Pixel, &event);
        assert_eq!(cmd.function, "fbq");
        assert_eq!(cmd.verb, "track");
    }

    #[test]
    fn test_remote_sink_without_transport_skips() {
        let sink = RemoteSink::new(RemoteProvider::Pixel);
        assert!(!sink.is_available());
        assert!(sink.record(&scroll_event()).is_ok());
    }

    #[test]
    fn test_remote_sink_forwards_to_transport() {
        let transport = Arc::new(CapturingTransport::default());
        let sink = RemoteSink::with_transport(RemoteProvider::Ga4, transport.clone());
        sink.record(&scroll_event()).unwrap();

        let commands = transport.commands.lock().unwrap();
        assert_eq!(commands.len(), 1);
        assert_eq!(commands[0].event_name, "scroll_depth");
        assert_eq!(commands[0].data["depth"], 25);
    }

    #[test]
    fn test_build_sink_by_kind() {
        assert_eq!(build_sink(SinkKind::Console, None).name(), "console");
        assert_eq!(build_sink(SinkKind::Noop, None).name(), "noop");
        assert_eq!(build_sink(SinkKind::Ga4, None).name(), "ga4");
        assert_eq!(build_sink(SinkKind::Pixel, None).name(), "pixel");
    }

    #[test]
    fn test_build_sink_passes_transport() {
        let transport = Arc::new(CapturingTransport::default());
        let sink = build_sink(SinkKind::Pixel, Some(transport.clone()));
        sink.record(&scroll_event()).unwrap();
        assert_eq!(transport.commands.lock().unwrap()[0].function, "fbq");
    }
}
