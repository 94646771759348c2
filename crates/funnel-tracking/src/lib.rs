//! Funnel tracking crate - event recording, sinks, debouncing, scroll depth.
//!
//! Provides the `EventSink` trait with console, no-op, in-memory and remote
//! (GA4 / pixel) implementations, the `EventTracker` that call sites use,
//! a trailing-edge `debounce` built on tokio timers, and the
//! `ScrollMilestoneTracker` that turns scroll positions into one-shot
//! `scroll_depth` events.

pub mod debounce;
pub mod error;
pub mod scroll;
pub mod sink;
pub mod tracker;

pub use debounce::{debounce, Debounced};
pub use error::SinkError;
pub use scroll::{MilestoneState, ScrollMetrics, ScrollMilestoneTracker};
pub use sink::{
    build_sink, ConsoleSink, EventSink, MemorySink, NoopSink, RemoteCommand, RemoteProvider,
    RemoteSink, RemoteTransport,
};
pub use tracker::EventTracker;
