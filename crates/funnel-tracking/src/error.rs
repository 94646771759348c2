//! Error types for recording sinks.

/// Errors a sink may report while recording an event.
///
/// The tracker logs and discards these; they never reach a call site.
#[derive(Debug, thiserror::Error)]
pub enum SinkError {
    #[error("Sink transport failed: {0}")]
    Transport(String),
    #[error("Event serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("Sink unavailable: {0}")]
    Unavailable(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sink_error_display() {
        let err = SinkError::Transport("connection reset".to_string());
        assert_eq!(err.to_string(), "Sink transport failed: connection reset");

        let err = SinkError::Unavailable("gtag not loaded".to_string());
        assert_eq!(err.to_string(), "Sink unavailable: gtag not loaded");
    }

    #[test]
    fn test_sink_error_from_serde_json() {
        let err = serde_json::from_str::<serde_json::Value>("{ nope }").unwrap_err();
        let err: SinkError = err.into();
        assert!(matches!(err, SinkError::Serialization(_)));
    }
}
