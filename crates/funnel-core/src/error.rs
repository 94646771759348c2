use thiserror::Error;

/// Top-level error type for the funnel crates.
///
/// Tracking itself never fails visibly; these errors come from loading
/// configuration, building a page context, or reading a replay script.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum FunnelError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Invalid milestone {value}: {reason}")]
    InvalidMilestone { value: u8, reason: String },
}

impl From<toml::de::Error> for FunnelError {
    fn from(err: toml::de::Error) -> Self {
        FunnelError::Config(err.to_string())
    }
}

impl From<toml::ser::Error> for FunnelError {
    fn from(err: toml::ser::Error) -> Self {
        FunnelError::Config(err.to_string())
    }
}

impl From<serde_json::Error> for FunnelError {
    fn from(err: serde_json::Error) -> Self {
        FunnelError::Serialization(err.to_string())
    }
}

impl From<url::ParseError> for FunnelError {
    fn from(err: url::ParseError) -> Self {
        FunnelError::InvalidUrl(err.to_string())
    }
}

/// A specialized `Result` type for funnel operations.
pub type Result<T> = std::result::Result<T, FunnelError>;
