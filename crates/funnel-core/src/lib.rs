pub mod config;
pub mod error;
pub mod events;

pub use config::FunnelConfig;
pub use error::{FunnelError, Result};
pub use events::{Payload, TrackedEvent};
