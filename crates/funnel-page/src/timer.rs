//! Time-on-page measurement.

use std::time::Duration;

use tokio::time::Instant;

/// Measures how long the page has been open.
///
/// Uses tokio's clock so paused-time tests can drive it.
#[derive(Debug, Clone, Copy)]
pub struct PageTimer {
    started: Instant,
}

impl PageTimer {
    pub fn start() -> Self {
        Self {
            started: Instant::now(),
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    /// Whole seconds on the page, rounded to the nearest second.
    pub fn elapsed_seconds(&self) -> u64 {
        round_seconds(self.elapsed())
    }
}

/// Round a duration to the nearest whole second, halves rounding up.
pub fn round_seconds(elapsed: Duration) -> u64 {
    let millis = elapsed.as_millis();
    ((millis + 500) / 1000) as u64
}
