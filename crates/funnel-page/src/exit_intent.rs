//! Exit-intent detection.

/// Fires once per page view when the pointer leaves through the top edge.
#[derive(Debug, Clone)]
pub struct ExitIntentDetector {
    threshold_px: f64,
    triggered: bool,
}

impl ExitIntentDetector {
    pub fn new(threshold_px: f64) -> Self {
        Self {
            threshold_px,
            triggered: false,
        }
    }

    /// Handle a pointer-out at `client_y`. Returns true only on the first
    /// exit above the threshold.
    pub fn on_mouse_out(&mut self, client_y: f64) -> bool {
        if self.triggered || client_y.is_nan() || client_y >= self.threshold_px {
            return false;
        }
        self.triggered = true;
        true
    }

    pub fn is_triggered(&self) -> bool {
        self.triggered
    }
}
