//! Reveal-on-scroll bookkeeping for animated elements.
//!
//! An element is revealed the first time enough of it is inside the viewport
//! (minus a bottom margin), and never tracked again afterwards.

use std::collections::HashSet;

use funnel_core::config::RevealConfig;
use serde::{Deserialize, Serialize};

/// Vertical extent of an element relative to the top of the viewport, in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ElementBounds {
    pub top: f64,
    pub bottom: f64,
}

impl ElementBounds {
    /// Fraction of the element inside `[0, root_bottom]`, or `None` if it is
    /// entirely outside.
    pub fn visible_ratio(&self, root_bottom: f64) -> Option<f64> {
        let visible_top = self.top.max(0.0);
        let visible_bottom = self.bottom.min(root_bottom);
        if visible_bottom < visible_top {
            return None;
        }
        let height = self.bottom - self.top;
        if height <= 0.0 {
            // Zero-height element sitting inside the root
            return Some(1.0);
        }
        Some((visible_bottom - visible_top) / height)
    }
}

#[derive(Debug, Clone)]
pub struct RevealTracker {
    threshold: f64,
    bottom_margin_px: f64,
    revealed: HashSet<String>,
}

impl RevealTracker {
    pub fn new(config: &RevealConfig) -> Self {
        Self {
            threshold: config.threshold,
            bottom_margin_px: config.bottom_margin_px,
            revealed: HashSet::new(),
        }
    }

    /// Report an element's position. Returns true when it should be revealed now.
    pub fn observe(
        &mut self,
        element_id: &str,
        bounds: ElementBounds,
        viewport_height: f64,
    ) -> bool {
        if self.revealed.contains(element_id) {
            return false;
        }
        let root_bottom = viewport_height - self.bottom_margin_px;
        let Some(ratio) = bounds.visible_ratio(root_bottom) else {
            return false;
        };
        if ratio < self.threshold {
            return false;
        }
        self.revealed.insert(element_id.to_string());
        true
    }

    pub fn is_revealed(&self, element_id: &str) -> bool {
        self.revealed.contains(element_id)
    }

    pub fn revealed_count(&self) -> usize {
        self.revealed.len()
    }
}
