//! Scroll-depth milestone tracking.
//!
//! Each milestone moves `NotReached -> Reached` at most once per page
//! lifetime. A fresh page view gets a fresh tracker.

use std::collections::BTreeSet;

use funnel_core::events::{Payload, SCROLL_DEPTH};
use serde::{Deserialize, Serialize};

use crate::tracker::EventTracker;

/// Scroll position and extents reported by the host, in pixels.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ScrollMetrics {
    pub scroll_offset: f64,
    pub document_height: f64,
    pub viewport_height: f64,
}

impl ScrollMetrics {
    /// Scrolled percentage of the scrollable range, rounded to an integer.
    ///
    /// `None` when there is nothing to scroll or the inputs are not finite.
    pub fn percent(&self) -> Option<i64> {
        let range = self.document_height - self.viewport_height;
        if range.is_nan() || range <= 0.0 {
            return None;
        }
        let ratio = self.scroll_offset / range * 100.0;
        if !ratio.is_finite() {
            return None;
        }
        Some(ratio.round() as i64)
    }
}

/// Progress of a single milestone.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MilestoneState {
    NotReached,
    Reached,
}

/// Emits one `scroll_depth` event per milestone, the first time it is reached.
#[derive(Debug)]
pub struct ScrollMilestoneTracker {
    milestones: Vec<u8>,
    reached: BTreeSet<u8>,
    page_url: String,
    tracker: EventTracker,
}

impl ScrollMilestoneTracker {
    /// Milestones are sorted and deduplicated.
    pub fn new(mut milestones: Vec<u8>, page_url: &str, tracker: EventTracker) -> Self {
        milestones.sort_unstable();
        milestones.dedup();
        Self {
            milestones,
            reached: BTreeSet::new(),
            page_url: page_url.to_string(),
            tracker,
        }
    }

    /// Sample a scroll position.
    ///
    /// Tracks every milestone that is newly at or below the current
    /// percentage, in ascending order, and returns them.
    pub fn on_scroll(&mut self, metrics: ScrollMetrics) -> Vec<u8> {
        let Some(percent) = metrics.percent() else {
            tracing::trace!(?metrics, "No scrollable range, skipping sample");
            return Vec::new();
        };

        let mut crossed = Vec::new();
        for &milestone in &self.milestones {
            if percent >= i64::from(milestone) && self.reached.insert(milestone) {
                self.tracker.track_with(
                    SCROLL_DEPTH,
                    Payload::new()
                        .with("depth", milestone)
                        .with("page_url", self.page_url.as_str()),
                );
                crossed.push(milestone);
            }
        }
        if !crossed.is_empty() {
            tracing::debug!(percent, ?crossed, "Scroll milestones reached");
        }
        crossed
    }

    /// State of `milestone`, or `None` if it is not one of the configured thresholds.
    pub fn state(&self, milestone: u8) -> Option<MilestoneState> {
        if !self.milestones.contains(&milestone) {
            return None;
        }
        Some(if self.reached.contains(&milestone) {
            MilestoneState::Reached
        } else {
            MilestoneState::NotReached
        })
    }

    /// Reached milestones in ascending order.
    pub fn reached(&self) -> impl Iterator<Item = u8> + '_ {
        self.reached.iter().copied()
    }

    pub fn milestones(&self) -> &[u8] {
        &self.milestones
    }

    pub fn is_complete(&self) -> bool {
        self.reached.len() == self.milestones.len()
    }
}
