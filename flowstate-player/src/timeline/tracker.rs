//! Current-segment tracking
//!
//! Detects when playback crosses from one segment to another (or runs past
//! the end) so the player can announce segment changes to its host.
//!
//! **Design:**
//! - The current index is cached for O(1) typical-case checks while elapsed
//!   time advances linearly
//! - A position outside the cached segment falls back to a binary search
//! - The cache is forgotten on reset/seek so the next check reports entry
//!   into whatever segment playback lands in

use super::Timeline;

/// Result of a boundary check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoundaryCheck {
    /// Playback moved to a different segment (or off the end) since the
    /// last check
    pub crossed: bool,

    /// Segment covering the checked position, `None` in a gap or past the end
    pub current: Option<usize>,
}

/// Tracks the segment that covers the current playback position
#[derive(Debug, Clone, Default)]
pub struct SegmentTracker {
    /// Cached result of the last check
    ///
    /// - None: not checked since creation/reset
    /// - Some(None): last check landed in a gap or past the end
    /// - Some(Some(index)): last check landed in this segment
    current: Option<Option<usize>>,
}

impl SegmentTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Check whether `position_ms` is in a different segment than last time
    ///
    /// Unlike a pure boundary detector, entering the first segment after a
    /// reset counts as a crossing: the host has not been told about any
    /// segment yet.
    pub fn check_boundary(&mut self, timeline: &Timeline, position_ms: u64) -> BoundaryCheck {
        // Hot path: still inside the cached segment
        if let Some(Some(index)) = self.current {
            if let Some(segment) = timeline.get(index) {
                if segment.contains(position_ms) {
                    return BoundaryCheck {
                        crossed: false,
                        current: Some(index),
                    };
                }
            }
        }

        // Cold path: search
        let found = timeline.segment_at(position_ms);
        let crossed = match self.current {
            None => found.is_some(),
            Some(previous) => previous != found,
        };
        self.current = Some(found);

        BoundaryCheck {
            crossed,
            current: found,
        }
    }

    /// Segment index from the last check, if any
    pub fn current(&self) -> Option<usize> {
        self.current.flatten()
    }

    /// Forget the cached position
    pub fn reset(&mut self) {
        self.current = None;
    }
}
