//! Validated, immutable timeline
//!
//! `Timeline::new` is the last gate before segments reach the scheduler:
//! every segment has a positive duration, offsets never decrease, ids are
//! unique and nothing ends past `MAX_TIMELINE_MS`. Downstream code relies on these invariants and does not re-check
//! them.

use crate::error::ConfigError;
use flowstate_common::timeline::TimelineSegment;
use std::collections::HashSet;

/// Longest timeline the player accepts
///
/// Elapsed time is derived from signed epoch milliseconds, so every offset
/// must fit in an `i64`.
pub const MAX_TIMELINE_MS: u64 = i64::MAX as u64;

/// Ordered segments of one workout run
#[derive(Debug, Clone, Default)]
pub struct Timeline {
    /// Sorted by `start_offset_ms` ascending (validated, not sorted here)
    segments: Vec<TimelineSegment>,

    /// End offset of the last segment
    total_duration_ms: u64,
}

impl Timeline {
    /// Validate segments and wrap them in a timeline
    ///
    /// Segments must already be in playback order. Out-of-order input is a
    /// caller bug and is rejected rather than sorted.
    pub fn new(segments: Vec<TimelineSegment>) -> Result<Self, ConfigError> {
        let mut seen = HashSet::with_capacity(segments.len());
        let mut previous_ms: Option<u64> = None;
        let mut total_duration_ms = 0;

        for (index, segment) in segments.iter().enumerate() {
            if segment.duration_ms == 0 {
                return Err(ConfigError::NonPositiveSegment { index });
            }
            if let Some(previous_ms) = previous_ms {
                if segment.start_offset_ms < previous_ms {
                    return Err(ConfigError::UnsortedTimeline {
                        index,
                        start_ms: segment.start_offset_ms,
                        previous_ms,
                    });
                }
            }
            if !seen.insert(segment.id) {
                return Err(ConfigError::DuplicateSegmentId {
                    index,
                    id: segment.id,
                });
            }
            let end_ms = segment
                .start_offset_ms
                .checked_add(segment.duration_ms)
                .filter(|end| *end <= MAX_TIMELINE_MS)
                .ok_or(ConfigError::TimelineTooLong {
                    limit_ms: MAX_TIMELINE_MS,
                })?;
            previous_ms = Some(segment.start_offset_ms);
            total_duration_ms = total_duration_ms.max(end_ms);
        }

        Ok(Self {
            segments,
            total_duration_ms,
        })
    }

    /// An empty timeline (nothing loaded)
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn segments(&self) -> &[TimelineSegment] {
        &self.segments
    }

    pub fn get(&self, index: usize) -> Option<&TimelineSegment> {
        self.segments.get(index)
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// End of the run (0 for an empty timeline)
    pub fn total_duration_ms(&self) -> u64 {
        self.total_duration_ms
    }

    /// Index of the first segment starting at or after `offset_ms`
    ///
    /// Returns `len()` if every segment starts earlier.
    pub fn first_at_or_after(&self, offset_ms: u64) -> usize {
        self.segments
            .partition_point(|s| s.start_offset_ms < offset_ms)
    }

    /// Index of the segment covering `position_ms`
    ///
    /// If segments overlap, the one that started most recently wins. Returns
    /// `None` before the first segment, in a gap, or past the end.
    pub fn segment_at(&self, position_ms: u64) -> Option<usize> {
        let started = self
            .segments
            .partition_point(|s| s.start_offset_ms <= position_ms);
        let index = started.checked_sub(1)?;
        self.segments[index].contains(position_ms).then_some(index)
    }
}
