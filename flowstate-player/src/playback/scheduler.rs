//! Lookahead cue scheduler
//!
//! Maps timeline segments onto the audio backend's precise clock. The driving
//! tick is coarse and may jitter, so on every tick the scheduler commits all
//! cues due within the next `lookahead_window_ms` to the backend with an
//! exact target time, and remembers which segments it has handed off.
//!
//! **Selection per tick:**
//! - segment has an audio cue
//! - segment id is not in the scheduled set
//! - `elapsed <= start_offset < elapsed + window`
//!
//! Segments are visited in timeline order, so coincident cues are always
//! issued in sequence order. Correctness does not depend on tick cadence: a
//! late tick simply commits more cues at once, and segments whose start has
//! already passed are never scheduled retroactively.

use crate::audio::{AudioBackend, CueHandle};
use crate::timeline::Timeline;
use flowstate_common::config::DEFAULT_LOOKAHEAD_WINDOW_MS;
use flowstate_common::time::ms_to_secs;
use std::collections::HashSet;
use tracing::debug;
use uuid::Uuid;

/// A cue handed to the backend during one tick
#[derive(Debug, Clone, PartialEq)]
pub struct ScheduledCue {
    pub segment_id: Uuid,
    pub cue_id: String,
    pub start_offset_ms: u64,
    /// Backend precise-clock time (seconds) the cue was scheduled for
    pub target_time: f64,
    pub handle: CueHandle,
}

/// Commits upcoming cues to the audio backend at most once per segment
#[derive(Debug, Clone)]
pub struct LookaheadScheduler {
    lookahead_window_ms: u64,

    /// Segments handed to the backend since the last cancel
    scheduled: HashSet<Uuid>,
}

impl Default for LookaheadScheduler {
    fn default() -> Self {
        Self::new(DEFAULT_LOOKAHEAD_WINDOW_MS)
    }
}

impl LookaheadScheduler {
    pub fn new(lookahead_window_ms: u64) -> Self {
        Self {
            lookahead_window_ms,
            scheduled: HashSet::new(),
        }
    }

    pub fn lookahead_window_ms(&self) -> u64 {
        self.lookahead_window_ms
    }

    /// Schedule every due cue not yet handed off
    ///
    /// The backend clock is read at most once per tick, and only if something
    /// is scheduled, so every cue of one tick shares the same reference.
    pub fn on_tick<B: AudioBackend + ?Sized>(
        &mut self,
        timeline: &Timeline,
        elapsed_ms: u64,
        backend: &mut B,
    ) -> Vec<ScheduledCue> {
        let horizon_ms = elapsed_ms.saturating_add(self.lookahead_window_ms);
        let first = timeline.first_at_or_after(elapsed_ms);

        let mut hardware_now: Option<f64> = None;
        let mut issued = Vec::new();

        for segment in timeline.segments()[first..]
            .iter()
            .take_while(|s| s.start_offset_ms < horizon_ms)
        {
            let Some(cue_id) = segment.audio_cue_id.as_deref() else {
                continue;
            };
            if self.scheduled.contains(&segment.id) {
                continue;
            }

            let now = *hardware_now.get_or_insert_with(|| backend.current_hardware_time());
            let lead_secs = ms_to_secs(segment.start_offset_ms - elapsed_ms);
            let target_time = now + lead_secs;

            let handle = backend.schedule_cue(cue_id, target_time);
            self.scheduled.insert(segment.id);

            debug!(
                "Scheduled '{}' for segment {} at +{} ms ({} @ {:.3})",
                cue_id, segment.id, segment.start_offset_ms, handle, target_time
            );

            issued.push(ScheduledCue {
                segment_id: segment.id,
                cue_id: cue_id.to_string(),
                start_offset_ms: segment.start_offset_ms,
                target_time,
                handle,
            });
        }

        issued
    }

    /// Cancel everything on the backend and forget the scheduled set
    ///
    /// Returns how many segments had been scheduled.
    pub fn cancel_all<B: AudioBackend + ?Sized>(&mut self, backend: &mut B) -> usize {
        backend.cancel_all();
        let count = self.scheduled.len();
        self.scheduled.clear();
        debug!("Cancelled scheduled cues ({} segments)", count);
        count
    }

    /// Forget the scheduled set without touching the backend
    pub fn clear(&mut self) {
        self.scheduled.clear();
    }

    pub fn is_scheduled(&self, segment_id: &Uuid) -> bool {
        self.scheduled.contains(segment_id)
    }

    pub fn scheduled_count(&self) -> usize {
        self.scheduled.len()
    }
}
