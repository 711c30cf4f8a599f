//! Recording audio backend
//!
//! Silent backend that records every command it receives. Its precise clock
//! is set by hand, which makes it the backend of choice for tests, benches
//! and dry runs.

use super::backend::{AudioBackend, CueHandle};
use std::collections::HashSet;
use tracing::{debug, warn};

/// One `schedule_cue` call as seen by the backend
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedCue {
    pub handle: CueHandle,
    pub cue_id: String,
    pub target_time: f64,
    /// False when the cue id was not in the known set (fallback played)
    pub resolved: bool,
}

/// Backend that records commands instead of playing sound
#[derive(Debug, Default)]
pub struct RecordingBackend {
    clock_secs: f64,
    next_handle: u64,
    scheduled: Vec<RecordedCue>,
    /// Handles issued since the last cancel
    live: Vec<CueHandle>,
    cancel_count: usize,
    /// Resolvable cue ids; `None` resolves everything
    known_cues: Option<HashSet<String>>,
}

impl RecordingBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Backend that only resolves the given cue ids
    pub fn with_known_cues<I, S>(cues: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            known_cues: Some(cues.into_iter().map(Into::into).collect()),
            ..Self::default()
        }
    }

    /// Set the precise clock (seconds)
    pub fn set_time(&mut self, secs: f64) {
        self.clock_secs = secs;
    }

    /// Advance the precise clock (seconds)
    pub fn advance(&mut self, secs: f64) {
        self.clock_secs += secs;
    }

    /// Every cue ever scheduled, in call order
    pub fn scheduled(&self) -> &[RecordedCue] {
        &self.scheduled
    }

    /// Cues scheduled since the last `cancel_all`
    pub fn live(&self) -> impl Iterator<Item = &RecordedCue> {
        self.scheduled
            .iter()
            .filter(move |cue| self.live.contains(&cue.handle))
    }

    pub fn live_count(&self) -> usize {
        self.live.len()
    }

    pub fn cancel_count(&self) -> usize {
        self.cancel_count
    }

    /// Forget recorded history (clock and known cues are kept)
    pub fn clear_history(&mut self) {
        self.scheduled.clear();
        self.live.clear();
        self.cancel_count = 0;
    }
}

impl AudioBackend for RecordingBackend {
    fn schedule_cue(&mut self, cue_id: &str, target_time: f64) -> CueHandle {
        let handle = CueHandle(self.next_handle);
        self.next_handle += 1;

        let resolved = self
            .known_cues
            .as_ref()
            .map_or(true, |known| known.contains(cue_id));
        if !resolved {
            warn!("Audio asset not found: {} ({}), recording fallback", cue_id, handle);
        }
        debug!("Recorded {} '{}' at {:.3}", handle, cue_id, target_time);

        self.scheduled.push(RecordedCue {
            handle,
            cue_id: cue_id.to_string(),
            target_time,
            resolved,
        });
        self.live.push(handle);
        handle
    }

    fn cancel_all(&mut self) {
        self.live.clear();
        self.cancel_count += 1;
    }

    fn current_hardware_time(&self) -> f64 {
        self.clock_secs
    }
}
