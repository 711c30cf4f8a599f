//! Playback state machine
//!
//! Holds the run status and the wall-clock reference used to derive elapsed
//! playback time.
//!
//! **Transitions:**
//! - `start`: Idle → Running
//! - `pause`: Running → Paused (cancels scheduled cues)
//! - `resume`: Paused → Running (reference shifted by the paused span)
//! - `seek`: Running/Paused → same status, new position (cancels scheduled cues)
//! - `check_completion`: Running → Completed once elapsed reaches the end
//! - `reset`: any → Idle (cancels scheduled cues)
//!
//! The machine never reads a clock: every method takes the host's `now_ms`
//! (epoch milliseconds). Each transition returns the side effect the owner
//! must apply, which is how cancellation reaches the scheduler.

use flowstate_common::events::PlaybackStatus;

/// Work the owner of the state machine must do after a transition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SideEffect {
    None,
    /// Cancel every cue handed to the audio backend and clear the scheduled set
    CancelScheduled,
}

/// An applied status change
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub from: PlaybackStatus,
    pub to: PlaybackStatus,
    pub effect: SideEffect,
}

/// A transition requested in a status that does not allow it
///
/// Not an error: the request is simply a no-op.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransitionIgnored {
    pub operation: &'static str,
    pub status: PlaybackStatus,
}

/// Outcome of a transition request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionOutcome {
    Applied(Transition),
    Ignored(TransitionIgnored),
}

impl TransitionOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, TransitionOutcome::Applied(_))
    }

    pub fn transition(&self) -> Option<Transition> {
        match self {
            TransitionOutcome::Applied(t) => Some(*t),
            TransitionOutcome::Ignored(_) => None,
        }
    }

    /// Side effect to apply (`None` when ignored)
    pub fn effect(&self) -> SideEffect {
        self.transition().map_or(SideEffect::None, |t| t.effect)
    }
}

/// Run status plus the time reference for elapsed-time computation
#[derive(Debug, Clone)]
pub struct PlaybackState {
    status: PlaybackStatus,

    /// Wall-clock instant such that `elapsed = now - reference` while running
    reference_start_epoch_ms: Option<i64>,

    /// Wall-clock instant of the pause (Paused only)
    paused_at_epoch_ms: Option<i64>,

    /// End of the loaded timeline
    total_duration_ms: u64,
}

impl PlaybackState {
    /// Idle state for a timeline of the given length
    pub fn new(total_duration_ms: u64) -> Self {
        Self {
            status: PlaybackStatus::Idle,
            reference_start_epoch_ms: None,
            paused_at_epoch_ms: None,
            total_duration_ms,
        }
    }

    pub fn status(&self) -> PlaybackStatus {
        self.status
    }

    pub fn reference_start_epoch_ms(&self) -> Option<i64> {
        self.reference_start_epoch_ms
    }

    pub fn total_duration_ms(&self) -> u64 {
        self.total_duration_ms
    }

    /// Elapsed playback time at `now_ms`
    ///
    /// - Idle: 0
    /// - Running: `now - reference` (saturating at 0 if the clock stepped back)
    /// - Paused: frozen at the pause instant
    /// - Completed: total duration
    pub fn elapsed(&self, now_ms: i64) -> u64 {
        match self.status {
            PlaybackStatus::Idle => 0,
            PlaybackStatus::Running => self.elapsed_at(now_ms),
            PlaybackStatus::Paused => self
                .paused_at_epoch_ms
                .map_or(0, |paused_at| self.elapsed_at(paused_at)),
            PlaybackStatus::Completed => self.total_duration_ms,
        }
    }

    fn elapsed_at(&self, instant_ms: i64) -> u64 {
        self.reference_start_epoch_ms
            .map_or(0, |reference| instant_ms.saturating_sub(reference).max(0) as u64)
    }

    /// Idle → Running
    pub fn start(&mut self, now_ms: i64) -> TransitionOutcome {
        match self.status {
            PlaybackStatus::Idle => {
                self.reference_start_epoch_ms = Some(now_ms);
                self.paused_at_epoch_ms = None;
                self.apply(PlaybackStatus::Running, SideEffect::None)
            }
            status => Self::ignored("start", status),
        }
    }

    /// Running → Paused
    pub fn pause(&mut self, now_ms: i64) -> TransitionOutcome {
        match self.status {
            PlaybackStatus::Running => {
                self.paused_at_epoch_ms = Some(now_ms);
                self.apply(PlaybackStatus::Paused, SideEffect::CancelScheduled)
            }
            status => Self::ignored("pause", status),
        }
    }

    /// Paused → Running, keeping elapsed time continuous
    pub fn resume(&mut self, now_ms: i64) -> TransitionOutcome {
        match self.status {
            PlaybackStatus::Paused => {
                if let (Some(reference), Some(paused_at)) =
                    (self.reference_start_epoch_ms, self.paused_at_epoch_ms)
                {
                    let paused_for = now_ms.saturating_sub(paused_at).max(0);
                    self.reference_start_epoch_ms = Some(reference.saturating_add(paused_for));
                }
                self.paused_at_epoch_ms = None;
                self.apply(PlaybackStatus::Running, SideEffect::None)
            }
            status => Self::ignored("resume", status),
        }
    }

    /// Move the playback position to `offset_ms` (clamped to the timeline)
    ///
    /// While running, playback continues from the new position. While
    /// paused, the frozen position changes and a later resume continues from
    /// it.
    pub fn seek(&mut self, now_ms: i64, offset_ms: u64) -> TransitionOutcome {
        let offset = i64::try_from(offset_ms.min(self.total_duration_ms)).unwrap_or(i64::MAX);
        match self.status {
            PlaybackStatus::Running => {
                self.reference_start_epoch_ms = Some(now_ms.saturating_sub(offset));
                self.apply(PlaybackStatus::Running, SideEffect::CancelScheduled)
            }
            PlaybackStatus::Paused => {
                let paused_at = *self.paused_at_epoch_ms.get_or_insert(now_ms);
                self.reference_start_epoch_ms = Some(paused_at.saturating_sub(offset));
                self.apply(PlaybackStatus::Paused, SideEffect::CancelScheduled)
            }
            status => Self::ignored("seek", status),
        }
    }

    /// Any → Idle
    pub fn reset(&mut self) -> TransitionOutcome {
        self.reference_start_epoch_ms = None;
        self.paused_at_epoch_ms = None;
        self.apply(PlaybackStatus::Idle, SideEffect::CancelScheduled)
    }

    /// Running → Completed once elapsed reaches the end of the timeline
    ///
    /// Natural completion cancels nothing: no cue remains to be scheduled.
    pub fn check_completion(&mut self, now_ms: i64) -> Option<Transition> {
        if self.status == PlaybackStatus::Running && self.elapsed(now_ms) >= self.total_duration_ms {
            self.apply(PlaybackStatus::Completed, SideEffect::None).transition()
        } else {
            None
        }
    }

    fn apply(&mut self, to: PlaybackStatus, effect: SideEffect) -> TransitionOutcome {
        let from = self.status;
        self.status = to;
        TransitionOutcome::Applied(Transition { from, to, effect })
    }

    fn ignored(operation: &'static str, status: PlaybackStatus) -> TransitionOutcome {
        TransitionOutcome::Ignored(TransitionIgnored { operation, status })
    }
}
