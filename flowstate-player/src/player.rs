//! Workout player
//!
//! Owns the loaded timeline, the playback state machine, the lookahead
//! scheduler and the audio backend, and applies the side effects of every
//! state transition. All operations take `&mut self`, so a single owner
//! linearizes them; hosts that drive the player from several tasks wrap it in
//! a mutex.
//!
//! **Driving loop:**
//! 1. Host calls `on_tick(now_ms)` every few hundred milliseconds
//! 2. Natural completion is checked first
//! 3. While running, due cues are committed to the backend and segment
//!    changes are detected
//!
//! Control operations (`start`, `pause`, `resume`, `seek`, `reset`) never
//! schedule anything themselves; the next tick does.

use crate::audio::{AudioBackend, CueHandle};
use crate::playback::{LookaheadScheduler, PlaybackState, ScheduledCue, SideEffect, Transition, TransitionOutcome};
use crate::timeline::{flatten_with_options, ConfigError, FlattenOptions, LookupWarning, SegmentTracker, Timeline};
use flowstate_common::config::{TomlConfig, DEFAULT_LOOKAHEAD_WINDOW_MS};
use flowstate_common::events::{EventBus, PlaybackStatus, PlayerEvent};
use flowstate_common::time;
use flowstate_common::timeline::TimelineSegment;
use flowstate_common::workout::{ExerciseLookup, WorkoutDefinition};
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

/// Player tuning taken from configuration
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerSettings {
    pub lookahead_window_ms: u64,
    pub flatten: FlattenOptions,
}

impl Default for PlayerSettings {
    fn default() -> Self {
        Self {
            lookahead_window_ms: DEFAULT_LOOKAHEAD_WINDOW_MS,
            flatten: FlattenOptions::default(),
        }
    }
}

impl PlayerSettings {
    pub fn from_config(config: &TomlConfig) -> Self {
        Self {
            lookahead_window_ms: config.scheduler.lookahead_window_ms,
            flatten: FlattenOptions {
                prep_seconds: config.workout.prep_seconds,
                cooldown_seconds: config.workout.cooldown_seconds,
            },
        }
    }
}

/// What one tick did
#[derive(Debug, Clone, PartialEq)]
pub struct TickReport {
    pub elapsed_ms: u64,
    pub status: PlaybackStatus,
    /// Cues committed to the backend during this tick
    pub scheduled: Vec<ScheduledCue>,
    /// Index of the segment playback entered since the previous tick
    pub segment_started: Option<usize>,
    /// This tick completed the workout
    pub completed: bool,
}

/// Position snapshot for display or forwarding to a UI
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PlaybackProgress {
    pub elapsed_ms: u64,
    pub total_ms: u64,
    pub segment_index: Option<usize>,
    /// Time left in the current segment
    pub segment_remaining_ms: Option<u64>,
}

/// Coordinates timeline, state machine, scheduler and audio backend
pub struct WorkoutPlayer<B: AudioBackend> {
    backend: B,
    settings: PlayerSettings,
    workout_id: Option<String>,
    timeline: Timeline,
    state: PlaybackState,
    scheduler: LookaheadScheduler,
    tracker: SegmentTracker,
    event_bus: Arc<EventBus>,
}

impl<B: AudioBackend> WorkoutPlayer<B> {
    /// Idle player with an empty timeline
    pub fn new(backend: B, settings: PlayerSettings) -> Self {
        info!(
            "Creating workout player (lookahead window {} ms)",
            settings.lookahead_window_ms
        );
        Self {
            backend,
            scheduler: LookaheadScheduler::new(settings.lookahead_window_ms),
            settings,
            workout_id: None,
            timeline: Timeline::empty(),
            state: PlaybackState::new(0),
            tracker: SegmentTracker::new(),
            event_bus: Arc::new(EventBus::default()),
        }
    }

    /// Publish events on a shared bus instead of a private one
    pub fn with_event_bus(mut self, event_bus: Arc<EventBus>) -> Self {
        self.event_bus = event_bus;
        self
    }

    pub fn subscribe(&self) -> broadcast::Receiver<PlayerEvent> {
        self.event_bus.subscribe()
    }

    pub fn event_bus(&self) -> &Arc<EventBus> {
        &self.event_bus
    }

    /// Flatten `definition` and make it the active timeline
    ///
    /// Any run in progress is abandoned (cues cancelled, status back to
    /// idle). On error the previously loaded workout stays active.
    pub fn load_workout(
        &mut self,
        definition: &WorkoutDefinition,
        lookup: &ExerciseLookup,
    ) -> Result<Vec<LookupWarning>, ConfigError> {
        let output = flatten_with_options(definition, lookup, &self.settings.flatten)?;
        let timeline = Timeline::new(output.segments)?;

        if self.state.status() != PlaybackStatus::Idle {
            let outcome = self.state.reset();
            self.apply(outcome, 0);
        }

        info!(
            "Loaded workout '{}' ({}): {} segments, {} ms",
            definition.name,
            definition.id,
            timeline.len(),
            timeline.total_duration_ms()
        );
        for warning in &output.warnings {
            warn!("Workout '{}': {}", definition.id, warning);
        }

        self.state = PlaybackState::new(timeline.total_duration_ms());
        self.scheduler.clear();
        self.tracker.reset();
        self.event_bus.emit_lossy(PlayerEvent::WorkoutLoaded {
            workout_id: definition.id.clone(),
            segment_count: timeline.len(),
            total_ms: timeline.total_duration_ms(),
            warnings: output.warnings.iter().map(ToString::to_string).collect(),
            timestamp: time::now(),
        });
        self.timeline = timeline;
        self.workout_id = Some(definition.id.clone());

        Ok(output.warnings)
    }

    /// Idle → Running
    ///
    /// An empty timeline completes immediately.
    pub fn start(&mut self, now_ms: i64) -> TransitionOutcome {
        info!("Start command received");
        let outcome = self.state.start(now_ms);
        if outcome.is_applied() {
            self.tracker.reset();
        }
        self.apply(outcome, now_ms);
        if let Some(transition) = self.state.check_completion(now_ms) {
            self.finish(transition);
        }
        outcome
    }

    /// Running → Paused, cancelling scheduled cues
    pub fn pause(&mut self, now_ms: i64) -> TransitionOutcome {
        info!("Pause command received");
        let outcome = self.state.pause(now_ms);
        self.apply(outcome, now_ms)
    }

    /// Paused → Running
    pub fn resume(&mut self, now_ms: i64) -> TransitionOutcome {
        info!("Resume command received");
        let outcome = self.state.resume(now_ms);
        self.apply(outcome, now_ms)
    }

    /// Jump to `offset_ms`, cancelling scheduled cues
    pub fn seek(&mut self, now_ms: i64, offset_ms: u64) -> TransitionOutcome {
        info!("Seek command received: {} ms", offset_ms);
        let outcome = self.state.seek(now_ms, offset_ms);
        if outcome.is_applied() {
            self.tracker.reset();
        }
        self.apply(outcome, now_ms)
    }

    /// Any → Idle, cancelling scheduled cues
    pub fn reset(&mut self) -> TransitionOutcome {
        info!("Reset command received");
        let outcome = self.state.reset();
        self.tracker.reset();
        self.apply(outcome, 0)
    }

    /// Advance the player to `now_ms`
    pub fn on_tick(&mut self, now_ms: i64) -> TickReport {
        let completed = match self.state.check_completion(now_ms) {
            Some(transition) => {
                self.finish(transition);
                true
            }
            None => false,
        };

        let elapsed_ms = self.state.elapsed(now_ms);
        let status = self.state.status();
        let mut report = TickReport {
            elapsed_ms,
            status,
            scheduled: Vec::new(),
            segment_started: None,
            completed,
        };
        if status != PlaybackStatus::Running {
            return report;
        }

        report.scheduled = self
            .scheduler
            .on_tick(&self.timeline, elapsed_ms, &mut self.backend);
        for cue in &report.scheduled {
            self.event_bus.emit_lossy(PlayerEvent::CueScheduled {
                segment_id: cue.segment_id,
                cue_id: cue.cue_id.clone(),
                target_time: cue.target_time,
                timestamp: time::now(),
            });
        }

        let check = self.tracker.check_boundary(&self.timeline, elapsed_ms);
        if let (true, Some(index)) = (check.crossed, check.current) {
            if let Some(segment) = self.timeline.get(index) {
                info!(
                    "Segment {}/{} started: {} at {} ms",
                    index + 1,
                    self.timeline.len(),
                    segment.kind,
                    segment.start_offset_ms
                );
                self.event_bus.emit_lossy(PlayerEvent::SegmentStarted {
                    segment_id: segment.id,
                    index,
                    kind: segment.kind,
                    timestamp: time::now(),
                });
                report.segment_started = Some(index);
            }
        }

        report
    }

    /// Play `cue_id` right now, outside the timeline
    ///
    /// Preview cues are not tracked by the scheduler and are cancelled along
    /// with everything else on the next pause/seek/reset.
    pub fn preview_cue(&mut self, cue_id: &str) -> CueHandle {
        let now = self.backend.current_hardware_time();
        debug!("Previewing cue '{}'", cue_id);
        self.backend.schedule_cue(cue_id, now)
    }

    pub fn status(&self) -> PlaybackStatus {
        self.state.status()
    }

    pub fn elapsed(&self, now_ms: i64) -> u64 {
        self.state.elapsed(now_ms)
    }

    pub fn timeline(&self) -> &Timeline {
        &self.timeline
    }

    pub fn workout_id(&self) -> Option<&str> {
        self.workout_id.as_deref()
    }

    pub fn settings(&self) -> &PlayerSettings {
        &self.settings
    }

    pub fn scheduler(&self) -> &LookaheadScheduler {
        &self.scheduler
    }

    /// Segment covering the playback position at `now_ms`
    pub fn current_segment(&self, now_ms: i64) -> Option<&TimelineSegment> {
        self.timeline
            .segment_at(self.state.elapsed(now_ms))
            .and_then(|index| self.timeline.get(index))
    }

    pub fn progress(&self, now_ms: i64) -> PlaybackProgress {
        let elapsed_ms = self.state.elapsed(now_ms);
        let segment_index = match self.state.status() {
            PlaybackStatus::Completed => None,
            _ => self.timeline.segment_at(elapsed_ms),
        };
        let segment_remaining_ms = segment_index
            .and_then(|index| self.timeline.get(index))
            .map(|segment| segment.end_offset_ms().saturating_sub(elapsed_ms));

        PlaybackProgress {
            elapsed_ms,
            total_ms: self.timeline.total_duration_ms(),
            segment_index,
            segment_remaining_ms,
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    /// Apply a transition's side effect and publish it
    fn apply(&mut self, outcome: TransitionOutcome, now_ms: i64) -> TransitionOutcome {
        let transition = match outcome {
            TransitionOutcome::Applied(transition) => transition,
            TransitionOutcome::Ignored(ignored) => {
                debug!("Ignoring {} while {}", ignored.operation, ignored.status);
                return outcome;
            }
        };

        if transition.effect == SideEffect::CancelScheduled {
            let count = self.scheduler.cancel_all(&mut self.backend);
            self.event_bus.emit_lossy(PlayerEvent::CuesCancelled {
                count,
                timestamp: time::now(),
            });
        }

        if transition.from != transition.to {
            info!("Playback state changed: {} -> {}", transition.from, transition.to);
            self.event_bus.emit_lossy(PlayerEvent::StatusChanged {
                old_status: transition.from,
                new_status: transition.to,
                elapsed_ms: self.state.elapsed(now_ms),
                timestamp: time::now(),
            });
        }

        outcome
    }

    fn finish(&mut self, transition: Transition) {
        let total_ms = self.timeline.total_duration_ms();
        self.apply(TransitionOutcome::Applied(transition), 0);
        info!("Workout completed ({} ms)", total_ms);
        self.event_bus.emit_lossy(PlayerEvent::WorkoutCompleted {
            workout_id: self.workout_id.clone().unwrap_or_default(),
            total_ms,
            timestamp: time::now(),
        });
    }
}
