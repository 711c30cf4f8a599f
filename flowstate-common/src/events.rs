//! Event types for the FlowState event system
//!
//! Provides the shared `PlayerEvent` definitions and the `EventBus` used by
//! the player to publish what it did. Hosts (terminal UI, a future web UI)
//! subscribe to the bus; the player never depends on anyone listening.

use crate::timeline::SegmentKind;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use uuid::Uuid;

/// Run status of the player
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PlaybackStatus {
    Idle,
    Running,
    Paused,
    Completed,
}

impl std::fmt::Display for PlaybackStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PlaybackStatus::Idle => write!(f, "idle"),
            PlaybackStatus::Running => write!(f, "running"),
            PlaybackStatus::Paused => write!(f, "paused"),
            PlaybackStatus::Completed => write!(f, "completed"),
        }
    }
}

/// Player event types
///
/// Events can be serialized (tagged by `type`) for forwarding to a UI.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum PlayerEvent {
    /// A workout was flattened and is now the active timeline
    WorkoutLoaded {
        workout_id: String,
        segment_count: usize,
        total_ms: u64,
        /// Exercise ids that could not be resolved
        warnings: Vec<String>,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// Run status changed
    StatusChanged {
        old_status: PlaybackStatus,
        new_status: PlaybackStatus,
        elapsed_ms: u64,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// A cue was handed to the audio backend
    CueScheduled {
        segment_id: Uuid,
        cue_id: String,
        /// Precise-clock seconds at which the backend should play it
        target_time: f64,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// All pending cues were cancelled
    CuesCancelled {
        /// How many segments had been handed off before cancellation
        count: usize,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// Playback crossed into a new segment
    SegmentStarted {
        segment_id: Uuid,
        index: usize,
        kind: SegmentKind,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// Elapsed time reached the end of the timeline
    WorkoutCompleted {
        workout_id: String,
        total_ms: u64,
        timestamp: chrono::DateTime<chrono::Utc>,
    },
}

/// Broadcast bus for `PlayerEvent`s
pub struct EventBus {
    tx: broadcast::Sender<PlayerEvent>,
    capacity: usize,
}

impl EventBus {
    /// Creates a new EventBus buffering up to `capacity` events per receiver
    ///
    /// # Examples
    ///
    /// ```
    /// use flowstate_common::events::EventBus;
    ///
    /// let event_bus = EventBus::new(256);
    /// assert_eq!(event_bus.capacity(), 256);
    /// ```
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx, capacity }
    }

    /// Subscribe to all future events
    pub fn subscribe(&self) -> broadcast::Receiver<PlayerEvent> {
        self.tx.subscribe()
    }

    /// Emit an event, returning the number of receivers
    #[allow(clippy::result_large_err)]
    pub fn emit(
        &self,
        event: PlayerEvent,
    ) -> Result<usize, broadcast::error::SendError<PlayerEvent>> {
        self.tx.send(event)
    }

    /// Emit an event, ignoring if no subscribers are listening
    pub fn emit_lossy(&self, event: PlayerEvent) {
        let _ = self.tx.send(event);
    }

    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(256)
    }
}
