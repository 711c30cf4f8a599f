//! # FlowState Workout Player Library (flowstate-player)
//!
//! Core of the timed-workout player.
//!
//! **Purpose:** Flatten nested workout definitions into an ordered timeline,
//! track run status across pause/resume/seek/reset, and commit audio cues to
//! a precise clock ahead of time so they fire exactly once and on time
//! despite a coarse driving tick.
//!
//! **Architecture:** `WorkoutPlayer` owns a validated `Timeline`, a
//! `PlaybackState` machine, a `LookaheadScheduler` and an `AudioBackend`.
//! The host drives it with `on_tick(now_ms)`; sound output lives entirely
//! behind the backend trait.

pub mod audio;
pub mod commands;
pub mod error;
pub mod playback;
pub mod player;
pub mod timeline;

pub use error::{ConfigError, Error, Result};
pub use player::{PlaybackProgress, PlayerSettings, TickReport, WorkoutPlayer};
