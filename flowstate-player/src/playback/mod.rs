//! Playback state and cue scheduling

pub mod scheduler;
pub mod state;

pub use scheduler::{LookaheadScheduler, ScheduledCue};
pub use state::{PlaybackState, SideEffect, Transition, TransitionIgnored, TransitionOutcome};
