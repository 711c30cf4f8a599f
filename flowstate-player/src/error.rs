//! Error types for flowstate-player
//!
//! `ConfigError` covers definitions and timelines that cannot be played.
//! Missing exercise metadata is not an error (see `timeline::LookupWarning`)
//! and ignored transitions are reported as values, not errors.

use thiserror::Error;

/// A workout definition or timeline that violates a timing invariant
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// Block (or prep/cooldown) duration is zero, negative, not finite, or
    /// rounds to 0 ms
    #[error("{path}: duration must be a positive number of seconds (at least 1 ms), got {seconds}")]
    NonPositiveDuration { path: String, seconds: f64 },

    /// Block (or prep/cooldown) duration longer than a timeline can hold
    #[error("{path}: duration of {seconds} s exceeds the longest playable timeline")]
    DurationTooLong { path: String, seconds: f64 },

    /// Segments end past the longest offset the player clock can represent
    #[error("timeline runs past {limit_ms} ms")]
    TimelineTooLong { limit_ms: u64 },

    /// Round with a negative repeat count
    #[error("{path}: repeat count must not be negative, got {count}")]
    NegativeRepeatCount { path: String, count: i32 },

    /// Unrolling the definition would produce an unreasonable number of segments
    #[error("workout unrolls to {count} segments, more than the limit of {limit}")]
    TooManySegments { count: u64, limit: u64 },

    /// Segment handed to `Timeline::new` with a zero duration
    #[error("segment {index} has zero duration")]
    NonPositiveSegment { index: usize },

    /// Segment starts before its predecessor
    #[error("segment {index} starts at {start_ms} ms, before previous segment at {previous_ms} ms")]
    UnsortedTimeline {
        index: usize,
        start_ms: u64,
        previous_ms: u64,
    },

    /// Two segments share an id
    #[error("segment {index} reuses id {id}")]
    DuplicateSegmentId { index: usize, id: uuid::Uuid },
}

/// Main error type for flowstate-player
#[derive(Error, Debug)]
pub enum Error {
    /// Workout or timeline configuration error
    #[error("Timeline configuration error: {0}")]
    Timeline(#[from] ConfigError),

    /// Errors from the shared library (I/O, parsing, config files)
    #[error(transparent)]
    Common(#[from] flowstate_common::Error),

    /// Unrecognized or malformed host command
    #[error("Invalid command: {0}")]
    InvalidCommand(String),
}

/// Convenience Result type using flowstate-player Error
pub type Result<T> = std::result::Result<T, Error>;
