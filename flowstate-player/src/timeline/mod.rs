//! Workout timeline: flattening, validation and segment tracking
//!
//! - `flattener`: workout definition → ordered segments
//! - `validated`: the immutable `Timeline` the player and scheduler consume
//! - `tracker`: which segment is current, and when that changes

pub mod flattener;
pub mod tracker;
pub mod validated;

pub use crate::error::ConfigError;
pub use flattener::{flatten, flatten_with_options, FlattenOptions, FlattenOutput, LookupWarning};
pub use tracker::SegmentTracker;
pub use validated::{Timeline, MAX_TIMELINE_MS};
