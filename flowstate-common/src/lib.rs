//! # FlowState Common Library
//!
//! Shared code for the FlowState workout player including:
//! - Workout definition and exercise models
//! - Timeline segment types produced by the flattener
//! - Player event types (PlayerEvent enum) and the EventBus
//! - Configuration loading
//! - Time helpers and human-readable time formatting

pub mod config;
pub mod error;
pub mod events;
pub mod human_time;
pub mod time;
pub mod timeline;
pub mod workout;

pub use error::{Error, Result};
pub use timeline::{SegmentKind, TimelineSegment};
pub use workout::{Exercise, ExerciseLookup, WorkoutBlock, WorkoutDefinition};
