//! Workout definition and exercise models
//!
//! A `WorkoutDefinition` is the structural plan (exercise/rest/round blocks)
//! that the player flattens into a timeline. Definitions are supplied by the
//! host application; the JSON shape matches the one the FlowState web client
//! stores:
//!
//! ```json
//! {
//!   "id": "hiit-1",
//!   "name": "Quick HIIT",
//!   "blocks": [
//!     { "type": "exercise", "exerciseId": "squat", "duration": 30 },
//!     { "type": "round", "rounds": 3, "blocks": [
//!         { "type": "exercise", "exerciseId": "burpee", "duration": 20 },
//!         { "type": "rest", "duration": 10 }
//!     ] }
//!   ]
//! }
//! ```

use crate::Result;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

/// Exercise metadata, keyed by `id` in an [`ExerciseLookup`]
///
/// Opaque to the player: it is attached to work segments as payload and
/// never inspected for timing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Exercise {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub material: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub instructions: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail_url: Option<String>,
}

impl Exercise {
    /// Minimal exercise with only an id and display name
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            category: String::new(),
            material: String::new(),
            description: None,
            instructions: String::new(),
            video_url: None,
            thumbnail_url: None,
        }
    }
}

/// Exercise metadata indexed by exercise id
pub type ExerciseLookup = HashMap<String, Exercise>;

/// Build a lookup from a list of exercises (later duplicates win)
pub fn index_exercises(exercises: impl IntoIterator<Item = Exercise>) -> ExerciseLookup {
    exercises.into_iter().map(|e| (e.id.clone(), e)).collect()
}

/// Load a JSON array of exercises and index it by id
pub fn load_exercises(path: &Path) -> Result<ExerciseLookup> {
    let content = std::fs::read_to_string(path)?;
    let exercises: Vec<Exercise> = serde_json::from_str(&content)?;
    Ok(index_exercises(exercises))
}

/// One block of a workout plan
///
/// Durations are in seconds and may be fractional. Repeat counts are signed
/// so that a negative count in a hand-edited file reaches the flattener and
/// is reported, instead of failing deserialization with an opaque message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum WorkoutBlock {
    /// Timed work interval for one exercise
    Exercise {
        #[serde(rename = "exerciseId")]
        exercise_ref: String,
        #[serde(rename = "duration")]
        duration_seconds: f64,
    },

    /// Timed rest interval
    Rest {
        #[serde(rename = "duration")]
        duration_seconds: f64,
    },

    /// Contained blocks repeated `repeat_count` times
    Round {
        #[serde(rename = "rounds")]
        repeat_count: i32,
        blocks: Vec<WorkoutBlock>,
    },
}

impl WorkoutBlock {
    pub fn exercise(exercise_ref: impl Into<String>, duration_seconds: f64) -> Self {
        WorkoutBlock::Exercise {
            exercise_ref: exercise_ref.into(),
            duration_seconds,
        }
    }

    pub fn rest(duration_seconds: f64) -> Self {
        WorkoutBlock::Rest { duration_seconds }
    }

    pub fn round(repeat_count: i32, blocks: Vec<WorkoutBlock>) -> Self {
        WorkoutBlock::Round {
            repeat_count,
            blocks,
        }
    }
}

/// A complete workout plan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkoutDefinition {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub blocks: Vec<WorkoutBlock>,
}

impl WorkoutDefinition {
    pub fn new(id: impl Into<String>, name: impl Into<String>, blocks: Vec<WorkoutBlock>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            blocks,
        }
    }

    /// Parse a definition from its JSON form
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load a definition from a JSON file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json_str(&content)
    }
}
