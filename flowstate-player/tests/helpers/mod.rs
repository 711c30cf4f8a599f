//! Test helpers for flowstate-player integration tests
//!
//! Provides a fixed host clock origin, workout builders and a player wired
//! to the recording backend.

#![allow(dead_code)]

use flowstate_common::workout::{Exercise, ExerciseLookup, WorkoutBlock, WorkoutDefinition};
use flowstate_player::audio::RecordingBackend;
use flowstate_player::{PlayerSettings, WorkoutPlayer};

/// Host wall-clock origin used by every test (epoch ms)
pub const T0: i64 = 1_700_000_000_000;

pub type TestPlayer = WorkoutPlayer<RecordingBackend>;

/// Player with default settings and a recording backend
pub fn test_player() -> TestPlayer {
    WorkoutPlayer::new(RecordingBackend::new(), PlayerSettings::default())
}

/// Player with the given settings
pub fn test_player_with(settings: PlayerSettings) -> TestPlayer {
    WorkoutPlayer::new(RecordingBackend::new(), settings)
}

/// Squat, push-up and plank
pub fn exercise_library() -> ExerciseLookup {
    let mut squat = Exercise::new("squat", "Squat");
    squat.category = "legs".to_string();
    let mut push_up = Exercise::new("push-up", "Push-up");
    push_up.category = "upper".to_string();
    let plank = Exercise::new("plank", "Plank");
    flowstate_common::workout::index_exercises([squat, push_up, plank])
}

/// 3 rounds of (squat 10 s, rest 5 s): 6 segments, 45 s
pub fn three_round_workout() -> WorkoutDefinition {
    WorkoutDefinition::new(
        "three-rounds",
        "Three Rounds",
        vec![WorkoutBlock::round(
            3,
            vec![WorkoutBlock::exercise("squat", 10.0), WorkoutBlock::rest(5.0)],
        )],
    )
}

/// Eight 1 s work segments back to back: 8 s
pub fn one_second_workout() -> WorkoutDefinition {
    WorkoutDefinition::new(
        "one-second",
        "One Second Drills",
        vec![WorkoutBlock::round(8, vec![WorkoutBlock::exercise("plank", 1.0)])],
    )
}

/// Player loaded with `definition` against the standard library
pub fn loaded_player(definition: &WorkoutDefinition) -> TestPlayer {
    let mut player = test_player();
    player
        .load_workout(definition, &exercise_library())
        .expect("fixture workout loads");
    player
}

/// Cue ids currently live on the backend, in scheduling order
pub fn live_cue_ids(player: &TestPlayer) -> Vec<String> {
    player.backend().live().map(|cue| cue.cue_id.clone()).collect()
}
