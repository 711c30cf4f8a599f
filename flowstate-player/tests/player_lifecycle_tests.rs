//! Player lifecycle integration tests
//!
//! Drives `WorkoutPlayer` through load/start/pause/resume/seek/reset with a
//! recording backend and a hand-advanced host clock, checking what reaches
//! the backend at each step.

mod helpers;

use flowstate_common::events::{PlaybackStatus, PlayerEvent};
use flowstate_common::timeline::SegmentKind;
use flowstate_common::workout::{ExerciseLookup, WorkoutBlock, WorkoutDefinition};
use flowstate_player::playback::SideEffect;
use flowstate_player::timeline::FlattenOptions;
use flowstate_player::{ConfigError, PlayerSettings};
use helpers::*;
use std::collections::HashSet;

#[test]
fn test_pause_continuity_through_player() {
    let mut player = loaded_player(&three_round_workout());

    player.start(T0);
    player.pause(T0 + 2_000);
    player.resume(T0 + 9_000);

    assert_eq!(player.elapsed(T0 + 9_500), 2_500);
    assert_eq!(player.status(), PlaybackStatus::Running);
}

#[test]
fn test_pause_cancels_and_resume_reschedules_remaining() {
    let mut player = loaded_player(&one_second_workout());
    player.start(T0);

    let report = player.on_tick(T0);
    assert_eq!(report.scheduled.len(), 5); // offsets 0..=4000

    let outcome = player.pause(T0 + 1_500);
    assert_eq!(outcome.effect(), SideEffect::CancelScheduled);
    assert_eq!(player.backend().cancel_count(), 1);
    assert_eq!(player.scheduler().scheduled_count(), 0);

    // Ticks while paused do nothing
    assert!(player.on_tick(T0 + 3_000).scheduled.is_empty());

    player.resume(T0 + 10_000);
    let report = player.on_tick(T0 + 10_000);
    let offsets: Vec<u64> = report.scheduled.iter().map(|c| c.start_offset_ms).collect();
    // elapsed 1500: segments at 2000..=6000 are due, 1000 has already started
    assert_eq!(offsets, vec![2_000, 3_000, 4_000, 5_000, 6_000]);
}

#[test]
fn test_reset_cancels_exactly_once_and_reschedules_from_scratch() {
    let mut player = loaded_player(&one_second_workout());
    player.start(T0);
    player.on_tick(T0);
    player.on_tick(T0 + 250);
    player.on_tick(T0 + 1_000);
    let scheduled_before = player.backend().scheduled().len();
    assert_eq!(scheduled_before, 6);

    player.reset();
    assert_eq!(player.backend().cancel_count(), 1);
    assert_eq!(player.backend().live_count(), 0);
    assert_eq!(player.scheduler().scheduled_count(), 0);
    assert_eq!(player.status(), PlaybackStatus::Idle);
    assert_eq!(player.elapsed(T0 + 5_000), 0);

    player.start(T0 + 20_000);
    let report = player.on_tick(T0 + 20_000);
    let offsets: Vec<u64> = report.scheduled.iter().map(|c| c.start_offset_ms).collect();
    assert_eq!(offsets, vec![0, 1_000, 2_000, 3_000, 4_000]);
    assert_eq!(player.backend().cancel_count(), 1);
}

#[test]
fn test_at_most_once_over_a_full_run() {
    let mut player = loaded_player(&three_round_workout());
    player.start(T0);

    // Irregular tick cadence
    let mut now = T0;
    for step in [
        0, 100, 400, 250, 1_700, 3_000, 90, 500, 7_000, 250, 250, 7_460, 5_000, 10_000, 10_000,
    ] {
        now += step;
        player.on_tick(now);
    }
    assert_eq!(player.status(), PlaybackStatus::Completed);

    let scheduled = player.backend().scheduled();
    assert_eq!(scheduled.len(), 6);
    assert_eq!(player.backend().cancel_count(), 0);

    let cue_ids: Vec<&str> = scheduled.iter().map(|c| c.cue_id.as_str()).collect();
    assert_eq!(
        cue_ids,
        vec!["start-work", "start-rest", "start-work", "start-rest", "start-work", "start-rest"]
    );
}

#[test]
fn test_target_times_follow_hardware_clock() {
    let mut player = loaded_player(&three_round_workout());
    player.backend_mut().set_time(500.0);
    player.start(T0);

    let report = player.on_tick(T0 + 7_000);
    // elapsed 7000: segment at 10000 is 3 s ahead on the precise clock
    assert_eq!(report.scheduled.len(), 1);
    let cue = &report.scheduled[0];
    assert_eq!(cue.start_offset_ms, 10_000);
    assert!((cue.target_time - 503.0).abs() < 1e-9);
}

#[test]
fn test_seek_cancels_and_reschedules_from_new_position() {
    let mut player = loaded_player(&three_round_workout());
    player.start(T0);
    player.on_tick(T0);
    assert_eq!(player.backend().scheduled().len(), 1);

    let outcome = player.seek(T0 + 1_000, 24_000);
    assert!(outcome.is_applied());
    assert_eq!(player.backend().cancel_count(), 1);
    assert_eq!(player.elapsed(T0 + 1_000), 24_000);

    let report = player.on_tick(T0 + 1_000);
    let offsets: Vec<u64> = report.scheduled.iter().map(|c| c.start_offset_ms).collect();
    assert_eq!(offsets, vec![25_000]);
    // 24000 falls inside the second squat (15000..25000)
    assert_eq!(report.segment_started, Some(2));
}

#[test]
fn test_seek_while_idle_is_ignored() {
    let mut player = loaded_player(&three_round_workout());
    let outcome = player.seek(T0, 10_000);
    assert!(!outcome.is_applied());
    assert_eq!(player.backend().cancel_count(), 0);
    assert_eq!(player.elapsed(T0), 0);
}

#[test]
fn test_natural_completion_does_not_cancel() {
    let mut player = loaded_player(&one_second_workout());
    player.start(T0);
    player.on_tick(T0);
    player.on_tick(T0 + 4_000);

    let report = player.on_tick(T0 + 8_000);
    assert!(report.completed);
    assert_eq!(report.status, PlaybackStatus::Completed);
    assert_eq!(report.elapsed_ms, 8_000);
    assert_eq!(player.backend().cancel_count(), 0);

    // Completed is terminal until reset
    assert!(!player.start(T0 + 9_000).is_applied());
    assert!(!player.on_tick(T0 + 9_000).completed);
}

#[test]
fn test_empty_workout_completes_on_start() {
    let mut player = test_player();
    let empty = WorkoutDefinition::new("empty", "Nothing", vec![]);
    let warnings = player.load_workout(&empty, &ExerciseLookup::new()).unwrap();
    assert!(warnings.is_empty());
    assert!(player.timeline().is_empty());

    player.start(T0);
    assert_eq!(player.status(), PlaybackStatus::Completed);
    let report = player.on_tick(T0 + 1_000);
    assert!(report.scheduled.is_empty());
    assert!(player.backend().scheduled().is_empty());
}

#[test]
fn test_loading_while_running_abandons_run() {
    let mut player = loaded_player(&three_round_workout());
    player.start(T0);
    player.on_tick(T0);

    player
        .load_workout(&one_second_workout(), &exercise_library())
        .unwrap();
    assert_eq!(player.status(), PlaybackStatus::Idle);
    assert_eq!(player.backend().cancel_count(), 1);
    assert_eq!(player.workout_id(), Some("one-second"));
    assert_eq!(player.timeline().total_duration_ms(), 8_000);
}

#[test]
fn test_missing_exercises_are_warnings() {
    let mut player = test_player();
    let definition = WorkoutDefinition::new(
        "mixed",
        "Mixed",
        vec![
            WorkoutBlock::exercise("squat", 5.0),
            WorkoutBlock::exercise("burpee", 5.0),
        ],
    );
    let warnings = player.load_workout(&definition, &exercise_library()).unwrap();

    assert_eq!(warnings.len(), 1);
    assert_eq!(warnings[0].exercise_ref, "burpee");
    assert_eq!(warnings[0].path, "blocks[1]");

    let segments = player.timeline().segments();
    assert_eq!(segments.len(), 2);
    assert!(segments[0].exercise.is_some());
    assert!(segments[1].exercise.is_none());
    assert_eq!(segments[1].start_offset_ms, 5_000);
}

#[test]
fn test_invalid_definition_is_config_error() {
    let mut player = test_player();
    let definition = WorkoutDefinition::new(
        "bad",
        "Bad",
        vec![WorkoutBlock::round(-2, vec![WorkoutBlock::rest(5.0)])],
    );
    let err = player.load_workout(&definition, &exercise_library()).unwrap_err();
    assert!(matches!(err, ConfigError::NegativeRepeatCount { count: -2, .. }));
    assert_eq!(player.workout_id(), None);
}

#[test]
fn test_prep_and_cooldown_settings() {
    let settings = PlayerSettings {
        flatten: FlattenOptions {
            prep_seconds: Some(5.0),
            cooldown_seconds: Some(30.0),
        },
        ..PlayerSettings::default()
    };
    let mut player = test_player_with(settings);
    player
        .load_workout(&three_round_workout(), &exercise_library())
        .unwrap();

    let segments = player.timeline().segments();
    assert_eq!(segments.len(), 8);
    assert_eq!(segments[0].kind, SegmentKind::Prep);
    assert_eq!(segments[1].start_offset_ms, 5_000);
    assert_eq!(segments[7].kind, SegmentKind::Cooldown);
    assert_eq!(player.timeline().total_duration_ms(), 80_000);

    player.start(T0);
    let report = player.on_tick(T0);
    assert_eq!(report.scheduled[0].cue_id, "start-prep");
}

#[test]
fn test_events_for_a_short_run() {
    let mut player = loaded_player(&one_second_workout());
    let mut rx = player.subscribe();

    player.start(T0);
    player.on_tick(T0);
    player.pause(T0 + 500);
    player.reset();

    let mut kinds = Vec::new();
    let mut cue_segments = HashSet::new();
    while let Ok(event) = rx.try_recv() {
        match event {
            PlayerEvent::StatusChanged { old_status, new_status, .. } => {
                kinds.push(format!("status:{}->{}", old_status, new_status))
            }
            PlayerEvent::CueScheduled { segment_id, .. } => {
                cue_segments.insert(segment_id);
                kinds.push("cue".to_string())
            }
            PlayerEvent::CuesCancelled { count, .. } => kinds.push(format!("cancelled:{}", count)),
            PlayerEvent::SegmentStarted { index, .. } => kinds.push(format!("segment:{}", index)),
            other => kinds.push(format!("{:?}", other)),
        }
    }

    assert_eq!(cue_segments.len(), 5);
    assert_eq!(
        kinds,
        vec![
            "status:idle->running",
            "cue",
            "cue",
            "cue",
            "cue",
            "cue",
            "segment:0",
            "cancelled:5",
            "status:running->paused",
            "cancelled:0",
            "status:paused->idle",
        ]
    );
}

#[test]
fn test_completion_event() {
    let mut player = loaded_player(&one_second_workout());
    let mut rx = player.subscribe();
    player.start(T0);
    player.on_tick(T0 + 8_000);

    let mut completed = None;
    while let Ok(event) = rx.try_recv() {
        if let PlayerEvent::WorkoutCompleted { workout_id, total_ms, .. } = event {
            completed = Some((workout_id, total_ms));
        }
    }
    assert_eq!(completed, Some(("one-second".to_string(), 8_000)));
}
