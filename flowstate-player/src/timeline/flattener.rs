//! Workout definition flattening
//!
//! Turns the nested block structure of a `WorkoutDefinition` into a flat,
//! ordered list of `TimelineSegment`s with absolute offsets.
//!
//! **Algorithm:**
//! 1. Validate every block (including blocks inside zero-repeat rounds) and
//!    count the segments the definition unrolls to
//! 2. Walk the blocks in order with a running cursor, emitting one segment per
//!    exercise/rest block and unrolling rounds in place
//! 3. Each emitted segment starts at the cursor; the cursor then advances by
//!    its duration, so offsets are ordered and contiguous by construction.
//!    Rounds that unroll to nothing are skipped without iterating.
//!
//! Durations and the running cursor are bounded by `MAX_TIMELINE_MS`; a
//! definition that would run past it is rejected, never clamped.
//!
//! Missing exercise metadata never affects timing: the segment is emitted
//! without its exercise and a `LookupWarning` is returned alongside.

use super::validated::MAX_TIMELINE_MS;
use crate::error::ConfigError;
use flowstate_common::timeline::{SegmentKind, TimelineSegment};
use flowstate_common::workout::{ExerciseLookup, WorkoutBlock, WorkoutDefinition};
use tracing::{debug, warn};
use uuid::Uuid;

/// Upper bound on unrolled segments per workout
pub const MAX_SEGMENTS: u64 = 100_000;

/// Extra segments wrapped around the definition's blocks
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FlattenOptions {
    /// Get-ready segment at offset 0 (cue `start-prep`)
    pub prep_seconds: Option<f64>,

    /// Cooldown segment after the last block (cue `start-cooldown`)
    pub cooldown_seconds: Option<f64>,
}

/// Exercise id referenced by a block but absent from the lookup
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LookupWarning {
    pub exercise_ref: String,
    /// Location of the referencing block, e.g. `blocks[1].blocks[0]`
    pub path: String,
    /// The emitted segment that carries no exercise
    pub segment_id: Uuid,
}

impl std::fmt::Display for LookupWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: exercise '{}' not found", self.path, self.exercise_ref)
    }
}

/// Flattened segments plus non-fatal diagnostics
#[derive(Debug, Clone)]
pub struct FlattenOutput {
    pub segments: Vec<TimelineSegment>,
    pub warnings: Vec<LookupWarning>,
}

/// Flatten a definition without prep or cooldown segments
///
/// # Examples
/// ```
/// use flowstate_common::workout::{ExerciseLookup, WorkoutBlock, WorkoutDefinition};
/// use flowstate_player::timeline::flatten;
///
/// let def = WorkoutDefinition::new("w", "Demo", vec![
///     WorkoutBlock::round(3, vec![
///         WorkoutBlock::exercise("squat", 10.0),
///         WorkoutBlock::rest(5.0),
///     ]),
/// ]);
///
/// let output = flatten(&def, &ExerciseLookup::new()).unwrap();
/// let offsets: Vec<u64> = output.segments.iter().map(|s| s.start_offset_ms).collect();
/// assert_eq!(offsets, vec![0, 10_000, 15_000, 25_000, 30_000, 40_000]);
/// assert_eq!(output.warnings.len(), 3); // "squat" is not in the lookup
/// ```
pub fn flatten(
    definition: &WorkoutDefinition,
    lookup: &ExerciseLookup,
) -> Result<FlattenOutput, ConfigError> {
    flatten_with_options(definition, lookup, &FlattenOptions::default())
}

/// Flatten a definition, optionally wrapping it in prep/cooldown segments
pub fn flatten_with_options(
    definition: &WorkoutDefinition,
    lookup: &ExerciseLookup,
    options: &FlattenOptions,
) -> Result<FlattenOutput, ConfigError> {
    let prep_ms = options
        .prep_seconds
        .map(|s| seconds_to_ms(s, "prep"))
        .transpose()?;
    let cooldown_ms = options
        .cooldown_seconds
        .map(|s| seconds_to_ms(s, "cooldown"))
        .transpose()?;

    let planned = count_segments(&definition.blocks, "blocks")?
        .saturating_add(prep_ms.is_some() as u64)
        .saturating_add(cooldown_ms.is_some() as u64);
    if planned > MAX_SEGMENTS {
        return Err(ConfigError::TooManySegments {
            count: planned,
            limit: MAX_SEGMENTS,
        });
    }

    let mut flattener = Flattener {
        lookup,
        cursor_ms: 0,
        segments: Vec::with_capacity(planned as usize),
        warnings: Vec::new(),
    };

    if let Some(ms) = prep_ms {
        flattener.push(SegmentKind::Prep, ms, None)?;
    }
    flattener.visit_blocks(&definition.blocks, "blocks")?;
    if let Some(ms) = cooldown_ms {
        flattener.push(SegmentKind::Cooldown, ms, None)?;
    }

    debug!(
        "Flattened workout '{}' into {} segments ({} ms, {} lookup warnings)",
        definition.id,
        flattener.segments.len(),
        flattener.cursor_ms,
        flattener.warnings.len()
    );

    Ok(FlattenOutput {
        segments: flattener.segments,
        warnings: flattener.warnings,
    })
}

/// Convert a configured duration to whole milliseconds
fn seconds_to_ms(seconds: f64, path: &str) -> Result<u64, ConfigError> {
    let millis = (seconds * 1000.0).round();
    if !seconds.is_finite() || seconds <= 0.0 || millis < 1.0 {
        return Err(ConfigError::NonPositiveDuration {
            path: path.to_string(),
            seconds,
        });
    }
    if millis > MAX_TIMELINE_MS as f64 {
        return Err(ConfigError::DurationTooLong {
            path: path.to_string(),
            seconds,
        });
    }
    Ok(millis as u64)
}

/// Whether the blocks unroll to zero segments
fn is_empty_unrolled(blocks: &[WorkoutBlock]) -> bool {
    blocks.iter().all(|block| match block {
        WorkoutBlock::Round {
            repeat_count,
            blocks,
        } => *repeat_count <= 0 || is_empty_unrolled(blocks),
        _ => false,
    })
}

/// Validate blocks and count the segments they unroll to
fn count_segments(blocks: &[WorkoutBlock], parent: &str) -> Result<u64, ConfigError> {
    let mut count: u64 = 0;
    for (i, block) in blocks.iter().enumerate() {
        let path = format!("{}[{}]", parent, i);
        match block {
            WorkoutBlock::Exercise { duration_seconds, .. }
            | WorkoutBlock::Rest { duration_seconds } => {
                seconds_to_ms(*duration_seconds, &path)?;
                count = count.saturating_add(1);
            }
            WorkoutBlock::Round {
                repeat_count,
                blocks,
            } => {
                if *repeat_count < 0 {
                    return Err(ConfigError::NegativeRepeatCount {
                        path,
                        count: *repeat_count,
                    });
                }
                let per_round = count_segments(blocks, &format!("{}.blocks", path))?;
                count = count.saturating_add(per_round.saturating_mul(*repeat_count as u64));
            }
        }
    }
    Ok(count)
}

struct Flattener<'a> {
    lookup: &'a ExerciseLookup,
    cursor_ms: u64,
    segments: Vec<TimelineSegment>,
    warnings: Vec<LookupWarning>,
}

impl Flattener<'_> {
    fn visit_blocks(&mut self, blocks: &[WorkoutBlock], parent: &str) -> Result<(), ConfigError> {
        for (i, block) in blocks.iter().enumerate() {
            let path = format!("{}[{}]", parent, i);
            match block {
                WorkoutBlock::Exercise {
                    exercise_ref,
                    duration_seconds,
                } => {
                    let duration_ms = seconds_to_ms(*duration_seconds, &path)?;
                    let exercise = self.lookup.get(exercise_ref).cloned();
                    let segment_id = self.push(SegmentKind::Work, duration_ms, exercise.clone())?;
                    if exercise.is_none() {
                        warn!("Exercise '{}' at {} not found in lookup", exercise_ref, path);
                        self.warnings.push(LookupWarning {
                            exercise_ref: exercise_ref.clone(),
                            path,
                            segment_id,
                        });
                    }
                }
                WorkoutBlock::Rest { duration_seconds } => {
                    let duration_ms = seconds_to_ms(*duration_seconds, &path)?;
                    self.push(SegmentKind::Rest, duration_ms, None)?;
                }
                WorkoutBlock::Round {
                    repeat_count,
                    blocks,
                } => {
                    if is_empty_unrolled(blocks) {
                        continue;
                    }
                    let inner = format!("{}.blocks", path);
                    for _ in 0..(*repeat_count).max(0) {
                        self.visit_blocks(blocks, &inner)?;
                    }
                }
            }
        }
        Ok(())
    }

    fn push(
        &mut self,
        kind: SegmentKind,
        duration_ms: u64,
        exercise: Option<flowstate_common::Exercise>,
    ) -> Result<Uuid, ConfigError> {
        let end_ms = self
            .cursor_ms
            .checked_add(duration_ms)
            .filter(|end| *end <= MAX_TIMELINE_MS)
            .ok_or(ConfigError::TimelineTooLong {
                limit_ms: MAX_TIMELINE_MS,
            })?;
        let id = Uuid::new_v4();
        self.segments.push(TimelineSegment {
            id,
            start_offset_ms: self.cursor_ms,
            duration_ms,
            kind,
            exercise,
            audio_cue_id: Some(kind.default_cue().to_string()),
        });
        self.cursor_ms = end_ms;
        Ok(id)
    }
}
