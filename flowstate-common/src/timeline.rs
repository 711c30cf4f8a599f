//! Timeline segment types
//!
//! A timeline is the flat, time-stamped form of a workout: one segment per
//! played interval, with absolute offsets from the start of the run.

use crate::workout::Exercise;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Cue issued at the start of every work segment
pub const CUE_START_WORK: &str = "start-work";
/// Cue issued at the start of every rest segment
pub const CUE_START_REST: &str = "start-rest";
/// Cue issued at the start of the optional prep segment
pub const CUE_START_PREP: &str = "start-prep";
/// Cue issued at the start of the optional cooldown segment
pub const CUE_START_COOLDOWN: &str = "start-cooldown";

/// Segment kind enumeration
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum SegmentKind {
    Work,
    Rest,
    Prep,
    Cooldown,
}

impl SegmentKind {
    /// Default cue for segments of this kind
    pub fn default_cue(self) -> &'static str {
        match self {
            SegmentKind::Work => CUE_START_WORK,
            SegmentKind::Rest => CUE_START_REST,
            SegmentKind::Prep => CUE_START_PREP,
            SegmentKind::Cooldown => CUE_START_COOLDOWN,
        }
    }
}

impl std::fmt::Display for SegmentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SegmentKind::Work => write!(f, "work"),
            SegmentKind::Rest => write!(f, "rest"),
            SegmentKind::Prep => write!(f, "prep"),
            SegmentKind::Cooldown => write!(f, "cooldown"),
        }
    }
}

/// One played interval of a workout run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimelineSegment {
    /// Unique per flattening; repeated rounds get distinct ids
    pub id: Uuid,

    /// Offset from the start of the run (milliseconds)
    pub start_offset_ms: u64,

    /// Length of the interval (milliseconds, always > 0 in a valid timeline)
    pub duration_ms: u64,

    pub kind: SegmentKind,

    /// Resolved exercise for work segments; `None` if the lookup missed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exercise: Option<Exercise>,

    /// Cue to play when the segment starts
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audio_cue_id: Option<String>,
}

impl TimelineSegment {
    /// Offset at which the next segment starts (saturates at `u64::MAX`)
    pub fn end_offset_ms(&self) -> u64 {
        self.start_offset_ms.saturating_add(self.duration_ms)
    }

    /// Whether `position_ms` falls inside `[start, end)`
    pub fn contains(&self, position_ms: u64) -> bool {
        position_ms >= self.start_offset_ms && position_ms < self.end_offset_ms()
    }
}
