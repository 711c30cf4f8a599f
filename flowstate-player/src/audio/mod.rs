//! Audio backend collaborator
//!
//! The core never renders sound. It hands "play cue X at precise time T" and
//! "cancel everything" commands to an `AudioBackend`, and reads the backend's
//! precise clock to convert timeline offsets into target times.

pub mod backend;
pub mod recording;
pub mod tokio_backend;

pub use backend::{AudioBackend, CueHandle};
pub use recording::{RecordedCue, RecordingBackend};
pub use tokio_backend::{CueFired, TokioCueBackend};
