//! Audio backend trait

/// Opaque handle for a cue handed to a backend
///
/// The player never uses handles for correctness; they exist so backends and
/// hosts can correlate log lines and notifications.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CueHandle(pub u64);

impl std::fmt::Display for CueHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "cue#{}", self.0)
    }
}

/// Sound output collaborator driven by the scheduler
///
/// All commands are fire-and-forget: implementations must not block the
/// caller. What happens when a cue id cannot be resolved (fallback tone,
/// silence) is entirely the backend's policy.
pub trait AudioBackend {
    /// Play `cue_id` at `target_time` on the backend's precise clock (seconds)
    fn schedule_cue(&mut self, cue_id: &str, target_time: f64) -> CueHandle;

    /// Stop every pending or sounding cue this backend is tracking
    fn cancel_all(&mut self);

    /// Monotonic precise clock in seconds, independent of the host's tick clock
    fn current_hardware_time(&self) -> f64;
}

impl<B: AudioBackend + ?Sized> AudioBackend for Box<B> {
    fn schedule_cue(&mut self, cue_id: &str, target_time: f64) -> CueHandle {
        (**self).schedule_cue(cue_id, target_time)
    }

    fn cancel_all(&mut self) {
        (**self).cancel_all()
    }

    fn current_hardware_time(&self) -> f64 {
        (**self).current_hardware_time()
    }
}
