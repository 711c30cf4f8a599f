//! Tokio-timer cue backend
//!
//! Reference backend for the terminal host. Each scheduled cue becomes a
//! spawned task that sleeps until its target instant and then "plays" the
//! cue: it logs the asset and reports a `CueFired` notification. The precise
//! clock is a `tokio::time::Instant` captured at construction, so tests can
//! drive it with paused virtual time.
//!
//! **Backend-local policy:**
//! - Cue ids missing from the manifest play the fallback tone (logged at warn)
//! - `cancel_all` aborts every task that has not fired yet
//!
//! `schedule_cue` spawns onto the current tokio runtime and must be called
//! from within one.

use super::backend::{AudioBackend, CueHandle};
use std::collections::BTreeMap;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, info, warn};

/// Asset label reported when a cue id is not in the manifest
pub const FALLBACK_ASSET: &str = "fallback-tone";

/// Notification sent when a cue's target time arrives
#[derive(Debug, Clone, PartialEq)]
pub struct CueFired {
    pub handle: CueHandle,
    pub cue_id: String,
    /// Asset from the manifest, or `FALLBACK_ASSET`
    pub asset: String,
    pub target_time: f64,
    /// Precise-clock seconds at which the task actually woke
    pub fired_at: f64,
}

/// Backend that plays cues on tokio timers
pub struct TokioCueBackend {
    origin: Instant,
    manifest: BTreeMap<String, String>,
    tasks: Vec<(CueHandle, JoinHandle<()>)>,
    next_handle: u64,
    fired_tx: Option<mpsc::UnboundedSender<CueFired>>,
}

impl TokioCueBackend {
    /// Backend resolving cue ids through `manifest` (cue id → asset)
    pub fn new(manifest: BTreeMap<String, String>) -> Self {
        Self {
            origin: Instant::now(),
            manifest,
            tasks: Vec::new(),
            next_handle: 0,
            fired_tx: None,
        }
    }

    /// Backend that also reports every fired cue on the returned channel
    pub fn with_notifications(
        manifest: BTreeMap<String, String>,
    ) -> (Self, mpsc::UnboundedReceiver<CueFired>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let mut backend = Self::new(manifest);
        backend.fired_tx = Some(tx);
        (backend, rx)
    }

    /// Cues scheduled but not yet fired or cancelled
    pub fn pending_count(&self) -> usize {
        self.tasks
            .iter()
            .filter(|(_, task)| !task.is_finished())
            .count()
    }

    fn resolve(&self, cue_id: &str) -> String {
        match self.manifest.get(cue_id) {
            Some(asset) => asset.clone(),
            None => {
                warn!("Audio asset not found: {} -> playing fallback", cue_id);
                FALLBACK_ASSET.to_string()
            }
        }
    }
}

impl AudioBackend for TokioCueBackend {
    fn schedule_cue(&mut self, cue_id: &str, target_time: f64) -> CueHandle {
        let handle = CueHandle(self.next_handle);
        self.next_handle += 1;

        // Drop bookkeeping for tasks that already fired
        self.tasks.retain(|(_, task)| !task.is_finished());

        let asset = self.resolve(cue_id);
        let offset = Duration::try_from_secs_f64(target_time.max(0.0)).unwrap_or(Duration::ZERO);
        let deadline = self.origin + offset;
        let origin = self.origin;
        let cue_id = cue_id.to_string();
        let fired_tx = self.fired_tx.clone();

        debug!("Scheduled {} '{}' at {:.3} (precise clock)", handle, cue_id, target_time);

        let task = tokio::spawn(async move {
            tokio::time::sleep_until(deadline).await;
            let fired_at = origin.elapsed().as_secs_f64();
            info!("Playing '{}' ({}) at {:.3}", cue_id, asset, fired_at);
            if let Some(tx) = fired_tx {
                let _ = tx.send(CueFired {
                    handle,
                    cue_id,
                    asset,
                    target_time,
                    fired_at,
                });
            }
        });

        self.tasks.push((handle, task));
        handle
    }

    fn cancel_all(&mut self) {
        let mut cancelled = 0;
        for (_, task) in self.tasks.drain(..) {
            if !task.is_finished() {
                cancelled += 1;
            }
            task.abort();
        }
        debug!("Cancelled {} pending cues", cancelled);
    }

    fn current_hardware_time(&self) -> f64 {
        self.origin.elapsed().as_secs_f64()
    }
}

impl Drop for TokioCueBackend {
    fn drop(&mut self) {
        for (_, task) in &self.tasks {
            task.abort();
        }
    }
}
