//! Recovery coordinator: re-push the authoritative session to a surface
//! after its page reloaded or navigated mid-recording.
//!
//! Per navigation: `loading` marks a restore as pending, `complete` starts
//! one restore run. A run makes up to `max_attempts` attempts with linear
//! backoff; each attempt waits for the page to settle, probes it with
//! `ping` until it answers, then pushes the snapshot and waits for the ack.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use dashmap::{DashMap, DashSet};
use parking_lot::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use playrec_config::RestoreConfig;
use playrec_protocols::{SurfaceError, SurfaceId, SurfaceMessage, SurfaceStatus};

use crate::recorder::Recorder;
use crate::retry::{RetryPolicy, retry_with_backoff};
use crate::surfaces::SurfaceRegistry;
use crate::timeout::with_deadline;

/// Timing of restore runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RestorePolicy {
    /// Wait after `complete` before touching the page.
    pub settle_delay: Duration,
    /// Attempts per navigation event.
    pub attempts: RetryPolicy,
    /// Readiness probes per attempt.
    pub probe: RetryPolicy,
    pub probe_timeout: Duration,
    pub push_timeout: Duration,
}

impl Default for RestorePolicy {
    fn default() -> Self {
        Self::from(&RestoreConfig::default())
    }
}

impl From<&RestoreConfig> for RestorePolicy {
    fn from(config: &RestoreConfig) -> Self {
        Self {
            settle_delay: config.settle_delay(),
            attempts: RetryPolicy::linear(config.max_attempts, config.backoff_step()),
            probe: RetryPolicy::linear(config.probe_attempts, config.probe_backoff()),
            probe_timeout: config.probe_timeout(),
            push_timeout: config.push_timeout(),
        }
    }
}

/// How a restore run ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RestoreOutcome {
    Restored { attempts: u32, step_count: usize },
    GaveUp { attempts: u32, last_error: String },
    /// The surface stopped owning a recording before the run finished.
    Skipped { attempts: u32 },
}

#[derive(Debug)]
enum AttemptError {
    NotOwned,
    StillLoading,
    Surface(SurfaceError),
}

impl fmt::Display for AttemptError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttemptError::NotOwned => write!(f, "surface no longer owns the recording"),
            AttemptError::StillLoading => write!(f, "page is still loading"),
            AttemptError::Surface(e) => write!(f, "{}", e),
        }
    }
}

/// Removes the in-flight marker however the run ends.
struct InFlight<'a> {
    runs: &'a DashSet<SurfaceId>,
    surface_id: SurfaceId,
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.runs.remove(&self.surface_id);
    }
}

pub struct RestoreCoordinator {
    recorder: Arc<Recorder>,
    surfaces: Arc<SurfaceRegistry>,
    policy: RestorePolicy,
    statuses: DashMap<SurfaceId, SurfaceStatus>,
    attempts: DashMap<SurfaceId, u32>,
    runs: DashSet<SurfaceId>,
    /// Session whose surface reported `loading` and has not been restored yet.
    pending_restore: Mutex<Option<String>>,
}

impl RestoreCoordinator {
    pub fn new(recorder: Arc<Recorder>, policy: RestorePolicy) -> Self {
        let surfaces = recorder.surfaces().clone();
        Self {
            recorder,
            surfaces,
            policy,
            statuses: DashMap::new(),
            attempts: DashMap::new(),
            runs: DashSet::new(),
            pending_restore: Mutex::new(None),
        }
    }

    /// Whether the running session is waiting for a restore. A flag left by
    /// an earlier session does not count.
    pub fn pending_restore(&self) -> bool {
        let status = self.recorder.status();
        if !status.is_recording {
            return false;
        }
        let pending = self.pending_restore.lock();
        pending.is_some() && *pending == status.session_id
    }

    fn clear_pending_restore(&self) {
        *self.pending_restore.lock() = None;
    }

    /// Attempts made so far in the current run for `surface_id`.
    pub fn attempts(&self, surface_id: SurfaceId) -> u32 {
        self.attempts.get(&surface_id).map(|a| *a).unwrap_or(0)
    }

    pub fn is_restoring(&self, surface_id: SurfaceId) -> bool {
        self.runs.contains(&surface_id)
    }

    /// Feed a load-status change of a surface.
    ///
    /// Returns the spawned restore run when `complete` arrives for the
    /// surface that owns the recording and no run is active for it yet.
    pub fn on_surface_status(
        self: &Arc<Self>,
        surface_id: SurfaceId,
        status: SurfaceStatus,
    ) -> Option<JoinHandle<RestoreOutcome>> {
        if !self.recorder.owns(surface_id) {
            self.statuses.remove(&surface_id);
            return None;
        }
        self.statuses.insert(surface_id, status);

        match status {
            SurfaceStatus::Loading => {
                debug!("Surface {} is loading, restore pending", surface_id);
                let session_id = self.recorder.status().session_id;
                *self.pending_restore.lock() = session_id;
                None
            }
            SurfaceStatus::Complete => {
                if !self.runs.insert(surface_id) {
                    debug!("Restore already running for surface {}", surface_id);
                    return None;
                }
                let coordinator = Arc::clone(self);
                Some(tokio::spawn(async move {
                    let _in_flight = InFlight {
                        runs: &coordinator.runs,
                        surface_id,
                    };
                    coordinator.restore(surface_id).await
                }))
            }
        }
    }

    /// Forget everything about a surface that went away.
    pub fn forget(&self, surface_id: SurfaceId) {
        self.statuses.remove(&surface_id);
        self.attempts.remove(&surface_id);
    }

    async fn restore(&self, surface_id: SurfaceId) -> RestoreOutcome {
        let result = retry_with_backoff(
            &self.policy.attempts,
            |e: &AttemptError| !matches!(e, AttemptError::NotOwned),
            |attempt| async move {
                self.attempts.insert(surface_id, attempt);
                self.attempt(surface_id).await
            },
        )
        .await;
        self.attempts.remove(&surface_id);

        match result {
            Ok((attempts, step_count)) => {
                self.clear_pending_restore();
                info!(
                    "Restored recording on surface {} ({} steps, attempt {})",
                    surface_id, step_count, attempts
                );
                RestoreOutcome::Restored {
                    attempts,
                    step_count,
                }
            }
            Err(e) if matches!(e.last_error, AttemptError::NotOwned) => {
                debug!("Restore of surface {} skipped: {}", surface_id, e.last_error);
                self.clear_pending_restore();
                self.statuses.remove(&surface_id);
                RestoreOutcome::Skipped {
                    attempts: e.attempts,
                }
            }
            Err(e) => {
                error!("Giving up restoring surface {}: {}", surface_id, e);
                self.clear_pending_restore();
                self.surfaces
                    .notify(
                        surface_id,
                        SurfaceMessage::ShowRestoreFailedNotification,
                        self.policy.probe_timeout,
                    )
                    .await;
                RestoreOutcome::GaveUp {
                    attempts: e.attempts,
                    last_error: e.last_error.to_string(),
                }
            }
        }
    }

    /// One `settle -> verify -> push` pass. Returns the attempt number and
    /// the step count that was pushed.
    async fn attempt(&self, surface_id: SurfaceId) -> Result<(u32, usize), AttemptError> {
        tokio::time::sleep(self.policy.settle_delay).await;

        if !self.recorder.owns(surface_id) {
            return Err(AttemptError::NotOwned);
        }
        if self.statuses.get(&surface_id).map(|s| *s) == Some(SurfaceStatus::Loading) {
            return Err(AttemptError::StillLoading);
        }

        self.verify_surface_ready(surface_id)
            .await
            .map_err(AttemptError::Surface)?;

        let snapshot = self.recorder.snapshot();
        if !snapshot.is_recording || snapshot.surface_id != Some(surface_id) {
            return Err(AttemptError::NotOwned);
        }
        let step_count = snapshot.steps.len();

        let surface = self
            .surfaces
            .get(surface_id)
            .ok_or(AttemptError::Surface(SurfaceError::SurfaceUnreachable(surface_id)))?;
        let deadline = self.policy.push_timeout;
        let reply = with_deadline(
            deadline,
            surface.request(SurfaceMessage::RestoreRecordingState { state: snapshot }),
            || SurfaceError::RestoreTimeout {
                surface: surface_id,
                secs: deadline.as_secs(),
            },
        )
        .await
        .map_err(AttemptError::Surface)?;

        if !reply.success {
            let reason = reply
                .error
                .unwrap_or_else(|| "Restore returned unsuccessful response".to_string());
            warn!("Surface {} rejected restore: {}", surface_id, reason);
            return Err(AttemptError::Surface(SurfaceError::Rejected(reason)));
        }
        Ok((self.attempts(surface_id), step_count))
    }

    /// Probe with `ping` until the page answers `{status: "ok"}`.
    async fn verify_surface_ready(&self, surface_id: SurfaceId) -> Result<(), SurfaceError> {
        retry_with_backoff(
            &self.policy.probe,
            |_: &SurfaceError| true,
            |_| async move {
                let reply = self
                    .surfaces
                    .request(surface_id, SurfaceMessage::Ping, self.policy.probe_timeout)
                    .await?;
                if reply.is_ready() {
                    Ok(())
                } else {
                    Err(SurfaceError::Rejected("surface not ready".to_string()))
                }
            },
        )
        .await
        .map_err(|e| {
            debug!("Surface {} not ready: {}", surface_id, e);
            SurfaceError::SurfaceUnreachable(surface_id)
        })
    }
}

#[cfg(test)]
#[path = "restore_tests.rs"]
mod tests;
