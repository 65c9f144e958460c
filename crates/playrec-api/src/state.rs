//! Application state.

use std::sync::Arc;
use std::time::{Duration, Instant};

use playrec_protocols::{SessionSettings, SessionStore};
use playrec_runtime::{Recorder, RestoreCoordinator, SurfaceRegistry};

/// Application state shared across handlers.
pub struct AppState {
    pub recorder: Arc<Recorder>,
    pub coordinator: Arc<RestoreCoordinator>,
    /// Used by `POST /recording/start` when the request carries no settings.
    pub default_settings: SessionSettings,
    start_time: Instant,
}

impl AppState {
    pub fn new(recorder: Arc<Recorder>, coordinator: Arc<RestoreCoordinator>) -> Self {
        Self {
            recorder,
            coordinator,
            default_settings: SessionSettings::default(),
            start_time: Instant::now(),
        }
    }

    pub fn with_default_settings(mut self, settings: SessionSettings) -> Self {
        self.default_settings = settings;
        self
    }

    pub fn surfaces(&self) -> &Arc<SurfaceRegistry> {
        self.recorder.surfaces()
    }

    pub fn sessions(&self) -> &Arc<dyn SessionStore> {
        self.recorder.sessions()
    }

    pub fn uptime(&self) -> Duration {
        self.start_time.elapsed()
    }
}
