//! Health endpoint.

use std::sync::Arc;

use axum::{Json, extract::State};
use serde::Serialize;

use playrec_protocols::RecordingPhase;

use crate::state::AppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub uptime_seconds: u64,
    pub phase: RecordingPhase,
    pub connected_surfaces: usize,
    pub pending_restore: bool,
}

pub async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        uptime_seconds: state.uptime().as_secs(),
        phase: state.recorder.status().phase,
        connected_surfaces: state.surfaces().len(),
        pending_restore: state.coordinator.pending_restore(),
    })
}
