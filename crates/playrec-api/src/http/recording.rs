//! Recording lifecycle, step capture and surface lifecycle endpoints.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use playrec_protocols::{
    CapturedStep, OutputFormat, RecorderStatus, SessionSettings, SessionSnapshot, SurfaceId,
    SurfaceStatus,
};
use playrec_runtime::{GenerationOutcome, StopOutcome};

use crate::error::ApiError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartRequest {
    /// Falls back to the configured defaults.
    #[serde(default)]
    pub settings: Option<SessionSettings>,
    pub surface_id: SurfaceId,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartResponse {
    pub session_id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddStepRequest {
    pub step: CapturedStep,
    pub surface_id: SurfaceId,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddStepResponse {
    pub accepted: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub step_index: Option<usize>,
}

#[derive(Debug, Deserialize)]
pub struct SurfaceStatusRequest {
    pub status: SurfaceStatus,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateRequest {
    pub steps: Vec<CapturedStep>,
    #[serde(default)]
    pub output_format: Option<OutputFormat>,
}

pub async fn start_recording(
    State(state): State<Arc<AppState>>,
    Json(request): Json<StartRequest>,
) -> Json<StartResponse> {
    let settings = request.settings.unwrap_or(state.default_settings);
    let session_id = state.recorder.start(settings, request.surface_id);
    Json(StartResponse { session_id })
}

pub async fn stop_recording(
    State(state): State<Arc<AppState>>,
) -> Result<Json<StopOutcome>, ApiError> {
    Ok(Json(state.recorder.stop().await?))
}

pub async fn recording_status(State(state): State<Arc<AppState>>) -> Json<RecorderStatus> {
    Json(state.recorder.status())
}

pub async fn recording_state(State(state): State<Arc<AppState>>) -> Json<SessionSnapshot> {
    Json(state.recorder.snapshot())
}

pub async fn add_step(
    State(state): State<Arc<AppState>>,
    Json(request): Json<AddStepRequest>,
) -> Json<AddStepResponse> {
    let accepted = state.recorder.add_step(request.step, request.surface_id);
    Json(AddStepResponse {
        accepted: accepted.is_some(),
        step_index: accepted.map(|step| step.step_index),
    })
}

/// Load status reported by the browser for one surface.
pub async fn surface_status(
    State(state): State<Arc<AppState>>,
    Path(id): Path<u64>,
    Json(request): Json<SurfaceStatusRequest>,
) -> StatusCode {
    if state
        .coordinator
        .on_surface_status(SurfaceId(id), request.status)
        .is_some()
    {
        debug!("Restore started for surface {}", id);
    }
    StatusCode::NO_CONTENT
}

/// The surface was closed for good.
pub async fn close_surface(
    State(state): State<Arc<AppState>>,
    Path(id): Path<u64>,
) -> Result<StatusCode, ApiError> {
    let surface_id = SurfaceId(id);
    let stopped = state.recorder.on_surface_closed(surface_id).await;
    state.coordinator.forget(surface_id);
    state.surfaces().unregister(surface_id);

    match stopped {
        Some(Err(e)) => {
            warn!("Auto-stop for closed surface {} failed: {}", id, e);
            Err(e.into())
        }
        _ => Ok(StatusCode::NO_CONTENT),
    }
}

/// Generate code for a step list outside any session.
pub async fn generate(
    State(state): State<Arc<AppState>>,
    Json(request): Json<GenerateRequest>,
) -> Result<Json<GenerationOutcome>, ApiError> {
    if request.steps.is_empty() {
        return Err(ApiError::BadRequest("No steps to generate code for".to_string()));
    }
    let now = Utc::now().timestamp_millis();
    let steps: Vec<_> = request
        .steps
        .into_iter()
        .enumerate()
        .map(|(i, captured)| {
            let ts = if captured.timestamp > 0 { captured.timestamp } else { now };
            captured.accept(i, i as u64, ts)
        })
        .collect();
    let format = request
        .output_format
        .unwrap_or(state.default_settings.output_format);
    Ok(Json(state.recorder.generate_for_steps(&steps, format).await))
}
