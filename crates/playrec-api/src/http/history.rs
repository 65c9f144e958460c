//! Session history endpoints.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::Deserialize;

use playrec_protocols::{SessionRecord, SessionStore};
use playrec_runtime::{ExportFormat, ExportedFile, export_session};

use crate::error::ApiError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ExportQuery {
    pub format: Option<String>,
}

pub async fn list_history(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<SessionRecord>>, ApiError> {
    Ok(Json(state.sessions().get_history().await?))
}

pub async fn get_session(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<SessionRecord>, ApiError> {
    match state.sessions().get_session(&id).await? {
        Some(record) => Ok(Json(record)),
        None => Err(ApiError::SessionNotFound(id)),
    }
}

pub async fn delete_session(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    state.sessions().delete_session(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn export(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Query(query): Query<ExportQuery>,
) -> Result<Json<ExportedFile>, ApiError> {
    let format = match query.format.as_deref() {
        Some(raw) => raw.parse::<ExportFormat>().map_err(ApiError::BadRequest)?,
        None => ExportFormat::default(),
    };
    let Some(record) = state.sessions().get_session(&id).await? else {
        return Err(ApiError::SessionNotFound(id));
    };
    Ok(Json(export_session(&record, format)?))
}
