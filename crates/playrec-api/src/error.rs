//! API error types and their HTTP mapping.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

use playrec_protocols::{RecorderError, StoreError};

#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Recorder(#[from] RecorderError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("Session not found: {0}")]
    SessionNotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Body of every error response.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            code: code.into(),
        }
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Recorder(RecorderError::NotRecording)
            | ApiError::Recorder(RecorderError::SurfaceMismatch { .. }) => StatusCode::CONFLICT,
            ApiError::Recorder(RecorderError::Generation(_)) => StatusCode::BAD_GATEWAY,
            ApiError::Store(StoreError::NotFound(_)) | ApiError::SessionNotFound(_) => {
                StatusCode::NOT_FOUND
            }
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Recorder(RecorderError::Store(_))
            | ApiError::Store(_)
            | ApiError::Serialization(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            ApiError::Recorder(RecorderError::NotRecording) => "NOT_RECORDING",
            ApiError::Recorder(RecorderError::SurfaceMismatch { .. }) => "SURFACE_MISMATCH",
            ApiError::Recorder(RecorderError::Generation(_)) => "GENERATION_FAILED",
            ApiError::Recorder(RecorderError::Store(_)) | ApiError::Store(_) => "STORE_ERROR",
            ApiError::SessionNotFound(_) => "NOT_FOUND",
            ApiError::BadRequest(_) => "BAD_REQUEST",
            ApiError::Serialization(_) => "SERIALIZATION_ERROR",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!("Request failed: {}", self);
        }
        (status, Json(ErrorResponse::new(self.to_string(), self.code()))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use playrec_protocols::{ProviderError, SurfaceId};

    #[test]
    fn test_recorder_errors_map_to_conflict() {
        assert_eq!(
            ApiError::from(RecorderError::NotRecording).status(),
            StatusCode::CONFLICT
        );
        let mismatch = ApiError::from(RecorderError::SurfaceMismatch {
            owner: SurfaceId(1),
            actual: SurfaceId(2),
        });
        assert_eq!(mismatch.status(), StatusCode::CONFLICT);
        assert_eq!(mismatch.code(), "SURFACE_MISMATCH");
    }

    #[test]
    fn test_generation_error_is_bad_gateway() {
        let err = ApiError::from(RecorderError::Generation(ProviderError::Timeout(180)));
        assert_eq!(err.status(), StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn test_not_found() {
        let err = ApiError::SessionNotFound("session_1".to_string());
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
        assert!(err.to_string().contains("session_1"));
        assert_eq!(
            ApiError::from(StoreError::NotFound("x".to_string())).status(),
            StatusCode::NOT_FOUND
        );
    }

    #[test]
    fn test_into_response_status() {
        let response = ApiError::BadRequest("no steps".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
