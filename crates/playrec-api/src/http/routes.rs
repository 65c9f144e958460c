//! HTTP route definitions.

use std::sync::Arc;

use axum::{
    Router,
    routing::{delete, get, post},
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::http::{history, monitoring, recording};
use crate::state::AppState;
use crate::websocket::ws_handler;

/// Create the main router.
///
/// ## Route Structure
///
/// ```text
/// /recording
///   POST   /recording/start      - Start a session owned by a surface
///   POST   /recording/stop       - Stop and persist the session
///   GET    /recording/status     - Recorder status
///   GET    /recording/state      - Authoritative session snapshot
///   POST   /recording/steps      - Add a captured step
///
/// /surfaces
///   POST   /surfaces/{id}/status - Report page load status
///   DELETE /surfaces/{id}        - Surface closed
///   GET    /surfaces/{id}/ws     - WebSocket transport of the surface
///
/// /history
///   GET    /history              - Newest first
///   GET    /history/{id}         - One record
///   DELETE /history/{id}         - Delete a record
///   GET    /history/{id}/export  - Export as json or playwright
///
/// POST /generate - Generate code for a step list
/// GET  /health   - Health check
/// ```
pub fn create_router(state: Arc<AppState>) -> Router {
    let recording_routes = Router::new()
        .route("/start", post(recording::start_recording))
        .route("/stop", post(recording::stop_recording))
        .route("/status", get(recording::recording_status))
        .route("/state", get(recording::recording_state))
        .route("/steps", post(recording::add_step));

    let surface_routes = Router::new()
        .route("/{id}", delete(recording::close_surface))
        .route("/{id}/status", post(recording::surface_status))
        .route("/{id}/ws", get(ws_handler));

    let history_routes = Router::new()
        .route("/", get(history::list_history))
        .route("/{id}", get(history::get_session).delete(history::delete_session))
        .route("/{id}/export", get(history::export));

    Router::new()
        .nest("/recording", recording_routes)
        .nest("/surfaces", surface_routes)
        .nest("/history", history_routes)
        .route("/generate", post(recording::generate))
        .route("/health", get(monitoring::health))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

#[cfg(test)]
#[path = "routes_tests.rs"]
mod tests;
