//! WebSocket connection handling for capture surfaces.
//!
//! Each page opens `/surfaces/{id}/ws`. The connection is registered as the
//! surface's transport until it drops; a reload reconnects under the same id.

use std::sync::Arc;

use axum::{
    extract::{
        Path, State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::IntoResponse,
};
use futures::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use playrec_protocols::{Surface, SurfaceId};

use super::frame::{InboundFrame, OutboundFrame};
use super::surface::WsSurface;
use crate::state::AppState;

/// WebSocket upgrade handler.
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    Path(id): Path<u64>,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, SurfaceId(id), state))
}

async fn handle_socket(socket: WebSocket, surface_id: SurfaceId, state: Arc<AppState>) {
    let (mut sender, mut receiver) = socket.split();
    let (tx, mut rx) = mpsc::channel::<OutboundFrame>(100);

    let surface = Arc::new(WsSurface::new(surface_id, tx));
    let connection_id = surface.connection_id().to_string();
    let registered: Arc<dyn Surface> = surface.clone();
    if state.surfaces().register(registered.clone()).is_some() {
        debug!("Surface {} reconnected, replacing old connection", surface_id);
    }
    info!("Surface {} connected: {}", surface_id, connection_id);

    let sender_task = tokio::spawn(async move {
        while let Some(frame) = rx.recv().await {
            match serde_json::to_string(&frame) {
                Ok(json) => {
                    if sender.send(Message::Text(json.into())).await.is_err() {
                        break;
                    }
                }
                Err(e) => error!("Failed to encode {} frame: {}", frame.message.action(), e),
            }
        }
    });

    while let Some(result) = receiver.next().await {
        match result {
            Ok(Message::Text(text)) => match serde_json::from_str::<InboundFrame>(&text) {
                Ok(frame) => handle_frame(frame, &surface, &state),
                Err(e) => warn!("Unparseable frame from surface {}: {}", surface_id, e),
            },
            Ok(Message::Close(_)) => {
                debug!("Surface {} sent close", surface_id);
                break;
            }
            Err(e) => {
                error!("WebSocket error on surface {}: {}", surface_id, e);
                break;
            }
            _ => {}
        }
    }

    // Leave the registry alone if a newer connection already took over.
    state
        .surfaces()
        .unregister_if(surface_id, |current| Arc::ptr_eq(current, &registered));
    surface.close();
    sender_task.abort();
    info!("Surface {} disconnected: {}", surface_id, connection_id);
}

fn handle_frame(frame: InboundFrame, surface: &WsSurface, state: &Arc<AppState>) {
    match frame {
        InboundFrame::AddStep { step } => {
            if state.recorder.add_step(step, surface.id()).is_none() {
                debug!("Step from surface {} was not accepted", surface.id());
            }
        }
        ack @ InboundFrame::Ack { .. } => {
            if let Some((request_id, reply)) = ack.into_reply() {
                surface.resolve(&request_id, reply);
            }
        }
    }
}
