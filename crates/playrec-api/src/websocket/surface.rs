//! A page connected over WebSocket, seen by the core as a [`Surface`].

use async_trait::async_trait;
use dashmap::DashMap;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, warn};
use uuid::Uuid;

use playrec_protocols::{Surface, SurfaceError, SurfaceId, SurfaceMessage, SurfaceReply};

use super::frame::OutboundFrame;

/// Requests waiting for an ack, keyed by request id.
type PendingReplies = DashMap<String, oneshot::Sender<SurfaceReply>>;

/// Removes the pending entry when the request finishes or is cancelled.
struct PendingGuard<'a> {
    pending: &'a PendingReplies,
    request_id: &'a str,
}

impl Drop for PendingGuard<'_> {
    fn drop(&mut self) {
        self.pending.remove(self.request_id);
    }
}

pub struct WsSurface {
    id: SurfaceId,
    connection_id: String,
    outbound: mpsc::Sender<OutboundFrame>,
    pending: PendingReplies,
}

impl WsSurface {
    pub fn new(id: SurfaceId, outbound: mpsc::Sender<OutboundFrame>) -> Self {
        Self {
            id,
            connection_id: Uuid::new_v4().to_string(),
            outbound,
            pending: DashMap::new(),
        }
    }

    pub fn connection_id(&self) -> &str {
        &self.connection_id
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// Route an ack to the request waiting for it.
    pub fn resolve(&self, request_id: &str, reply: SurfaceReply) -> bool {
        match self.pending.remove(request_id) {
            Some((_, tx)) => tx.send(reply).is_ok(),
            None => {
                debug!(
                    "Ack {} on surface {} matches no pending request",
                    request_id, self.id
                );
                false
            }
        }
    }

    /// Fail every waiting request with `Closed`.
    pub fn close(&self) {
        let dropped = self.pending.len();
        self.pending.clear();
        if dropped > 0 {
            warn!(
                "Surface {} disconnected with {} unanswered request(s)",
                self.id, dropped
            );
        }
    }
}

#[async_trait]
impl Surface for WsSurface {
    fn id(&self) -> SurfaceId {
        self.id
    }

    async fn request(&self, message: SurfaceMessage) -> Result<SurfaceReply, SurfaceError> {
        let request_id = Uuid::new_v4().to_string();
        let (tx, rx) = oneshot::channel();
        self.pending.insert(request_id.clone(), tx);
        let _guard = PendingGuard {
            pending: &self.pending,
            request_id: &request_id,
        };

        let frame = OutboundFrame {
            request_id: request_id.clone(),
            message,
        };
        self.outbound
            .send(frame)
            .await
            .map_err(|_| SurfaceError::Closed)?;

        rx.await.map_err(|_| SurfaceError::Closed)
    }
}
