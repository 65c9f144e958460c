//! Connected capture surfaces.

use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use tracing::debug;

use playrec_protocols::{Surface, SurfaceError, SurfaceId, SurfaceMessage, SurfaceReply};

use crate::timeout::with_deadline;

/// Surfaces currently reachable, keyed by id. A reload replaces the entry.
#[derive(Default)]
pub struct SurfaceRegistry {
    surfaces: DashMap<SurfaceId, Arc<dyn Surface>>,
}

impl SurfaceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a surface, returning the connection it replaced.
    pub fn register(&self, surface: Arc<dyn Surface>) -> Option<Arc<dyn Surface>> {
        let id = surface.id();
        debug!("Surface {} registered", id);
        self.surfaces.insert(id, surface)
    }

    pub fn unregister(&self, id: SurfaceId) -> Option<Arc<dyn Surface>> {
        self.surfaces.remove(&id).map(|(_, surface)| surface)
    }

    /// Unregister only when `predicate` accepts the current entry.
    pub fn unregister_if(&self, id: SurfaceId, predicate: impl FnOnce(&Arc<dyn Surface>) -> bool) -> bool {
        self.surfaces
            .remove_if(&id, |_, surface| predicate(surface))
            .is_some()
    }

    pub fn get(&self, id: SurfaceId) -> Option<Arc<dyn Surface>> {
        self.surfaces.get(&id).map(|entry| entry.value().clone())
    }

    pub fn contains(&self, id: SurfaceId) -> bool {
        self.surfaces.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.surfaces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.surfaces.is_empty()
    }

    /// Deliver `message` and wait at most `deadline` for the reply.
    ///
    /// An unknown id or an expired deadline is `SurfaceUnreachable`.
    pub async fn request(
        &self,
        id: SurfaceId,
        message: SurfaceMessage,
        deadline: Duration,
    ) -> Result<SurfaceReply, SurfaceError> {
        let surface = self.get(id).ok_or(SurfaceError::SurfaceUnreachable(id))?;
        with_deadline(deadline, surface.request(message), || {
            SurfaceError::SurfaceUnreachable(id)
        })
        .await
    }

    /// Best-effort push; failures are logged and swallowed.
    pub async fn notify(&self, id: SurfaceId, message: SurfaceMessage, deadline: Duration) -> bool {
        let action = message.action();
        match self.request(id, message, deadline).await {
            Ok(_) => true,
            Err(e) => {
                debug!("Could not deliver {} to surface {}: {}", action, id, e);
                false
            }
        }
    }
}
