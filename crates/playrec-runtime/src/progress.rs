//! Progress sinks for batch generation.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::broadcast;
use tracing::{info, warn};

use playrec_protocols::{KeyValueStore, ProgressEvent, ProgressSink};

const CHANNEL_CAPACITY: usize = 64;

pub fn progress_key(session_id: &str) -> String {
    format!("progress_{}", session_id)
}

/// Persists the latest event per session and fans events out to subscribers.
pub struct StoredProgressSink {
    kv: Arc<dyn KeyValueStore>,
    events: broadcast::Sender<ProgressEvent>,
}

impl StoredProgressSink {
    pub fn new(kv: Arc<dyn KeyValueStore>) -> Self {
        let (events, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self { kv, events }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ProgressEvent> {
        self.events.subscribe()
    }
}

#[async_trait]
impl ProgressSink for StoredProgressSink {
    async fn report(&self, event: ProgressEvent) {
        match serde_json::to_value(&event) {
            Ok(value) => {
                if let Err(e) = self.kv.set(&progress_key(&event.session_id), value).await {
                    warn!("Failed to store progress for {}: {}", event.session_id, e);
                }
            }
            Err(e) => warn!("Failed to encode progress event: {}", e),
        }
        // No subscribers is fine.
        let _ = self.events.send(event);
    }
}

/// Logs each event; used by the command line.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogProgressSink;

#[async_trait]
impl ProgressSink for LogProgressSink {
    async fn report(&self, event: ProgressEvent) {
        info!(
            "[{}] {:?} {}% {}",
            event.session_id, event.stage, event.progress_percent, event.details
        );
    }
}
