//! In-memory session store.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::debug;

use playrec_protocols::{SessionRecord, SessionStore, StoreError};

use super::{DEFAULT_HISTORY_LIMIT, promote};

#[derive(Default)]
struct History {
    order: Vec<String>,
    records: HashMap<String, SessionRecord>,
}

/// In-memory session store.
pub struct MemorySessionStore {
    history: RwLock<History>,
    limit: usize,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::with_limit(DEFAULT_HISTORY_LIMIT)
    }

    pub fn with_limit(limit: usize) -> Self {
        Self {
            history: RwLock::new(History::default()),
            limit,
        }
    }
}

impl Default for MemorySessionStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn save_session(&self, record: &SessionRecord) -> Result<(), StoreError> {
        let mut history = self.history.write().await;
        let evicted = promote(&mut history.order, &record.id, self.limit);
        history.records.insert(record.id.clone(), record.clone());
        for id in evicted {
            debug!("Evicting session {} from history", id);
            history.records.remove(&id);
        }
        Ok(())
    }

    async fn get_session(&self, id: &str) -> Result<Option<SessionRecord>, StoreError> {
        Ok(self.history.read().await.records.get(id).cloned())
    }

    async fn get_history(&self) -> Result<Vec<SessionRecord>, StoreError> {
        let history = self.history.read().await;
        Ok(history
            .order
            .iter()
            .filter_map(|id| history.records.get(id).cloned())
            .collect())
    }

    async fn delete_session(&self, id: &str) -> Result<(), StoreError> {
        let mut history = self.history.write().await;
        history.order.retain(|existing| existing != id);
        history.records.remove(id);
        Ok(())
    }
}
