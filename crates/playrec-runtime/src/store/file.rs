//! File-based session store: one JSON file per session plus a newest-first index.

use std::path::PathBuf;

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use playrec_protocols::{SessionRecord, SessionStore, StoreError};

use super::{DEFAULT_HISTORY_LIMIT, is_valid_id, promote};

const INDEX_FILE: &str = "index.json";

/// File-based session store.
pub struct FileSessionStore {
    directory: PathBuf,
    limit: usize,
    /// Serializes index read-modify-write cycles.
    index_lock: Mutex<()>,
}

impl FileSessionStore {
    pub fn new(directory: PathBuf) -> Self {
        Self::with_limit(directory, DEFAULT_HISTORY_LIMIT)
    }

    pub fn with_limit(directory: PathBuf, limit: usize) -> Self {
        Self {
            directory,
            limit,
            index_lock: Mutex::new(()),
        }
    }

    pub fn directory(&self) -> &PathBuf {
        &self.directory
    }

    fn session_path(&self, id: &str) -> PathBuf {
        self.directory.join(format!("{}.json", id))
    }

    fn index_path(&self) -> PathBuf {
        self.directory.join(INDEX_FILE)
    }

    async fn read_index(&self) -> Result<Vec<String>, StoreError> {
        let path = self.index_path();
        if !path.exists() {
            return Ok(Vec::new());
        }
        let json = tokio::fs::read_to_string(&path).await?;
        Ok(serde_json::from_str(&json)?)
    }

    async fn write_index(&self, index: &[String]) -> Result<(), StoreError> {
        let json = serde_json::to_string_pretty(index)?;
        tokio::fs::write(self.index_path(), json).await?;
        Ok(())
    }

    async fn remove_file(&self, id: &str) -> Result<(), StoreError> {
        let path = self.session_path(id);
        if path.exists() {
            tokio::fs::remove_file(&path).await?;
            debug!("Deleted session file: {:?}", path);
        }
        Ok(())
    }
}

#[async_trait]
impl SessionStore for FileSessionStore {
    async fn save_session(&self, record: &SessionRecord) -> Result<(), StoreError> {
        if !is_valid_id(&record.id) {
            return Err(StoreError::Io(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                format!("invalid session id: {}", record.id),
            )));
        }

        let _guard = self.index_lock.lock().await;
        tokio::fs::create_dir_all(&self.directory).await?;

        let json = serde_json::to_string_pretty(record)?;
        let path = self.session_path(&record.id);
        tokio::fs::write(&path, json).await?;
        debug!("Saved session {} to {:?}", record.id, path);

        let mut index = self.read_index().await?;
        let evicted = promote(&mut index, &record.id, self.limit);
        self.write_index(&index).await?;

        for id in evicted {
            debug!("Evicting session {} from history", id);
            self.remove_file(&id).await?;
        }
        Ok(())
    }

    async fn get_session(&self, id: &str) -> Result<Option<SessionRecord>, StoreError> {
        if !is_valid_id(id) {
            return Ok(None);
        }
        let path = self.session_path(id);
        if !path.exists() {
            return Ok(None);
        }
        let json = tokio::fs::read_to_string(&path).await?;
        Ok(Some(serde_json::from_str(&json)?))
    }

    async fn get_history(&self) -> Result<Vec<SessionRecord>, StoreError> {
        let _guard = self.index_lock.lock().await;
        let mut records = Vec::new();
        for id in self.read_index().await? {
            match self.get_session(&id).await {
                Ok(Some(record)) => records.push(record),
                Ok(None) => warn!("Session {} is indexed but has no file", id),
                Err(e) => warn!("Skipping unreadable session {}: {}", id, e),
            }
        }
        Ok(records)
    }

    async fn delete_session(&self, id: &str) -> Result<(), StoreError> {
        if !is_valid_id(id) {
            return Ok(());
        }
        let _guard = self.index_lock.lock().await;
        let mut index = self.read_index().await?;
        let before = index.len();
        index.retain(|existing| existing != id);
        if index.len() != before {
            self.write_index(&index).await?;
        }
        self.remove_file(id).await
    }
}
