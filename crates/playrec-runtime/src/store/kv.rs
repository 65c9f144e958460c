//! Key-value stores for settings and transient values.

use std::path::PathBuf;

use async_trait::async_trait;
use dashmap::DashMap;
use serde_json::{Map, Value};
use tokio::sync::Mutex;

use playrec_protocols::{KeyValueStore, StoreError};

/// In-memory key-value store.
#[derive(Default)]
pub struct MemoryKvStore {
    values: DashMap<String, Value>,
}

impl MemoryKvStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl KeyValueStore for MemoryKvStore {
    async fn get(&self, key: &str) -> Result<Option<Value>, StoreError> {
        Ok(self.values.get(key).map(|entry| entry.value().clone()))
    }

    async fn set(&self, key: &str, value: Value) -> Result<(), StoreError> {
        self.values.insert(key.to_string(), value);
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), StoreError> {
        self.values.remove(key);
        Ok(())
    }
}

/// A single JSON object on disk, rewritten on every change.
pub struct FileKvStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileKvStore {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            lock: Mutex::new(()),
        }
    }

    async fn load(&self) -> Result<Map<String, Value>, StoreError> {
        if !self.path.exists() {
            return Ok(Map::new());
        }
        let json = tokio::fs::read_to_string(&self.path).await?;
        if json.trim().is_empty() {
            return Ok(Map::new());
        }
        Ok(serde_json::from_str(&json)?)
    }

    async fn persist(&self, values: &Map<String, Value>) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let json = serde_json::to_string_pretty(values)?;
        tokio::fs::write(&self.path, json).await?;
        Ok(())
    }
}

#[async_trait]
impl KeyValueStore for FileKvStore {
    async fn get(&self, key: &str) -> Result<Option<Value>, StoreError> {
        let _guard = self.lock.lock().await;
        Ok(self.load().await?.remove(key))
    }

    async fn set(&self, key: &str, value: Value) -> Result<(), StoreError> {
        let _guard = self.lock.lock().await;
        let mut values = self.load().await?;
        values.insert(key.to_string(), value);
        self.persist(&values).await
    }

    async fn remove(&self, key: &str) -> Result<(), StoreError> {
        let _guard = self.lock.lock().await;
        let mut values = self.load().await?;
        if values.remove(key).is_some() {
            self.persist(&values).await?;
        }
        Ok(())
    }
}
