//! Persistence collaborator contracts.

use async_trait::async_trait;
use serde_json::Value;

use crate::error::StoreError;
use crate::session::SessionRecord;

/// Storage of finished sessions, listed newest first.
#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn save_session(&self, record: &SessionRecord) -> Result<(), StoreError>;

    async fn get_session(&self, id: &str) -> Result<Option<SessionRecord>, StoreError>;

    async fn get_history(&self) -> Result<Vec<SessionRecord>, StoreError>;

    async fn delete_session(&self, id: &str) -> Result<(), StoreError>;
}

/// Settings and transient values (progress, downloadable artifacts).
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<Value>, StoreError>;

    async fn set(&self, key: &str, value: Value) -> Result<(), StoreError>;

    async fn remove(&self, key: &str) -> Result<(), StoreError>;
}
