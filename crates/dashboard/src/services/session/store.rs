//! Persistence for session values.

use std::collections::HashMap;
use std::future::Future;

use serde_json::Value;
use thiserror::Error;
use tokio::sync::Mutex;

/// Errors raised by a session persistence store.
#[derive(Debug, Error)]
pub enum SessionStoreError {
    /// The tower-sessions backend failed.
    #[error("session backend error: {0}")]
    Backend(#[from] tower_sessions::session::Error),

    /// A value could not be serialized.
    #[error("session serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// A key-value store holding the persisted session values.
///
/// Reads return raw JSON; callers treat it as untrusted.
pub trait SessionPersistence: Send + Sync {
    /// Read the value stored under `key`.
    fn load(&self, key: &str)
    -> impl Future<Output = Result<Option<Value>, SessionStoreError>> + Send;

    /// Store `value` under `key`, replacing any previous value.
    fn store(
        &self,
        key: &str,
        value: Value,
    ) -> impl Future<Output = Result<(), SessionStoreError>> + Send;

    /// Remove the value under `key`. Removing an absent key is not an error.
    fn remove(&self, key: &str) -> impl Future<Output = Result<(), SessionStoreError>> + Send;
}

impl SessionPersistence for tower_sessions::Session {
    async fn load(&self, key: &str) -> Result<Option<Value>, SessionStoreError> {
        Ok(self.get_value(key).await?)
    }

    async fn store(&self, key: &str, value: Value) -> Result<(), SessionStoreError> {
        self.insert_value(key, value).await?;
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), SessionStoreError> {
        self.remove_value(key).await?;
        Ok(())
    }
}

/// Process-local persistence, used by the CLI and in tests.
#[derive(Debug, Default)]
pub struct MemorySessionPersistence {
    values: Mutex<HashMap<String, Value>>,
}

impl MemorySessionPersistence {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether nothing is stored.
    pub async fn is_empty(&self) -> bool {
        self.values.lock().await.is_empty()
    }
}

impl SessionPersistence for MemorySessionPersistence {
    async fn load(&self, key: &str) -> Result<Option<Value>, SessionStoreError> {
        Ok(self.values.lock().await.get(key).cloned())
    }

    async fn store(&self, key: &str, value: Value) -> Result<(), SessionStoreError> {
        self.values.lock().await.insert(key.to_owned(), value);
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), SessionStoreError> {
        self.values.lock().await.remove(key);
        Ok(())
    }
}
