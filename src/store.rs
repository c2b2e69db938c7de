use std::collections::HashMap;

use anyhow::Result;
use async_trait::async_trait;
use serde_json::Value as JsonValue;
use tokio::sync::RwLock;

/// Opaque get/put-by-key storage for JSON values
///
/// No transactional guarantees: a `get` followed by a `put` from another
/// request can interleave, and the last `put` wins.
#[async_trait]
pub trait KvStore: Send + Sync {
    /// `Ok(None)` when nothing has been stored under `key`
    async fn get(&self, key: &str) -> Result<Option<JsonValue>>;

    /// Insert or overwrite the value under `key`
    async fn put(&self, key: &str, value: JsonValue) -> Result<()>;

    /// Lightweight round trip proving the backend is reachable
    async fn health_check(&self) -> Result<()>;
}

/// Process-local store, used by the `memory` backend and in tests
#[derive(Debug, Default)]
pub struct InMemoryStore {
    values: RwLock<HashMap<String, JsonValue>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl KvStore for InMemoryStore {
    async fn get(&self, key: &str) -> Result<Option<JsonValue>> {
        Ok(self.values.read().await.get(key).cloned())
    }

    async fn put(&self, key: &str, value: JsonValue) -> Result<()> {
        self.values.write().await.insert(key.to_string(), value);
        tracing::debug!("Stored value under key: {}", key);
        Ok(())
    }

    async fn health_check(&self) -> Result<()> {
        Ok(())
    }
}
