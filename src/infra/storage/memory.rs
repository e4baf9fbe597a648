//! In-memory key-value store.

use async_trait::async_trait;
use dashmap::DashMap;

use crate::domain::{AppError, KeyValueStore};

/// Process-local store backed by a concurrent map. Contents do not survive
/// a restart.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: DashMap<String, String>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Raw keys as stored, including any namespace prefix
    #[must_use]
    pub fn keys(&self) -> Vec<String> {
        self.entries.iter().map(|e| e.key().clone()).collect()
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn set(&self, key: &str, value: &str) -> Result<(), AppError> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<String>, AppError> {
        Ok(self.entries.get(key).map(|e| e.value().clone()))
    }

    async fn remove(&self, key: &str) -> Result<(), AppError> {
        self.entries.remove(key);
        Ok(())
    }

    async fn clear(&self) -> Result<(), AppError> {
        self.entries.clear();
        Ok(())
    }

    async fn clear_prefix(&self, prefix: &str) -> Result<(), AppError> {
        self.entries.retain(|key, _| !key.starts_with(prefix));
        Ok(())
    }
}
