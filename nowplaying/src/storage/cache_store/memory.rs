use async_trait::async_trait;
use chrono::{Duration, Utc};
use std::collections::HashMap;

use crate::storage::errors::StorageError;

use super::types::{CacheStore, InMemoryCacheStore, MemoryEntry};

impl InMemoryCacheStore {
    pub fn new() -> Self {
        tracing::info!("Creating new in-memory token cache store");
        Self {
            entry: HashMap::new(),
        }
    }
}

impl Default for InMemoryCacheStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryEntry {
    fn is_live(&self) -> bool {
        self.evict_at.is_none_or(|at| Utc::now() < at)
    }
}

#[async_trait]
impl CacheStore for InMemoryCacheStore {
    async fn init(&self) -> Result<(), StorageError> {
        Ok(()) // Nothing to initialize for in-memory store
    }

    async fn put(&mut self, key: &str, value: String) -> Result<(), StorageError> {
        self.entry.insert(
            key.to_string(),
            MemoryEntry {
                value,
                evict_at: None,
            },
        );
        Ok(())
    }

    async fn put_with_ttl(
        &mut self,
        key: &str,
        value: String,
        ttl: u64,
    ) -> Result<(), StorageError> {
        let evict_at = i64::try_from(ttl)
            .ok()
            .and_then(Duration::try_seconds)
            .and_then(|ttl| Utc::now().checked_add_signed(ttl))
            .ok_or_else(|| StorageError::Storage(format!("TTL out of range: {ttl}")))?;
        self.entry.insert(
            key.to_string(),
            MemoryEntry {
                value,
                evict_at: Some(evict_at),
            },
        );
        // Sweep anything that has already lapsed
        self.entry.retain(|_, entry| entry.is_live());
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self
            .entry
            .get(key)
            .filter(|entry| entry.is_live())
            .map(|entry| entry.value.clone()))
    }

    async fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        self.entry.remove(key);
        Ok(())
    }
}
