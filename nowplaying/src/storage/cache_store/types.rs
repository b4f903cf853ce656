use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;

use crate::storage::errors::StorageError;

pub struct InMemoryCacheStore {
    pub(super) entry: HashMap<String, MemoryEntry>,
}

#[derive(Debug, Clone)]
pub(super) struct MemoryEntry {
    pub(super) value: String,
    pub(super) evict_at: Option<DateTime<Utc>>,
}

pub struct RedisCacheStore {
    pub(super) client: redis::Client,
}

/// Key-value backend the token store is persisted in.
#[async_trait]
pub trait CacheStore: Send + Sync + 'static {
    /// Initialize the store. This is called when the store is created.
    async fn init(&self) -> Result<(), StorageError>;

    /// Put a value into the store without expiry.
    async fn put(&mut self, key: &str, value: String) -> Result<(), StorageError>;

    /// Put a value into the store, evicted by the backend after `ttl` seconds.
    async fn put_with_ttl(&mut self, key: &str, value: String, ttl: u64)
    -> Result<(), StorageError>;

    /// Get a value from the store.
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Remove a value from the store.
    async fn remove(&mut self, key: &str) -> Result<(), StorageError>;
}
