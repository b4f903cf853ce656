//! In-memory cache store whose writes take a configurable time

use async_trait::async_trait;
use nowplaying_axum::nowplaying::{CacheStore, InMemoryCacheStore, StorageError, TokenStore};
use std::time::Duration;

pub struct SlowStore {
    inner: InMemoryCacheStore,
    put_delay: Duration,
    put_with_ttl_delay: Duration,
}

impl SlowStore {
    /// `put` (durable keys) and `put_with_ttl` (cached token) each sleep first.
    pub fn token_store(put_delay: Duration, put_with_ttl_delay: Duration) -> TokenStore {
        TokenStore::new(Box::new(Self {
            inner: InMemoryCacheStore::new(),
            put_delay,
            put_with_ttl_delay,
        }))
    }
}

#[async_trait]
impl CacheStore for SlowStore {
    async fn init(&self) -> Result<(), StorageError> {
        self.inner.init().await
    }

    async fn put(&mut self, key: &str, value: String) -> Result<(), StorageError> {
        tokio::time::sleep(self.put_delay).await;
        self.inner.put(key, value).await
    }

    async fn put_with_ttl(
        &mut self,
        key: &str,
        value: String,
        ttl: u64,
    ) -> Result<(), StorageError> {
        tokio::time::sleep(self.put_with_ttl_delay).await;
        self.inner.put_with_ttl(key, value, ttl).await
    }

    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        self.inner.get(key).await
    }

    async fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        self.inner.remove(key).await
    }
}
