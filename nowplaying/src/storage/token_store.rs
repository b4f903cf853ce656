//! Persisted credential state: the cached access token and the refresh token.

use std::sync::Arc;
use tokio::sync::Mutex;

use super::cache_store::{CacheStore, InMemoryCacheStore};
use super::errors::StorageError;
use super::types::{CachedToken, REFRESH_TOKEN_KEY, TOKEN_KEY};

/// Handle to the key-value store that owns all credential state.
///
/// Cloning is cheap and every clone talks to the same backend. Nothing read
/// through this handle is retained in process; callers re-read per request.
#[derive(Clone)]
pub struct TokenStore {
    inner: Arc<Mutex<Box<dyn CacheStore>>>,
}

impl TokenStore {
    pub fn new(store: Box<dyn CacheStore>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(store)),
        }
    }

    pub fn in_memory() -> Self {
        Self::new(Box::new(InMemoryCacheStore::new()))
    }

    /// Read the cached access token.
    ///
    /// An entry that no longer parses is logged and reported as absent so the
    /// next refresh overwrites it.
    pub async fn get_cached_token(&self) -> Result<Option<CachedToken>, StorageError> {
        let raw = self.inner.lock().await.get(TOKEN_KEY).await?;
        let Some(raw) = raw else {
            return Ok(None);
        };

        match serde_json::from_str::<CachedToken>(&raw) {
            Ok(token) => Ok(Some(token)),
            Err(e) => {
                tracing::warn!("Ignoring unparsable cached token entry: {}", e);
                Ok(None)
            }
        }
    }

    pub async fn put_cached_token(
        &self,
        token: &CachedToken,
        ttl_secs: u64,
    ) -> Result<(), StorageError> {
        let value = serde_json::to_string(token)?;
        self.inner
            .lock()
            .await
            .put_with_ttl(TOKEN_KEY, value, ttl_secs)
            .await
    }

    pub async fn get_refresh_token(&self) -> Result<Option<String>, StorageError> {
        let value = self.inner.lock().await.get(REFRESH_TOKEN_KEY).await?;
        Ok(value.filter(|token| !token.is_empty()))
    }

    /// Store the refresh token as a raw string with no expiry.
    pub async fn put_refresh_token(&self, refresh_token: &str) -> Result<(), StorageError> {
        self.inner
            .lock()
            .await
            .put(REFRESH_TOKEN_KEY, refresh_token.to_string())
            .await
    }

    /// Raw access to the backing store, for inspection in tests and tooling.
    pub async fn get_raw(&self, key: &str) -> Result<Option<String>, StorageError> {
        self.inner.lock().await.get(key).await
    }
}
