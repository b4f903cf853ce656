use std::env;

use crate::config::ConfigError;
use crate::storage::errors::StorageError;

use super::types::{CacheStore, InMemoryCacheStore, RedisCacheStore};

/// Which backend the token store lives in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreConfig {
    Memory,
    Redis { url: String },
}

impl StoreConfig {
    /// Read `TOKEN_STORE_TYPE` / `TOKEN_STORE_URL`.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::parse(
            env::var("TOKEN_STORE_TYPE").ok().as_deref(),
            env::var("TOKEN_STORE_URL").ok().as_deref(),
        )
    }

    fn parse(store_type: Option<&str>, store_url: Option<&str>) -> Result<Self, ConfigError> {
        match store_type.unwrap_or("memory") {
            "memory" => Ok(Self::Memory),
            "redis" => {
                let url = store_url
                    .filter(|url| !url.is_empty())
                    .ok_or_else(|| ConfigError::Missing("TOKEN_STORE_URL".to_string()))?;
                Ok(Self::Redis {
                    url: url.to_string(),
                })
            }
            t => Err(ConfigError::Invalid(format!(
                "Unsupported TOKEN_STORE_TYPE: {t}. Supported types are 'memory' and 'redis'"
            ))),
        }
    }

    /// Create the backend and verify it is reachable.
    pub async fn connect(&self) -> Result<Box<dyn CacheStore>, StorageError> {
        let store: Box<dyn CacheStore> = match self {
            Self::Memory => Box::new(InMemoryCacheStore::new()),
            Self::Redis { url } => {
                let store = RedisCacheStore::open(url)?;
                store.init().await.inspect_err(|e| {
                    tracing::error!("Failed to connect to Redis: {}", e);
                })?;
                Box::new(store)
            }
        };

        tracing::info!("Connected to token store: {}", self.kind());
        Ok(store)
    }

    fn kind(&self) -> &'static str {
        match self {
            Self::Memory => "memory",
            Self::Redis { .. } => "redis",
        }
    }
}
