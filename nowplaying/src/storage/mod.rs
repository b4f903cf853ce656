mod cache_store;
mod errors;
mod token_store;
mod types;

pub use cache_store::{CacheStore, InMemoryCacheStore, RedisCacheStore, StoreConfig};
pub use errors::StorageError;
pub use token_store::TokenStore;
pub use types::{
    CachedToken, MAX_LIFETIME_SECS, REFRESH_TOKEN_KEY, SAFETY_BUFFER_SECS, TOKEN_KEY, store_ttl_secs,
};
