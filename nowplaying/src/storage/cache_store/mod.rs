mod config;
mod memory;
mod redis;
mod types;

pub use config::StoreConfig;
pub use types::{CacheStore, InMemoryCacheStore, RedisCacheStore};
