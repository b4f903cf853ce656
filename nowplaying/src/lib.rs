//! nowplaying - token lifecycle core for a Spotify "now playing" edge proxy
//!
//! Holds the refresh token in an external key-value store, exchanges it for
//! short-lived access tokens, caches them with a safety buffer, and fetches
//! the account's currently-playing state with a valid bearer token.

mod config;
mod deferred;
mod player;
mod storage;
mod token;
mod utils;

pub use config::{
    ClientAuthMode, ConfigError, DEFAULT_CURRENTLY_PLAYING_URL, DEFAULT_TOKEN_URL, SpotifyConfig,
};
pub use deferred::DeferredTasks;
pub use player::{NowPlaying, PlayerError, fetch_now_playing};
pub use storage::{
    CacheStore, CachedToken, InMemoryCacheStore, MAX_LIFETIME_SECS, REFRESH_TOKEN_KEY,
    RedisCacheStore, SAFETY_BUFFER_SECS, StorageError, StoreConfig, TOKEN_KEY, TokenStore,
    store_ttl_secs,
};
pub use token::{SeedError, SeedPayload, TokenError, TokenManager, seed_credentials};

/// Load configuration and connect the token store.
pub async fn init() -> Result<(SpotifyConfig, TokenStore), Box<dyn std::error::Error>> {
    let config = SpotifyConfig::from_env()?;
    if let Err(e) = config.validate() {
        // Refresh reports this as MissingCredential; surface it early too
        tracing::warn!("{}", e);
    }

    let store = TokenStore::new(StoreConfig::from_env()?.connect().await?);
    Ok((config, store))
}
