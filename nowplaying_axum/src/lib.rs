mod error;
mod handlers;
mod middleware;
mod router;

pub use error::{ErrorResponse, IntoResponseError};
pub use router::{ProxyState, now_playing_router, now_playing_router_no_trace};

// Re-export the core so applications need a single dependency
pub use nowplaying;
pub use nowplaying::{DeferredTasks, SpotifyConfig, TokenManager, TokenStore, init};
