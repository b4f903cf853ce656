//! Router for the now-playing edge proxy

use axum::{Router, middleware, routing::post};
use std::sync::Arc;
use tower_http::LatencyUnit;
use tower_http::trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer};
use tracing::Level;

use nowplaying::TokenManager;

use super::handlers::{proxy_now_playing, seed_token};
use super::middleware::cors_and_no_store;

/// Shared handler state. Holds no credentials, only the manager's handles.
#[derive(Clone)]
pub struct ProxyState {
    pub manager: Arc<TokenManager>,
}

impl ProxyState {
    pub fn new(manager: TokenManager) -> Self {
        Self {
            manager: Arc::new(manager),
        }
    }
}

/// Create the proxy router
///
/// - `OPTIONS` on any path: 204 preflight
/// - `POST /token`: seed credentials
/// - anything else: currently-playing passthrough
pub fn now_playing_router(state: ProxyState) -> Router {
    now_playing_router_no_trace(state).layer(
        TraceLayer::new_for_http()
            .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
            .on_request(DefaultOnRequest::new().level(Level::INFO))
            .on_response(
                DefaultOnResponse::new()
                    .level(Level::INFO)
                    .latency_unit(LatencyUnit::Millis),
            ),
    )
}

/// Same as [`now_playing_router`] without the HTTP tracing middleware.
///
/// Request headers are never recorded in spans by either variant; the seed
/// endpoint carries credentials.
pub fn now_playing_router_no_trace(state: ProxyState) -> Router {
    Router::new()
        .route("/token", post(seed_token).fallback(proxy_now_playing))
        .fallback(proxy_now_playing)
        .with_state(state)
        .layer(middleware::from_fn(cors_and_no_store))
}
