pub mod slow_store;

pub use mock_spotify::{MockReply, MockSpotify, default_token_body, default_track_body};
pub use slow_store::SlowStore;
pub use test_server::{TEST_CLIENT_ID, TestServer};

use reqwest::Response;

/// Assert the headers every proxy response must carry.
pub fn assert_proxy_headers(response: &Response) {
    let headers = response.headers();
    assert_eq!(
        headers
            .get("access-control-allow-origin")
            .and_then(|v| v.to_str().ok()),
        Some("*")
    );
    assert_eq!(
        headers.get("cache-control").and_then(|v| v.to_str().ok()),
        Some("no-store")
    );
}

pub fn now_millis() -> i64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .expect("clock before epoch")
        .as_millis() as i64
}
