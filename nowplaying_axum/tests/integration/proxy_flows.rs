//! Currently-playing passthrough: caching, refresh, relay and error translation.

use nowplaying_axum::nowplaying::CachedToken;
use serde_json::{Value, json};

use crate::common::{
    MockReply, TEST_CLIENT_ID, TestServer, assert_proxy_headers, default_track_body, now_millis,
};

async fn seed_stale_cache(server: &TestServer, refresh_token: &str) {
    let stale = CachedToken {
        access_token: "at-stale".to_string(),
        expires_at: now_millis() - 1_000,
    };
    server.store().put_cached_token(&stale, 3600).await.unwrap();
    server.store().put_refresh_token(refresh_token).await.unwrap();
}

/// Seeding then reading uses the seeded access token without a refresh
#[tokio::test]
async fn test_seed_then_get_uses_cached_token() {
    let server = TestServer::start().await;

    let response = server
        .post_json(
            "/token",
            &json!({ "refresh_token": "rt1", "access_token": "at1", "expires_in": 3600 }),
        )
        .await;
    assert_eq!(response.status(), 200);
    assert_eq!(response.json::<Value>().await.unwrap(), json!({ "status": "ok" }));

    let response = server.get("/").await;
    assert_eq!(response.status(), 200);
    assert_proxy_headers(&response);
    assert_eq!(response.json::<Value>().await.unwrap(), default_track_body());

    assert_eq!(server.spotify.token_calls(), 0);
    assert_eq!(server.spotify.bearers(), vec!["at1".to_string()]);
}

/// A stale cache triggers exactly one refresh before the currently-playing call
#[tokio::test]
async fn test_stale_cache_refreshes_once() {
    let server = TestServer::start().await;
    seed_stale_cache(&server, "rt1").await;

    let before = now_millis();
    let response = server.get("/").await;
    let after = now_millis();

    assert_eq!(response.status(), 200);
    assert_eq!(server.spotify.token_calls(), 1);
    assert_eq!(server.spotify.playing_calls(), 1);
    assert_eq!(server.spotify.bearers(), vec!["at-refreshed".to_string()]);

    // PKCE-style body: client_id in the form, no Authorization header
    let form = server.spotify.last_token_form().expect("token form");
    assert_eq!(form.get("grant_type").map(String::as_str), Some("refresh_token"));
    assert_eq!(form.get("refresh_token").map(String::as_str), Some("rt1"));
    assert_eq!(form.get("client_id").map(String::as_str), Some(TEST_CLIENT_ID));
    assert!(server.spotify.last_token_auth().is_none());

    // The new token lands in the store once deferred writes settle
    server.settle().await;
    let cached = server
        .store()
        .get_cached_token()
        .await
        .unwrap()
        .expect("cached token after refresh");
    assert_eq!(cached.access_token, "at-refreshed");
    assert!(cached.expires_at >= before + 3_540_000);
    assert!(cached.expires_at <= after + 3_540_000);
}

/// Once the refreshed token is cached, the next request does not refresh again
#[tokio::test]
async fn test_refreshed_token_is_reused() {
    let server = TestServer::start().await;
    seed_stale_cache(&server, "rt1").await;

    assert_eq!(server.get("/").await.status(), 200);
    server.settle().await;
    assert_eq!(server.get("/").await.status(), 200);

    assert_eq!(server.spotify.token_calls(), 1);
    assert_eq!(server.spotify.playing_calls(), 2);
}

/// Upstream 204 becomes 200 `{is_playing: false}`
#[tokio::test]
async fn test_nothing_playing() {
    let server = TestServer::start().await;
    seed_stale_cache(&server, "rt1").await;
    server.spotify.set_playing_reply(MockReply::no_content());

    let response = server.get("/").await;
    assert_eq!(response.status(), 200);
    assert_proxy_headers(&response);
    assert!(
        response
            .headers()
            .get("content-type")
            .and_then(|v| v.to_str().ok())
            .is_some_and(|ct| ct.starts_with("application/json"))
    );
    assert_eq!(
        response.json::<Value>().await.unwrap(),
        json!({ "is_playing": false })
    );
}

/// Token endpoint rejects the refresh: 503 with a generic message
#[tokio::test]
async fn test_invalid_grant_is_service_unavailable() {
    let server = TestServer::start().await;
    seed_stale_cache(&server, "rt-revoked").await;
    server.spotify.set_token_reply(MockReply::json(
        400,
        json!({ "error": "invalid_grant", "error_description": "Refresh token revoked" }),
    ));

    let response = server.get("/").await;
    assert_eq!(response.status(), 503);
    assert_proxy_headers(&response);
    assert_eq!(
        response.json::<Value>().await.unwrap(),
        json!({ "error": "Spotify token refresh failed" })
    );
    assert_eq!(server.spotify.token_calls(), 1);
    assert_eq!(server.spotify.playing_calls(), 0);
}

/// Nothing seeded and no fallback configured
#[tokio::test]
async fn test_empty_store_is_service_unavailable() {
    let server = TestServer::start().await;

    let response = server.get("/").await;
    assert_eq!(response.status(), 503);
    assert_eq!(
        response.json::<Value>().await.unwrap(),
        json!({ "error": "Spotify token refresh failed" })
    );
    assert_eq!(server.spotify.token_calls(), 0);
}

/// Non-JSON token response is reported as 503 too
#[tokio::test]
async fn test_malformed_token_response_is_service_unavailable() {
    let server = TestServer::start().await;
    seed_stale_cache(&server, "rt1").await;
    server.spotify.set_token_reply(MockReply::raw(
        502,
        Some("text/html"),
        "<html>Bad Gateway</html>",
    ));

    let response = server.get("/").await;
    assert_eq!(response.status(), 503);
    assert_eq!(server.spotify.playing_calls(), 0);
}

/// Currently-playing failure: 502 with a generic message, no upstream detail leaked
#[tokio::test]
async fn test_upstream_failure_is_bad_gateway() {
    let server = TestServer::start().await;
    seed_stale_cache(&server, "rt1").await;
    server.spotify.set_playing_reply(MockReply::json(
        429,
        json!({ "error": { "status": 429, "message": "API rate limit exceeded" } }),
    ));

    let response = server.get("/").await;
    assert_eq!(response.status(), 502);
    assert_proxy_headers(&response);
    assert_eq!(
        response.json::<Value>().await.unwrap(),
        json!({ "error": "Failed to fetch currently playing track" })
    );
}

/// Success bodies and content types are relayed verbatim
#[tokio::test]
async fn test_relays_body_and_content_type() {
    let server = TestServer::start().await;
    seed_stale_cache(&server, "rt1").await;
    server.spotify.set_playing_reply(MockReply::raw(
        200,
        Some("application/json; charset=utf-8"),
        r#"{"is_playing":true,"item":null}"#,
    ));

    let response = server.get("/").await;
    assert_eq!(response.status(), 200);
    assert_eq!(
        response
            .headers()
            .get("content-type")
            .and_then(|v| v.to_str().ok()),
        Some("application/json; charset=utf-8")
    );
    assert_eq!(
        response.text().await.unwrap(),
        r#"{"is_playing":true,"item":null}"#
    );
}

/// Missing upstream Content-Type defaults to JSON
#[tokio::test]
async fn test_missing_content_type_defaults_to_json() {
    let server = TestServer::start().await;
    seed_stale_cache(&server, "rt1").await;
    server
        .spotify
        .set_playing_reply(MockReply::raw(200, None, r#"{"is_playing":true}"#));

    let response = server.get("/").await;
    assert_eq!(response.status(), 200);
    assert_eq!(
        response
            .headers()
            .get("content-type")
            .and_then(|v| v.to_str().ok()),
        Some("application/json")
    );
}

/// Preflight short-circuits with CORS headers and never reaches upstream
#[tokio::test]
async fn test_options_preflight() {
    let server = TestServer::start().await;

    for path in ["/", "/token", "/anything/else"] {
        let response = server.request(reqwest::Method::OPTIONS, path).await;
        assert_eq!(response.status(), 204);
        assert_proxy_headers(&response);
        let methods = response
            .headers()
            .get("access-control-allow-methods")
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();
        assert!(methods.contains("GET") && methods.contains("POST"));
        assert!(response.text().await.unwrap().is_empty());
    }

    assert_eq!(server.spotify.token_calls(), 0);
    assert_eq!(server.spotify.playing_calls(), 0);
}

/// Every path other than `POST /token` is the passthrough
#[tokio::test]
async fn test_any_path_is_proxied() {
    let server = TestServer::start().await;
    seed_stale_cache(&server, "rt1").await;

    assert_eq!(server.get("/now-playing").await.status(), 200);
    assert_eq!(server.get("/token").await.status(), 200);
    assert_eq!(server.spotify.playing_calls(), 2);
}

/// The inbound query string is forwarded upstream
#[tokio::test]
async fn test_query_is_forwarded() {
    let server = TestServer::start().await;
    seed_stale_cache(&server, "rt1").await;

    assert_eq!(
        server.get("/?market=DE&additional_types=episode").await.status(),
        200
    );
    assert_eq!(
        server.spotify.playing_queries(),
        vec![Some("market=DE&additional_types=episode".to_string())]
    );
}
