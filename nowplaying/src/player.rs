//! The upstream "currently playing" call.

use reqwest::StatusCode;
use reqwest::header::CONTENT_TYPE;
use thiserror::Error;

use crate::token::{TokenError, TokenManager};

/// What the currently-playing endpoint reported.
#[derive(Debug, Clone, PartialEq)]
pub enum NowPlaying {
    /// Upstream answered 204: nothing is playing.
    Idle,
    /// Upstream answered with track metadata, relayed verbatim.
    Track {
        status: u16,
        content_type: Option<String>,
        body: Vec<u8>,
    },
}

#[derive(Debug, Error, Clone)]
pub enum PlayerError {
    #[error("Token error: {0}")]
    Token(#[from] TokenError),

    /// The currently-playing call answered with a non-success status.
    #[error("Upstream unavailable: status {status}")]
    UpstreamUnavailable { status: u16 },

    #[error("Request error: {0}")]
    Request(String),
}

/// Fetch the playback state with a valid bearer token, forwarding `query`.
pub async fn fetch_now_playing(
    manager: &TokenManager,
    query: Option<&str>,
) -> Result<NowPlaying, PlayerError> {
    let access_token = manager.get_valid_token().await?;

    let mut url = manager.config().currently_playing_url.clone();
    if let Some(query) = query.filter(|q| !q.is_empty()) {
        url.push(if url.contains('?') { '&' } else { '?' });
        url.push_str(query);
    }

    let response = manager
        .client()
        .get(&url)
        .bearer_auth(access_token)
        .send()
        .await
        .map_err(|e| PlayerError::Request(e.to_string()))?;

    let status = response.status();
    if status == StatusCode::NO_CONTENT {
        tracing::debug!("Nothing is playing");
        return Ok(NowPlaying::Idle);
    }

    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        tracing::error!(
            "Failed to fetch currently playing track: status={}, body={}",
            status,
            body
        );
        return Err(PlayerError::UpstreamUnavailable {
            status: status.as_u16(),
        });
    }

    let content_type = response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    let body = response
        .bytes()
        .await
        .map_err(|e| PlayerError::Request(e.to_string()))?
        .to_vec();

    tracing::debug!("Currently playing: status={}, {} bytes", status, body.len());
    Ok(NowPlaying::Track {
        status: status.as_u16(),
        content_type,
        body,
    })
}
