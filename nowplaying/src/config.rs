//! Environment-provided configuration for the upstream Spotify endpoints

use std::{env, time::Duration};
use thiserror::Error;

pub const DEFAULT_TOKEN_URL: &str = "https://accounts.spotify.com/api/token";
pub const DEFAULT_CURRENTLY_PLAYING_URL: &str =
    "https://api.spotify.com/v1/me/player/currently-playing";
pub const DEFAULT_UPSTREAM_TIMEOUT_SECS: u64 = 8;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Missing configuration: {0} must be set")]
    Missing(String),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// How the refresh request authenticates the client to the token endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientAuthMode {
    /// Public client: `client_id` goes in the form body, no secret.
    Pkce,
    /// Confidential client: HTTP Basic with `client_id:client_secret`.
    Basic,
}

impl ClientAuthMode {
    fn parse(value: Option<&str>) -> Result<Self, ConfigError> {
        match value.map(str::to_ascii_lowercase).as_deref() {
            None | Some("pkce") => Ok(Self::Pkce),
            Some("basic") => Ok(Self::Basic),
            Some(other) => Err(ConfigError::Invalid(format!(
                "SPOTIFY_CLIENT_AUTH must be 'pkce' or 'basic', got '{other}'"
            ))),
        }
    }
}

#[derive(Debug, Clone)]
pub struct SpotifyConfig {
    pub client_id: String,
    pub client_secret: Option<String>,
    pub auth_mode: ClientAuthMode,
    /// Used only when the store holds no refresh token.
    pub fallback_refresh_token: Option<String>,
    pub token_url: String,
    pub currently_playing_url: String,
    pub upstream_timeout: Duration,
    pub single_flight: bool,
}

impl SpotifyConfig {
    /// Configuration pointing at the public Spotify endpoints.
    pub fn new(client_id: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: None,
            auth_mode: ClientAuthMode::Pkce,
            fallback_refresh_token: None,
            token_url: DEFAULT_TOKEN_URL.to_string(),
            currently_playing_url: DEFAULT_CURRENTLY_PLAYING_URL.to_string(),
            upstream_timeout: Duration::from_secs(DEFAULT_UPSTREAM_TIMEOUT_SECS),
            single_flight: true,
        }
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        let var = |name: &str| env::var(name).ok().filter(|v| !v.is_empty());

        let client_id = var("SPOTIFY_CLIENT_ID")
            .ok_or_else(|| ConfigError::Missing("SPOTIFY_CLIENT_ID".into()))?;

        let token_url = var("SPOTIFY_TOKEN_URL").unwrap_or_else(|| DEFAULT_TOKEN_URL.to_string());
        check_url("SPOTIFY_TOKEN_URL", &token_url)?;

        let currently_playing_url = var("SPOTIFY_CURRENTLY_PLAYING_URL")
            .unwrap_or_else(|| DEFAULT_CURRENTLY_PLAYING_URL.to_string());
        check_url("SPOTIFY_CURRENTLY_PLAYING_URL", &currently_playing_url)?;

        Ok(Self {
            client_id,
            client_secret: var("SPOTIFY_CLIENT_SECRET"),
            auth_mode: ClientAuthMode::parse(var("SPOTIFY_CLIENT_AUTH").as_deref())?,
            fallback_refresh_token: var("SPOTIFY_REFRESH_TOKEN"),
            token_url,
            currently_playing_url,
            upstream_timeout: parse_timeout(var("UPSTREAM_TIMEOUT_SECS").as_deref())?,
            single_flight: parse_flag(var("TOKEN_SINGLE_FLIGHT").as_deref(), true),
        })
    }

    /// Startup check for settings that would only fail once a refresh runs.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.auth_mode == ClientAuthMode::Basic && self.client_secret.is_none() {
            return Err(ConfigError::Missing(
                "SPOTIFY_CLIENT_SECRET (required by SPOTIFY_CLIENT_AUTH=basic)".into(),
            ));
        }
        Ok(())
    }
}

fn check_url(name: &str, value: &str) -> Result<(), ConfigError> {
    url::Url::parse(value)
        .map(|_| ())
        .map_err(|e| ConfigError::Invalid(format!("{name} is not a valid URL: {e}")))
}

fn parse_timeout(value: Option<&str>) -> Result<Duration, ConfigError> {
    match value {
        None => Ok(Duration::from_secs(DEFAULT_UPSTREAM_TIMEOUT_SECS)),
        Some(v) => match v.parse::<u64>() {
            Ok(secs) if secs > 0 => Ok(Duration::from_secs(secs)),
            _ => Err(ConfigError::Invalid(format!(
                "UPSTREAM_TIMEOUT_SECS must be a positive integer, got '{v}'"
            ))),
        },
    }
}

fn parse_flag(value: Option<&str>, default: bool) -> bool {
    value
        .map(|v| v.to_lowercase() != "false" && v != "0")
        .unwrap_or(default)
}
