//! One-time bootstrap of credentials into the token store.

use serde_json::{Map, Value};

use crate::storage::{CachedToken, TokenStore, store_ttl_secs};
use crate::utils::now_millis;

use super::errors::SeedError;

/// Validated bootstrap payload: `{refresh_token, access_token, expires_in}`.
#[derive(Debug, Clone, PartialEq)]
pub struct SeedPayload {
    pub refresh_token: String,
    pub access_token: String,
    pub expires_in: f64,
}

impl SeedPayload {
    pub fn from_slice(body: &[u8]) -> Result<Self, SeedError> {
        let value: Value = serde_json::from_slice(body).map_err(|_| SeedError::InvalidBody)?;
        Self::from_json(&value)
    }

    /// Validate every field before anything is written.
    pub fn from_json(body: &Value) -> Result<Self, SeedError> {
        let fields = body.as_object().ok_or(SeedError::InvalidBody)?;

        let refresh_token = required_string(fields, "refresh_token")?;
        let access_token = required_string(fields, "access_token")?;
        let expires_in = match fields.get("expires_in") {
            None | Some(Value::Null) => {
                return Err(SeedError::Validation("expires_in is required".to_string()));
            }
            Some(value) => value
                .as_f64()
                .filter(|secs| secs.is_finite() && *secs > 0.0)
                .ok_or_else(|| {
                    SeedError::Validation("expires_in must be a positive number".to_string())
                })?,
        };

        Ok(Self {
            refresh_token,
            access_token,
            expires_in,
        })
    }
}

fn required_string(fields: &Map<String, Value>, name: &str) -> Result<String, SeedError> {
    match fields.get(name) {
        None | Some(Value::Null) => Err(SeedError::Validation(format!("{name} is required"))),
        Some(Value::String(s)) if !s.trim().is_empty() => Ok(s.clone()),
        Some(_) => Err(SeedError::Validation(format!(
            "{name} must be a non-empty string"
        ))),
    }
}

/// Persist a validated payload: durable refresh token, then the cached access token.
pub async fn seed_credentials(
    store: &TokenStore,
    payload: &SeedPayload,
) -> Result<CachedToken, SeedError> {
    store.put_refresh_token(&payload.refresh_token).await?;

    let cached = CachedToken::issue(payload.access_token.clone(), payload.expires_in, now_millis());
    store
        .put_cached_token(&cached, store_ttl_secs(payload.expires_in))
        .await?;

    tracing::info!(
        "Seeded credentials; access token fresh until {}",
        cached.expires_at
    );
    Ok(cached)
}
