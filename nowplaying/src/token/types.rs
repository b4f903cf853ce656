use serde::Deserialize;
use serde_json::Value;

/// Lifetime assumed when the token endpoint omits `expires_in`.
pub(super) const DEFAULT_EXPIRES_IN_SECS: f64 = 3600.0;

/// Body returned by the token endpoint for `grant_type=refresh_token`.
///
/// Every field is optional here; which ones are required is decided by the
/// refresh logic so it can report a missing `access_token` as an auth failure.
#[derive(Debug, Clone, Deserialize)]
pub(super) struct TokenResponse {
    pub(super) access_token: Option<String>,
    #[allow(dead_code)]
    pub(super) token_type: Option<String>,
    /// Kept loose: a string or other non-number falls back to the default.
    pub(super) expires_in: Option<Value>,
    pub(super) refresh_token: Option<String>,
}

impl TokenResponse {
    /// Lifetime in seconds, falling back to the default for absent, non-numeric
    /// or non-positive values.
    pub(super) fn lifetime_secs(&self) -> f64 {
        self.expires_in
            .as_ref()
            .and_then(Value::as_f64)
            .filter(|secs| secs.is_finite() && *secs > 0.0)
            .unwrap_or(DEFAULT_EXPIRES_IN_SECS)
    }
}
