use serde::{Deserialize, Serialize};

/// Store key holding the serialized [`CachedToken`].
pub const TOKEN_KEY: &str = "token";

/// Store key holding the raw refresh token string.
pub const REFRESH_TOKEN_KEY: &str = "refresh_token";

/// Seconds subtracted from a token's real lifetime before it counts as stale.
pub const SAFETY_BUFFER_SECS: f64 = 60.0;

/// Upper bound applied to any reported lifetime (one year).
pub const MAX_LIFETIME_SECS: f64 = 365.0 * 24.0 * 60.0 * 60.0;

/// Access token cached together with its absolute expiry (epoch milliseconds).
///
/// `expires_at` is never the raw upstream lifetime: it is always computed by
/// [`CachedToken::issue`], so a token reported fresh has at least
/// [`SAFETY_BUFFER_SECS`] of real life left at the moment of the check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CachedToken {
    pub access_token: String,
    pub expires_at: i64,
}

impl CachedToken {
    /// Build a cache entry for a token issued at `now_ms` with the given lifetime.
    ///
    /// Lifetimes at or below the safety buffer clamp to zero remaining freshness,
    /// i.e. the token expires immediately instead of getting a negative window.
    /// Lifetimes above [`MAX_LIFETIME_SECS`] are capped there.
    pub fn issue(access_token: impl Into<String>, expires_in_secs: f64, now_ms: i64) -> Self {
        let fresh_secs = (clamp_lifetime(expires_in_secs) - SAFETY_BUFFER_SECS).max(0.0);
        Self {
            access_token: access_token.into(),
            expires_at: now_ms.saturating_add((fresh_secs * 1000.0) as i64),
        }
    }

    pub fn is_fresh(&self, now_ms: i64) -> bool {
        now_ms < self.expires_at
    }
}

/// Store-level TTL for an entry that lives `expires_in_secs`.
///
/// Whole seconds, rounded up, between 1 and [`MAX_LIFETIME_SECS`]: redis
/// rejects a zero expiry.
pub fn store_ttl_secs(expires_in_secs: f64) -> u64 {
    if expires_in_secs.is_finite() && expires_in_secs > 1.0 {
        clamp_lifetime(expires_in_secs).ceil() as u64
    } else {
        1
    }
}

fn clamp_lifetime(expires_in_secs: f64) -> f64 {
    if expires_in_secs.is_nan() {
        return 0.0;
    }
    expires_in_secs.min(MAX_LIFETIME_SECS)
}
