use serde_json::Value;
use std::sync::Arc;
use tokio::sync::{Mutex, watch};

use crate::config::{ClientAuthMode, SpotifyConfig};
use crate::deferred::DeferredTasks;
use crate::storage::{CachedToken, TokenStore, store_ttl_secs};
use crate::utils::{build_client, now_millis};

use super::errors::TokenError;
use super::types::TokenResponse;

type RefreshResult = Result<String, TokenError>;

/// Receiving side of one refresh; holds `None` until the refresh settles.
type Outcome = watch::Receiver<Option<RefreshResult>>;

/// Hands out a usable access token, refreshing it against the token endpoint
/// when the cached one is missing or stale.
///
/// The manager keeps no credentials between calls: every call starts from
/// what the [`TokenStore`] holds. Each refresh runs as a task registered with
/// [`DeferredTasks`], so the upstream exchange and the rotated refresh token
/// write finish even if the caller is dropped.
///
/// With single-flight enabled, the in-flight slot stays occupied until the
/// cached token has been written, so a miss arriving between the refresh
/// settling and the cache write landing reuses the settled result.
pub struct TokenManager {
    exchange: Exchange,
    in_flight: Arc<Mutex<Option<Outcome>>>,
}

/// Everything a detached refresh task needs, owned.
#[derive(Clone)]
struct Exchange {
    store: TokenStore,
    config: Arc<SpotifyConfig>,
    client: reqwest::Client,
    deferred: DeferredTasks,
}

/// A refreshed token and the store TTL its cache entry gets.
struct Issued {
    cached: CachedToken,
    ttl: u64,
}

impl TokenManager {
    pub fn new(
        config: SpotifyConfig,
        store: TokenStore,
        deferred: DeferredTasks,
    ) -> Result<Self, TokenError> {
        let client = build_client(config.upstream_timeout)
            .map_err(|e| TokenError::Request(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            exchange: Exchange {
                store,
                config: Arc::new(config),
                client,
                deferred,
            },
            in_flight: Arc::new(Mutex::new(None)),
        })
    }

    pub fn store(&self) -> &TokenStore {
        &self.exchange.store
    }

    pub fn config(&self) -> &SpotifyConfig {
        &self.exchange.config
    }

    pub fn client(&self) -> &reqwest::Client {
        &self.exchange.client
    }

    pub fn deferred(&self) -> &DeferredTasks {
        &self.exchange.deferred
    }

    /// Return the cached access token if still fresh, otherwise refresh.
    pub async fn get_valid_token(&self) -> Result<String, TokenError> {
        if let Some(cached) = self.store().get_cached_token().await? {
            if cached.is_fresh(now_millis()) {
                tracing::debug!("Using cached access token (expires_at={})", cached.expires_at);
                return Ok(cached.access_token);
            }
            tracing::debug!("Cached access token is stale (expires_at={})", cached.expires_at);
        } else {
            tracing::debug!("No cached access token");
        }

        if self.config().single_flight {
            self.refresh_coalesced().await
        } else {
            self.refresh().await
        }
    }

    /// Share one refresh among callers that miss the cache at the same time.
    async fn refresh_coalesced(&self) -> Result<String, TokenError> {
        let outcome = {
            let mut slot = self.in_flight.lock().await;
            match slot.as_ref() {
                Some(outcome) => {
                    tracing::debug!("Joining in-flight token refresh");
                    outcome.clone()
                }
                None => {
                    let outcome = self.spawn_refresh(true).await;
                    *slot = Some(outcome.clone());
                    outcome
                }
            }
        };
        settle(outcome).await
    }

    /// Exchange the stored refresh token for a new access token.
    pub async fn refresh(&self) -> Result<String, TokenError> {
        settle(self.spawn_refresh(false).await).await
    }

    /// Run one refresh as a tracked task and return where its result appears.
    ///
    /// The result is published once the rotated refresh token (if any) is
    /// stored. The cached token is written after that, off the caller's path.
    async fn spawn_refresh(&self, holds_slot: bool) -> Outcome {
        let (tx, outcome) = watch::channel(None);
        let exchange = self.exchange.clone();
        let slot = holds_slot.then(|| Arc::clone(&self.in_flight));

        self.exchange
            .deferred
            .wait_until("token refresh", async move {
                let written = match exchange.run().await {
                    Ok(issued) => {
                        tx.send_replace(Some(Ok(issued.cached.access_token.clone())));
                        exchange
                            .store
                            .put_cached_token(&issued.cached, issued.ttl)
                            .await
                    }
                    Err(e) => {
                        tx.send_replace(Some(Err(e)));
                        Ok(())
                    }
                };

                if let Some(slot) = slot {
                    let mut slot = slot.lock().await;
                    let own = tx.subscribe();
                    if slot.as_ref().is_some_and(|current| current.same_channel(&own)) {
                        *slot = None;
                    }
                }
                written
            })
            .await;

        outcome
    }
}

async fn settle(mut outcome: Outcome) -> RefreshResult {
    let settled = match outcome.wait_for(Option::is_some).await {
        Ok(settled) => (*settled).clone(),
        Err(_) => None,
    };
    settled.unwrap_or_else(|| Err(refresh_aborted()))
}

fn refresh_aborted() -> TokenError {
    TokenError::Request("token refresh task ended without a result".to_string())
}

impl Exchange {
    async fn run(&self) -> Result<Issued, TokenError> {
        let refresh_token = self.load_refresh_token().await?;

        let mut form = vec![
            ("grant_type", "refresh_token"),
            ("refresh_token", refresh_token.as_str()),
        ];
        let mut request = self.client.post(&self.config.token_url);
        match self.config.auth_mode {
            ClientAuthMode::Pkce => form.push(("client_id", self.config.client_id.as_str())),
            ClientAuthMode::Basic => {
                let secret = self.config.client_secret.as_deref().ok_or_else(|| {
                    TokenError::MissingCredential(
                        "SPOTIFY_CLIENT_SECRET is required for basic client authentication"
                            .to_string(),
                    )
                })?;
                request = request.basic_auth(&self.config.client_id, Some(secret));
            }
        }

        tracing::info!("Refreshing access token at {}", self.config.token_url);
        let response = request
            .form(&form)
            .send()
            .await
            .map_err(|e| TokenError::Request(e.to_string()))?;

        let status = response.status();
        let response_body = response
            .text()
            .await
            .map_err(|e| TokenError::Request(e.to_string()))?;

        let body: Value = serde_json::from_str(&response_body).map_err(|e| {
            tracing::error!("Token endpoint returned non-JSON body (status {})", status);
            TokenError::MalformedUpstreamResponse(format!("status {status}: {e}"))
        })?;

        if !status.is_success() {
            tracing::error!("Token refresh rejected: status={}, body={}", status, body);
            return Err(TokenError::UpstreamAuth {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: TokenResponse = serde_json::from_value(body.clone())
            .map_err(|e| TokenError::MalformedUpstreamResponse(e.to_string()))?;

        let Some(access_token) = parsed.access_token.clone().filter(|t| !t.is_empty()) else {
            tracing::error!(
                "Token response has no access_token (status {}, error={:?})",
                status,
                body.get("error")
            );
            return Err(TokenError::UpstreamAuth {
                status: status.as_u16(),
                body,
            });
        };

        if let Some(rotated) = parsed.refresh_token.as_deref().filter(|t| !t.is_empty()) {
            if rotated != refresh_token {
                tracing::info!("Upstream rotated the refresh token");
            }
            // Must land before the token is handed out: the old one may already be void
            self.store.put_refresh_token(rotated).await?;
        }

        let lifetime = parsed.lifetime_secs();
        let cached = CachedToken::issue(access_token, lifetime, now_millis());
        tracing::info!(
            "Access token refreshed; fresh until {} (lifetime {}s)",
            cached.expires_at,
            lifetime
        );

        Ok(Issued {
            cached,
            ttl: store_ttl_secs(lifetime),
        })
    }

    async fn load_refresh_token(&self) -> Result<String, TokenError> {
        if let Some(token) = self.store.get_refresh_token().await? {
            return Ok(token);
        }

        match self.config.fallback_refresh_token.as_deref() {
            Some(token) => {
                tracing::warn!("No refresh token in store; using SPOTIFY_REFRESH_TOKEN");
                Ok(token.to_string())
            }
            None => Err(TokenError::MissingCredential(
                "no refresh token stored; seed credentials via POST /token".to_string(),
            )),
        }
    }
}
