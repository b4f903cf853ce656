use axum::Json;
use http::{Result as HttpResponse, StatusCode};
use nowplaying::{PlayerError, SeedError};
use serde_json::{Value, json};

/// Client-visible failure: a status plus `{ "error": <generic message> }`.
pub type ErrorResponse = (StatusCode, Json<Value>);

pub(crate) const TOKEN_REFRESH_FAILED: &str = "Spotify token refresh failed";
pub(crate) const UPSTREAM_FETCH_FAILED: &str = "Failed to fetch currently playing track";
pub(crate) const TOKEN_STORE_FAILED: &str = "Failed to store token";
pub(crate) const INVALID_JSON_BODY: &str = "Invalid JSON body";

pub(crate) fn error_response(status: StatusCode, message: &str) -> ErrorResponse {
    (status, Json(json!({ "error": message })))
}

/// Helper trait for converting errors to a standard response error format
///
/// Diagnostic detail is logged here and never copied into the response body.
pub trait IntoResponseError<T> {
    fn into_response_error(self) -> Result<T, ErrorResponse>;
}

impl<T> IntoResponseError<T> for Result<T, PlayerError> {
    fn into_response_error(self) -> Result<T, ErrorResponse> {
        self.map_err(|e| {
            tracing::error!("Now playing request failed: {}", e);
            match e {
                PlayerError::UpstreamUnavailable { .. } => {
                    error_response(StatusCode::BAD_GATEWAY, UPSTREAM_FETCH_FAILED)
                }
                PlayerError::Token(_) | PlayerError::Request(_) => {
                    error_response(StatusCode::SERVICE_UNAVAILABLE, TOKEN_REFRESH_FAILED)
                }
            }
        })
    }
}

impl<T> IntoResponseError<T> for Result<T, SeedError> {
    fn into_response_error(self) -> Result<T, ErrorResponse> {
        self.map_err(|e| match e {
            SeedError::InvalidBody => {
                tracing::warn!("Rejected seed request: body is not a JSON object");
                error_response(StatusCode::BAD_REQUEST, INVALID_JSON_BODY)
            }
            SeedError::Validation(message) => {
                tracing::warn!("Rejected seed request: {}", message);
                error_response(StatusCode::BAD_REQUEST, &message)
            }
            SeedError::Storage(e) => {
                tracing::error!("Failed to seed token store: {}", e);
                error_response(StatusCode::SERVICE_UNAVAILABLE, TOKEN_STORE_FAILED)
            }
        })
    }
}

/// Implementation for http::Error (used by Response::builder() when relaying)
impl<T> IntoResponseError<T> for HttpResponse<T> {
    fn into_response_error(self) -> Result<T, ErrorResponse> {
        self.map_err(|e| {
            tracing::error!("Failed to build relayed response: {}", e);
            error_response(StatusCode::BAD_GATEWAY, UPSTREAM_FETCH_FAILED)
        })
    }
}
