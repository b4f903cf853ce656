use serde_json::Value;
use thiserror::Error;

use crate::storage::StorageError;

#[derive(Debug, Error, Clone)]
pub enum TokenError {
    /// No refresh token is available; credentials must be re-seeded.
    #[error("Missing credential: {0}")]
    MissingCredential(String),

    #[error("Malformed upstream response: {0}")]
    MalformedUpstreamResponse(String),

    /// The token endpoint rejected the refresh or returned no access token.
    #[error("Upstream auth error: status {status}, body {body}")]
    UpstreamAuth { status: u16, body: Value },

    #[error("Request error: {0}")]
    Request(String),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

#[derive(Debug, Error, Clone)]
pub enum SeedError {
    #[error("Invalid JSON body")]
    InvalidBody,

    #[error("{0}")]
    Validation(String),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}
