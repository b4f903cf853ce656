use axum::{
    Json,
    body::{Body, Bytes},
    extract::{RawQuery, State},
    response::{IntoResponse, Response},
};
use http::{StatusCode, header::CONTENT_TYPE};
use serde_json::{Value, json};

use nowplaying::{NowPlaying, SeedPayload, fetch_now_playing, seed_credentials};

use super::error::{ErrorResponse, IntoResponseError};
use super::router::ProxyState;

const JSON_CONTENT_TYPE: &str = "application/json";

/// `POST /token`: prime the store with bootstrap credentials.
pub(crate) async fn seed_token(
    State(state): State<ProxyState>,
    body: Bytes,
) -> Result<Json<Value>, ErrorResponse> {
    let payload = SeedPayload::from_slice(&body).into_response_error()?;
    seed_credentials(state.manager.store(), &payload)
        .await
        .into_response_error()?;

    Ok(Json(json!({ "status": "ok" })))
}

/// Everything else: relay the account's currently-playing state.
pub(crate) async fn proxy_now_playing(
    State(state): State<ProxyState>,
    RawQuery(query): RawQuery,
) -> Result<Response, ErrorResponse> {
    let now_playing = fetch_now_playing(&state.manager, query.as_deref())
        .await
        .into_response_error()?;

    match now_playing {
        NowPlaying::Idle => {
            Ok((StatusCode::OK, Json(json!({ "is_playing": false }))).into_response())
        }
        NowPlaying::Track {
            status,
            content_type,
            body,
        } => Response::builder()
            .status(status)
            .header(
                CONTENT_TYPE,
                content_type.as_deref().unwrap_or(JSON_CONTENT_TYPE),
            )
            .body(Body::from(body))
            .into_response_error(),
    }
}
