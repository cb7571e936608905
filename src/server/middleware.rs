use axum::{
    body::Body,
    extract::{Query, State},
    http::Request,
    middleware::Next,
    response::{IntoResponse, Response},
};
use serde::Deserialize;

use super::AppState;
use crate::error::AppError;

/// Header alternative to the `token` query parameter
pub const PUSH_TOKEN_HEADER: &str = "X-Push-Token";

/// Push token authentication middleware.
///
/// Pub/Sub push subscriptions cannot set headers, so the token is normally
/// part of the endpoint URL (`/pubsub/push?token=...`).
pub async fn push_token_auth(
    State(state): State<AppState>,
    req: Request<Body>,
    next: Next,
) -> Response {
    // If no token is configured, allow all requests (development mode)
    let Some(expected) = &state.settings.relay.push_token else {
        return next.run(req).await;
    };

    match extract_push_token(&req) {
        Some(token) if token == *expected => next.run(req).await,
        Some(_) => {
            tracing::warn!("Invalid push token provided");
            AppError::Auth("Invalid push token".to_string()).into_response()
        }
        None => {
            tracing::warn!("Missing push token");
            AppError::Auth("Missing push token".to_string()).into_response()
        }
    }
}

/// Query parameters accepted on the push endpoint
#[derive(Debug, Deserialize)]
pub struct PushTokenQuery {
    pub token: Option<String>,
}

/// Extract the push token from the `X-Push-Token` header or the `token` query parameter
pub fn extract_push_token(req: &Request<Body>) -> Option<String> {
    if let Some(token) = req
        .headers()
        .get(PUSH_TOKEN_HEADER)
        .and_then(|v| v.to_str().ok())
    {
        return Some(token.to_string());
    }

    Query::<PushTokenQuery>::try_from_uri(req.uri())
        .ok()
        .and_then(|Query(query)| query.token)
}
