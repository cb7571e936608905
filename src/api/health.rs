//! Health check and statistics endpoints.

use axum::{extract::State, Json};
use serde::Serialize;

use crate::relay::RelayStatsSnapshot;
use crate::server::AppState;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_seconds: u64,
    pub bitbucket: BitbucketHealthResponse,
}

#[derive(Debug, Serialize)]
pub struct BitbucketHealthResponse {
    pub base_url: String,
    pub credentials_configured: bool,
}

pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let bitbucket = &state.settings.bitbucket;

    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: state.start_time.elapsed().as_secs(),
        bitbucket: BitbucketHealthResponse {
            base_url: bitbucket.base_url.clone(),
            credentials_configured: bitbucket.has_credentials(),
        },
    })
}

pub async fn stats(State(state): State<AppState>) -> Json<RelayStatsSnapshot> {
    Json(state.translator.stats())
}
