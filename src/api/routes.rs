use axum::{
    middleware,
    routing::{get, post},
    Router,
};

use crate::server::{push_token_auth, AppState};
use crate::triggers::pubsub_push;

use super::health::{health, stats};
use super::metrics::prometheus_metrics;

pub fn api_routes(state: AppState) -> Router<AppState> {
    Router::new()
        // Health, stats & metrics
        .route("/health", get(health))
        .route("/stats", get(stats))
        .route("/metrics", get(prometheus_metrics))
        // Pub/Sub push endpoint
        .merge(
            Router::new()
                .route("/pubsub/push", post(pubsub_push))
                .route_layer(middleware::from_fn_with_state(state, push_token_auth)),
        )
}
