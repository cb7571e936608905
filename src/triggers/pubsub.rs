//! Pub/Sub push trigger.
//!
//! Pub/Sub redelivers on any non-2xx answer. Every event the relay has
//! finished with is acknowledged with 200: relayed (whatever the delivery
//! outcome), ignored, or rejected as malformed. Only relay-side faults
//! surface as error statuses.

use axum::{extract::State, Json};
use serde::Serialize;

use crate::cloudbuild::PushEnvelope;
use crate::error::{AppError, ErrorBody, Result};
use crate::relay::RelaySummary;
use crate::server::AppState;

/// Answer to a push request
#[derive(Debug, Serialize)]
#[serde(tag = "result", rename_all = "lowercase")]
pub enum PushResponse {
    /// Event translated and sent (see `delivered` for the outcome)
    Relayed(RelaySummary),
    /// Repository lives on a provider this relay does not publish to
    Ignored { provider: String },
    /// Event could not be decoded; acknowledged so it is not redelivered
    Rejected { error: ErrorBody },
}

/// POST /pubsub/push
#[tracing::instrument(
    name = "http.pubsub_push",
    skip(state, envelope),
    fields(subscription = envelope.subscription.as_deref().unwrap_or("-"))
)]
pub async fn pubsub_push(
    State(state): State<AppState>,
    Json(envelope): Json<PushEnvelope>,
) -> Result<Json<PushResponse>> {
    match state.translator.translate_and_send(&envelope.message).await {
        Ok(report) => Ok(Json(PushResponse::Relayed(report.summary()))),
        Err(AppError::UnsupportedProvider(provider)) => {
            Ok(Json(PushResponse::Ignored { provider }))
        }
        Err(e) if e.is_malformed_input() => Ok(Json(PushResponse::Rejected {
            error: ErrorBody::from(&e),
        })),
        Err(e) => Err(e),
    }
}
