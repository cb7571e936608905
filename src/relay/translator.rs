use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::bitbucket::{
    status_url, CommitState, CommitStatusUpdate, DeliveryError, DeliveryReceipt, RepoRef,
    StatusPublisher, StatusRequest,
};
use crate::cloudbuild::{BuildEvent, PubSubMessage};
use crate::error::{AppError, Result};
use crate::metrics::{DeliveryMetrics, EventMetrics};

/// Outcome of one `translate_and_send` call
#[derive(Debug)]
pub struct RelayReport {
    /// Identifier of this invocation, for correlating logs
    pub relay_id: Uuid,
    pub received_at: DateTime<Utc>,
    pub request: StatusRequest,
    /// Result of the single outbound call
    pub delivery: std::result::Result<DeliveryReceipt, DeliveryError>,
}

impl RelayReport {
    pub fn is_delivered(&self) -> bool {
        self.delivery.is_ok()
    }

    pub fn state(&self) -> CommitState {
        self.request.body.state
    }

    pub fn summary(&self) -> RelaySummary {
        let (delivered, provider_status, error) = match &self.delivery {
            Ok(receipt) => (true, Some(receipt.status), None),
            Err(DeliveryError::Rejected { status, .. }) => {
                (false, Some(*status), self.delivery_error())
            }
            Err(_) => (false, None, self.delivery_error()),
        };

        RelaySummary {
            relay_id: self.relay_id,
            build_id: self.request.body.uuid.clone(),
            repository: self.request.repo.full_name(),
            commit_sha: self.request.commit_sha.clone(),
            state: self.state(),
            delivered,
            provider_status,
            error,
            received_at: self.received_at,
        }
    }

    fn delivery_error(&self) -> Option<String> {
        self.delivery.as_ref().err().map(|e| e.to_string())
    }
}

/// Serializable view of a [`RelayReport`]
#[derive(Debug, Clone, Serialize)]
pub struct RelaySummary {
    pub relay_id: Uuid,
    pub build_id: String,
    pub repository: String,
    pub commit_sha: String,
    pub state: CommitState,
    pub delivered: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider_status: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub received_at: DateTime<Utc>,
}

/// Counters since process start
#[derive(Debug, Default)]
pub struct RelayStats {
    pub events_received: AtomicU64,
    pub events_rejected: AtomicU64,
    pub events_ignored: AtomicU64,
    pub deliveries_succeeded: AtomicU64,
    pub deliveries_failed: AtomicU64,
}

impl RelayStats {
    pub fn snapshot(&self) -> RelayStatsSnapshot {
        RelayStatsSnapshot {
            events_received: self.events_received.load(Ordering::Relaxed),
            events_rejected: self.events_rejected.load(Ordering::Relaxed),
            events_ignored: self.events_ignored.load(Ordering::Relaxed),
            deliveries_succeeded: self.deliveries_succeeded.load(Ordering::Relaxed),
            deliveries_failed: self.deliveries_failed.load(Ordering::Relaxed),
        }
    }
}

/// Snapshot of relay statistics
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RelayStatsSnapshot {
    pub events_received: u64,
    pub events_rejected: u64,
    pub events_ignored: u64,
    pub deliveries_succeeded: u64,
    pub deliveries_failed: u64,
}

/// Turns Cloud Build notifications into Bitbucket commit statuses
pub struct Translator {
    publisher: Arc<dyn StatusPublisher>,
    provider: Option<String>,
    status_name: String,
    stats: RelayStats,
}

impl Translator {
    pub fn new(publisher: Arc<dyn StatusPublisher>, status_name: impl Into<String>) -> Self {
        Self {
            publisher,
            provider: None,
            status_name: status_name.into(),
            stats: RelayStats::default(),
        }
    }

    /// Skip builds whose provider marker differs from `provider`
    pub fn with_provider_filter(mut self, provider: Option<String>) -> Self {
        self.provider = provider;
        self
    }

    pub fn stats(&self) -> RelayStatsSnapshot {
        self.stats.snapshot()
    }

    /// Build the status request for a decoded Build Event
    pub fn build_request(&self, event: &BuildEvent) -> Result<StatusRequest> {
        let repo = RepoRef::parse(event.repo_name())?;
        if let Some(provider) = &self.provider {
            if !repo.is_provider(provider) {
                return Err(AppError::UnsupportedProvider(repo.provider));
            }
        }

        let url = status_url(
            self.publisher.base_url(),
            &repo.owner,
            &repo.slug,
            event.commit_sha(),
        );

        Ok(StatusRequest {
            url,
            commit_sha: event.commit_sha().to_string(),
            body: CommitStatusUpdate::from_build(event, &self.status_name),
            repo,
        })
    }

    /// Decode a Pub/Sub message and build its status request, without sending it
    pub fn translate(&self, message: &PubSubMessage) -> Result<StatusRequest> {
        let event = message.decode_build_event()?;
        self.build_request(&event)
    }

    /// Decode, map and publish one notification.
    ///
    /// Input errors are returned. Delivery failures are logged and carried in
    /// the report instead; there are no retries.
    #[tracing::instrument(
        name = "relay.translate_and_send",
        skip(self, message),
        fields(message_id = message.message_id.as_deref().unwrap_or("-"))
    )]
    pub async fn translate_and_send(&self, message: &PubSubMessage) -> Result<RelayReport> {
        self.stats.events_received.fetch_add(1, Ordering::Relaxed);

        let request = match self.translate(message) {
            Ok(request) => request,
            Err(e) => {
                self.record_input_error(&e);
                return Err(e);
            }
        };

        let relay_id = Uuid::new_v4();
        let received_at = Utc::now();
        EventMetrics::record_relayed(request.body.state);

        let delivery = self.publisher.publish(&request).await;
        match &delivery {
            Ok(receipt) => {
                self.stats.deliveries_succeeded.fetch_add(1, Ordering::Relaxed);
                DeliveryMetrics::record_delivered(receipt.elapsed);
                tracing::info!(
                    relay_id = %relay_id,
                    build_id = %request.body.uuid,
                    repository = %request.repo.full_name(),
                    commit_sha = %request.commit_sha,
                    state = %request.body.state,
                    status = receipt.status,
                    "Commit status published"
                );
            }
            Err(e) => {
                self.stats.deliveries_failed.fetch_add(1, Ordering::Relaxed);
                DeliveryMetrics::record_failed(e.kind());
                tracing::error!(
                    relay_id = %relay_id,
                    build_id = %request.body.uuid,
                    url = %request.url,
                    state = %request.body.state,
                    error = %e,
                    "Failed to publish commit status"
                );
            }
        }

        Ok(RelayReport {
            relay_id,
            received_at,
            request,
            delivery,
        })
    }

    fn record_input_error(&self, error: &AppError) {
        match error {
            AppError::UnsupportedProvider(provider) => {
                self.stats.events_ignored.fetch_add(1, Ordering::Relaxed);
                EventMetrics::record_ignored();
                tracing::debug!(
                    provider = %provider,
                    expected = ?self.provider,
                    "Ignoring build for repository on another provider"
                );
            }
            e => {
                self.stats.events_rejected.fetch_add(1, Ordering::Relaxed);
                EventMetrics::record_rejected();
                tracing::warn!(code = e.code(), error = %e, "Rejected build notification");
            }
        }
    }
}
