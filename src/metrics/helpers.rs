//! Metrics helper structs for convenient metric recording

use std::time::Duration;

use prometheus::{Encoder, TextEncoder};

use super::{
    DELIVERIES_TOTAL, DELIVERY_FAILURES_TOTAL, DELIVERY_LATENCY, EVENTS_RECEIVED_TOTAL,
    STATES_PUBLISHED_TOTAL,
};
use crate::bitbucket::CommitState;

/// Encode all metrics to Prometheus text format
pub fn encode_metrics() -> Result<String, prometheus::Error> {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();
    encoder.encode(&metric_families, &mut buffer)?;
    Ok(String::from_utf8(buffer).unwrap_or_default())
}

/// Helper struct for recording inbound event metrics
pub struct EventMetrics;

impl EventMetrics {
    /// Record an event translated into a status update
    pub fn record_relayed(state: CommitState) {
        EVENTS_RECEIVED_TOTAL.with_label_values(&["relayed"]).inc();
        STATES_PUBLISHED_TOTAL
            .with_label_values(&[state.as_str()])
            .inc();
    }

    /// Record an event for a repository on another provider
    pub fn record_ignored() {
        EVENTS_RECEIVED_TOTAL.with_label_values(&["ignored"]).inc();
    }

    /// Record an event that could not be decoded
    pub fn record_rejected() {
        EVENTS_RECEIVED_TOTAL.with_label_values(&["rejected"]).inc();
    }
}

/// Helper struct for recording outbound delivery metrics
pub struct DeliveryMetrics;

impl DeliveryMetrics {
    /// Record a delivery accepted by the provider
    pub fn record_delivered(elapsed: Duration) {
        DELIVERIES_TOTAL.with_label_values(&["delivered"]).inc();
        DELIVERY_LATENCY.observe(elapsed.as_secs_f64());
    }

    /// Record a failed delivery
    pub fn record_failed(kind: &str) {
        DELIVERIES_TOTAL.with_label_values(&["failed"]).inc();
        DELIVERY_FAILURES_TOTAL.with_label_values(&[kind]).inc();
    }
}
