//! Prometheus metrics for the relay.
//!
//! - Inbound events by outcome (relayed, ignored, rejected)
//! - Published commit states
//! - Outbound deliveries by outcome and failure kind
//! - Outbound delivery latency

mod helpers;

pub use helpers::{encode_metrics, DeliveryMetrics, EventMetrics};

use lazy_static::lazy_static;
use prometheus::{
    register_histogram, register_int_counter_vec, Histogram, IntCounterVec,
};

/// Prefix for all metrics
const METRIC_PREFIX: &str = "relay";

lazy_static! {
    // ============================================================================
    // Inbound Metrics
    // ============================================================================

    /// Build events received, by outcome
    pub static ref EVENTS_RECEIVED_TOTAL: IntCounterVec = register_int_counter_vec!(
        format!("{}_events_received_total", METRIC_PREFIX),
        "Build events received",
        &["outcome"]
    ).unwrap();

    /// Commit states published, by state
    pub static ref STATES_PUBLISHED_TOTAL: IntCounterVec = register_int_counter_vec!(
        format!("{}_states_published_total", METRIC_PREFIX),
        "Commit states sent to the provider",
        &["state"]
    ).unwrap();

    // ============================================================================
    // Outbound Metrics
    // ============================================================================

    /// Status deliveries, by outcome
    pub static ref DELIVERIES_TOTAL: IntCounterVec = register_int_counter_vec!(
        format!("{}_deliveries_total", METRIC_PREFIX),
        "Status update deliveries",
        &["outcome"]
    ).unwrap();

    /// Failed deliveries, by failure kind
    pub static ref DELIVERY_FAILURES_TOTAL: IntCounterVec = register_int_counter_vec!(
        format!("{}_delivery_failures_total", METRIC_PREFIX),
        "Failed status update deliveries",
        &["kind"]
    ).unwrap();

    /// Round-trip time of the outbound status request
    pub static ref DELIVERY_LATENCY: Histogram = register_histogram!(
        format!("{}_delivery_latency_seconds", METRIC_PREFIX),
        "Status update delivery latency in seconds",
        vec![0.01, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0]
    ).unwrap();
}
