//! Relays Cloud Build status notifications to Bitbucket commit statuses.

// Infrastructure
pub mod config;
pub mod error;
pub mod metrics;
pub mod telemetry;

// Domain
pub mod bitbucket;
pub mod cloudbuild;
pub mod relay;

// Application layer
pub mod api;
pub mod server;
pub mod triggers;
