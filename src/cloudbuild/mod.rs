//! Inbound side: Cloud Build notifications as delivered by Cloud Pub/Sub.

mod event;

pub use event::{BuildEvent, PubSubMessage, PushEnvelope, RepoSource, SourceProvenance};
