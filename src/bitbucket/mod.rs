//! Outbound side: Bitbucket commit build statuses.

mod client;
mod payload;
mod repo;
mod state;

pub use client::{
    status_url, BitbucketClient, DeliveryError, DeliveryReceipt, StatusPublisher, StatusRequest,
};
pub use payload::CommitStatusUpdate;
pub use repo::RepoRef;
pub use state::{map_status, CommitState};
