//! Bitbucket commit build-status API client.
//!
//! See <https://developer.atlassian.com/cloud/bitbucket/rest/api-group-commit-statuses/>

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::Client;
use thiserror::Error;

use super::payload::CommitStatusUpdate;
use super::repo::RepoRef;
use crate::config::BitbucketConfig;

const USER_AGENT: &str = concat!("build-status-relay/", env!("CARGO_PKG_VERSION"));

/// A fully built outbound status update
#[derive(Debug, Clone, PartialEq)]
pub struct StatusRequest {
    pub repo: RepoRef,
    pub commit_sha: String,
    pub url: String,
    pub body: CommitStatusUpdate,
}

/// Successful delivery of a status update
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryReceipt {
    /// HTTP status returned by the provider
    pub status: u16,
    pub elapsed: Duration,
}

#[derive(Debug, Error)]
pub enum DeliveryError {
    #[error("HTTP request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Bitbucket rejected status update with {status}: {body}")]
    Rejected { status: u16, body: String },

    /// For `StatusPublisher` implementations other than `BitbucketClient`
    #[error("Status publisher unavailable: {0}")]
    Unavailable(String),
}

impl DeliveryError {
    /// Metrics label for the failure kind
    pub fn kind(&self) -> &'static str {
        match self {
            DeliveryError::Transport(_) => "transport",
            DeliveryError::Rejected { .. } => "rejected",
            DeliveryError::Unavailable(_) => "unavailable",
        }
    }
}

/// Destination for commit status updates
#[async_trait]
pub trait StatusPublisher: Send + Sync {
    /// Base URL the status endpoints live under
    fn base_url(&self) -> &str;

    /// Issue exactly one request for `request`. No retries.
    async fn publish(&self, request: &StatusRequest) -> Result<DeliveryReceipt, DeliveryError>;
}

/// `{base}/{owner}/{slug}/commit/{sha}/statuses/build`
pub fn status_url(base_url: &str, owner: &str, slug: &str, commit_sha: &str) -> String {
    format!(
        "{}/{}/{}/commit/{}/statuses/build",
        base_url.trim_end_matches('/'),
        owner,
        slug,
        commit_sha
    )
}

/// Publishes statuses to the Bitbucket REST API with HTTP Basic auth
pub struct BitbucketClient {
    http: Client,
    config: BitbucketConfig,
}

impl BitbucketClient {
    pub fn new(config: BitbucketConfig) -> Result<Self, reqwest::Error> {
        let http = Client::builder()
            .timeout(config.timeout())
            .user_agent(USER_AGENT)
            .build()?;

        Ok(Self { http, config })
    }

    pub fn config(&self) -> &BitbucketConfig {
        &self.config
    }
}

#[async_trait]
impl StatusPublisher for BitbucketClient {
    fn base_url(&self) -> &str {
        &self.config.base_url
    }

    async fn publish(&self, request: &StatusRequest) -> Result<DeliveryReceipt, DeliveryError> {
        let started = Instant::now();

        let resp = self
            .http
            .post(&request.url)
            .basic_auth(&self.config.user, Some(&self.config.app_password))
            .json(&request.body)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(DeliveryError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        Ok(DeliveryReceipt {
            status: status.as_u16(),
            elapsed: started.elapsed(),
        })
    }
}
