use std::sync::Arc;
use std::time::Instant;

use crate::bitbucket::{BitbucketClient, StatusPublisher};
use crate::config::Settings;
use crate::error::{AppError, Result};
use crate::relay::Translator;

#[derive(Clone)]
pub struct AppState {
    pub settings: Arc<Settings>,
    pub translator: Arc<Translator>,
    pub start_time: Instant,
}

impl AppState {
    /// State backed by the real Bitbucket client
    pub fn new(settings: Settings) -> Result<Self> {
        let client = BitbucketClient::new(settings.bitbucket.clone())
            .map_err(|e| AppError::Internal(format!("failed to build HTTP client: {}", e)))?;
        Ok(Self::with_publisher(settings, Arc::new(client)))
    }

    /// State with an explicit publisher
    pub fn with_publisher(settings: Settings, publisher: Arc<dyn StatusPublisher>) -> Self {
        let translator = Arc::new(
            Translator::new(publisher, settings.bitbucket.status_name.clone())
                .with_provider_filter(settings.relay.provider.clone()),
        );

        Self {
            settings: Arc::new(settings),
            translator,
            start_time: Instant::now(),
        }
    }
}
