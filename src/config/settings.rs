use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::env;
use std::fmt;
use std::time::Duration;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub bitbucket: BitbucketConfig,
    #[serde(default)]
    pub relay: RelayConfig,
    #[serde(default)]
    pub otel: OtelConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

/// Outbound Bitbucket API settings. Injected into the client at construction.
#[derive(Clone, Deserialize)]
pub struct BitbucketConfig {
    /// Repositories endpoint, without trailing slash
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Basic-auth user (`BITBUCKET_USER`)
    #[serde(default)]
    pub user: String,
    /// Basic-auth app password (`BITBUCKET_APP_PASS`)
    #[serde(default)]
    pub app_password: String,
    /// Request timeout in seconds
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
    /// Value of the `name` field shown next to the commit
    #[serde(default = "default_status_name")]
    pub status_name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RelayConfig {
    /// Only relay builds whose `repoName` starts with this provider marker.
    /// Unset relays every build.
    #[serde(default)]
    pub provider: Option<String>,
    /// Shared secret the push subscription must present (query `token` or `X-Push-Token`)
    #[serde(default)]
    pub push_token: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OtelConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default = "default_otel_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_service_name")]
    pub service_name: String,
    #[serde(default = "default_sampling_ratio")]
    pub sampling_ratio: f64,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_base_url() -> String {
    "https://api.bitbucket.org/2.0/repositories".to_string()
}

fn default_timeout_seconds() -> u64 {
    30
}

fn default_status_name() -> String {
    "Google Cloud Build".to_string()
}

fn default_otel_endpoint() -> String {
    "http://localhost:4317".to_string()
}

fn default_service_name() -> String {
    "build-status-relay".to_string()
}

fn default_sampling_ratio() -> f64 {
    1.0
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        // Load .env file if exists
        let _ = dotenvy::dotenv();

        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let builder = Config::builder()
            .set_default("server.host", default_host())?
            .set_default("bitbucket.base_url", default_base_url())?
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", run_mode)).required(false))
            // SERVER__PORT, BITBUCKET__BASE_URL, RELAY__PUSH_TOKEN, OTEL__ENABLED, ...
            .add_source(
                Environment::default()
                    .separator("__")
                    .try_parsing(true),
            )
            // Names used by existing deployments take precedence
            .set_override_option("bitbucket.user", env::var("BITBUCKET_USER").ok())?
            .set_override_option("bitbucket.app_password", env::var("BITBUCKET_APP_PASS").ok())?
            .set_override_option("server.port", env::var("PORT").ok())?;

        builder.build()?.try_deserialize()
    }

    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

impl BitbucketConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }

    pub fn has_credentials(&self) -> bool {
        !self.user.is_empty() && !self.app_password.is_empty()
    }

    /// Log a warning for each missing credential
    pub fn warn_if_unauthenticated(&self) {
        if self.user.is_empty() {
            tracing::warn!("BITBUCKET_USER not set -- status updates will be rejected by Bitbucket");
        }
        if self.app_password.is_empty() {
            tracing::warn!("BITBUCKET_APP_PASS not set -- status updates will be rejected by Bitbucket");
        }
    }
}

impl fmt::Debug for BitbucketConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BitbucketConfig")
            .field("base_url", &self.base_url)
            .field("user", &self.user)
            .field("app_password", &"<redacted>")
            .field("timeout_seconds", &self.timeout_seconds)
            .field("status_name", &self.status_name)
            .finish()
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl Default for BitbucketConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            user: String::new(),
            app_password: String::new(),
            timeout_seconds: default_timeout_seconds(),
            status_name: default_status_name(),
        }
    }
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            provider: None,
            push_token: None,
        }
    }
}

impl Default for OtelConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            endpoint: default_otel_endpoint(),
            service_name: default_service_name(),
            sampling_ratio: default_sampling_ratio(),
        }
    }
}
