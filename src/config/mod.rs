mod settings;

pub use settings::{BitbucketConfig, OtelConfig, RelayConfig, ServerConfig, Settings};
