use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Authentication error: {0}")]
    Auth(String),

    /// Message `data` was not valid base64
    #[error("Invalid message data: {0}")]
    Decode(String),

    /// Payload was not a Build Event (bad JSON or missing required fields)
    #[error("Invalid build event: {0}")]
    InvalidEvent(#[from] serde_json::Error),

    /// `repoName` did not decode into provider, owner and slug
    #[error("Malformed repo name: {0:?}")]
    MalformedRepoName(String),

    /// `repoName` names a provider this relay does not publish to
    #[error("Unsupported repository provider: {0}")]
    UnsupportedProvider(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Stable machine-readable code, also used as a metrics label
    pub fn code(&self) -> &'static str {
        match self {
            AppError::Config(_) => "CONFIG_ERROR",
            AppError::Auth(_) => "UNAUTHORIZED",
            AppError::Decode(_) => "INVALID_MESSAGE_DATA",
            AppError::InvalidEvent(_) => "INVALID_BUILD_EVENT",
            AppError::MalformedRepoName(_) => "MALFORMED_REPO_NAME",
            AppError::UnsupportedProvider(_) => "UNSUPPORTED_PROVIDER",
            AppError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Whether the error was caused by the inbound event rather than the relay
    pub fn is_malformed_input(&self) -> bool {
        matches!(
            self,
            AppError::Decode(_) | AppError::InvalidEvent(_) | AppError::MalformedRepoName(_)
        )
    }
}

#[derive(Serialize)]
struct ErrorResponse {
    error: ErrorBody,
}

/// `{"code","message"}` part of an error body
#[derive(Debug, Clone, Serialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
}

impl From<&AppError> for ErrorBody {
    fn from(err: &AppError) -> Self {
        Self {
            code: err.code().to_string(),
            message: err.to_string(),
        }
    }
}

/// Check if running in production mode (based on RUN_MODE env var)
fn is_production() -> bool {
    std::env::var("RUN_MODE")
        .map(|m| m == "production" || m == "prod")
        .unwrap_or(false)
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let log_message = self.to_string();
        let (status, client_message) = match &self {
            AppError::Config(_) | AppError::Internal(_) => {
                let client_msg = if is_production() {
                    "Internal server error".to_string()
                } else {
                    log_message.clone()
                };
                (StatusCode::INTERNAL_SERVER_ERROR, client_msg)
            }
            AppError::Auth(msg) => (StatusCode::UNAUTHORIZED, msg.clone()),
            AppError::Decode(_)
            | AppError::InvalidEvent(_)
            | AppError::MalformedRepoName(_)
            | AppError::UnsupportedProvider(_) => (StatusCode::BAD_REQUEST, log_message.clone()),
        };
        let code = self.code();

        // Always log the detailed error server-side
        tracing::error!(
            code = %code,
            status = %status.as_u16(),
            message = %log_message,
            "API error"
        );

        let body = ErrorResponse {
            error: ErrorBody {
                code: code.to_string(),
                message: client_message,
            },
        };

        (status, Json(body)).into_response()
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
