//! Error types for the application.

use serenity::http::HttpError;
use serenity::model::ModelError;
use thiserror::Error;

/// Top-level application error.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Discord error: {0}")]
    Discord(#[from] serenity::Error),

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),
}

/// Configuration-related errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    IoError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config: {message}")]
    ParseError { message: String },

    #[error("Config validation failed: {message}")]
    ValidationError { message: String },
}

/// Failure of a single gateway operation (send, create thread, fetch, lookup).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GatewayError {
    /// The bot lacks the permission for the operation.
    #[error("Missing permission: {0}")]
    Unauthorized(String),

    /// The target was deleted or is not cached.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Transport failure, timeout or anything unexpected.
    #[error("Gateway error: {0}")]
    Other(String),
}

impl From<serenity::Error> for GatewayError {
    fn from(error: serenity::Error) -> Self {
        let message = error.to_string();
        match &error {
            serenity::Error::Http(HttpError::UnsuccessfulRequest(response)) => {
                match response.status_code.as_u16() {
                    401 | 403 => Self::Unauthorized(message),
                    404 => Self::NotFound(message),
                    _ => Self::Other(message),
                }
            }
            serenity::Error::Model(ModelError::InvalidPermissions { .. }) => {
                Self::Unauthorized(message)
            }
            _ => Self::Other(message),
        }
    }
}

/// Result type alias using AppError.
pub type Result<T> = std::result::Result<T, AppError>;

/// Result type alias for gateway operations.
pub type GatewayResult<T> = std::result::Result<T, GatewayError>;
