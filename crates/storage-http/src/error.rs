//! Error types for the HTTP repository client.

use rusty_artifactory_storage::RepositoryError;
use thiserror::Error;

/// Errors specific to the HTTP repository client.
#[derive(Error, Debug)]
pub enum HttpError {
    /// The request could not be sent or its body could not be read.
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The server answered with a status the operation does not accept.
    #[error("Unexpected HTTP status {status} from {url}")]
    UnexpectedStatus { url: String, status: u16 },

    /// The response body could not be decoded.
    #[error("Invalid response from {url}: {message}")]
    InvalidResponse {
        url: String,
        status: u16,
        message: String,
    },

    /// Configuration error.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

impl From<HttpError> for RepositoryError {
    fn from(err: HttpError) -> Self {
        match err {
            HttpError::Request(e) => RepositoryError::Transport {
                status: e.status().map(|s| s.as_u16()),
                message: e.to_string(),
            },
            HttpError::UnexpectedStatus { url, status: 404 } => RepositoryError::NotFound { what: url },
            HttpError::UnexpectedStatus { url, status } => RepositoryError::Transport {
                message: format!("unexpected response from {}", url),
                status: Some(status),
            },
            HttpError::InvalidResponse {
                url,
                status,
                message,
            } => RepositoryError::Transport {
                message: format!("invalid response from {}: {}", url, message),
                status: Some(status),
            },
            HttpError::ConfigError(message) => RepositoryError::InvalidConfig { message },
            HttpError::IoError(e) => RepositoryError::IoError {
                path: String::new(),
                message: e.to_string(),
            },
        }
    }
}
