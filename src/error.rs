//! Error types for the sharepoint_drive crate.

use reqwest::StatusCode;
use thiserror::Error;

/// Errors that can occur when talking to SharePoint through Microsoft Graph.
#[derive(Error, Debug)]
pub enum DriveError {
    #[error("Authentication failed: {0}")]
    AuthenticationError(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Transient failure ({}): {message}", status_label(.status))]
    Transient { status: Option<u16>, message: String },

    #[error("Invalid path: {0}")]
    InvalidPath(String),

    #[error("Invalid SharePoint URL: {0}")]
    InvalidUrl(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("API error ({status}): {message}")]
    ApiError { status: u16, message: String },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Failed to read configuration file: {0}")]
    ConfigFileError(#[source] std::io::Error),

    #[error("Failed to parse configuration JSON: {0}")]
    ConfigParseError(#[from] serde_json::Error),

    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl DriveError {
    /// Classify a non-success HTTP status returned by Graph.
    pub fn from_status(status: StatusCode, message: String) -> Self {
        match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                DriveError::AuthenticationError(message)
            }
            StatusCode::NOT_FOUND => DriveError::NotFound(message),
            s if s == StatusCode::TOO_MANY_REQUESTS || s.is_server_error() => {
                DriveError::Transient {
                    status: Some(s.as_u16()),
                    message,
                }
            }
            s => DriveError::ApiError {
                status: s.as_u16(),
                message,
            },
        }
    }

    /// Whether the caller may retry the operation with backoff.
    pub fn is_transient(&self) -> bool {
        matches!(self, DriveError::Transient { .. })
    }
}

impl From<reqwest::Error> for DriveError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            return DriveError::InvalidResponse(err.to_string());
        }
        DriveError::Transient {
            status: err.status().map(|s| s.as_u16()),
            message: err.to_string(),
        }
    }
}

fn status_label(status: &Option<u16>) -> String {
    status
        .map(|s| s.to_string())
        .unwrap_or_else(|| "network".to_string())
}

/// Result type alias for DriveError.
pub type Result<T> = std::result::Result<T, DriveError>;
