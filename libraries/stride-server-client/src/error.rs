//! Error types for the Stride server client.

use stride_core::StrideError;
use thiserror::Error;

/// Errors that can occur when talking to the Stride backend.
#[derive(Error, Debug)]
pub enum ServerClientError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Server returned an error response
    #[error("Server error ({status}): {message}")]
    ServerError { status: u16, message: String },

    /// Authentication required but no token available, or token rejected
    #[error("Authentication required")]
    AuthRequired,

    /// Caller may not perform this action (e.g. deleting another author's reel)
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Resource does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// Invalid server URL
    #[error("Invalid server URL: {0}")]
    InvalidUrl(String),

    /// Failed to parse server response
    #[error("Failed to parse response: {0}")]
    ParseError(String),

    /// Server is offline or unreachable
    #[error("Server unreachable: {0}")]
    ServerUnreachable(String),

    /// Rate limited by server
    #[error("Rate limited, retry after {retry_after_secs} seconds")]
    RateLimited { retry_after_secs: u64 },
}

/// Result type for server client operations.
pub type Result<T> = std::result::Result<T, ServerClientError>;

impl From<ServerClientError> for StrideError {
    fn from(err: ServerClientError) -> Self {
        match err {
            ServerClientError::Request(e) => StrideError::Network(e.to_string()),
            ServerClientError::ServerUnreachable(msg) => StrideError::Network(msg),
            ServerClientError::ParseError(msg) => {
                StrideError::Network(format!("malformed response: {msg}"))
            }
            ServerClientError::ServerError { status, message } => {
                StrideError::Server { status, message }
            }
            ServerClientError::RateLimited { retry_after_secs } => StrideError::Server {
                status: 429,
                message: format!("rate limited, retry after {retry_after_secs}s"),
            },
            ServerClientError::AuthRequired => StrideError::AuthRequired,
            ServerClientError::Forbidden(msg) => StrideError::PermissionDenied(msg),
            ServerClientError::NotFound(path) => StrideError::not_found("resource", path),
            ServerClientError::InvalidUrl(msg) => StrideError::InvalidInput(msg),
        }
    }
}
