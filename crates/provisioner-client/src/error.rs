//! Provisioner client errors

use thiserror::Error;

/// Errors that can occur when interacting with the provisioning backend API
#[derive(Debug, Error)]
pub enum ProvisionerError {
    /// HTTP request/response error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The backend returned an error
    #[error("provisioner API error: {0}")]
    Api(String),

    /// JSON serialization/deserialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Authentication failed (invalid token, expired, etc.)
    #[error("authentication failed: {0}")]
    Authentication(String),

    /// Resource not found
    #[error("not found: {0}")]
    NotFound(String),

    /// Invalid request (e.g., missing required fields)
    #[error("invalid request: {0}")]
    InvalidRequest(String),
}
