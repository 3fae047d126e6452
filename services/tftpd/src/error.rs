//! TFTP service errors

use thiserror::Error;

/// Errors from the TFTP service
#[derive(Debug, Error)]
pub enum TftpdError {
    /// Bad or missing configuration
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// HTTP request to the config generator failed
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The config generator answered with a non-success status
    #[error("config generator returned {status} for {url}")]
    Generator {
        /// HTTP status code
        status: u16,
        /// URL that was fetched
        url: String,
    },

    /// IO error while serving a file
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// TFTP server failure
    #[error("TFTP server error: {0}")]
    Server(#[from] async_tftp::Error),
}
