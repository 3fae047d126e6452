//! Reconciler errors

use thiserror::Error;

/// Errors that can abort a reconciliation run
#[derive(Debug, Error)]
pub enum ReconcileError {
    /// Fetching the remote inventory failed; nothing was changed
    #[error("remote inventory fetch failed: {0}")]
    RemoteFetch(#[source] provisioner_client::ProvisionerError),

    /// Fetching the local inventory failed; nothing was changed
    #[error("local inventory fetch failed: {0}")]
    LocalFetch(#[source] StoreError),
}

/// Errors from a local machine store implementation
#[derive(Debug, Error)]
pub enum StoreError {
    /// A machine with this system id already exists
    #[error("machine already exists: {0}")]
    AlreadyExists(String),

    /// No machine with this system id
    #[error("machine not found: {0}")]
    NotFound(String),

    /// Underlying storage failure
    #[error("store error: {0}")]
    Storage(String),
}
