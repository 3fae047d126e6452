//! Serial store errors

use thiserror::Error;

/// Errors that can occur when operating on serial counters
#[derive(Debug, Error)]
pub enum SequenceError {
    /// A counter with this name already exists
    #[error("sequence already exists: {0}")]
    AlreadyExists(String),

    /// No counter with this name exists
    #[error("sequence not found: {0}")]
    NotFound(String),

    /// The backing store is unreachable or failed.
    ///
    /// Transient infrastructure failure; surfaced to the caller, never
    /// retried here.
    #[error("serial store error: {0}")]
    Store(String),
}
