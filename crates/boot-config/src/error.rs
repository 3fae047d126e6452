//! Boot configuration errors

use thiserror::Error;

/// Errors that can occur while synthesizing boot configuration
#[derive(Debug, Error)]
pub enum BootConfigError {
    /// A template variable has no corresponding parameter.
    ///
    /// Always fatal to the render in question: a partially substituted
    /// config must never reach the DHCP daemon, DNS server or a booting
    /// machine.
    #[error("missing template parameter: {name}")]
    MissingParameter {
        /// Name of the offending template variable
        name: String,
    },

    /// The template itself is malformed (e.g. an unclosed placeholder)
    #[error("malformed template: {0}")]
    Template(String),

    /// Serial allocation failed while rewriting a zone
    #[error("serial allocation failed: {0}")]
    Serial(#[from] zone_serial::SequenceError),

    /// IO error while writing a rendered config
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
