use std::io;
use thiserror::Error;

/// The error type for traffic monitoring operations.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error while writing to the output terminal
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The device could not be reached or the transport failed mid-request
    #[error("device unreachable: {0}")]
    DeviceUnreachable(#[from] reqwest::Error),

    /// The device answered, but the response was malformed or incomplete
    #[error("protocol error in field '{field}': {reason}")]
    Protocol { field: String, reason: String },

    /// A non-monotonic or zero-width sample interval was observed
    #[error("non-monotonic sample timestamps")]
    Clock,
}

impl Error {
    /// Create a new protocol error for a malformed response field
    pub fn protocol(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Protocol {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

/// A specialized `Result` type for traffic monitoring operations.
pub type Result<T> = std::result::Result<T, Error>;
