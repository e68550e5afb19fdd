//! Error types for secure messaging engines

use thiserror::Error;

use crate::command::CommandError;
use crate::response::error::ResponseError;

/// Error returned by [`SecureMessaging`](super::SecureMessaging) engines
///
/// Engines must leave their session state untouched when returning one.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SecureMessagingError {
    /// The plaintext command could not be parsed
    #[error("Malformed command: {0}")]
    MalformedCommand(#[from] CommandError),

    /// The wrapped command would not fit the output capacity
    #[error("Wrapped command of {length} bytes exceeds the {capacity} byte limit")]
    CommandTooLong {
        /// Length the wrapped command would have
        length: usize,
        /// Available capacity
        capacity: usize,
    },

    /// The response could not be parsed
    #[error("Malformed response: {0}")]
    MalformedResponse(#[from] ResponseError),

    /// The unwrapped response would not fit the output capacity
    #[error("Unwrapped response of {length} bytes exceeds the {capacity} byte limit")]
    ResponseTooLong {
        /// Length of the unwrapped response
        length: usize,
        /// Available capacity
        capacity: usize,
    },

    /// The response failed integrity verification
    #[error("Integrity check failed: {0}")]
    IntegrityCheckFailed(&'static str),

    /// The secure session has been closed
    #[error("Secure messaging session is closed")]
    SessionClosed,

    /// A cryptographic primitive failed
    #[error("Cryptographic error: {0}")]
    Crypto(&'static str),

    /// Other error with message
    #[error("{0}")]
    Other(String),
}

impl SecureMessagingError {
    /// Create a general other error
    pub fn other<S: Into<String>>(message: S) -> Self {
        Self::Other(message.into())
    }

    /// Small per-variant offset used to build exchange error codes
    pub const fn kind_code(&self) -> u32 {
        match self {
            Self::MalformedCommand(_) => 1,
            Self::CommandTooLong { .. } => 2,
            Self::MalformedResponse(_) => 3,
            Self::ResponseTooLong { .. } => 4,
            Self::IntegrityCheckFailed(_) => 5,
            Self::SessionClosed => 6,
            Self::Crypto(_) => 7,
            Self::Other(_) => 0xF,
        }
    }
}
