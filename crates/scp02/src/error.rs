//! Error types for SCP02 session setup

use thiserror::Error;

use crate::session::Scp02Level;

/// Result type for SCP02 session setup
pub type Result<T> = std::result::Result<T, Error>;

/// Error returned when an SCP02 session cannot be created
///
/// Failures during an exchange are reported as
/// [`SecureMessagingError`](apdu_sm_core::SecureMessagingError) instead.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// Wrong key length
    #[error("Invalid key length: expected 16, got {0}")]
    InvalidKeyLength(usize),

    /// The requested level needs a response MAC key
    #[error("Security level {0:?} requires an R-MAC session key")]
    MissingRmacKey(Scp02Level),

    /// Unknown GlobalPlatform security level byte
    #[error("Unsupported security level: {0:#04X}")]
    UnsupportedSecurityLevel(u8),
}
