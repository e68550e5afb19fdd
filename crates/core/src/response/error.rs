//! Error types specific to APDU responses

use thiserror::Error;

/// Error for APDU response parsing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ResponseError {
    /// Response shorter than a status word
    #[error("Incomplete response: {0} bytes, a status word needs 2")]
    Incomplete(usize),
}
