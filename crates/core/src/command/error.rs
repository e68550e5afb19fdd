//! Error types specific to APDU commands

use thiserror::Error;

/// Error for APDU command parsing and encoding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum CommandError {
    /// Byte length does not match any short APDU case
    #[error("Invalid command length: {0}")]
    InvalidLength(usize),

    /// Data too long for a short APDU
    #[error("Data too long: {0} bytes (max {1})")]
    DataTooLong(usize, usize),
}
