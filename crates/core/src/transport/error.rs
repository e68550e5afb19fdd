//! Error types specific to card transport

use thiserror::Error;

/// Transport error type
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// Connection error
    #[error("Failed to connect to device")]
    Connection,

    /// Transmission error
    #[error("Failed to transmit data")]
    Transmission,

    /// No card in the reader, or the card was removed
    #[error("No card present")]
    NoCard,

    /// Buffer too small
    #[error("Response buffer too small")]
    BufferTooSmall,

    /// Driver error (with the driver's own result code)
    #[error("Driver error code: {0:#010X}")]
    Driver(u32),

    /// Timeout error
    #[error("Operation timed out")]
    Timeout,

    /// Other error with message
    #[error("{0}")]
    Other(String),
}

impl TransportError {
    /// Create a new driver error
    pub const fn driver(code: u32) -> Self {
        Self::Driver(code)
    }

    /// Create a general other error
    pub fn other<S: Into<String>>(message: S) -> Self {
        Self::Other(message.into())
    }

    /// Numeric code for the uniform result convention
    ///
    /// Driver errors report the driver's code unchanged.
    pub const fn code(&self) -> u32 {
        match self {
            Self::Connection => 0x8030_F101,
            Self::Transmission => 0x8030_F102,
            Self::NoCard => 0x8030_F103,
            Self::BufferTooSmall => 0x8030_F104,
            Self::Driver(code) => *code,
            Self::Timeout => 0x8030_F105,
            Self::Other(_) => 0x8030_F1FF,
        }
    }
}
