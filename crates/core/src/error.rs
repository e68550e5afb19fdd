//! Core error type for secure APDU exchanges
//!
//! Every exchange fails with exactly one [`Error`], the first one hit. The
//! variants follow the stages of an exchange so callers can tell a missing
//! transport from a wrap, transport or unwrap failure. [`ErrorStatus`] is the
//! flat numeric code plus message form of any outcome.

use std::fmt;

use crate::secure_messaging::SecureMessagingError;
use crate::transport::TransportError;

/// Result type for secure APDU exchanges
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Numeric codes of the uniform result convention
pub mod codes {
    /// Success
    pub const SUCCESS: u32 = 0;
    /// No transport bound to the card context
    pub const NO_TRANSPORT: u32 = 0x8030_F001;
    /// Logical channel outside the supported range
    pub const INVALID_LOGICAL_CHANNEL: u32 = 0x8030_F002;
    /// Base of wrap failures, offset by the secure messaging error kind
    pub const WRAP_BASE: u32 = 0x8030_F010;
    /// Base of unwrap failures, offset by the secure messaging error kind
    pub const UNWRAP_BASE: u32 = 0x8030_F020;
}

/// Stage of an exchange an error belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The card context is not usable as configured
    Configuration,
    /// Secure messaging failed to protect the command
    Wrap,
    /// The physical or logical exchange failed
    Transport,
    /// The response failed verification or was malformed
    Unwrap,
}

/// Core error type that encompasses all possible errors in the crate
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// No transport is bound to the card context
    #[error("No transport configured: likely no connection library is set")]
    NoTransport,

    /// Logical channel outside the supported range
    #[error("Invalid logical channel {0}: only channels 0 to 3 are supported")]
    InvalidLogicalChannel(u8),

    /// Wrapping the command failed
    #[error("Failed to wrap command: {0}")]
    Wrap(#[source] SecureMessagingError),

    /// The transport failed
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// Unwrapping the response failed
    #[error("Failed to unwrap response: {0}")]
    Unwrap(#[source] SecureMessagingError),

    /// Context error with message and source error
    #[error("{context}: {source}")]
    Context {
        /// Contextual message
        context: String,
        /// Source error
        source: Box<Self>,
    },
}

impl Error {
    /// Create a new error with context information
    pub fn with_context<S: Into<String>>(self, context: S) -> Self {
        Self::Context {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// The stage this error belongs to
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NoTransport | Self::InvalidLogicalChannel(_) => ErrorKind::Configuration,
            Self::Wrap(_) => ErrorKind::Wrap,
            Self::Transport(_) => ErrorKind::Transport,
            Self::Unwrap(_) => ErrorKind::Unwrap,
            Self::Context { source, .. } => source.kind(),
        }
    }

    /// Numeric code for the uniform result convention
    pub fn code(&self) -> u32 {
        match self {
            Self::NoTransport => codes::NO_TRANSPORT,
            Self::InvalidLogicalChannel(_) => codes::INVALID_LOGICAL_CHANNEL,
            Self::Wrap(e) => codes::WRAP_BASE + e.kind_code(),
            Self::Transport(e) => e.code(),
            Self::Unwrap(e) => codes::UNWRAP_BASE + e.kind_code(),
            Self::Context { source, .. } => source.code(),
        }
    }
}

/// Extension trait for Result with exchange errors
pub trait ResultExt<T> {
    /// Add context to an error
    fn context<S: Into<String>>(self, context: S) -> Result<T>;
}

impl<T> ResultExt<T> for Result<T> {
    fn context<S: Into<String>>(self, context: S) -> Self {
        self.map_err(|e| e.with_context(context))
    }
}

/// Uniform outcome carrying a numeric code and a human readable message
///
/// The success flag is authoritative. Failures carry an [`Error::code`];
/// a successful exchange carries the transport's own status code, which is
/// [`codes::SUCCESS`] for plain transports and the card status word for
/// PC/SC style ones.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorStatus {
    success: bool,
    code: u32,
    message: String,
}

impl ErrorStatus {
    /// A successful outcome with the given code
    pub fn success(code: u32) -> Self {
        Self {
            success: true,
            code,
            message: "Success".to_string(),
        }
    }

    /// A failed outcome
    pub fn failure<S: Into<String>>(code: u32, message: S) -> Self {
        Self {
            success: false,
            code,
            message: message.into(),
        }
    }

    /// Whether the operation succeeded
    pub const fn is_success(&self) -> bool {
        self.success
    }

    /// The numeric code
    pub const fn code(&self) -> u32 {
        self.code
    }

    /// The human readable message
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<&Error> for ErrorStatus {
    fn from(error: &Error) -> Self {
        Self::failure(error.code(), error.to_string())
    }
}

impl From<Error> for ErrorStatus {
    fn from(error: Error) -> Self {
        Self::from(&error)
    }
}

impl fmt::Display for ErrorStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#010X}: {}", self.code, self.message)
    }
}
