//! Configuration options for secure APDU exchanges

/// Largest short command: header, Lc, 255 data bytes and Le
pub const SHORT_COMMAND_MAX: usize = 261;
/// Largest short response: 256 data bytes and the status word
pub const SHORT_RESPONSE_MAX: usize = 258;
/// Largest extended command: header, 3 byte Lc, 65535 data bytes and 2 byte Le
pub const EXTENDED_COMMAND_MAX: usize = 65_544;
/// Largest extended response: 65536 data bytes and the status word
pub const EXTENDED_RESPONSE_MAX: usize = 65_538;

/// Buffer limits applied to every exchange
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExchangeConfig {
    /// Capacity for the wrapped command
    max_command_len: usize,
    /// Capacity for the unwrapped response
    max_response_len: usize,
}

impl Default for ExchangeConfig {
    fn default() -> Self {
        if cfg!(feature = "extended") {
            Self::extended()
        } else {
            Self::short()
        }
    }
}

impl ExchangeConfig {
    /// Create a new default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Limits for short APDUs
    pub const fn short() -> Self {
        Self {
            max_command_len: SHORT_COMMAND_MAX,
            max_response_len: SHORT_RESPONSE_MAX,
        }
    }

    /// Limits for extended length APDUs
    pub const fn extended() -> Self {
        Self {
            max_command_len: EXTENDED_COMMAND_MAX,
            max_response_len: EXTENDED_RESPONSE_MAX,
        }
    }

    /// Set the wrapped command capacity
    pub const fn with_max_command_len(mut self, len: usize) -> Self {
        self.max_command_len = len;
        self
    }

    /// Set the unwrapped response capacity
    pub const fn with_max_response_len(mut self, len: usize) -> Self {
        self.max_response_len = len;
        self
    }

    /// Capacity for the wrapped command
    pub const fn max_command_len(&self) -> usize {
        self.max_command_len
    }

    /// Capacity for the unwrapped response
    pub const fn max_response_len(&self) -> usize {
        self.max_response_len
    }
}
