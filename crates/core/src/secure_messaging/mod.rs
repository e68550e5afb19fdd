//! Secure messaging abstractions
//!
//! A [`SecureMessaging`] implementation *is* the session security state of an
//! established secure channel: its keys, chaining values and mode. Exchanges
//! borrow it mutably for the whole wrap, transmit, unwrap sequence, so both
//! halves of the transformation observe the same state and no exchange can
//! interleave with another on the same session.

pub mod error;
mod plain;

use std::cmp::Ordering;
use std::fmt;

use bytes::Bytes;

pub use error::SecureMessagingError;
pub use plain::Plain;

/// Protection applied by a secure messaging session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct SecurityLevel {
    /// Commands carry a MAC
    command_mac: bool,
    /// Command data is encrypted
    command_encryption: bool,
    /// Responses carry a MAC
    response_mac: bool,
}

impl SecurityLevel {
    /// No security (plain communication)
    pub const fn none() -> Self {
        Self {
            command_mac: false,
            command_encryption: false,
            response_mac: false,
        }
    }

    /// Command MAC only
    pub const fn mac() -> Self {
        Self::none().with_command_mac()
    }

    /// Command encryption and MAC
    pub const fn enc_mac() -> Self {
        Self::none().with_command_encryption()
    }

    /// Command MAC and response MAC
    pub const fn mac_rmac() -> Self {
        Self::mac().with_response_mac()
    }

    /// Command encryption and MAC, with response MAC
    pub const fn full() -> Self {
        Self::enc_mac().with_response_mac()
    }

    /// Builder method to add command MAC
    pub const fn with_command_mac(mut self) -> Self {
        self.command_mac = true;
        self
    }

    /// Builder method to add command encryption
    pub const fn with_command_encryption(mut self) -> Self {
        // Encryption implies MAC protection
        self.command_mac = true;
        self.command_encryption = true;
        self
    }

    /// Builder method to add response MAC
    pub const fn with_response_mac(mut self) -> Self {
        self.response_mac = true;
        self
    }

    /// Check if commands carry a MAC
    pub const fn has_command_mac(&self) -> bool {
        self.command_mac
    }

    /// Check if command data is encrypted
    pub const fn has_command_encryption(&self) -> bool {
        self.command_encryption
    }

    /// Check if responses carry a MAC
    pub const fn has_response_mac(&self) -> bool {
        self.response_mac
    }

    /// Check if this security level has any protection
    pub const fn is_none(&self) -> bool {
        !self.command_mac && !self.command_encryption && !self.response_mac
    }

    /// Check if a security level satisfies required security properties
    pub const fn satisfies(&self, required: &Self) -> bool {
        (!required.command_mac || self.command_mac)
            && (!required.command_encryption || self.command_encryption)
            && (!required.response_mac || self.response_mac)
    }

    const fn strength(&self) -> u8 {
        (self.command_mac as u8)
            + (self.response_mac as u8) * 2
            + (self.command_encryption as u8) * 4
    }
}

impl PartialOrd for SecurityLevel {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for SecurityLevel {
    fn cmp(&self, other: &Self) -> Ordering {
        self.strength().cmp(&other.strength())
    }
}

/// Session security state able to protect commands and verify responses
///
/// # Contract
///
/// * [`wrap`](Self::wrap) either returns a wrapped command no longer than
///   `capacity` and advances session counters exactly once, or fails and
///   leaves the state unchanged so a caller-owned retry stays safe.
/// * [`unwrap`](Self::unwrap) receives the command as transmitted (minus the
///   wrapping) to rebuild the cryptographic context of the exchange, and
///   returns the verified plaintext response, status word included, no
///   longer than `capacity`. Failures leave the state unchanged.
pub trait SecureMessaging: Send + fmt::Debug {
    /// Protect an outbound command
    fn wrap(&mut self, command: &[u8], capacity: usize) -> Result<Bytes, SecureMessagingError>;

    /// Verify and strip protection from a response
    fn unwrap(
        &mut self,
        command: &[u8],
        response: &[u8],
        capacity: usize,
    ) -> Result<Bytes, SecureMessagingError>;

    /// Protection currently applied
    fn security_level(&self) -> SecurityLevel;
}

impl<T: SecureMessaging + ?Sized> SecureMessaging for Box<T> {
    fn wrap(&mut self, command: &[u8], capacity: usize) -> Result<Bytes, SecureMessagingError> {
        (**self).wrap(command, capacity)
    }

    fn unwrap(
        &mut self,
        command: &[u8],
        response: &[u8],
        capacity: usize,
    ) -> Result<Bytes, SecureMessagingError> {
        (**self).unwrap(command, response, capacity)
    }

    fn security_level(&self) -> SecurityLevel {
        (**self).security_level()
    }
}

/// Fail with [`SecureMessagingError::CommandTooLong`] if `length` exceeds `capacity`
pub const fn check_command_capacity(
    length: usize,
    capacity: usize,
) -> Result<(), SecureMessagingError> {
    if length > capacity {
        Err(SecureMessagingError::CommandTooLong { length, capacity })
    } else {
        Ok(())
    }
}

/// Fail with [`SecureMessagingError::ResponseTooLong`] if `length` exceeds `capacity`
pub const fn check_response_capacity(
    length: usize,
    capacity: usize,
) -> Result<(), SecureMessagingError> {
    if length > capacity {
        Err(SecureMessagingError::ResponseTooLong { length, capacity })
    } else {
        Ok(())
    }
}
