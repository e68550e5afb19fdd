//! Logical channel addressing of command class bytes

use std::fmt;

use crate::error::Error;

/// Class byte bits carrying the logical channel number (b2 b1)
pub const CHANNEL_MASK: u8 = 0x03;

/// Clear the logical channel bits of a class byte
pub const fn strip_channel(cla: u8) -> u8 {
    cla & !CHANNEL_MASK
}

/// Logical channel a card session is bound to
///
/// Only the basic class byte encoding is supported, which covers channels
/// 0 to 3 for both interindustry and proprietary (`0x8X`) classes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct LogicalChannel(u8);

impl LogicalChannel {
    /// The basic channel, always open
    pub const BASIC: Self = Self(0);

    /// Highest supported channel number
    pub const MAX: u8 = 3;

    /// Create a logical channel, rejecting unsupported numbers
    pub fn new(number: u8) -> Result<Self, Error> {
        if number > Self::MAX {
            return Err(Error::InvalidLogicalChannel(number));
        }
        Ok(Self(number))
    }

    /// The channel number
    pub const fn number(self) -> u8 {
        self.0
    }

    /// Overwrite the channel bits of a class byte with this channel
    pub const fn address(self, cla: u8) -> u8 {
        strip_channel(cla) | self.0
    }

    /// Address a raw command in place
    ///
    /// Empty buffers are left alone.
    pub fn apply(self, apdu: &mut [u8]) {
        if let Some(cla) = apdu.first_mut() {
            *cla = self.address(*cla);
        }
    }
}

impl TryFrom<u8> for LogicalChannel {
    type Error = Error;

    fn try_from(number: u8) -> Result<Self, Error> {
        Self::new(number)
    }
}

impl fmt::Display for LogicalChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "channel {}", self.0)
    }
}
