//! Session state for SCP02 secure messaging
//!
//! This module provides the session keys, the negotiated security level and
//! the chaining values that make up an open SCP02 secure channel.

use std::fmt;

use apdu_sm_core::SecurityLevel;
use cipher::{Iv, Key};
use tracing::debug;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::crypto::{Scp02, Scp02Mac};
use crate::error::{Error, Result};

/// SCP02 session keys
///
/// Keys are 2-key 3DES keys derived during secure channel initiation.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct SessionKeys {
    /// Command encryption key (S-ENC)
    enc: [u8; 16],
    /// Command MAC key (C-MAC)
    mac: [u8; 16],
    /// Response MAC key (R-MAC)
    rmac: Option<[u8; 16]>,
}

impl fmt::Debug for SessionKeys {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionKeys")
            .field("enc", &"<redacted>")
            .field("mac", &"<redacted>")
            .field("rmac", &self.rmac.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

impl SessionKeys {
    /// Create a key set with encryption and MAC keys
    pub const fn new(enc: [u8; 16], mac: [u8; 16]) -> Self {
        Self {
            enc,
            mac,
            rmac: None,
        }
    }

    /// Create a key set with all three keys
    pub const fn new_with_rmac(enc: [u8; 16], mac: [u8; 16], rmac: [u8; 16]) -> Self {
        Self {
            enc,
            mac,
            rmac: Some(rmac),
        }
    }

    /// Create a key set from slices, checking their lengths
    pub fn from_slices(enc: &[u8], mac: &[u8], rmac: Option<&[u8]>) -> Result<Self> {
        let rmac = rmac.map(to_key).transpose()?;
        Ok(Self {
            enc: to_key(enc)?,
            mac: to_key(mac)?,
            rmac,
        })
    }

    /// Get the encryption key
    pub fn enc(&self) -> Key<Scp02> {
        Key::<Scp02>::clone_from_slice(&self.enc)
    }

    /// Get the command MAC key
    pub fn mac(&self) -> Key<Scp02> {
        Key::<Scp02>::clone_from_slice(&self.mac)
    }

    /// Get the response MAC key
    pub fn rmac(&self) -> Option<Key<Scp02>> {
        self.rmac.as_ref().map(|key| Key::<Scp02>::clone_from_slice(key))
    }
}

fn to_key(key: &[u8]) -> Result<[u8; 16]> {
    key.try_into()
        .map_err(|_| Error::InvalidKeyLength(key.len()))
}

/// SCP02 security level negotiated with EXTERNAL AUTHENTICATE
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Scp02Level {
    /// C-MAC
    Mac,
    /// C-DECRYPTION and C-MAC
    EncMac,
    /// C-MAC and R-MAC
    MacRmac,
    /// C-DECRYPTION, C-MAC and R-MAC
    EncMacRmac,
}

impl Scp02Level {
    /// GlobalPlatform security level byte
    pub const fn to_byte(self) -> u8 {
        match self {
            Self::Mac => 0x01,
            Self::EncMac => 0x03,
            Self::MacRmac => 0x11,
            Self::EncMacRmac => 0x13,
        }
    }

    /// Whether command data is encrypted
    pub const fn has_encryption(self) -> bool {
        matches!(self, Self::EncMac | Self::EncMacRmac)
    }

    /// Whether responses carry an R-MAC
    pub const fn has_rmac(self) -> bool {
        matches!(self, Self::MacRmac | Self::EncMacRmac)
    }

    /// Equivalent core security level
    pub const fn security_level(self) -> SecurityLevel {
        match self {
            Self::Mac => SecurityLevel::mac(),
            Self::EncMac => SecurityLevel::enc_mac(),
            Self::MacRmac => SecurityLevel::mac_rmac(),
            Self::EncMacRmac => SecurityLevel::full(),
        }
    }
}

impl TryFrom<u8> for Scp02Level {
    type Error = Error;

    fn try_from(level: u8) -> Result<Self> {
        match level {
            0x01 => Ok(Self::Mac),
            0x03 => Ok(Self::EncMac),
            0x11 => Ok(Self::MacRmac),
            0x13 => Ok(Self::EncMacRmac),
            other => Err(Error::UnsupportedSecurityLevel(other)),
        }
    }
}

/// Implementation options of the SCP02 protocol
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Scp02Options {
    icv_encryption: bool,
}

impl Default for Scp02Options {
    fn default() -> Self {
        Self {
            icv_encryption: true,
        }
    }
}

impl Scp02Options {
    /// Set whether the C-MAC ICV is encrypted before use (option 0x55)
    pub const fn with_icv_encryption(mut self, enabled: bool) -> Self {
        self.icv_encryption = enabled;
        self
    }

    /// Whether the C-MAC ICV is encrypted before use
    pub const fn icv_encryption(&self) -> bool {
        self.icv_encryption
    }
}

/// Open SCP02 secure messaging session
///
/// Holds the session keys and the C-MAC and R-MAC chaining values. Commands
/// and responses are protected through the
/// [`SecureMessaging`](apdu_sm_core::SecureMessaging) implementation.
#[derive(Clone)]
pub struct Scp02Session {
    pub(crate) keys: SessionKeys,
    pub(crate) level: Scp02Level,
    pub(crate) options: Scp02Options,
    /// Last C-MAC
    pub(crate) cmac_icv: Iv<Scp02>,
    /// Last R-MAC
    pub(crate) rmac_icv: Iv<Scp02>,
    pub(crate) open: bool,
}

impl fmt::Debug for Scp02Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scp02Session")
            .field("level", &self.level)
            .field("options", &self.options)
            .field("open", &self.open)
            .finish()
    }
}

impl Scp02Session {
    /// Create an open session at the given security level
    pub fn new(keys: SessionKeys, level: Scp02Level) -> Result<Self> {
        if level.has_rmac() && keys.rmac.is_none() {
            return Err(Error::MissingRmacKey(level));
        }

        Ok(Self {
            keys,
            level,
            options: Scp02Options::default(),
            cmac_icv: Iv::<Scp02>::default(),
            rmac_icv: Iv::<Scp02>::default(),
            open: true,
        })
    }

    /// Set the protocol options
    pub fn with_options(mut self, options: Scp02Options) -> Self {
        self.options = options;
        self
    }

    /// Start the C-MAC chain from `icv`
    pub fn with_cmac_icv(mut self, icv: Scp02Mac) -> Self {
        self.cmac_icv = icv.into();
        self
    }

    /// Start the R-MAC chain from `icv`
    pub fn with_rmac_icv(mut self, icv: Scp02Mac) -> Self {
        self.rmac_icv = icv.into();
        self
    }

    /// Negotiated security level
    pub const fn level(&self) -> Scp02Level {
        self.level
    }

    /// Protocol options
    pub const fn options(&self) -> Scp02Options {
        self.options
    }

    /// Last C-MAC sent
    pub fn cmac_icv(&self) -> Scp02Mac {
        self.cmac_icv.into()
    }

    /// Last R-MAC verified
    pub fn rmac_icv(&self) -> Scp02Mac {
        self.rmac_icv.into()
    }

    /// Check whether the session still protects commands
    pub const fn is_open(&self) -> bool {
        self.open
    }

    /// Close the session
    ///
    /// Later wraps fail with
    /// [`SecureMessagingError::SessionClosed`](apdu_sm_core::SecureMessagingError::SessionClosed).
    pub fn close(&mut self) {
        debug!("Closing SCP02 secure messaging session");
        self.open = false;
        self.cmac_icv = Iv::<Scp02>::default();
        self.rmac_icv = Iv::<Scp02>::default();
    }
}
