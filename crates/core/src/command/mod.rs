//! APDU command definitions
//!
//! Secure messaging engines need to look inside a command (header, Lc, data,
//! Le) to rebuild it with a MAC or an encrypted body. This module provides a
//! short-form ISO/IEC 7816-4 command that round-trips through raw bytes.

pub mod error;

use bytes::{BufMut, Bytes, BytesMut};

pub use error::CommandError;

/// Largest data field of a short APDU
pub const MAX_SHORT_DATA: usize = 255;

/// Generic APDU command structure
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    /// Command class byte
    pub cla: u8,
    /// Instruction byte
    pub ins: u8,
    /// Parameter 1
    pub p1: u8,
    /// Parameter 2
    pub p2: u8,
    /// Command data (optional)
    pub data: Option<Bytes>,
    /// Expected length (optional)
    pub le: Option<u8>,
}

impl Command {
    /// Create a new command with just the header bytes
    pub const fn new(cla: u8, ins: u8, p1: u8, p2: u8) -> Self {
        Self {
            cla,
            ins,
            p1,
            p2,
            data: None,
            le: None,
        }
    }

    /// Create a new command with data payload
    pub fn new_with_data<T: Into<Bytes>>(cla: u8, ins: u8, p1: u8, p2: u8, data: T) -> Self {
        Self::new(cla, ins, p1, p2).with_data(data)
    }

    /// Set the data field
    pub fn with_data<T: Into<Bytes>>(mut self, data: T) -> Self {
        self.data = Some(data.into());
        self
    }

    /// Set the expected length field
    pub const fn with_le(mut self, le: u8) -> Self {
        self.le = Some(le);
        self
    }

    /// Replace the class byte
    pub const fn with_class(mut self, cla: u8) -> Self {
        self.cla = cla;
        self
    }

    /// Command class (CLA)
    pub const fn class(&self) -> u8 {
        self.cla
    }

    /// Instruction code (INS)
    pub const fn instruction(&self) -> u8 {
        self.ins
    }

    /// First parameter (P1)
    pub const fn p1(&self) -> u8 {
        self.p1
    }

    /// Second parameter (P2)
    pub const fn p2(&self) -> u8 {
        self.p2
    }

    /// The four header bytes
    pub const fn header(&self) -> [u8; 4] {
        [self.cla, self.ins, self.p1, self.p2]
    }

    /// Command payload data (optional)
    pub fn data(&self) -> Option<&[u8]> {
        self.data.as_deref()
    }

    /// Length of the data field, zero when absent
    pub fn data_len(&self) -> usize {
        self.data.as_ref().map_or(0, Bytes::len)
    }

    /// Expected response length (optional)
    pub const fn expected_length(&self) -> Option<u8> {
        self.le
    }

    /// Calculate length of serialized command
    pub fn command_length(&self) -> usize {
        let lc = if self.data.is_some() {
            1 + self.data_len()
        } else {
            0
        };
        4 + lc + usize::from(self.le.is_some())
    }

    /// Convert to raw APDU bytes
    pub fn to_bytes(&self) -> Result<Bytes, CommandError> {
        let mut buffer = BytesMut::with_capacity(self.command_length());
        buffer.put_slice(&self.header());

        if let Some(data) = self.data() {
            let lc = u8::try_from(data.len())
                .map_err(|_| CommandError::DataTooLong(data.len(), MAX_SHORT_DATA))?;
            buffer.put_u8(lc);
            buffer.put_slice(data);
        }

        if let Some(le) = self.le {
            buffer.put_u8(le);
        }

        Ok(buffer.freeze())
    }

    /// Parse a short command from raw bytes
    pub fn from_bytes(data: &[u8]) -> Result<Self, CommandError> {
        let [cla, ins, p1, p2, body @ ..] = data else {
            return Err(CommandError::InvalidLength(data.len()));
        };

        let mut command = Self::new(*cla, *ins, *p1, *p2);

        match body {
            // Case 1
            [] => {}
            // Case 2: only Le
            [le] => command.le = Some(*le),
            [lc, rest @ ..] => {
                let lc = usize::from(*lc);
                // Lc = 0 would announce an extended length field
                if lc == 0 || rest.len() < lc || rest.len() > lc + 1 {
                    return Err(CommandError::InvalidLength(data.len()));
                }
                command.data = Some(Bytes::copy_from_slice(&rest[..lc]));
                command.le = rest.get(lc).copied();
            }
        }

        Ok(command)
    }
}
