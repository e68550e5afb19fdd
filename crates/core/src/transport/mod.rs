//! Transport traits for APDU communication with cards
//!
//! A transport is the capability that physically moves bytes to and from a
//! card. It has no knowledge of command structure or secure messaging. The
//! [`TransportBinding`] resolved from a [`CardContext`](crate::CardContext)
//! decides which transport, if any, an exchange goes through.

pub mod error;

use std::fmt;

use bytes::Bytes;
pub use error::TransportError;
use tracing::{debug, trace};

use crate::context::CardInfo;
use crate::error::Error;
use crate::response::status::StatusWord;

/// Result code reported by a transport for a completed exchange
///
/// This is the transport's own outcome and is independent of the card's
/// status word. PC/SC style transports report the status word here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct TransportStatus(u32);

impl TransportStatus {
    /// Status of a transport reporting plain success
    pub const SUCCESS: Self = Self(0);

    /// Create a status from a raw code
    pub const fn new(code: u32) -> Self {
        Self(code)
    }

    /// The raw code
    pub const fn code(self) -> u32 {
        self.0
    }
}

impl From<StatusWord> for TransportStatus {
    fn from(status: StatusWord) -> Self {
        Self(u32::from(status.to_u16()))
    }
}

impl fmt::Display for TransportStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#06X}", self.0)
    }
}

/// Raw bytes received from the card together with the transport status
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportResponse {
    data: Bytes,
    status: TransportStatus,
}

impl TransportResponse {
    /// Create a response with an explicit transport status
    pub fn new(data: impl Into<Bytes>, status: TransportStatus) -> Self {
        Self {
            data: data.into(),
            status,
        }
    }

    /// Create a response whose transport status is the trailing status word
    ///
    /// Responses too short to hold a status word report
    /// [`TransportStatus::SUCCESS`]; rejecting them is left to unwrapping.
    pub fn from_card(data: impl Into<Bytes>) -> Self {
        let data = data.into();
        let status = match data.as_ref() {
            [.., sw1, sw2] => StatusWord::new(*sw1, *sw2).into(),
            _ => TransportStatus::SUCCESS,
        };
        Self { data, status }
    }

    /// Raw response bytes as received
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// The transport's status for this exchange
    pub const fn status(&self) -> TransportStatus {
        self.status
    }

    /// Take the raw bytes
    pub fn into_data(self) -> Bytes {
        self.data
    }
}

/// Trait for basic card transports
///
/// Implementations deliver each command exactly once. Timeouts, if any,
/// belong to the implementation.
pub trait CardTransport: Send + fmt::Debug {
    /// Send raw APDU bytes to the card addressed by `card`
    fn transmit_raw(
        &mut self,
        card: &CardInfo,
        command: &[u8],
    ) -> Result<TransportResponse, TransportError> {
        trace!(command = %hex::encode_upper(command), "Transmitting raw command");
        let result = self.do_transmit_raw(card, command);
        match &result {
            Ok(response) => {
                trace!(
                    response = %hex::encode_upper(response.data()),
                    status = %response.status(),
                    "Received raw response"
                );
            }
            Err(e) => {
                debug!(error = ?e, "Transport error during transmission");
            }
        }
        result
    }

    /// Internal implementation of transmit_raw
    /// This is the method that concrete implementations should override
    fn do_transmit_raw(
        &mut self,
        card: &CardInfo,
        command: &[u8],
    ) -> Result<TransportResponse, TransportError>;

    /// Check if the transport is connected to a physical card
    fn is_connected(&self) -> bool {
        true
    }

    /// Reset the transport connection
    fn reset(&mut self) -> Result<(), TransportError> {
        Ok(())
    }
}

/// How an exchange reaches the card
///
/// The binding is installed by whatever selects the transport plugin. An
/// unbound context fails every exchange with [`Error::NoTransport`].
#[derive(Debug, Default)]
pub enum TransportBinding {
    /// No transport has been configured
    #[default]
    Unbound,
    /// A concrete transport
    Bound(Box<dyn CardTransport>),
}

impl TransportBinding {
    /// Bind a concrete transport
    pub fn bound<T: CardTransport + 'static>(transport: T) -> Self {
        Self::Bound(Box::new(transport))
    }

    /// Check whether a transport is bound
    pub const fn is_bound(&self) -> bool {
        matches!(self, Self::Bound(_))
    }

    /// Resolve the transport for one exchange
    pub fn resolve(&mut self) -> Result<&mut dyn CardTransport, Error> {
        match self {
            Self::Bound(transport) => Ok(transport.as_mut()),
            Self::Unbound => Err(Error::NoTransport),
        }
    }

    /// Remove the bound transport, leaving the binding unbound
    pub fn unbind(&mut self) -> Option<Box<dyn CardTransport>> {
        match std::mem::take(self) {
            Self::Bound(transport) => Some(transport),
            Self::Unbound => None,
        }
    }
}
