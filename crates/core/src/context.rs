//! Card context and card addressing information
//!
//! [`CardContext`] bundles how to reach the card (the transport binding) with
//! the exchange limits. [`CardInfo`] describes the connected card, including
//! the logical channel every command must be addressed to.

use bytes::Bytes;

use crate::channel::LogicalChannel;
use crate::config::ExchangeConfig;
use crate::error::Result;
use crate::exchange::{ExchangeOutcome, send_apdu};
use crate::secure_messaging::SecureMessaging;
use crate::trace::ApduTrace;
use crate::transport::{CardTransport, TransportBinding};

/// Information about a connected card
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CardInfo {
    /// Logical channel of the session
    logical_channel: LogicalChannel,
    /// Name of the reader holding the card
    reader_name: Option<String>,
    /// Answer to reset
    atr: Bytes,
}

impl CardInfo {
    /// Card on the basic logical channel
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the logical channel
    pub fn with_logical_channel(mut self, channel: LogicalChannel) -> Self {
        self.logical_channel = channel;
        self
    }

    /// Set the reader name
    pub fn with_reader_name<S: Into<String>>(mut self, name: S) -> Self {
        self.reader_name = Some(name.into());
        self
    }

    /// Set the answer to reset
    pub fn with_atr(mut self, atr: impl Into<Bytes>) -> Self {
        self.atr = atr.into();
        self
    }

    /// Logical channel of the session
    pub const fn logical_channel(&self) -> LogicalChannel {
        self.logical_channel
    }

    /// Name of the reader holding the card
    pub fn reader_name(&self) -> Option<&str> {
        self.reader_name.as_deref()
    }

    /// Answer to reset
    pub fn atr(&self) -> &[u8] {
        &self.atr
    }
}

/// Connection context shared by all exchanges with a card
#[derive(Debug, Default)]
pub struct CardContext {
    binding: TransportBinding,
    config: ExchangeConfig,
}

impl CardContext {
    /// Create a context from a binding
    pub fn new(binding: TransportBinding) -> Self {
        Self {
            binding,
            config: ExchangeConfig::default(),
        }
    }

    /// Create a context with a bound transport
    pub fn with_transport<T: CardTransport + 'static>(transport: T) -> Self {
        Self::new(TransportBinding::bound(transport))
    }

    /// Create a context with no transport bound
    pub fn unbound() -> Self {
        Self::new(TransportBinding::Unbound)
    }

    /// Set the exchange limits
    pub fn with_config(mut self, config: ExchangeConfig) -> Self {
        self.config = config;
        self
    }

    /// Exchange limits
    pub const fn config(&self) -> ExchangeConfig {
        self.config
    }

    /// Transport binding
    pub const fn binding(&self) -> &TransportBinding {
        &self.binding
    }

    /// Mutable transport binding
    pub const fn binding_mut(&mut self) -> &mut TransportBinding {
        &mut self.binding
    }

    /// Replace the transport binding, returning the previous one
    pub fn set_binding(&mut self, binding: TransportBinding) -> TransportBinding {
        std::mem::replace(&mut self.binding, binding)
    }

    /// Exchange one command with the card
    ///
    /// See [`send_apdu`] for the sequence and failure semantics.
    pub fn send_apdu<S: SecureMessaging + ?Sized>(
        &mut self,
        card: &CardInfo,
        security: &mut S,
        command: &[u8],
        trace: &mut ApduTrace,
    ) -> Result<ExchangeOutcome> {
        send_apdu(self, card, security, command, trace)
    }
}
