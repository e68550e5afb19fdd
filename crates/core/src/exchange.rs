//! Secure APDU exchange
//!
//! One call of [`send_apdu`] runs the full sequence for a single command:
//! resolve the transport, wrap the command, address the logical channel,
//! transmit, then unwrap the response. Any failure stops the sequence at
//! that stage and is the result of the exchange.

use bytes::{Bytes, BytesMut};
use tracing::{debug, instrument, trace};

use crate::context::{CardContext, CardInfo};
use crate::error::{Error, ErrorStatus, Result};
use crate::response::Response;
use crate::response::status::StatusWord;
use crate::secure_messaging::{
    SecureMessaging, SecureMessagingError, check_command_capacity, check_response_capacity,
};
use crate::trace::{ApduTrace, Checkpoint};
use crate::transport::TransportStatus;

/// Result of a successful exchange
///
/// The transport's status and the card's status word are kept apart. A
/// successful exchange may still carry an error status word from the card.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExchangeOutcome {
    transport_status: TransportStatus,
    response: Response,
}

impl ExchangeOutcome {
    /// Create an outcome
    pub const fn new(transport_status: TransportStatus, response: Response) -> Self {
        Self {
            transport_status,
            response,
        }
    }

    /// Status reported by the transport for the exchange
    pub const fn transport_status(&self) -> TransportStatus {
        self.transport_status
    }

    /// Status word of the unwrapped response
    pub const fn status_word(&self) -> StatusWord {
        self.response.status()
    }

    /// Unwrapped response
    pub const fn response(&self) -> &Response {
        &self.response
    }

    /// Payload of the unwrapped response, without the status word
    pub fn payload(&self) -> &[u8] {
        self.response.payload()
    }

    /// Take the unwrapped response
    pub fn into_response(self) -> Response {
        self.response
    }

    /// Unwrapped response bytes, status word included
    pub fn to_bytes(&self) -> Bytes {
        self.response.to_bytes()
    }

    /// Uniform result form carrying the transport's status code
    pub fn error_status(&self) -> ErrorStatus {
        ErrorStatus::success(self.transport_status.code())
    }
}

/// Exchange one command with the card through a secure messaging session
///
/// The caller's `command` is never modified. The transmitted copy, and the
/// plaintext copy handed to unwrapping, are addressed to the logical channel
/// of `card`.
///
/// # Errors
///
/// * [`Error::NoTransport`] when the context has no transport bound. The
///   session is not touched.
/// * [`Error::Wrap`] when protecting the command fails. Nothing is sent.
/// * [`Error::Transport`] when the transport fails. The response is not
///   unwrapped.
/// * [`Error::Unwrap`] when the response fails verification or parsing.
#[instrument(
    level = "trace",
    skip_all,
    fields(channel = card.logical_channel().number())
)]
pub fn send_apdu<S: SecureMessaging + ?Sized>(
    context: &mut CardContext,
    card: &CardInfo,
    security: &mut S,
    command: &[u8],
    trace: &mut ApduTrace,
) -> Result<ExchangeOutcome> {
    trace.record(Checkpoint::Command, command);

    let config = context.config();
    let transport = context.binding_mut().resolve()?;

    let wrapped = security
        .wrap(command, config.max_command_len())
        .map_err(Error::Wrap)?;
    check_command_capacity(wrapped.len(), config.max_command_len()).map_err(Error::Wrap)?;

    let channel = card.logical_channel();
    let mut transmitted = BytesMut::from(wrapped.as_ref());
    channel.apply(&mut transmitted);
    let mut plaintext = BytesMut::from(command);
    channel.apply(&mut plaintext);

    trace.record(Checkpoint::WrappedCommand, &transmitted);

    let received = transport.transmit_raw(card, &transmitted).map_err(|e| {
        debug!(error = %e, "Exchange failed in transport");
        Error::from(e)
    })?;
    let transport_status = received.status();
    trace.record(Checkpoint::Response, received.data());

    let unwrapped = security
        .unwrap(&plaintext, received.data(), config.max_response_len())
        .map_err(Error::Unwrap)?;
    check_response_capacity(unwrapped.len(), config.max_response_len()).map_err(Error::Unwrap)?;
    let response = Response::from_bytes(&unwrapped)
        .map_err(|e| Error::Unwrap(SecureMessagingError::from(e)))?;

    trace.record(Checkpoint::UnwrappedResponse, &unwrapped);
    trace!(
        transport_status = %transport_status,
        status_word = %response.status(),
        "Exchange complete"
    );

    Ok(ExchangeOutcome::new(transport_status, response))
}
