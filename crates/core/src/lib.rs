//! Secure APDU exchange over pluggable card transports
//!
//! This crate sends ISO/IEC 7816-4 commands to a smart card through a secure
//! messaging session and a transport chosen at runtime.
//!
//! ## Overview
//!
//! An exchange combines three collaborators:
//!
//! - a [`CardContext`] holding the [`TransportBinding`] and exchange limits
//! - a [`CardInfo`] describing the card and its logical channel
//! - a [`SecureMessaging`] session that wraps commands and unwraps responses
//!
//! [`send_apdu`] runs the sequence and returns an [`ExchangeOutcome`] that
//! keeps the transport's status apart from the card's status word. Failures
//! are reported as a single [`Error`] whose [`ErrorKind`] names the stage that
//! failed. An optional [`ApduTrace`] writes the bytes of every stage as hex.
#![cfg_attr(not(test), warn(unused_crate_dependencies))]
#![forbid(unsafe_code)]
#![warn(missing_docs, rustdoc::missing_crate_level_docs)]

// Re-export bytes for convenience
pub use bytes::{Bytes, BytesMut};

pub mod channel;
pub mod command;
pub mod config;
pub mod context;
pub mod error;
pub mod exchange;
pub mod response;
pub mod secure_messaging;
pub mod trace;
pub mod transport;

pub use channel::LogicalChannel;
pub use command::Command;
pub use config::ExchangeConfig;
pub use context::{CardContext, CardInfo};
pub use error::{Error, ErrorKind, ErrorStatus, Result, ResultExt};
pub use exchange::{ExchangeOutcome, send_apdu};
pub use response::Response;
pub use response::status::StatusWord;
pub use secure_messaging::{Plain, SecureMessaging, SecureMessagingError, SecurityLevel};
pub use trace::{ApduTrace, Checkpoint, TraceScope};
pub use transport::{
    CardTransport, TransportBinding, TransportError, TransportResponse, TransportStatus,
};

/// Prelude module containing commonly used traits and types
pub mod prelude {
    pub use crate::{
        ApduTrace, Bytes, BytesMut, CardContext, CardInfo, CardTransport, Command, Error,
        ErrorStatus, ExchangeOutcome, LogicalChannel, Plain, Response, Result, SecureMessaging,
        SecureMessagingError, SecurityLevel, StatusWord, TransportBinding, TransportResponse,
        TransportStatus, send_apdu,
    };
}
