//! Common test utilities
#![allow(dead_code)]

use std::io::{self, Write};
use std::sync::{Arc, Mutex};

use apdu_sm_core::TransportError;
use apdu_sm_core::prelude::*;
use apdu_sm_core::secure_messaging::{check_command_capacity, check_response_capacity};

/// What a [`RecordingTransport`] has seen
#[derive(Debug, Default)]
pub struct TransportLog {
    /// Every command transmitted, in order
    pub sent: Vec<Vec<u8>>,
}

/// Transport double answering every command with a fixed reply
#[derive(Debug)]
pub struct RecordingTransport {
    log: Arc<Mutex<TransportLog>>,
    reply: Result<TransportResponse, TransportError>,
}

impl RecordingTransport {
    /// Transport answering with `response`, its status taken from the status word
    pub fn replying(response: &[u8]) -> (Self, Arc<Mutex<TransportLog>>) {
        Self::with_reply(Ok(TransportResponse::from_card(response.to_vec())))
    }

    /// Transport answering with `response` and an explicit transport status
    pub fn replying_with_status(
        response: &[u8],
        status: TransportStatus,
    ) -> (Self, Arc<Mutex<TransportLog>>) {
        Self::with_reply(Ok(TransportResponse::new(response.to_vec(), status)))
    }

    /// Transport failing every transmission with `error`
    pub fn failing(error: TransportError) -> (Self, Arc<Mutex<TransportLog>>) {
        Self::with_reply(Err(error))
    }

    fn with_reply(
        reply: Result<TransportResponse, TransportError>,
    ) -> (Self, Arc<Mutex<TransportLog>>) {
        let log = Arc::new(Mutex::new(TransportLog::default()));
        (
            Self {
                log: Arc::clone(&log),
                reply,
            },
            log,
        )
    }
}

impl CardTransport for RecordingTransport {
    fn do_transmit_raw(
        &mut self,
        _card: &CardInfo,
        command: &[u8],
    ) -> Result<TransportResponse, TransportError> {
        self.log.lock().unwrap().sent.push(command.to_vec());
        self.reply.clone()
    }
}

/// Marker byte [`CountingEngine`] appends to commands and expects before the status word
pub const MARKER: u8 = 0x5A;

/// What a [`CountingEngine`] has seen
#[derive(Debug, Default)]
pub struct EngineLog {
    /// Number of successful wraps
    pub wraps: usize,
    /// Commands handed to unwrap
    pub unwrap_commands: Vec<Vec<u8>>,
}

/// Toy secure messaging engine
///
/// Wrapping appends [`MARKER`]. Unwrapping requires [`MARKER`] right before the
/// status word and removes it.
#[derive(Debug)]
pub struct CountingEngine {
    log: Arc<Mutex<EngineLog>>,
}

impl CountingEngine {
    pub fn new() -> (Self, Arc<Mutex<EngineLog>>) {
        let log = Arc::new(Mutex::new(EngineLog::default()));
        (
            Self {
                log: Arc::clone(&log),
            },
            log,
        )
    }
}

impl SecureMessaging for CountingEngine {
    fn wrap(&mut self, command: &[u8], capacity: usize) -> Result<Bytes, SecureMessagingError> {
        let mut wrapped = command.to_vec();
        wrapped.push(MARKER);
        check_command_capacity(wrapped.len(), capacity)?;
        self.log.lock().unwrap().wraps += 1;
        Ok(wrapped.into())
    }

    fn unwrap(
        &mut self,
        command: &[u8],
        response: &[u8],
        capacity: usize,
    ) -> Result<Bytes, SecureMessagingError> {
        self.log.lock().unwrap().unwrap_commands.push(command.to_vec());
        let [data @ .., marker, sw1, sw2] = response else {
            return Err(SecureMessagingError::IntegrityCheckFailed("marker missing"));
        };
        if *marker != MARKER {
            return Err(SecureMessagingError::IntegrityCheckFailed("marker mismatch"));
        }
        let mut plain = data.to_vec();
        plain.extend_from_slice(&[*sw1, *sw2]);
        check_response_capacity(plain.len(), capacity)?;
        Ok(plain.into())
    }

    fn security_level(&self) -> SecurityLevel {
        SecurityLevel::mac()
    }
}

/// Engine whose wrap always fails
#[derive(Debug, Default)]
pub struct FailingWrap {
    pub unwraps: usize,
}

impl SecureMessaging for FailingWrap {
    fn wrap(&mut self, _command: &[u8], _capacity: usize) -> Result<Bytes, SecureMessagingError> {
        Err(SecureMessagingError::SessionClosed)
    }

    fn unwrap(
        &mut self,
        _command: &[u8],
        response: &[u8],
        _capacity: usize,
    ) -> Result<Bytes, SecureMessagingError> {
        self.unwraps += 1;
        Ok(Bytes::copy_from_slice(response))
    }

    fn security_level(&self) -> SecurityLevel {
        SecurityLevel::mac()
    }
}

/// Engine passing commands through and rejecting every response
#[derive(Debug, Default)]
pub struct FailingUnwrap;

impl SecureMessaging for FailingUnwrap {
    fn wrap(&mut self, command: &[u8], _capacity: usize) -> Result<Bytes, SecureMessagingError> {
        Ok(Bytes::copy_from_slice(command))
    }

    fn unwrap(
        &mut self,
        _command: &[u8],
        _response: &[u8],
        _capacity: usize,
    ) -> Result<Bytes, SecureMessagingError> {
        Err(SecureMessagingError::IntegrityCheckFailed("R-MAC"))
    }

    fn security_level(&self) -> SecurityLevel {
        SecurityLevel::mac_rmac()
    }
}

/// Engine passing both directions through without honouring any capacity
#[derive(Debug, Default)]
pub struct Unbounded;

impl SecureMessaging for Unbounded {
    fn wrap(&mut self, command: &[u8], _capacity: usize) -> Result<Bytes, SecureMessagingError> {
        Ok(Bytes::copy_from_slice(command))
    }

    fn unwrap(
        &mut self,
        _command: &[u8],
        response: &[u8],
        _capacity: usize,
    ) -> Result<Bytes, SecureMessagingError> {
        Ok(Bytes::copy_from_slice(response))
    }

    fn security_level(&self) -> SecurityLevel {
        SecurityLevel::none()
    }
}

/// Trace sink whose contents remain readable after it is handed over
#[derive(Debug, Clone, Default)]
pub struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

impl SharedBuffer {
    pub fn contents(&self) -> String {
        String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
    }

    pub fn lines(&self) -> Vec<String> {
        self.contents().lines().map(str::to_owned).collect()
    }
}

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Install a test subscriber honouring `RUST_LOG`
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
