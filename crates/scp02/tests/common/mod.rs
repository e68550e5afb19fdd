//! Common test utilities
#![allow(dead_code)]

use std::io::{self, Write};
use std::sync::{Arc, Mutex};

use apdu_sm_core::TransportError;
use apdu_sm_core::channel::strip_channel;
use apdu_sm_core::prelude::*;
use apdu_sm_scp02::crypto::{Scp02, decrypt_data, encrypt_icv, mac_full_3des};
use apdu_sm_scp02::secure_messaging::{MAC_LEN, SM_CLA_BIT};
use apdu_sm_scp02::{Scp02Level, Scp02Session, SessionKeys};
use cipher::Iv;
use hex_literal::hex;

pub const ENC_KEY: [u8; 16] = hex!("16b5867ff50be7239c2bf1245b83a362");
pub const MAC_KEY: [u8; 16] = hex!("2983ba77d709c2daa1e6000abccac951");
pub const RMAC_KEY: [u8; 16] = hex!("5b02e75ad63190aece0622936f11abab");

/// GET DATA answer of the simulated applet
pub const CARD_DATA: [u8; 6] = hex!("9F7F01020304");

pub fn keys() -> SessionKeys {
    SessionKeys::new_with_rmac(ENC_KEY, MAC_KEY, RMAC_KEY)
}

pub fn session(level: Scp02Level) -> Scp02Session {
    Scp02Session::new(keys(), level).unwrap()
}

/// Plaintext answer of the simulated applet to an instruction
pub fn applet_response(ins: u8, data: &[u8]) -> (Vec<u8>, [u8; 2]) {
    match ins {
        // GET DATA
        0xCA => (CARD_DATA.to_vec(), [0x90, 0x00]),
        // Echo
        0xEE => (data.to_vec(), [0x90, 0x00]),
        // SELECT
        0xA4 => (Vec::new(), [0x90, 0x00]),
        _ => (Vec::new(), [0x6D, 0x00]),
    }
}

/// What the simulated card has seen
#[derive(Debug, Default)]
pub struct CardLog {
    /// Commands after removing secure messaging, channel bits kept
    pub plain_commands: Vec<Vec<u8>>,
    /// Commands rejected for a bad C-MAC or format
    pub rejected: usize,
}

/// Card side of an SCP02 secure channel
#[derive(Debug)]
pub struct SimulatedCard {
    keys: SessionKeys,
    level: Scp02Level,
    icv_encryption: bool,
    cmac_icv: Iv<Scp02>,
    rmac_icv: Iv<Scp02>,
    tamper_rmac: bool,
    log: Arc<Mutex<CardLog>>,
}

impl SimulatedCard {
    pub fn new(level: Scp02Level) -> (Self, Arc<Mutex<CardLog>>) {
        let log = Arc::new(Mutex::new(CardLog::default()));
        (
            Self {
                keys: keys(),
                level,
                icv_encryption: true,
                cmac_icv: Iv::<Scp02>::default(),
                rmac_icv: Iv::<Scp02>::default(),
                tamper_rmac: false,
                log: Arc::clone(&log),
            },
            log,
        )
    }

    pub fn without_icv_encryption(mut self) -> Self {
        self.icv_encryption = false;
        self
    }

    /// Corrupt every R-MAC sent
    pub fn tampering(mut self) -> Self {
        self.tamper_rmac = true;
        self
    }

    fn reject(&self) -> TransportResponse {
        self.log.lock().unwrap().rejected += 1;
        TransportResponse::from_card(vec![0x69, 0x82])
    }

    /// Verify the C-MAC and remove secure messaging
    fn unprotect(&mut self, command: &[u8]) -> Option<(Vec<u8>, Vec<u8>)> {
        let [cla, ins, p1, p2, lc, rest @ ..] = command else {
            return None;
        };
        let lc = usize::from(*lc);
        if cla & SM_CLA_BIT == 0 || lc < MAC_LEN || rest.len() < lc {
            return None;
        }
        let (payload, mac) = rest[..lc].split_at(lc - MAC_LEN);

        let plain = if self.level.has_encryption() && !payload.is_empty() {
            decrypt_data(&self.keys.enc(), payload).ok()?
        } else {
            payload.to_vec()
        };

        let mut mac_input = vec![strip_channel(*cla), *ins, *p1, *p2];
        mac_input.push(u8::try_from(plain.len() + MAC_LEN).ok()?);
        mac_input.extend_from_slice(&plain);

        let icv = if self.cmac_icv == Iv::<Scp02>::default() || !self.icv_encryption {
            self.cmac_icv
        } else {
            encrypt_icv(&self.keys.mac(), &self.cmac_icv)
        };
        let expected = mac_full_3des(&self.keys.mac(), &icv, &mac_input);
        if expected.as_slice() != mac {
            return None;
        }
        self.cmac_icv = expected.into();

        let mut header = vec![cla & !SM_CLA_BIT, *ins, *p1, *p2];
        let mut plain_command = header.clone();
        if !plain.is_empty() {
            plain_command.push(plain.len() as u8);
            plain_command.extend_from_slice(&plain);
        }
        plain_command.extend_from_slice(&rest[lc..]);

        header[0] = strip_channel(header[0]);
        header.push(plain.len() as u8);
        header.extend_from_slice(&plain);
        Some((plain_command, header))
    }
}

impl CardTransport for SimulatedCard {
    fn do_transmit_raw(
        &mut self,
        _card: &CardInfo,
        command: &[u8],
    ) -> Result<TransportResponse, TransportError> {
        let Some((plain_command, rmac_prefix)) = self.unprotect(command) else {
            return Ok(self.reject());
        };
        let Ok(parsed) = Command::from_bytes(&plain_command) else {
            return Ok(self.reject());
        };
        self.log.lock().unwrap().plain_commands.push(plain_command);

        let (data, sw) = applet_response(parsed.instruction(), parsed.data().unwrap_or_default());

        let mut response = data.clone();
        let status_only_error = data.is_empty() && sw != [0x90, 0x00];
        if self.level.has_rmac() && !status_only_error {
            let mut mac_input = rmac_prefix;
            mac_input.push(data.len() as u8);
            mac_input.extend_from_slice(&data);
            mac_input.extend_from_slice(&sw);

            let key = self.keys.rmac().ok_or(TransportError::Transmission)?;
            let mut rmac = mac_full_3des(&key, &self.rmac_icv, &mac_input);
            self.rmac_icv = rmac.into();
            if self.tamper_rmac {
                rmac[0] ^= 0xFF;
            }
            response.extend_from_slice(&rmac);
        }
        response.extend_from_slice(&sw);

        Ok(TransportResponse::from_card(response))
    }
}

/// Card answering in plaintext, for comparison with secured exchanges
#[derive(Debug, Default)]
pub struct PlainCard;

impl CardTransport for PlainCard {
    fn do_transmit_raw(
        &mut self,
        _card: &CardInfo,
        command: &[u8],
    ) -> Result<TransportResponse, TransportError> {
        let parsed =
            Command::from_bytes(command).map_err(|e| TransportError::other(e.to_string()))?;
        let (mut response, sw) =
            applet_response(parsed.instruction(), parsed.data().unwrap_or_default());
        response.extend_from_slice(&sw);
        Ok(TransportResponse::from_card(response))
    }
}

/// Trace sink whose contents remain readable after it is handed over
#[derive(Debug, Clone, Default)]
pub struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

impl SharedBuffer {
    pub fn lines(&self) -> Vec<String> {
        String::from_utf8(self.0.lock().unwrap().clone())
            .unwrap()
            .lines()
            .map(str::to_owned)
            .collect()
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
