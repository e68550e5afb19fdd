//! SCP02 command wrapping and response unwrapping

use apdu_sm_core::channel::strip_channel;
use apdu_sm_core::command::MAX_SHORT_DATA;
use apdu_sm_core::response::utils::split_status_word;
use apdu_sm_core::secure_messaging::{check_command_capacity, check_response_capacity};
use apdu_sm_core::{Command, SecureMessaging, SecureMessagingError, SecurityLevel};
use bytes::{BufMut, Bytes, BytesMut};
use cipher::Iv;
use subtle::ConstantTimeEq;
use tracing::{debug, trace};

use crate::crypto::{Scp02, Scp02Mac, encrypt_data, encrypt_icv, mac_full_3des};
use crate::session::Scp02Session;

/// Class byte bit announcing secure messaging
pub const SM_CLA_BIT: u8 = 0x04;
/// Length of C-MAC and R-MAC values
pub const MAC_LEN: usize = 8;
/// Largest response data an R-MAC can cover
pub const MAX_RMAC_DATA: usize = 256;

impl Scp02Session {
    /// ICV for the next C-MAC
    fn next_cmac_icv(&self) -> Iv<Scp02> {
        if self.cmac_icv == Iv::<Scp02>::default() || !self.options.icv_encryption() {
            self.cmac_icv
        } else {
            encrypt_icv(&self.keys.mac(), &self.cmac_icv)
        }
    }

    /// Compute the R-MAC of an exchange from the plaintext command and response
    fn compute_rmac(
        &self,
        command: &Command,
        data: &[u8],
        sw: [u8; 2],
    ) -> Result<Scp02Mac, SecureMessagingError> {
        let key = self
            .keys
            .rmac()
            .ok_or(SecureMessagingError::Crypto("no R-MAC session key"))?;
        let plain = command.data().unwrap_or_default();

        let mut mac_input = BytesMut::with_capacity(8 + plain.len() + data.len());
        mac_input.put_u8(strip_channel(command.class()) & !SM_CLA_BIT);
        mac_input.put_slice(&command.header()[1..]);
        mac_input.put_u8(short_length(plain.len())?);
        mac_input.put_slice(plain);
        // A full 256 byte response is announced as 00
        if data.len() > MAX_RMAC_DATA {
            return Err(SecureMessagingError::ResponseTooLong {
                length: data.len(),
                capacity: MAX_RMAC_DATA,
            });
        }
        mac_input.put_u8(data.len() as u8);
        mac_input.put_slice(data);
        mac_input.put_slice(&sw);

        Ok(mac_full_3des(&key, &self.rmac_icv, &mac_input))
    }
}

fn short_length(length: usize) -> Result<u8, SecureMessagingError> {
    u8::try_from(length).map_err(|_| SecureMessagingError::CommandTooLong {
        length,
        capacity: MAX_SHORT_DATA,
    })
}

impl SecureMessaging for Scp02Session {
    fn wrap(&mut self, command: &[u8], capacity: usize) -> Result<Bytes, SecureMessagingError> {
        if !self.open {
            return Err(SecureMessagingError::SessionClosed);
        }

        let command = Command::from_bytes(command)?;
        let plain = command.data().unwrap_or_default();

        let body = if self.level.has_encryption() && !plain.is_empty() {
            encrypt_data(&self.keys.enc(), plain)
        } else {
            plain.to_vec()
        };

        let lc = short_length(body.len() + MAC_LEN)?;
        let wrapped_len = 5 + usize::from(lc) + usize::from(command.expected_length().is_some());
        check_command_capacity(wrapped_len, capacity)?;

        let cla = strip_channel(command.class()) | SM_CLA_BIT;
        let header = [cla, command.instruction(), command.p1(), command.p2()];

        // The MAC covers the plaintext data with Lc announcing the MAC
        let mut mac_input = BytesMut::with_capacity(5 + plain.len());
        mac_input.put_slice(&header);
        mac_input.put_u8(short_length(plain.len() + MAC_LEN)?);
        mac_input.put_slice(plain);

        let mac = mac_full_3des(&self.keys.mac(), &self.next_cmac_icv(), &mac_input);

        let mut wrapped = BytesMut::with_capacity(wrapped_len);
        wrapped.put_slice(&header);
        wrapped.put_u8(lc);
        wrapped.put_slice(&body);
        wrapped.put_slice(&mac);
        if let Some(le) = command.expected_length() {
            wrapped.put_u8(le);
        }

        self.cmac_icv = mac.into();
        trace!(
            mac = %hex::encode_upper(mac),
            encrypted = self.level.has_encryption(),
            "Command wrapped with SCP02"
        );

        Ok(wrapped.freeze())
    }

    fn unwrap(
        &mut self,
        command: &[u8],
        response: &[u8],
        capacity: usize,
    ) -> Result<Bytes, SecureMessagingError> {
        if !self.open {
            return Err(SecureMessagingError::SessionClosed);
        }

        let (body, sw) = split_status_word(response)?;

        if !self.level.has_rmac() || (body.is_empty() && !sw.is_success()) {
            check_response_capacity(response.len(), capacity)?;
            return Ok(Bytes::copy_from_slice(response));
        }

        let Some(split) = body.len().checked_sub(MAC_LEN) else {
            debug!(length = response.len(), "Response too short to carry an R-MAC");
            return Err(SecureMessagingError::IntegrityCheckFailed("R-MAC missing"));
        };
        let (data, rmac) = body.split_at(split);

        let command = Command::from_bytes(command)?;
        let expected = self.compute_rmac(&command, data, [sw.sw1, sw.sw2])?;
        if !bool::from(expected.as_slice().ct_eq(rmac)) {
            debug!(
                received = %hex::encode_upper(rmac),
                "R-MAC verification failed"
            );
            return Err(SecureMessagingError::IntegrityCheckFailed("R-MAC mismatch"));
        }

        let mut unwrapped = BytesMut::with_capacity(data.len() + 2);
        unwrapped.put_slice(data);
        unwrapped.put_u8(sw.sw1);
        unwrapped.put_u8(sw.sw2);
        check_response_capacity(unwrapped.len(), capacity)?;

        self.rmac_icv = expected.into();
        trace!(rmac = %hex::encode_upper(expected), "Response R-MAC verified");

        Ok(unwrapped.freeze())
    }

    fn security_level(&self) -> SecurityLevel {
        if self.open {
            self.level.security_level()
        } else {
            SecurityLevel::none()
        }
    }
}
