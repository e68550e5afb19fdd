use bytes::Bytes;

use super::{
    SecureMessaging, SecureMessagingError, SecurityLevel, check_command_capacity,
    check_response_capacity,
};
use crate::command::CommandError;
use crate::response::error::ResponseError;

/// Secure messaging that applies no protection
///
/// Used for exchanges before a secure channel is opened. Commands and
/// responses pass through byte for byte.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Plain;

impl SecureMessaging for Plain {
    fn wrap(&mut self, command: &[u8], capacity: usize) -> Result<Bytes, SecureMessagingError> {
        if command.len() < 4 {
            return Err(CommandError::InvalidLength(command.len()).into());
        }
        check_command_capacity(command.len(), capacity)?;
        Ok(Bytes::copy_from_slice(command))
    }

    fn unwrap(
        &mut self,
        _command: &[u8],
        response: &[u8],
        capacity: usize,
    ) -> Result<Bytes, SecureMessagingError> {
        if response.len() < 2 {
            return Err(ResponseError::Incomplete(response.len()).into());
        }
        check_response_capacity(response.len(), capacity)?;
        Ok(Bytes::copy_from_slice(response))
    }

    fn security_level(&self) -> SecurityLevel {
        SecurityLevel::none()
    }
}
