//! Utility functions for APDU response handling

use tracing::debug;

use crate::response::error::ResponseError;
use crate::response::status::StatusWord;

/// Split raw response bytes into payload and status word
///
/// # Errors
/// Returns an error if the data is too short to contain a status word.
pub fn split_status_word(data: &[u8]) -> Result<(&[u8], StatusWord), ResponseError> {
    let Some(split) = data.len().checked_sub(2) else {
        debug!("Response too short: {} bytes", data.len());
        return Err(ResponseError::Incomplete(data.len()));
    };

    let (payload, sw) = data.split_at(split);
    Ok((payload, StatusWord::new(sw[0], sw[1])))
}
