//! Cryptographic operations for GlobalPlatform SCP02 secure messaging
//!
//! This module provides the primitives the SCP02 session needs once session
//! keys are established: the "full 3DES" retail MAC used for C-MAC and R-MAC,
//! ICV encryption, and 3DES-CBC command data encryption.

use cbc_mac::{CbcMac, Mac};
use cipher::{
    BlockDecryptMut, BlockEncrypt, BlockEncryptMut, Iv, IvSizeUser, Key, KeyInit, KeyIvInit,
    KeySizeUser,
    block_padding::{Iso7816, RawPadding},
    consts::{U8, U16},
    generic_array::GenericArray,
};
use des::{Des, TdesEde3};

use apdu_sm_core::SecureMessagingError;

/// SCP02 MAC value
pub type Scp02Mac = [u8; 8];

/// Block size shared by DES and 3DES
pub const BLOCK_SIZE: usize = 8;

/// Placeholder struct for defining SCP02 cryptographic parameters
#[allow(missing_debug_implementations)]
pub struct Scp02;

impl KeySizeUser for Scp02 {
    type KeySize = U16;
}

impl IvSizeUser for Scp02 {
    type IvSize = U8;
}

/// Pad `data` to a multiple of the block size (ISO/IEC 9797-1 method 2)
///
/// A full padding block is added when `data` is already aligned.
pub fn pad(data: &[u8]) -> Vec<u8> {
    let pos = data.len() % BLOCK_SIZE;
    let padded_len = data.len() - pos + BLOCK_SIZE;

    let mut padded = Vec::with_capacity(padded_len);
    padded.extend_from_slice(data);
    padded.resize(padded_len, 0);
    Iso7816::raw_pad(&mut padded[padded_len - BLOCK_SIZE..], pos);
    padded
}

/// Calculate a full 3DES MAC for SCP02
///
/// Single DES chains over every padded block but the last, which is
/// encrypted with 3DES.
///
/// # Arguments
///
/// * `key` - The key (16 bytes)
/// * `iv` - The initialization vector (8 bytes)
/// * `data` - The data to MAC, unpadded
pub fn mac_full_3des(key: &Key<Scp02>, iv: &Iv<Scp02>, data: &[u8]) -> Scp02Mac {
    let padded = pad(data);
    let (head, last) = padded.split_at(padded.len() - BLOCK_SIZE);

    let des_cipher = Des::new(GenericArray::from_slice(&key[..8]));
    let des3_cipher = TdesEde3::new(&resize_key(key));

    let mut chain = *iv;
    for chunk in head.chunks_exact(BLOCK_SIZE) {
        xor_into(&mut chain, chunk);
        des_cipher.encrypt_block(&mut chain);
    }

    xor_into(&mut chain, last);
    des3_cipher.encrypt_block(&mut chain);

    chain.into()
}

/// Encrypt an ICV (Initial Chaining Vector) for SCP02
///
/// The ICV is encrypted with single DES under the first half of the MAC key.
pub fn encrypt_icv(mac_key: &Key<Scp02>, icv: &Iv<Scp02>) -> Iv<Scp02> {
    let key = GenericArray::from_slice(&mac_key[..8]);
    let mut mac = <CbcMac<Des> as Mac>::new(key);
    mac.update(icv.as_ref());
    mac.finalize().into_bytes()
}

/// Encrypt command data with 3DES-CBC under a zero IV, padding it first
pub fn encrypt_data(enc_key: &Key<Scp02>, data: &[u8]) -> Vec<u8> {
    cbc::Encryptor::<TdesEde3>::new(&resize_key(enc_key), &Default::default())
        .encrypt_padded_vec_mut::<Iso7816>(data)
}

/// Decrypt command data encrypted by [`encrypt_data`] and remove the padding
pub fn decrypt_data(
    enc_key: &Key<Scp02>,
    data: &[u8],
) -> Result<Vec<u8>, SecureMessagingError> {
    cbc::Decryptor::<TdesEde3>::new(&resize_key(enc_key), &Default::default())
        .decrypt_padded_vec_mut::<Iso7816>(data)
        .map_err(|_| SecureMessagingError::Crypto("invalid padding in decrypted data"))
}

/// Resize the SCP02 16-byte key to 24 bytes for 3DES
///
/// This copies the first 8 bytes to the end of the key.
pub fn resize_key(key: &Key<Scp02>) -> Key<TdesEde3> {
    let mut result = Key::<TdesEde3>::default();
    result[..16].copy_from_slice(key);
    result[16..24].copy_from_slice(&key[..8]);
    result
}

fn xor_into(block: &mut Iv<Scp02>, data: &[u8]) {
    for (a, b) in block.iter_mut().zip(data) {
        *a ^= *b;
    }
}
