//! AES-256-GCM authenticated encryption
//!
//! Envelope format: `nonce(16) ‖ tag(16) ‖ ciphertext(variable)`
//! - Nonce: 16 bytes (128 bits), fresh from the OS RNG per call
//! - Auth tag: 16 bytes (128 bits)
//! - Ciphertext: same length as the plaintext
//!
//! GCM is run with a 128-bit nonce rather than the usual 96 bits so that
//! envelopes stay byte-compatible with stores written by earlier releases.

use aes_gcm::{
    aead::{consts::U16, generic_array::GenericArray, AeadInPlace, KeyInit},
    aes::Aes256,
    AesGcm,
};
use rand::{rngs::OsRng, RngCore};
use zeroize::Zeroizing;

use super::DerivedKey;
use crate::error::{Result, SoubiError};

/// Nonce length in bytes
pub const NONCE_LENGTH: usize = 16;
/// Authentication tag length in bytes
pub const TAG_LENGTH: usize = 16;
/// Bytes an envelope adds on top of the plaintext
pub const ENVELOPE_OVERHEAD: usize = NONCE_LENGTH + TAG_LENGTH;

/// AES-256-GCM with a 16-byte nonce
type Aes256Gcm128 = AesGcm<Aes256, U16>;

/// Encrypted data with nonce and auth tag
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncryptedData {
    /// Per-encryption nonce
    pub iv: [u8; NONCE_LENGTH],
    /// Authentication tag
    pub auth_tag: [u8; TAG_LENGTH],
    /// Encrypted ciphertext
    pub ciphertext: Vec<u8>,
}

impl EncryptedData {
    /// Pack into `nonce ‖ tag ‖ ciphertext`
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(ENVELOPE_OVERHEAD + self.ciphertext.len());
        out.extend_from_slice(&self.iv);
        out.extend_from_slice(&self.auth_tag);
        out.extend_from_slice(&self.ciphertext);
        out
    }

    /// Split a packed envelope by fixed offsets.
    ///
    /// Returns `None` when the input is too short to hold a nonce and a tag;
    /// callers treat that as "no data".
    pub fn from_bytes(packed: &[u8]) -> Option<Self> {
        if packed.len() < ENVELOPE_OVERHEAD {
            return None;
        }

        let mut iv = [0u8; NONCE_LENGTH];
        iv.copy_from_slice(&packed[..NONCE_LENGTH]);

        let mut auth_tag = [0u8; TAG_LENGTH];
        auth_tag.copy_from_slice(&packed[NONCE_LENGTH..ENVELOPE_OVERHEAD]);

        Some(Self {
            iv,
            auth_tag,
            ciphertext: packed[ENVELOPE_OVERHEAD..].to_vec(),
        })
    }
}

fn cipher_for(key: &DerivedKey) -> Result<Aes256Gcm128> {
    Aes256Gcm128::new_from_slice(key.as_bytes())
        .map_err(|e| SoubiError::EncryptionError(e.to_string()))
}

/// Encrypt plaintext using AES-256-GCM
pub fn encrypt(plaintext: &[u8], key: &DerivedKey) -> Result<EncryptedData> {
    encrypt_with_aad(plaintext, &[], key)
}

/// Encrypt plaintext, binding `aad` into the tag without encrypting it
pub fn encrypt_with_aad(plaintext: &[u8], aad: &[u8], key: &DerivedKey) -> Result<EncryptedData> {
    let cipher = cipher_for(key)?;

    let mut iv = [0u8; NONCE_LENGTH];
    OsRng.fill_bytes(&mut iv);

    let mut ciphertext = plaintext.to_vec();
    let tag = cipher
        .encrypt_in_place_detached(GenericArray::from_slice(&iv), aad, &mut ciphertext)
        .map_err(|e| SoubiError::EncryptionError(e.to_string()))?;

    let mut auth_tag = [0u8; TAG_LENGTH];
    auth_tag.copy_from_slice(tag.as_slice());

    Ok(EncryptedData {
        iv,
        auth_tag,
        ciphertext,
    })
}

/// Decrypt ciphertext using AES-256-GCM
///
/// Any authentication failure, whether from a wrong key or from tampering,
/// is reported as [`SoubiError::DecryptionFailed`]; no plaintext is returned.
pub fn decrypt(encrypted: &EncryptedData, key: &DerivedKey) -> Result<Zeroizing<Vec<u8>>> {
    decrypt_with_aad(encrypted, &[], key)
}

/// Decrypt ciphertext that was sealed with `aad`
pub fn decrypt_with_aad(
    encrypted: &EncryptedData,
    aad: &[u8],
    key: &DerivedKey,
) -> Result<Zeroizing<Vec<u8>>> {
    let cipher = cipher_for(key)?;

    let mut plaintext = Zeroizing::new(encrypted.ciphertext.clone());
    cipher
        .decrypt_in_place_detached(
            GenericArray::from_slice(&encrypted.iv),
            aad,
            &mut plaintext[..],
            GenericArray::from_slice(&encrypted.auth_tag),
        )
        .map_err(|_| SoubiError::DecryptionFailed)?;

    Ok(plaintext)
}
