//! Password-based key derivation using scrypt
//!
//! Work factors are fixed so that every store ever written can be reopened:
//! N = 2^14, r = 8, p = 1 (about 16 MiB and ~100ms per derivation).

use rand::{rngs::OsRng, RngCore};
use scrypt::Params;

use super::{DerivedKey, SecretString, KEY_LENGTH};
use crate::error::{Result, SoubiError};

/// log2 of the scrypt CPU/memory cost `N`
const SCRYPT_LOG_N: u8 = 14;
/// scrypt block size `r`
const SCRYPT_R: u32 = 8;
/// scrypt parallelism `p`
const SCRYPT_P: u32 = 1;

/// Length of a freshly generated salt in bytes
pub const SALT_LENGTH: usize = 32;

/// Random salt mixed into key derivation.
///
/// Salts read back from disk are kept verbatim, whatever their length.
#[derive(Clone, PartialEq, Eq)]
pub struct Salt(Vec<u8>);

impl Salt {
    /// Wrap salt bytes read from storage
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl std::fmt::Debug for Salt {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Salt").field("len", &self.0.len()).finish()
    }
}

/// Generate a cryptographically secure random salt
pub fn generate_salt() -> Salt {
    let mut bytes = vec![0u8; SALT_LENGTH];
    OsRng.fill_bytes(&mut bytes);
    Salt(bytes)
}

/// Derive a 256-bit key from a password using scrypt
///
/// # Arguments
/// * `password` - The user's password
/// * `salt` - The store's salt
///
/// # Returns
/// A 32-byte key suitable for AES-256-GCM
pub fn derive_key(password: &str, salt: &Salt) -> Result<DerivedKey> {
    let params = Params::new(SCRYPT_LOG_N, SCRYPT_R, SCRYPT_P, KEY_LENGTH)
        .map_err(|e| SoubiError::KeyDerivationError(e.to_string()))?;

    let mut key_bytes = [0u8; KEY_LENGTH];
    scrypt::scrypt(password.as_bytes(), salt.as_bytes(), &params, &mut key_bytes)
        .map_err(|e| SoubiError::KeyDerivationError(e.to_string()))?;

    Ok(DerivedKey::new(key_bytes))
}

/// Run [`derive_key`] on the blocking pool.
///
/// The password is moved in and dropped (zeroized) once derivation finishes.
pub async fn derive_key_blocking(password: SecretString, salt: Salt) -> Result<DerivedKey> {
    tokio::task::spawn_blocking(move || derive_key(password.expose(), &salt))
        .await
        .map_err(|e| SoubiError::KeyDerivationError(format!("KDF task failed: {}", e)))?
}
