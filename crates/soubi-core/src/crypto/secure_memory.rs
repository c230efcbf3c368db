//! Secure memory handling with automatic zeroization

use subtle::ConstantTimeEq;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Length of a derived key in bytes (AES-256)
pub const KEY_LENGTH: usize = 32;

/// Store encryption key - automatically zeroed when dropped.
///
/// Deliberately not `Clone`: the store owns the only copy for as long as it
/// is keyed, and rotation replaces it in place.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct DerivedKey {
    key: [u8; KEY_LENGTH],
}

impl DerivedKey {
    /// Create a new key from raw bytes
    pub(crate) fn new(key: [u8; KEY_LENGTH]) -> Self {
        Self { key }
    }

    /// Get the key bytes (use carefully - avoid copying)
    pub(crate) fn as_bytes(&self) -> &[u8; KEY_LENGTH] {
        &self.key
    }

    /// Compare two keys without leaking the position of the first mismatch
    pub fn ct_eq(&self, other: &DerivedKey) -> bool {
        self.key[..].ct_eq(&other.key[..]).into()
    }
}

impl std::fmt::Debug for DerivedKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DerivedKey")
            .field("key", &"[REDACTED]")
            .finish()
    }
}

/// Password or other secret text - automatically zeroed when dropped
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct SecretString {
    value: String,
}

impl SecretString {
    /// Create a new secret string
    pub fn new(value: String) -> Self {
        Self { value }
    }

    /// Get the secret value (use carefully)
    pub fn expose(&self) -> &str {
        &self.value
    }
}

impl From<String> for SecretString {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

impl From<&str> for SecretString {
    fn from(value: &str) -> Self {
        Self::new(value.to_string())
    }
}

impl std::fmt::Debug for SecretString {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SecretString")
            .field("value", &"[REDACTED]")
            .finish()
    }
}
