//! Cryptographic primitives for the encrypted store
//!
//! This module provides:
//! - AES-256-GCM authenticated encryption with a 16-byte nonce
//! - scrypt key derivation from passwords
//! - Secure memory handling with zeroize

mod encryption;
mod key_derivation;
mod secure_memory;

pub use encryption::{
    decrypt, decrypt_with_aad, encrypt, encrypt_with_aad, EncryptedData, ENVELOPE_OVERHEAD,
    NONCE_LENGTH, TAG_LENGTH,
};
pub use key_derivation::{derive_key, derive_key_blocking, generate_salt, Salt, SALT_LENGTH};
pub use secure_memory::{DerivedKey, SecretString, KEY_LENGTH};
