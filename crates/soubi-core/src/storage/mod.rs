//! Storage backends for the inventory document
//!
//! This module provides:
//! 1. The password-encrypted file store (salt sidecar, framed AEAD blob)
//! 2. An in-memory backend for tests

mod encrypted_file;
mod format;
mod fs;
mod memory;
pub mod salt;
mod traits;

pub use encrypted_file::{EncryptedStore, PasswordChange, StorePaths, StoreState};
pub use format::{FORMAT_VERSION, HEADER_LENGTH, MAGIC};
pub use memory::MemoryAdapter;
pub use traits::{Document, DocumentAdapter};

pub(crate) use fs::write_atomic;
