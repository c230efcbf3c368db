//! Error types for soubi-core

use thiserror::Error;

/// Result type alias for store and inventory operations
pub type Result<T> = std::result::Result<T, SoubiError>;

/// SOUBI error types
#[derive(Error, Debug)]
pub enum SoubiError {
    #[error("Store is not initialized - call init with a password first")]
    NotInitialized,

    #[error("Store is already initialized")]
    AlreadyInitialized,

    #[error("Wrong password - the current password does not match this store")]
    WrongPassword,

    #[error("Decryption failed - wrong password or corrupted file")]
    DecryptionFailed,

    #[error("Nothing to re-encrypt - the store holds no data")]
    NothingToReencrypt,

    #[error("Password rotation did not complete - reopen the store")]
    RotationIncomplete,

    #[error("Unsupported store format version: {0}")]
    UnsupportedFormat(u8),

    #[error("Encryption failed: {0}")]
    EncryptionError(String),

    #[error("Key derivation failed: {0}")]
    KeyDerivationError(String),

    #[error("Asset not found: {0}")]
    AssetNotFound(String),

    #[error("Loadout not found: {0}")]
    LoadoutNotFound(String),

    #[error("Loadout is active: {0}")]
    LoadoutActive(String),

    #[error("Loadout is not active: {0}")]
    LoadoutNotActive(String),

    #[error("Loadout is empty: {0}")]
    EmptyLoadout(String),

    #[error("Deployment conflict: {}", .0.join("; "))]
    DeploymentConflict(Vec<String>),

    #[error("Intel not found: {0}")]
    IntelNotFound(String),

    #[error("Attachment not found: {0}")]
    AttachmentNotFound(String),

    #[error("Invalid SOUBI database file: {0}")]
    InvalidImport(String),

    #[error("Could not determine data directory")]
    NoDataDir,

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}
