//! # soubi-core
//!
//! Core functionality for SOUBI including:
//! - AES-256-GCM encryption with scrypt key derivation
//! - A single-file encrypted document store with password rotation
//! - The inventory model (assets, loadouts, intel, targets)
//! - Plain JSON configuration

pub mod config;
pub mod crypto;
pub mod error;
pub mod inventory;
pub mod storage;

pub use config::{default_data_dir, Config, ConfigManager};
pub use crypto::{derive_key, generate_salt, DerivedKey, EncryptedData, Salt, SecretString};
pub use error::{Result, SoubiError};
pub use inventory::{
    Asset, AssetStatus, EquipReport, Intel, Inventory, InventoryDocument, Loadout, LoadoutStatus,
    NewAsset, NewIntel, Target, TargetSighting,
};
pub use storage::{
    Document, DocumentAdapter, EncryptedStore, MemoryAdapter, PasswordChange, StorePaths,
    StoreState,
};
