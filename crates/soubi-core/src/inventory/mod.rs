//! Inventory of assets, loadouts, intel and targets
//!
//! The inventory is a single JSON document persisted through a
//! [`DocumentAdapter`](crate::storage::DocumentAdapter).

mod manager;
mod types;

pub use manager::Inventory;
pub use types::{
    Asset, AssetStatus, AttachedFile, DocumentSettings, EquipReport, Intel, InventoryDocument,
    LogEntry, LogKind, Loadout, LoadoutStatus, NewAsset, NewIntel, Target, TargetAnalysis,
    TargetMeta, TargetSighting,
};
