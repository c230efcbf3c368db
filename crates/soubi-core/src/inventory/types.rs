//! Inventory document schema
//!
//! Field names follow the on-disk JSON the desktop app has always used,
//! which mixes snake_case (assets, intel) and camelCase (settings, targets).

use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use uuid::Uuid;

/// Current time as Unix milliseconds
pub(crate) fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}

/// Condition of a physical asset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AssetStatus {
    /// Clean and available
    Pristine,
    /// Returned from the field carrying captured data
    Compromised,
    /// Out in an active loadout
    Deployed,
}

impl fmt::Display for AssetStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            AssetStatus::Pristine => "PRISTINE",
            AssetStatus::Compromised => "COMPROMISED",
            AssetStatus::Deployed => "DEPLOYED",
        };
        f.pad(label)
    }
}

/// Kind of flight-recorder entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LogKind {
    Created,
    StatusChange,
    Deployed,
    Returned,
    FileAdded,
    FileRemoved,
}

/// One entry in an asset's flight recorder
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    pub id: Uuid,
    /// Unix milliseconds
    pub timestamp: i64,
    #[serde(rename = "type")]
    pub kind: LogKind,
    pub description: String,
    pub user: String,
}

impl LogEntry {
    /// Entry recorded by the application itself
    pub fn system(kind: LogKind, description: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            timestamp: now_millis(),
            kind,
            description: description.into(),
            user: "System".to_string(),
        }
    }
}

/// File attached to an asset (path only; the file itself is not stored)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttachedFile {
    pub name: String,
    pub path: String,
    pub added_at: i64,
}

/// A piece of kit in the armory
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Asset {
    pub id: Uuid,
    pub name: String,
    pub category: String,
    pub status: AssetStatus,
    #[serde(default)]
    pub serial_number: String,
    /// `YYYY-MM-DD`
    #[serde(default)]
    pub purchase_date: String,
    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    pub image_path: Option<String>,
    /// Assets this one needs in the same loadout
    #[serde(default)]
    pub dependencies: Vec<Uuid>,
    #[serde(default)]
    pub logs: Vec<LogEntry>,
    #[serde(default)]
    pub files: Vec<AttachedFile>,
}

/// Input for creating an asset; unset fields get defaults
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewAsset {
    pub name: Option<String>,
    pub category: Option<String>,
    pub serial_number: Option<String>,
    pub purchase_date: Option<String>,
    pub notes: Option<String>,
    pub image_path: Option<String>,
}

impl Asset {
    /// Build a fresh, pristine asset
    pub fn new(input: NewAsset) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: input.name.unwrap_or_else(|| "Unnamed Asset".to_string()),
            category: input.category.unwrap_or_else(|| "HARDWARE".to_string()),
            status: AssetStatus::Pristine,
            serial_number: input.serial_number.unwrap_or_default(),
            purchase_date: input
                .purchase_date
                .unwrap_or_else(|| Utc::now().format("%Y-%m-%d").to_string()),
            notes: input.notes.unwrap_or_default(),
            image_path: input.image_path,
            dependencies: Vec::new(),
            logs: vec![LogEntry::system(LogKind::Created, "Asset added to armory.")],
            files: Vec::new(),
        }
    }

    pub(crate) fn log(&mut self, kind: LogKind, description: impl Into<String>) {
        self.logs.push(LogEntry::system(kind, description));
    }
}

/// Loadout lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LoadoutStatus {
    Dormant,
    Active,
}

/// A named kit of assets deployed together
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Loadout {
    pub id: Uuid,
    pub name: String,
    pub status: LoadoutStatus,
    pub created_at: i64,
    #[serde(default)]
    pub items: Vec<Uuid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deployed_at: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub returned_at: Option<i64>,
}

impl Loadout {
    pub fn new(name: Option<&str>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.unwrap_or("Unnamed Loadout").to_string(),
            status: LoadoutStatus::Dormant,
            created_at: now_millis(),
            items: Vec::new(),
            deployed_at: None,
            returned_at: None,
        }
    }

    pub fn is_active(&self) -> bool {
        self.status == LoadoutStatus::Active
    }
}

/// Result of equipping a loadout
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EquipReport {
    pub loadout: Loadout,
    /// Missing dependencies, e.g. "Proxmark requires Battery Pack"
    pub warnings: Vec<String>,
}

/// Captured data (keys, handshakes, raw dumps)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Intel {
    pub id: Uuid,
    #[serde(rename = "type")]
    pub kind: String,
    pub data: Value,
    pub timestamp: i64,
    #[serde(default)]
    pub notes: String,
    pub source: String,
}

/// Input for recording intel
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewIntel {
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub data: Value,
    pub notes: Option<String>,
}

impl Intel {
    pub fn new(input: NewIntel) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind: input.kind.unwrap_or_else(|| "RAW".to_string()),
            data: input.data,
            timestamp: now_millis(),
            notes: input.notes.unwrap_or_default(),
            source: "GHOST_NODE".to_string(),
        }
    }
}

/// Link-layer details of a wireless target
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TargetMeta {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mac: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rssi: Option<i64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// What has been worked out about a target
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TargetAnalysis {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vendor: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A profiled WiFi/BT device seen over time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Target {
    pub id: Uuid,
    pub first_seen: i64,
    pub last_seen: i64,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<String>,
    #[serde(default)]
    pub meta: TargetMeta,
    #[serde(default)]
    pub analysis: TargetAnalysis,
}

/// A single observation of a target
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TargetSighting {
    pub source: Option<String>,
    pub data: Option<String>,
    #[serde(default)]
    pub meta: TargetMeta,
    #[serde(default)]
    pub analysis: TargetAnalysis,
}

impl TargetSighting {
    /// Identifier used to match sightings to targets: the MAC, else the raw data
    pub fn identifier(&self) -> Option<&str> {
        self.meta.mac.as_deref().or(self.data.as_deref())
    }
}

impl Target {
    pub(crate) fn matches(&self, identifier: &str) -> bool {
        self.meta.mac.as_deref() == Some(identifier) || self.data.as_deref() == Some(identifier)
    }
}

/// Application preferences stored inside the encrypted document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentSettings {
    pub theme: String,
    pub data_path: String,
}

impl Default for DocumentSettings {
    fn default() -> Self {
        Self {
            theme: "dark".to_string(),
            data_path: String::new(),
        }
    }
}

/// The whole inventory, persisted as one document
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InventoryDocument {
    #[serde(default)]
    pub settings: DocumentSettings,
    #[serde(default)]
    pub assets: Vec<Asset>,
    #[serde(default)]
    pub loadouts: Vec<Loadout>,
    #[serde(default)]
    pub presets: Vec<Value>,
    #[serde(default)]
    pub intel: Vec<Intel>,
    #[serde(default)]
    pub targets: Vec<Target>,
}

impl InventoryDocument {
    /// Empty inventory pointing at `data_path`
    pub fn with_data_path(data_path: impl Into<String>) -> Self {
        Self {
            settings: DocumentSettings {
                data_path: data_path.into(),
                ..DocumentSettings::default()
            },
            ..Self::default()
        }
    }
}
