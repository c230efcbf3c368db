//! Inventory operations on top of a document backend
//!
//! The whole document is held in memory and written back through the
//! adapter after every change, so the store always holds the latest state.

use std::collections::HashSet;
use std::path::Path;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::types::{
    now_millis, Asset, AssetStatus, AttachedFile, EquipReport, Intel, InventoryDocument, Loadout,
    LoadoutStatus, LogKind, NewAsset, NewIntel, Target, TargetSighting,
};
use crate::crypto::SecretString;
use crate::error::{Result, SoubiError};
use crate::storage::{write_atomic, Document, DocumentAdapter, EncryptedStore, PasswordChange};

/// Inventory bound to a storage backend
pub struct Inventory<A: DocumentAdapter> {
    adapter: A,
    document: InventoryDocument,
}

impl<A: DocumentAdapter> Inventory<A> {
    /// Load the inventory, writing an empty one when the backend has none.
    ///
    /// A stored document without an `assets` array is also replaced by
    /// defaults. Decryption failures propagate.
    pub async fn load(adapter: A, data_path: impl Into<String>) -> Result<Self> {
        let stored = adapter.read().await?;

        let document = match stored {
            Some(value) if value.get("assets").map_or(false, Document::is_array) => {
                let document: InventoryDocument = serde_json::from_value(value)?;
                info!(
                    "Loaded inventory from {} ({} assets, {} loadouts)",
                    adapter.backend_name(),
                    document.assets.len(),
                    document.loadouts.len()
                );
                document
            }
            _ => {
                let document = InventoryDocument::with_data_path(data_path);
                adapter.write(&serde_json::to_value(&document)?).await?;
                info!("Created new inventory in {}", adapter.backend_name());
                document
            }
        };

        Ok(Self { adapter, document })
    }

    /// Current document
    pub fn document(&self) -> &InventoryDocument {
        &self.document
    }

    /// Underlying backend
    pub fn adapter(&self) -> &A {
        &self.adapter
    }

    async fn persist(&self) -> Result<()> {
        self.adapter
            .write(&serde_json::to_value(&self.document)?)
            .await
    }

    /// Persist the current document, putting `previous` back if the write fails
    async fn commit(&mut self, previous: InventoryDocument) -> Result<()> {
        if let Err(e) = self.persist().await {
            warn!(
                "Write to {} failed, discarding change: {}",
                self.adapter.backend_name(),
                e
            );
            self.document = previous;
            return Err(e);
        }
        Ok(())
    }

    fn asset_mut(&mut self, id: Uuid) -> Result<&mut Asset> {
        self.document
            .assets
            .iter_mut()
            .find(|a| a.id == id)
            .ok_or_else(|| SoubiError::AssetNotFound(id.to_string()))
    }

    fn loadout_index(&self, id: Uuid) -> Result<usize> {
        self.document
            .loadouts
            .iter()
            .position(|l| l.id == id)
            .ok_or_else(|| SoubiError::LoadoutNotFound(id.to_string()))
    }

    fn asset_name(&self, id: Uuid) -> Option<&str> {
        self.document
            .assets
            .iter()
            .find(|a| a.id == id)
            .map(|a| a.name.as_str())
    }

    // Assets

    pub fn assets(&self) -> &[Asset] {
        &self.document.assets
    }

    pub fn asset(&self, id: Uuid) -> Option<&Asset> {
        self.document.assets.iter().find(|a| a.id == id)
    }

    pub async fn create_asset(&mut self, input: NewAsset) -> Result<Asset> {
        let previous = self.document.clone();
        let asset = Asset::new(input);
        self.document.assets.push(asset.clone());
        self.commit(previous).await?;

        info!("Created asset: {} ({})", asset.name, asset.id);
        Ok(asset)
    }

    pub async fn delete_asset(&mut self, id: Uuid) -> Result<Asset> {
        let previous = self.document.clone();
        let index = self
            .document
            .assets
            .iter()
            .position(|a| a.id == id)
            .ok_or_else(|| SoubiError::AssetNotFound(id.to_string()))?;

        let asset = self.document.assets.remove(index);
        self.commit(previous).await?;

        info!("Deleted asset: {} ({})", asset.name, id);
        Ok(asset)
    }

    /// Flip PRISTINE <-> COMPROMISED; anything else goes back to PRISTINE
    pub async fn toggle_asset_status(&mut self, id: Uuid) -> Result<Asset> {
        let previous = self.document.clone();
        let asset = self.asset_mut(id)?;
        let old_status = asset.status;
        asset.status = match old_status {
            AssetStatus::Pristine => AssetStatus::Compromised,
            _ => AssetStatus::Pristine,
        };
        let description = format!("Status changed from {} to {}", old_status, asset.status);
        asset.log(LogKind::StatusChange, description);
        let asset = asset.clone();

        self.commit(previous).await?;
        info!("Toggled {}: {} -> {}", asset.name, old_status, asset.status);
        Ok(asset)
    }

    pub async fn set_asset_dependencies(&mut self, id: Uuid, dependencies: Vec<Uuid>) -> Result<Asset> {
        let previous = self.document.clone();
        if let Some(missing) = dependencies.iter().find(|dep| self.asset(**dep).is_none()) {
            return Err(SoubiError::AssetNotFound(missing.to_string()));
        }

        let asset = self.asset_mut(id)?;
        asset.dependencies = dependencies;
        let asset = asset.clone();

        self.commit(previous).await?;
        debug!("Set {} dependencies on {}", asset.dependencies.len(), asset.name);
        Ok(asset)
    }

    /// All transitive dependencies of an asset, depth first, each listed once
    pub fn asset_dependencies(&self, id: Uuid) -> Vec<Uuid> {
        let mut deps = Vec::new();
        let mut visited = HashSet::from([id]);
        self.collect_dependencies(id, &mut visited, &mut deps);
        deps
    }

    fn collect_dependencies(&self, id: Uuid, visited: &mut HashSet<Uuid>, deps: &mut Vec<Uuid>) {
        let Some(asset) = self.asset(id) else {
            return;
        };
        for dep in &asset.dependencies {
            if visited.insert(*dep) {
                deps.push(*dep);
                self.collect_dependencies(*dep, visited, deps);
            }
        }
    }

    pub async fn add_file_to_asset(
        &mut self,
        id: Uuid,
        name: impl Into<String>,
        path: impl Into<String>,
    ) -> Result<Asset> {
        let previous = self.document.clone();
        let file = AttachedFile {
            name: name.into(),
            path: path.into(),
            added_at: now_millis(),
        };

        let asset = self.asset_mut(id)?;
        asset.log(LogKind::FileAdded, format!("Attached file: {}", file.name));
        asset.files.push(file);
        let asset = asset.clone();

        self.commit(previous).await?;
        debug!("Attached file to {}", asset.name);
        Ok(asset)
    }

    pub async fn remove_file_from_asset(&mut self, id: Uuid, path: &str) -> Result<Asset> {
        let previous = self.document.clone();
        let asset = self.asset_mut(id)?;
        let index = asset
            .files
            .iter()
            .position(|f| f.path == path)
            .ok_or_else(|| SoubiError::AttachmentNotFound(path.to_string()))?;

        let removed = asset.files.remove(index);
        asset.log(LogKind::FileRemoved, format!("Removed file: {}", removed.name));
        let asset = asset.clone();

        self.commit(previous).await?;
        debug!("Removed file {} from {}", removed.name, asset.name);
        Ok(asset)
    }

    // Loadouts

    pub fn loadouts(&self) -> &[Loadout] {
        &self.document.loadouts
    }

    pub fn loadout(&self, id: Uuid) -> Option<&Loadout> {
        self.document.loadouts.iter().find(|l| l.id == id)
    }

    pub async fn create_loadout(&mut self, name: Option<&str>) -> Result<Loadout> {
        let previous = self.document.clone();
        let loadout = Loadout::new(name);
        self.document.loadouts.push(loadout.clone());
        self.commit(previous).await?;

        info!("Created loadout: {} ({})", loadout.name, loadout.id);
        Ok(loadout)
    }

    /// Replace a dormant loadout's item list
    pub async fn update_loadout(&mut self, id: Uuid, items: Vec<Uuid>) -> Result<Loadout> {
        let previous = self.document.clone();
        let index = self.loadout_index(id)?;
        let loadout = &mut self.document.loadouts[index];
        if loadout.is_active() {
            return Err(SoubiError::LoadoutActive(loadout.name.clone()));
        }

        loadout.items = items;
        let loadout = loadout.clone();

        self.commit(previous).await?;
        info!("Updated loadout {}: {} items", loadout.name, loadout.items.len());
        Ok(loadout)
    }

    pub async fn delete_loadout(&mut self, id: Uuid) -> Result<Loadout> {
        let previous = self.document.clone();
        let index = self.loadout_index(id)?;
        if self.document.loadouts[index].is_active() {
            return Err(SoubiError::LoadoutActive(
                self.document.loadouts[index].name.clone(),
            ));
        }

        let loadout = self.document.loadouts.remove(index);
        self.commit(previous).await?;

        info!("Deleted loadout: {}", loadout.name);
        Ok(loadout)
    }

    /// Deploy every item in a loadout.
    ///
    /// Fails without changes if any item is already deployed through another
    /// active loadout. Dependencies missing from the loadout only warn.
    pub async fn equip_loadout(&mut self, id: Uuid) -> Result<EquipReport> {
        let previous = self.document.clone();
        let index = self.loadout_index(id)?;
        let loadout = &self.document.loadouts[index];

        if loadout.is_active() {
            return Err(SoubiError::LoadoutActive(loadout.name.clone()));
        }
        if loadout.items.is_empty() {
            return Err(SoubiError::EmptyLoadout(loadout.name.clone()));
        }

        let mut conflicts = Vec::new();
        for item in &loadout.items {
            let Some(asset) = self.asset(*item) else {
                continue;
            };
            if asset.status != AssetStatus::Deployed {
                continue;
            }
            if let Some(other) = self
                .document
                .loadouts
                .iter()
                .find(|l| l.is_active() && l.items.contains(item))
            {
                conflicts.push(format!("{} is deployed in \"{}\"", asset.name, other.name));
            }
        }
        if !conflicts.is_empty() {
            return Err(SoubiError::DeploymentConflict(conflicts));
        }

        let mut warnings = Vec::new();
        for item in &loadout.items {
            let Some(asset) = self.asset(*item) else {
                continue;
            };
            for dep in &asset.dependencies {
                if loadout.items.contains(dep) {
                    continue;
                }
                if let Some(dep_name) = self.asset_name(*dep) {
                    warnings.push(format!("{} requires {}", asset.name, dep_name));
                }
            }
        }

        let items = loadout.items.clone();
        let loadout_name = loadout.name.clone();
        for asset in self
            .document
            .assets
            .iter_mut()
            .filter(|a| items.contains(&a.id))
        {
            asset.status = AssetStatus::Deployed;
            asset.log(
                LogKind::Deployed,
                format!("Deployed in loadout \"{}\"", loadout_name),
            );
        }

        let loadout = &mut self.document.loadouts[index];
        loadout.status = LoadoutStatus::Active;
        loadout.deployed_at = Some(now_millis());
        let loadout = loadout.clone();

        self.commit(previous).await?;
        info!("Equipped loadout: {} ({} items)", loadout.name, items.len());
        if !warnings.is_empty() {
            warn!("Loadout {} is missing dependencies: {}", loadout.name, warnings.join("; "));
        }
        Ok(EquipReport { loadout, warnings })
    }

    /// Bring an active loadout back; listed items come back compromised
    pub async fn return_loadout(&mut self, id: Uuid, compromised: &[Uuid]) -> Result<Loadout> {
        let previous = self.document.clone();
        let index = self.loadout_index(id)?;
        let loadout = &self.document.loadouts[index];
        if !loadout.is_active() {
            return Err(SoubiError::LoadoutNotActive(loadout.name.clone()));
        }

        let items = loadout.items.clone();
        let loadout_name = loadout.name.clone();
        for asset in self
            .document
            .assets
            .iter_mut()
            .filter(|a| items.contains(&a.id))
        {
            let description = if compromised.contains(&asset.id) {
                asset.status = AssetStatus::Compromised;
                format!("Returned from \"{}\" - DATA CAPTURED", loadout_name)
            } else {
                asset.status = AssetStatus::Pristine;
                format!("Returned from \"{}\" - Clean", loadout_name)
            };
            asset.log(LogKind::Returned, description);
        }

        let loadout = &mut self.document.loadouts[index];
        loadout.status = LoadoutStatus::Dormant;
        loadout.returned_at = Some(now_millis());
        let loadout = loadout.clone();

        self.commit(previous).await?;
        info!(
            "Returned loadout: {} ({} compromised)",
            loadout.name,
            compromised.len()
        );
        Ok(loadout)
    }

    // Intel and targets

    pub fn intel(&self) -> &[Intel] {
        &self.document.intel
    }

    pub async fn add_intel(&mut self, input: NewIntel) -> Result<Intel> {
        let previous = self.document.clone();
        let intel = Intel::new(input);
        self.document.intel.push(intel.clone());
        self.commit(previous).await?;

        info!("Captured intel: {} ({})", intel.kind, intel.id);
        Ok(intel)
    }

    pub async fn delete_intel(&mut self, id: Uuid) -> Result<Intel> {
        let previous = self.document.clone();
        let index = self
            .document
            .intel
            .iter()
            .position(|i| i.id == id)
            .ok_or_else(|| SoubiError::IntelNotFound(id.to_string()))?;

        let intel = self.document.intel.remove(index);
        self.commit(previous).await?;

        info!("Deleted intel: {}", id);
        Ok(intel)
    }

    pub fn targets(&self) -> &[Target] {
        &self.document.targets
    }

    /// Record a sighting. Returns `None` when it carries no identifier.
    pub async fn upsert_target(&mut self, sighting: TargetSighting) -> Result<Option<Target>> {
        let Some(identifier) = sighting.identifier().map(str::to_string) else {
            debug!("Ignoring target sighting without an identifier");
            return Ok(None);
        };
        let previous = self.document.clone();
        let now = now_millis();

        let target = match self
            .document
            .targets
            .iter_mut()
            .find(|t| t.matches(&identifier))
        {
            Some(target) => {
                target.last_seen = now;
                // A zero reading means the radio reported nothing
                if let Some(rssi) = sighting.meta.rssi.filter(|rssi| *rssi != 0) {
                    target.meta.rssi = Some(rssi);
                }
                if target.analysis.vendor.is_none() && sighting.analysis.vendor.is_some() {
                    target.analysis.vendor = sighting.analysis.vendor;
                }
                target.clone()
            }
            None => {
                let target = Target {
                    id: Uuid::new_v4(),
                    first_seen: now,
                    last_seen: now,
                    kind: sighting.source.unwrap_or_else(|| "UNKNOWN".to_string()),
                    data: sighting.data,
                    meta: sighting.meta,
                    analysis: sighting.analysis,
                };
                self.document.targets.push(target.clone());
                target
            }
        };

        self.commit(previous).await?;
        Ok(Some(target))
    }

    // Maintenance

    /// Wipe the inventory back to an empty document, keeping the data path
    pub async fn factory_reset(&mut self) -> Result<()> {
        let previous = self.document.clone();
        let data_path = self.document.settings.data_path.clone();
        self.document = InventoryDocument::with_data_path(data_path);
        self.commit(previous).await?;

        warn!("Inventory reset to factory defaults");
        Ok(())
    }

    /// Write the decrypted document to `path` as pretty JSON
    pub async fn export_to(&self, path: &Path) -> Result<()> {
        let contents = serde_json::to_vec_pretty(&self.document)?;
        write_atomic(path, &contents).await?;

        warn!("Exported inventory to {:?} - this file is NOT encrypted", path);
        Ok(())
    }

    /// Replace the inventory with a JSON export
    pub async fn import_from(&mut self, path: &Path) -> Result<()> {
        let previous = self.document.clone();
        let contents = tokio::fs::read(path).await?;
        let value: Document = serde_json::from_slice(&contents)
            .map_err(|e| SoubiError::InvalidImport(e.to_string()))?;

        if !value.get("assets").map_or(false, Document::is_array) {
            return Err(SoubiError::InvalidImport("missing assets array".to_string()));
        }
        if value.get("loadouts").map_or(true, Document::is_null) {
            return Err(SoubiError::InvalidImport("missing loadouts".to_string()));
        }

        self.document = serde_json::from_value(value)
            .map_err(|e| SoubiError::InvalidImport(e.to_string()))?;
        self.commit(previous).await?;

        info!("Imported inventory from {:?}", path);
        Ok(())
    }
}

impl Inventory<EncryptedStore> {
    /// Rotate the password of the underlying encrypted store
    pub async fn change_password(
        &mut self,
        old_password: impl Into<SecretString>,
        new_password: impl Into<SecretString>,
    ) -> PasswordChange {
        self.adapter.change_password(old_password, new_password).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{MemoryAdapter, StorePaths};
    use serde_json::json;
    use tempfile::TempDir;

    async fn test_inventory() -> Inventory<MemoryAdapter> {
        Inventory::load(MemoryAdapter::new(), "/tmp/soubi").await.unwrap()
    }

    fn named(name: &str) -> NewAsset {
        NewAsset {
            name: Some(name.to_string()),
            ..NewAsset::default()
        }
    }

    #[tokio::test]
    async fn test_load_writes_defaults() {
        let inventory = test_inventory().await;

        let stored = inventory.adapter().read().await.unwrap().unwrap();
        assert_eq!(stored["settings"]["theme"], json!("dark"));
        assert_eq!(stored["settings"]["dataPath"], json!("/tmp/soubi"));
        assert_eq!(stored["assets"], json!([]));
    }

    #[tokio::test]
    async fn test_load_replaces_document_without_assets() {
        let adapter = MemoryAdapter::with_document(json!({"foo": 1}));
        let inventory = Inventory::load(adapter, "/data").await.unwrap();

        assert!(inventory.assets().is_empty());
        assert_eq!(inventory.document().settings.data_path, "/data");
    }

    #[tokio::test]
    async fn test_asset_lifecycle() {
        let mut inventory = test_inventory().await;

        let asset = inventory.create_asset(named("Flipper Zero")).await.unwrap();
        assert_eq!(inventory.assets().len(), 1);

        let toggled = inventory.toggle_asset_status(asset.id).await.unwrap();
        assert_eq!(toggled.status, AssetStatus::Compromised);
        assert_eq!(toggled.logs.last().unwrap().kind, LogKind::StatusChange);
        assert_eq!(
            toggled.logs.last().unwrap().description,
            "Status changed from PRISTINE to COMPROMISED"
        );

        let toggled = inventory.toggle_asset_status(asset.id).await.unwrap();
        assert_eq!(toggled.status, AssetStatus::Pristine);

        inventory.delete_asset(asset.id).await.unwrap();
        assert!(inventory.assets().is_empty());
        assert!(matches!(
            inventory.delete_asset(asset.id).await,
            Err(SoubiError::AssetNotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_every_change_is_persisted() {
        let mut inventory = test_inventory().await;
        let asset = inventory.create_asset(named("HackRF")).await.unwrap();

        let stored = inventory.adapter().read().await.unwrap().unwrap();
        assert_eq!(stored["assets"][0]["id"], json!(asset.id));
        assert_eq!(stored["assets"][0]["status"], json!("PRISTINE"));
    }

    #[tokio::test]
    async fn test_file_attachments() {
        let mut inventory = test_inventory().await;
        let asset = inventory.create_asset(named("Proxmark")).await.unwrap();

        let updated = inventory
            .add_file_to_asset(asset.id, "manual.pdf", "/docs/manual.pdf")
            .await
            .unwrap();
        assert_eq!(updated.files.len(), 1);
        assert_eq!(updated.logs.last().unwrap().kind, LogKind::FileAdded);

        assert!(matches!(
            inventory.remove_file_from_asset(asset.id, "/nope").await,
            Err(SoubiError::AttachmentNotFound(_))
        ));

        let updated = inventory
            .remove_file_from_asset(asset.id, "/docs/manual.pdf")
            .await
            .unwrap();
        assert!(updated.files.is_empty());
        assert_eq!(updated.logs.last().unwrap().kind, LogKind::FileRemoved);
    }

    #[tokio::test]
    async fn test_dependencies_are_transitive_and_cycle_safe() {
        let mut inventory = test_inventory().await;
        let a = inventory.create_asset(named("A")).await.unwrap();
        let b = inventory.create_asset(named("B")).await.unwrap();
        let c = inventory.create_asset(named("C")).await.unwrap();

        inventory.set_asset_dependencies(a.id, vec![b.id]).await.unwrap();
        inventory.set_asset_dependencies(b.id, vec![c.id]).await.unwrap();
        inventory.set_asset_dependencies(c.id, vec![a.id]).await.unwrap();

        assert_eq!(inventory.asset_dependencies(a.id), vec![b.id, c.id]);
        assert!(matches!(
            inventory.set_asset_dependencies(a.id, vec![Uuid::new_v4()]).await,
            Err(SoubiError::AssetNotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_equip_and_return_loadout() {
        let mut inventory = test_inventory().await;
        let radio = inventory.create_asset(named("Radio")).await.unwrap();
        let battery = inventory.create_asset(named("Battery")).await.unwrap();
        inventory
            .set_asset_dependencies(radio.id, vec![battery.id])
            .await
            .unwrap();

        let loadout = inventory.create_loadout(Some("Recon")).await.unwrap();
        assert_eq!(loadout.status, LoadoutStatus::Dormant);
        inventory.update_loadout(loadout.id, vec![radio.id]).await.unwrap();

        let report = inventory.equip_loadout(loadout.id).await.unwrap();
        assert_eq!(report.loadout.status, LoadoutStatus::Active);
        assert!(report.loadout.deployed_at.is_some());
        assert_eq!(report.warnings, vec!["Radio requires Battery".to_string()]);
        assert_eq!(inventory.asset(radio.id).unwrap().status, AssetStatus::Deployed);

        // Active loadouts are frozen
        assert!(matches!(
            inventory.update_loadout(loadout.id, vec![]).await,
            Err(SoubiError::LoadoutActive(_))
        ));
        assert!(matches!(
            inventory.delete_loadout(loadout.id).await,
            Err(SoubiError::LoadoutActive(_))
        ));
        assert!(matches!(
            inventory.equip_loadout(loadout.id).await,
            Err(SoubiError::LoadoutActive(_))
        ));

        let returned = inventory
            .return_loadout(loadout.id, &[radio.id])
            .await
            .unwrap();
        assert_eq!(returned.status, LoadoutStatus::Dormant);
        assert!(returned.returned_at.is_some());
        let radio = inventory.asset(radio.id).unwrap();
        assert_eq!(radio.status, AssetStatus::Compromised);
        assert!(radio.logs.last().unwrap().description.ends_with("DATA CAPTURED"));

        assert!(matches!(
            inventory.return_loadout(loadout.id, &[]).await,
            Err(SoubiError::LoadoutNotActive(_))
        ));
        inventory.delete_loadout(loadout.id).await.unwrap();
        assert!(inventory.loadouts().is_empty());
    }

    #[tokio::test]
    async fn test_equip_rejects_empty_and_conflicting_loadouts() {
        let mut inventory = test_inventory().await;
        let antenna = inventory.create_asset(named("Antenna")).await.unwrap();

        let empty = inventory.create_loadout(None).await.unwrap();
        assert_eq!(empty.name, "Unnamed Loadout");
        assert!(matches!(
            inventory.equip_loadout(empty.id).await,
            Err(SoubiError::EmptyLoadout(_))
        ));

        let first = inventory.create_loadout(Some("First")).await.unwrap();
        let second = inventory.create_loadout(Some("Second")).await.unwrap();
        inventory.update_loadout(first.id, vec![antenna.id]).await.unwrap();
        inventory.update_loadout(second.id, vec![antenna.id]).await.unwrap();
        inventory.equip_loadout(first.id).await.unwrap();

        match inventory.equip_loadout(second.id).await {
            Err(SoubiError::DeploymentConflict(conflicts)) => {
                assert_eq!(conflicts, vec!["Antenna is deployed in \"First\"".to_string()]);
            }
            other => panic!("expected deployment conflict, got {:?}", other),
        }
        assert_eq!(
            inventory.loadout(second.id).unwrap().status,
            LoadoutStatus::Dormant
        );
    }

    #[tokio::test]
    async fn test_intel() {
        let mut inventory = test_inventory().await;

        let intel = inventory
            .add_intel(NewIntel {
                kind: None,
                data: json!("04:A2:1B:FF"),
                notes: None,
            })
            .await
            .unwrap();
        assert_eq!(intel.kind, "RAW");
        assert_eq!(intel.source, "GHOST_NODE");
        assert_eq!(inventory.intel().len(), 1);

        inventory.delete_intel(intel.id).await.unwrap();
        assert!(inventory.intel().is_empty());
        assert!(matches!(
            inventory.delete_intel(intel.id).await,
            Err(SoubiError::IntelNotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_upsert_target() {
        let mut inventory = test_inventory().await;
        let mut sighting = TargetSighting {
            source: Some("WIFI".to_string()),
            data: Some("HomeNet".to_string()),
            ..TargetSighting::default()
        };
        sighting.meta.mac = Some("AA:BB:CC:DD:EE:FF".to_string());
        sighting.meta.rssi = Some(-70);

        let created = inventory.upsert_target(sighting.clone()).await.unwrap().unwrap();
        assert_eq!(created.kind, "WIFI");
        assert_eq!(created.first_seen, created.last_seen);

        sighting.meta.rssi = Some(-40);
        sighting.analysis.vendor = Some("Espressif".to_string());
        let updated = inventory.upsert_target(sighting).await.unwrap().unwrap();
        assert_eq!(updated.id, created.id);
        assert_eq!(updated.meta.rssi, Some(-40));
        assert_eq!(updated.analysis.vendor.as_deref(), Some("Espressif"));
        assert_eq!(inventory.targets().len(), 1);

        let mut silent = TargetSighting::default();
        silent.meta.mac = Some("AA:BB:CC:DD:EE:FF".to_string());
        silent.meta.rssi = Some(0);
        let updated = inventory.upsert_target(silent).await.unwrap().unwrap();
        assert_eq!(updated.meta.rssi, Some(-40));

        let ignored = inventory
            .upsert_target(TargetSighting::default())
            .await
            .unwrap();
        assert!(ignored.is_none());
    }

    #[tokio::test]
    async fn test_factory_reset() {
        let mut inventory = test_inventory().await;
        inventory.create_asset(named("Pineapple")).await.unwrap();

        inventory.factory_reset().await.unwrap();

        assert!(inventory.assets().is_empty());
        assert_eq!(inventory.document().settings.data_path, "/tmp/soubi");
    }

    #[tokio::test]
    async fn test_export_import() {
        let temp_dir = TempDir::new().unwrap();
        let export_path = temp_dir.path().join("export.json");

        let mut source = test_inventory().await;
        source.create_asset(named("Ubertooth")).await.unwrap();
        source.export_to(&export_path).await.unwrap();

        let mut target = test_inventory().await;
        target.import_from(&export_path).await.unwrap();
        assert_eq!(target.assets().len(), 1);
        assert_eq!(target.assets()[0].name, "Ubertooth");

        let bad_path = temp_dir.path().join("bad.json");
        tokio::fs::write(&bad_path, br#"{"assets": []}"#).await.unwrap();
        assert!(matches!(
            target.import_from(&bad_path).await,
            Err(SoubiError::InvalidImport(_))
        ));
        assert_eq!(target.assets().len(), 1);
    }

    #[tokio::test]
    async fn test_encrypted_inventory_change_password() {
        let temp_dir = TempDir::new().unwrap();
        let paths = StorePaths::new(temp_dir.path().join("soubi.db"));

        let store = EncryptedStore::open(paths.clone(), "abc123").await.unwrap();
        let mut inventory = Inventory::load(store, "/data").await.unwrap();
        inventory.create_asset(named("Wifi Pineapple")).await.unwrap();

        let outcome = inventory.change_password("abc123", "hunter2").await;
        assert!(outcome.success);

        let store = EncryptedStore::open(paths, "hunter2").await.unwrap();
        let reopened = Inventory::load(store, "/data").await.unwrap();
        assert_eq!(reopened.assets()[0].name, "Wifi Pineapple");
    }

    #[tokio::test]
    async fn test_failed_write_leaves_document_unchanged() {
        let temp_dir = TempDir::new().unwrap();
        let paths = StorePaths::new(temp_dir.path().join("soubi.db"));

        let store = EncryptedStore::open(paths.clone(), "abc123").await.unwrap();
        let mut inventory = Inventory::load(store, "/data").await.unwrap();
        let radio = inventory.create_asset(named("Radio")).await.unwrap();
        let loadout = inventory.create_loadout(Some("Recon")).await.unwrap();
        inventory.update_loadout(loadout.id, vec![radio.id]).await.unwrap();
        let before = inventory.document().clone();

        // A directory squatting on the temp path makes every write fail
        let blocker = temp_dir.path().join("soubi.db.tmp");
        std::fs::create_dir(&blocker).unwrap();
        std::fs::write(blocker.join("keep"), b"x").unwrap();

        assert!(matches!(
            inventory.create_asset(named("Phantom")).await,
            Err(SoubiError::IoError(_))
        ));
        assert!(inventory.equip_loadout(loadout.id).await.is_err());
        assert!(inventory.toggle_asset_status(radio.id).await.is_err());
        assert!(inventory.factory_reset().await.is_err());
        assert_eq!(inventory.document(), &before);

        std::fs::remove_dir_all(&blocker).unwrap();
        let report = inventory.equip_loadout(loadout.id).await.unwrap();
        assert_eq!(report.loadout.status, LoadoutStatus::Active);

        let store = EncryptedStore::open(paths, "abc123").await.unwrap();
        let reopened = Inventory::load(store, "/data").await.unwrap();
        assert_eq!(reopened.assets().len(), 1);
        assert_eq!(reopened.asset(radio.id).unwrap().status, AssetStatus::Deployed);
    }
}
