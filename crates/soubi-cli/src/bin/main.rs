//! SOUBI CLI - manage the encrypted field inventory from a terminal
//!
//! The CLI opens the same store the desktop app uses. The password comes
//! from `--password`, `SOUBI_PASSWORD`, or an interactive prompt.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

use soubi_core::{
    default_data_dir, ConfigManager, EncryptedStore, Inventory, NewAsset, SecretString,
};

/// SOUBI - encrypted inventory for field equipment
#[derive(Parser, Debug)]
#[command(name = "soubi")]
#[command(version)]
#[command(about = "SOUBI - password-encrypted inventory of assets and loadouts")]
struct Args {
    /// Data directory holding the store, its salt and config.json
    #[arg(long, env = "SOUBI_DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// Store password (prompted for when absent)
    #[arg(long, env = "SOUBI_PASSWORD", hide_env_values = true)]
    password: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create the store (or verify an existing one opens)
    Init,
    /// List assets
    Assets,
    /// Add an asset
    AddAsset {
        name: String,
        #[arg(long)]
        category: Option<String>,
        #[arg(long)]
        serial: Option<String>,
        #[arg(long)]
        notes: Option<String>,
    },
    /// Flip an asset between PRISTINE and COMPROMISED
    Toggle { asset_id: Uuid },
    /// Delete an asset
    RemoveAsset { asset_id: Uuid },
    /// List loadouts
    Loadouts,
    /// Create an empty loadout
    CreateLoadout { name: String },
    /// Replace the items of a dormant loadout
    SetItems {
        loadout_id: Uuid,
        asset_ids: Vec<Uuid>,
    },
    /// Deploy a loadout
    Equip { loadout_id: Uuid },
    /// Bring a loadout back from the field
    Return {
        loadout_id: Uuid,
        /// Items that came back carrying captured data
        #[arg(long, num_args = 1..)]
        compromised: Vec<Uuid>,
    },
    /// Show everything an asset depends on
    Deps { asset_id: Uuid },
    /// List captured intel
    Intel,
    /// Change the store password
    Passwd,
    /// Write the decrypted inventory to a JSON file
    Export { path: PathBuf },
    /// Replace the inventory with a JSON export
    Import { path: PathBuf },
    /// Wipe the inventory
    Reset,
}

fn password_from(arg: Option<String>, prompt: &str) -> Result<SecretString, std::io::Error> {
    match arg {
        Some(password) => Ok(SecretString::new(password)),
        None => rpassword::prompt_password(prompt).map(SecretString::new),
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let data_dir = match args.data_dir {
        Some(dir) => dir,
        None => default_data_dir()?,
    };
    let config = ConfigManager::load(&data_dir)?;

    // Logs go to stderr so command output stays clean
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(config.get().log_filter.as_deref().unwrap_or("info"))
    });
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let password = password_from(args.password, "SOUBI password: ")?;
    let store = EncryptedStore::open(config.store_paths(), password)
        .await
        .map_err(|e| format!("Failed to open store: {}", e))?;
    let mut inventory = Inventory::load(store, data_dir.display().to_string())
        .await
        .map_err(|e| format!("Failed to unlock inventory: {}", e))?;

    match args.command {
        Command::Init => {
            config.save().await?;
            info!("Store initialized in {:?}", data_dir);
            println!(
                "Store ready: {} assets, {} loadouts",
                inventory.assets().len(),
                inventory.loadouts().len()
            );
        }
        Command::Assets => {
            for asset in inventory.assets() {
                println!(
                    "{}  {:<12} {:<10} {}",
                    asset.id, asset.status, asset.category, asset.name
                );
            }
        }
        Command::AddAsset {
            name,
            category,
            serial,
            notes,
        } => {
            let asset = inventory
                .create_asset(NewAsset {
                    name: Some(name),
                    category,
                    serial_number: serial,
                    notes,
                    ..NewAsset::default()
                })
                .await?;
            println!("{}", asset.id);
        }
        Command::Toggle { asset_id } => {
            let asset = inventory.toggle_asset_status(asset_id).await?;
            println!("{} is now {}", asset.name, asset.status);
        }
        Command::RemoveAsset { asset_id } => {
            let asset = inventory.delete_asset(asset_id).await?;
            println!("Removed {}", asset.name);
        }
        Command::Loadouts => {
            for loadout in inventory.loadouts() {
                println!(
                    "{}  {:<8} {} ({} items)",
                    loadout.id,
                    if loadout.is_active() { "ACTIVE" } else { "DORMANT" },
                    loadout.name,
                    loadout.items.len()
                );
            }
        }
        Command::CreateLoadout { name } => {
            let loadout = inventory.create_loadout(Some(&name)).await?;
            println!("{}", loadout.id);
        }
        Command::SetItems {
            loadout_id,
            asset_ids,
        } => {
            let loadout = inventory.update_loadout(loadout_id, asset_ids).await?;
            println!("{} now holds {} items", loadout.name, loadout.items.len());
        }
        Command::Equip { loadout_id } => {
            let report = inventory.equip_loadout(loadout_id).await?;
            for warning in &report.warnings {
                eprintln!("warning: {}", warning);
            }
            println!("{} deployed", report.loadout.name);
        }
        Command::Return {
            loadout_id,
            compromised,
        } => {
            let loadout = inventory.return_loadout(loadout_id, &compromised).await?;
            println!("{} returned", loadout.name);
        }
        Command::Deps { asset_id } => {
            for dep in inventory.asset_dependencies(asset_id) {
                match inventory.asset(dep) {
                    Some(asset) => println!("{}  {}", dep, asset.name),
                    None => println!("{}  <missing>", dep),
                }
            }
        }
        Command::Intel => {
            for intel in inventory.intel() {
                println!("{}  {:<10} {}", intel.id, intel.kind, intel.data);
            }
        }
        Command::Passwd => {
            let current = password_from(None, "Current password: ")?;
            let new = password_from(None, "New password: ")?;
            let confirm = password_from(None, "Confirm new password: ")?;
            if new.expose() != confirm.expose() {
                return Err("Passwords do not match".into());
            }

            let outcome = inventory.change_password(current, new).await;
            if !outcome.success {
                return Err(outcome
                    .error
                    .unwrap_or_else(|| "Password change failed".to_string())
                    .into());
            }
            println!("Password changed");
        }
        Command::Export { path } => {
            inventory.export_to(&path).await?;
            println!("Exported to {} (unencrypted)", path.display());
        }
        Command::Import { path } => {
            inventory.import_from(&path).await?;
            println!("Imported {} assets", inventory.assets().len());
        }
        Command::Reset => {
            inventory.factory_reset().await?;
            println!("Inventory wiped");
        }
    }

    Ok(())
}
