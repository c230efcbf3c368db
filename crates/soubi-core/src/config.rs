//! Application configuration
//!
//! Stores non-sensitive configuration in a plain JSON file next to the
//! encrypted store. Configuration is readable before the store is unlocked.

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::{Result, SoubiError};
use crate::storage::{write_atomic, StorePaths};

const CONFIG_FILE_NAME: &str = "config.json";

/// Default encrypted store file name
pub const DEFAULT_DB_FILE_NAME: &str = "soubi.db";

/// Application configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Config file version
    pub version: u32,
    /// File name of the encrypted store inside the data directory
    #[serde(default = "default_db_file_name")]
    pub db_file_name: String,
    /// Default `tracing` filter when `RUST_LOG` is unset (e.g. "soubi_core=debug")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_filter: Option<String>,
}

fn default_db_file_name() -> String {
    DEFAULT_DB_FILE_NAME.to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: 1,
            db_file_name: default_db_file_name(),
            log_filter: None,
        }
    }
}

/// Platform data directory (e.g. `~/.local/share/soubi` on Linux)
pub fn default_data_dir() -> Result<PathBuf> {
    ProjectDirs::from("com", "soubi", "soubi")
        .map(|dirs| dirs.data_dir().to_path_buf())
        .ok_or(SoubiError::NoDataDir)
}

/// Config manager
pub struct ConfigManager {
    data_dir: PathBuf,
    config_file: PathBuf,
    config: Config,
}

impl ConfigManager {
    /// Load the config from `data_dir`, falling back to defaults when absent
    pub fn load(data_dir: &Path) -> Result<Self> {
        let config_file = data_dir.join(CONFIG_FILE_NAME);
        let config = Self::load_from_file(&config_file)?;

        Ok(Self {
            data_dir: data_dir.to_path_buf(),
            config_file,
            config,
        })
    }

    fn load_from_file(path: &Path) -> Result<Config> {
        if !path.exists() {
            debug!("No config file found, using defaults");
            return Ok(Config::default());
        }

        let contents = std::fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&contents)?;
        debug!("Loaded config from {:?}", path);
        Ok(config)
    }

    /// Save config to file
    pub async fn save(&self) -> Result<()> {
        let contents = serde_json::to_vec_pretty(&self.config)?;
        write_atomic(&self.config_file, &contents).await?;

        debug!("Saved config to {:?}", self.config_file);
        Ok(())
    }

    pub fn get(&self) -> &Config {
        &self.config
    }

    pub fn get_mut(&mut self) -> &mut Config {
        &mut self.config
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Blob and salt paths of the configured store
    pub fn store_paths(&self) -> StorePaths {
        StorePaths::new(self.data_dir.join(&self.config.db_file_name))
    }
}
