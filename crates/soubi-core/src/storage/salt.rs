//! Salt sidecar persistence

use std::path::Path;
use tracing::{debug, info, warn};

use super::fs::{read_if_exists, write_atomic};
use crate::crypto::{generate_salt, Salt, SALT_LENGTH};
use crate::error::Result;

/// Load the salt at `path`, creating and persisting a new one on first run.
///
/// A new salt is on disk before this returns, so nothing can be encrypted
/// under a key whose salt was never saved.
pub async fn get_or_create(path: &Path) -> Result<Salt> {
    if let Some(salt) = load(path).await? {
        return Ok(salt);
    }

    let salt = generate_salt();
    write_atomic(path, salt.as_bytes()).await?;
    info!("Created new salt at {:?}", path);
    Ok(salt)
}

/// Read an existing salt verbatim. Length is not validated.
pub async fn load(path: &Path) -> Result<Option<Salt>> {
    let Some(bytes) = read_if_exists(path).await? else {
        debug!("No salt file at {:?}", path);
        return Ok(None);
    };

    if bytes.len() != SALT_LENGTH {
        warn!(
            "Salt at {:?} is {} bytes, expected {}",
            path,
            bytes.len(),
            SALT_LENGTH
        );
    }
    Ok(Some(Salt::from_bytes(bytes)))
}

/// Overwrite the salt at `path`
pub async fn replace(path: &Path, salt: &Salt) -> Result<()> {
    write_atomic(path, salt.as_bytes()).await?;
    debug!("Replaced salt at {:?}", path);
    Ok(())
}
