//! Filesystem helpers shared by the blob and salt writers

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;
use tracing::debug;

use crate::error::Result;

/// Temp file used while replacing `path`: the same name with `.tmp` appended
pub(crate) fn temp_path_for(path: &Path) -> PathBuf {
    let mut name: OsString = path.as_os_str().to_owned();
    name.push(".tmp");
    PathBuf::from(name)
}

/// Replace the contents of `path` atomically.
///
/// Data is written and fsynced to a sibling temp file, which is then renamed
/// over the target. A crash leaves either the old file or the new one.
pub(crate) async fn write_atomic(path: &Path, contents: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            tokio::fs::create_dir_all(parent).await?;
        }
    }

    let temp_path = temp_path_for(path);
    let mut file = tokio::fs::File::create(&temp_path).await?;
    file.write_all(contents).await?;
    file.sync_all().await?;
    drop(file);

    if let Err(e) = tokio::fs::rename(&temp_path, path).await {
        let _ = tokio::fs::remove_file(&temp_path).await;
        return Err(e.into());
    }

    debug!("Wrote {} bytes to {:?}", contents.len(), path);
    Ok(())
}

/// Read a file, mapping "not found" to `None`
pub(crate) async fn read_if_exists(path: &Path) -> Result<Option<Vec<u8>>> {
    match tokio::fs::read(path).await {
        Ok(bytes) => Ok(Some(bytes)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_write_atomic_replaces_and_cleans_up() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested").join("soubi.db");

        write_atomic(&path, b"first").await.unwrap();
        write_atomic(&path, b"second").await.unwrap();

        assert_eq!(tokio::fs::read(&path).await.unwrap(), b"second");
        assert!(!temp_path_for(&path).exists());
    }

    #[tokio::test]
    async fn test_read_if_exists() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("missing");

        assert_eq!(read_if_exists(&path).await.unwrap(), None);

        tokio::fs::write(&path, b"").await.unwrap();
        assert_eq!(read_if_exists(&path).await.unwrap(), Some(Vec::new()));
    }

    #[test]
    fn test_temp_path_appends_suffix() {
        let path = Path::new("/data/soubi.db.salt");
        assert_eq!(temp_path_for(path), PathBuf::from("/data/soubi.db.salt.tmp"));
    }
}
