//! Password-encrypted document store
//!
//! The whole document is serialized, sealed with AES-256-GCM under a key
//! derived from the user's password, and written to a single file. The
//! scrypt salt lives in a sidecar file next to it (`<file>.salt`).

use async_trait::async_trait;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, error, info, warn};
use zeroize::Zeroizing;

use super::format;
use super::fs::{read_if_exists, write_atomic};
use super::salt;
use super::{Document, DocumentAdapter};
use crate::crypto::{
    decrypt_with_aad, derive_key_blocking, encrypt_with_aad, generate_salt, DerivedKey,
    EncryptedData, SecretString,
};
use crate::error::{Result, SoubiError};

/// Store lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreState {
    /// No key yet - call `init`
    Uninitialized,
    /// Keyed and usable
    Ready,
    /// Key replacement in progress. A store left here by a failed or
    /// dropped rotation refuses all I/O until it is reopened.
    Rotating,
}

/// Locations of the encrypted blob and its salt sidecar
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorePaths {
    blob: PathBuf,
    salt: PathBuf,
}

impl StorePaths {
    /// Paths for a blob file; the salt sits beside it as `<blob>.salt`
    pub fn new(blob: impl Into<PathBuf>) -> Self {
        let blob = blob.into();
        let mut salt = blob.clone().into_os_string();
        salt.push(".salt");
        Self {
            blob,
            salt: PathBuf::from(salt),
        }
    }

    pub fn blob(&self) -> &Path {
        &self.blob
    }

    pub fn salt(&self) -> &Path {
        &self.salt
    }
}

/// Outcome of a password change, shaped for display by a UI layer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PasswordChange {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl PasswordChange {
    fn succeeded() -> Self {
        Self {
            success: true,
            error: None,
        }
    }

    fn failed(err: &SoubiError) -> Self {
        Self {
            success: false,
            error: Some(err.to_string()),
        }
    }
}

/// Encrypted document store
///
/// Not internally synchronized: `change_password` takes `&mut self`, so a
/// rotation can never overlap a read or write on the same instance.
pub struct EncryptedStore {
    paths: StorePaths,
    key: Option<DerivedKey>,
    state: StoreState,
}

impl EncryptedStore {
    /// Create an uninitialized store bound to `paths`
    pub fn new(paths: StorePaths) -> Self {
        Self {
            paths,
            key: None,
            state: StoreState::Uninitialized,
        }
    }

    /// Create and initialize in one step
    pub async fn open(paths: StorePaths, password: impl Into<SecretString>) -> Result<Self> {
        let mut store = Self::new(paths);
        store.init(password).await?;
        Ok(store)
    }

    /// Load or create the salt and derive the store key.
    ///
    /// The password is consumed and zeroized as soon as the key exists.
    pub async fn init(&mut self, password: impl Into<SecretString>) -> Result<()> {
        if self.state != StoreState::Uninitialized {
            return Err(SoubiError::AlreadyInitialized);
        }

        let salt = salt::get_or_create(self.paths.salt()).await?;
        let key = derive_key_blocking(password.into(), salt).await?;

        self.key = Some(key);
        self.state = StoreState::Ready;

        info!("Encrypted store ready at {:?}", self.paths.blob());
        Ok(())
    }

    /// Get the current lifecycle state
    pub fn state(&self) -> StoreState {
        self.state
    }

    pub fn paths(&self) -> &StorePaths {
        &self.paths
    }

    /// The live key, if the store is in a state that allows I/O
    fn ready_key(&self) -> Result<&DerivedKey> {
        match self.state {
            StoreState::Uninitialized => Err(SoubiError::NotInitialized),
            StoreState::Rotating => Err(SoubiError::RotationIncomplete),
            StoreState::Ready => self.key.as_ref().ok_or(SoubiError::NotInitialized),
        }
    }

    /// Decrypt the stored bytes.
    ///
    /// Missing, empty, or too-short files read as `None`. Authentication
    /// failure is an error, never an empty result.
    pub async fn read_plaintext(&self) -> Result<Option<Zeroizing<Vec<u8>>>> {
        let key = self.ready_key()?;
        self.open_blob(key).await
    }

    /// Encrypt `plaintext` and replace the stored file with it
    pub async fn write_plaintext(&self, plaintext: &[u8]) -> Result<()> {
        let key = self.ready_key()?;
        self.seal_blob(key, plaintext).await
    }

    /// Read and deserialize the stored document
    pub async fn read<T: DeserializeOwned>(&self) -> Result<Option<T>> {
        match self.read_plaintext().await? {
            Some(plaintext) => Ok(Some(serde_json::from_slice(&plaintext)?)),
            None => Ok(None),
        }
    }

    /// Serialize and store a document, replacing whatever was there
    pub async fn write<T: Serialize + ?Sized + Sync>(&self, document: &T) -> Result<()> {
        let plaintext = Zeroizing::new(serde_json::to_vec_pretty(document)?);
        self.write_plaintext(&plaintext).await
    }

    async fn open_blob(&self, key: &DerivedKey) -> Result<Option<Zeroizing<Vec<u8>>>> {
        let path = self.paths.blob();

        let Some(contents) = read_if_exists(path).await? else {
            debug!("No store file at {:?}", path);
            return Ok(None);
        };
        if contents.is_empty() {
            debug!("Store file {:?} is empty", path);
            return Ok(None);
        }

        let framed = format::split(&contents)?;
        let Some(envelope) = EncryptedData::from_bytes(framed.envelope) else {
            warn!(
                "Store file {:?} is too short to hold data ({} bytes)",
                path,
                contents.len()
            );
            return Ok(None);
        };

        match decrypt_with_aad(&envelope, framed.aad, key) {
            Ok(plaintext) => {
                debug!("Read {} bytes from {:?}", plaintext.len(), path);
                Ok(Some(plaintext))
            }
            Err(e) => {
                error!("Decryption failed - wrong password or corrupted file");
                Err(e)
            }
        }
    }

    async fn seal_blob(&self, key: &DerivedKey, plaintext: &[u8]) -> Result<()> {
        let header = format::header();
        let envelope = encrypt_with_aad(plaintext, &header, key)?;

        let mut contents = header.to_vec();
        contents.extend_from_slice(&envelope.to_bytes());
        write_atomic(self.paths.blob(), &contents).await
    }

    /// Change the store password, re-encrypting everything under a new salt.
    ///
    /// Failures come back as a structured outcome instead of an error so the
    /// caller can prompt again.
    pub async fn change_password(
        &mut self,
        old_password: impl Into<SecretString>,
        new_password: impl Into<SecretString>,
    ) -> PasswordChange {
        match self.try_change_password(old_password, new_password).await {
            Ok(()) => {
                info!("Password changed successfully");
                PasswordChange::succeeded()
            }
            Err(e) => {
                error!("Password change failed: {}", e);
                PasswordChange::failed(&e)
            }
        }
    }

    /// [`change_password`](Self::change_password) with the typed error.
    ///
    /// There is no rollback. If this fails after the new salt has been
    /// written, the old salt is gone and the blob is still sealed under the
    /// old key; the store stays in [`StoreState::Rotating`].
    pub async fn try_change_password(
        &mut self,
        old_password: impl Into<SecretString>,
        new_password: impl Into<SecretString>,
    ) -> Result<()> {
        let old_password = old_password.into();
        let new_password = new_password.into();

        self.ready_key()?;

        let current_salt = salt::load(self.paths.salt()).await?.ok_or_else(|| {
            std::io::Error::new(std::io::ErrorKind::NotFound, "salt file is missing")
        })?;
        let candidate = derive_key_blocking(old_password, current_salt).await?;
        if !candidate.ct_eq(self.ready_key()?) {
            return Err(SoubiError::WrongPassword);
        }
        drop(candidate);

        let plaintext = self
            .read_plaintext()
            .await?
            .ok_or(SoubiError::NothingToReencrypt)?;

        let new_salt = generate_salt();
        let new_key = derive_key_blocking(new_password, new_salt.clone()).await?;

        self.state = StoreState::Rotating;
        self.key = Some(new_key);
        salt::replace(self.paths.salt(), &new_salt).await?;

        let key = self.key.as_ref().ok_or(SoubiError::NotInitialized)?;
        self.seal_blob(key, &plaintext).await?;
        self.state = StoreState::Ready;

        Ok(())
    }
}

impl std::fmt::Debug for EncryptedStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EncryptedStore")
            .field("paths", &self.paths)
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl DocumentAdapter for EncryptedStore {
    async fn read(&self) -> Result<Option<Document>> {
        EncryptedStore::read::<Document>(self).await
    }

    async fn write(&self, document: &Document) -> Result<()> {
        EncryptedStore::write(self, document).await
    }

    fn backend_name(&self) -> &'static str {
        "Encrypted File"
    }
}
