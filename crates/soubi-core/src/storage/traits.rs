//! Storage trait definitions

use crate::error::Result;
use async_trait::async_trait;

/// Plaintext document tree handed between the inventory layer and a backend
pub type Document = serde_json::Value;

/// Backend that persists a whole document at a time
#[async_trait]
pub trait DocumentAdapter: Send + Sync {
    /// Load the stored document, `None` when nothing has been written yet
    async fn read(&self) -> Result<Option<Document>>;

    /// Replace the stored document
    async fn write(&self, document: &Document) -> Result<()>;

    /// Get a human-readable name for this backend
    fn backend_name(&self) -> &'static str;
}
