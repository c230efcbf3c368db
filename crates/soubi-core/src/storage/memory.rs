//! In-memory document backend

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{Document, DocumentAdapter};
use crate::error::Result;

/// Unencrypted, non-persistent backend for tests and throwaway sessions
#[derive(Debug, Default)]
pub struct MemoryAdapter {
    document: RwLock<Option<Document>>,
}

impl MemoryAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start with an existing document
    pub fn with_document(document: Document) -> Self {
        Self {
            document: RwLock::new(Some(document)),
        }
    }
}

#[async_trait]
impl DocumentAdapter for MemoryAdapter {
    async fn read(&self) -> Result<Option<Document>> {
        Ok(self.document.read().await.clone())
    }

    async fn write(&self, document: &Document) -> Result<()> {
        *self.document.write().await = Some(document.clone());
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "Memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_read_write() {
        let adapter = MemoryAdapter::new();
        assert_eq!(adapter.read().await.unwrap(), None);

        adapter.write(&json!({"foo": 1})).await.unwrap();
        assert_eq!(adapter.read().await.unwrap(), Some(json!({"foo": 1})));
    }
}
