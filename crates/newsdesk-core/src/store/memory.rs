//! In-memory document store

use super::DocumentStore;
use crate::error::{Result, StoreError};
use crate::types::{Document, Fields};
use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::HashMap;

/// Process-local store with the same semantics as `SqliteStore`
#[derive(Default)]
pub struct MemoryStore {
    collections: RwLock<HashMap<String, Vec<Document>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a collection with existing documents
    pub fn with_documents(collection: impl Into<String>, docs: Vec<Document>) -> Self {
        let store = Self::new();
        store.collections.write().insert(collection.into(), docs);
        store
    }

    /// Number of documents in a collection
    pub fn len(&self, collection: &str) -> usize {
        self.collections
            .read()
            .get(collection)
            .map(Vec::len)
            .unwrap_or(0)
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn list_all(&self, collection: &str) -> Result<Vec<Document>> {
        Ok(self
            .collections
            .read()
            .get(collection)
            .cloned()
            .unwrap_or_default())
    }

    async fn create(&self, collection: &str, fields: Fields) -> Result<String> {
        let id = uuid::Uuid::new_v4().to_string();
        self.collections
            .write()
            .entry(collection.to_string())
            .or_default()
            .push(Document::new(id.clone(), fields));
        Ok(id)
    }

    async fn delete(&self, collection: &str, id: &str) -> Result<()> {
        let mut collections = self.collections.write();
        let docs = collections
            .get_mut(collection)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;

        let before = docs.len();
        docs.retain(|d| d.id != id);
        if docs.len() == before {
            return Err(StoreError::NotFound(id.to_string()).into());
        }
        Ok(())
    }
}
