//! Document store collaborators
//!
//! This module provides:
//! - The `DocumentStore` trait the news panel talks to
//! - A SQLite-backed local store (migrations, queries, connection pooling)
//! - An in-memory store for tests and throwaway sessions
//! - A client for the hosted Firestore REST API

mod firestore;
mod memory;
mod migrations;
mod queries;
mod sqlite;

pub use firestore::{FirestoreConfig, FirestoreStore};
pub use memory::MemoryStore;
pub use migrations::run_migrations;
pub use queries::*;
pub use sqlite::{DbPool, SqliteStore};

use crate::error::Result;
use crate::types::{Document, Fields};
use async_trait::async_trait;

/// A store of schemaless documents grouped into named collections
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Every document of a collection, in the store's own order
    async fn list_all(&self, collection: &str) -> Result<Vec<Document>>;

    /// Add a document and return the identifier the store assigned
    async fn create(&self, collection: &str, fields: Fields) -> Result<String>;

    /// Remove one document
    async fn delete(&self, collection: &str, id: &str) -> Result<()>;
}
