//! SQLite-backed document store

use super::{delete_document, insert_document, list_documents, run_migrations, DocumentStore};
use crate::error::{Result, StoreError};
use crate::types::{Document, Fields};
use async_trait::async_trait;
use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::Connection;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Pooled SQLite connections
pub type DbPool = Pool<SqliteConnectionManager>;

const DB_FILE: &str = "newsdesk.db";

/// Local document store kept in a SQLite database
pub struct SqliteStore {
    pool: DbPool,
    location: PathBuf,
}

impl SqliteStore {
    /// Open `newsdesk.db` inside `data_dir`, creating the directory if needed
    pub fn open_in(data_dir: impl AsRef<Path>) -> Result<Self> {
        Self::from_path(data_dir.as_ref().join(DB_FILE))
    }

    /// Open (or create) a database file and bring its schema up to date
    pub fn from_path(location: PathBuf) -> Result<Self> {
        match location.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => std::fs::create_dir_all(dir)?,
            _ => {}
        }
        let builder = Pool::builder().max_size(4);
        Self::with_pool(builder, SqliteConnectionManager::file(&location), location)
    }

    /// A private database that lives as long as the store.
    ///
    /// Each SQLite memory connection is a separate database, so the pool
    /// holds exactly one connection and never retires it.
    pub fn in_memory() -> Result<Self> {
        let builder = Pool::builder()
            .max_size(1)
            .idle_timeout(None)
            .max_lifetime(None);
        Self::with_pool(
            builder,
            SqliteConnectionManager::memory(),
            PathBuf::from(":memory:"),
        )
    }

    fn with_pool(
        builder: r2d2::Builder<SqliteConnectionManager>,
        manager: SqliteConnectionManager,
        location: PathBuf,
    ) -> Result<Self> {
        let pool = builder
            .build(manager)
            .map_err(|e| StoreError::Pool(format!("{}: {}", location.display(), e)))?;

        let conn = pool.get()?;
        run_migrations(&conn).map_err(|e| StoreError::MigrationFailed(e.to_string()))?;
        drop(conn);

        info!("Opened document store at {}", location.display());
        Ok(Self { pool, location })
    }

    /// Database file, or `:memory:`
    pub fn location(&self) -> &Path {
        &self.location
    }

    /// Run a query on a pooled connection off the async executor
    async fn with_connection<T, F>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Connection) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let conn = pool.get()?;
            f(&conn)
        })
        .await?
    }
}

#[async_trait]
impl DocumentStore for SqliteStore {
    async fn list_all(&self, collection: &str) -> Result<Vec<Document>> {
        let collection = collection.to_string();
        let docs = self
            .with_connection(move |conn| list_documents(conn, &collection))
            .await?;
        debug!("Listed {} documents", docs.len());
        Ok(docs)
    }

    async fn create(&self, collection: &str, fields: Fields) -> Result<String> {
        let collection = collection.to_string();
        let id = uuid::Uuid::new_v4().to_string();
        let new_id = id.clone();
        self.with_connection(move |conn| insert_document(conn, &collection, &new_id, &fields))
            .await?;
        debug!("Created document {}", id);
        Ok(id)
    }

    async fn delete(&self, collection: &str, id: &str) -> Result<()> {
        let collection = collection.to_string();
        let target = id.to_string();
        let existed = self
            .with_connection(move |conn| delete_document(conn, &collection, &target))
            .await?;

        if !existed {
            return Err(StoreError::NotFound(id.to_string()).into());
        }
        debug!("Deleted document {}", id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::NewsDraft;

    #[test]
    fn test_in_memory_store() {
        let store = SqliteStore::in_memory().unwrap();
        assert_eq!(store.location(), Path::new(":memory:"));
    }

    #[tokio::test]
    async fn test_create_list_delete() {
        let store = SqliteStore::in_memory().unwrap();
        let fields = NewsDraft::new("Good news", "Something nice happened", "u1").into_fields();

        let id = store.create("news", fields.clone()).await.unwrap();
        let docs = store.list_all("news").await.unwrap();
        assert_eq!(docs, vec![Document::new(id.clone(), fields)]);

        store.delete("news", &id).await.unwrap();
        assert!(store.list_all("news").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_delete_unknown_is_not_found() {
        let store = SqliteStore::in_memory().unwrap();
        let err = store.delete("news", "missing").await.unwrap_err();
        assert!(matches!(err, crate::Error::Store(StoreError::NotFound(id)) if id == "missing"));
    }

    #[tokio::test]
    async fn test_file_store_persists_across_reopen() {
        let dir = tempfile::tempdir().unwrap();

        let id = {
            let store = SqliteStore::open_in(dir.path()).unwrap();
            store.create("news", Fields::new()).await.unwrap()
        };

        let reopened = SqliteStore::open_in(dir.path()).unwrap();
        let docs = reopened.list_all("news").await.unwrap();
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].id, id);
        assert!(reopened.location().ends_with("newsdesk.db"));
    }
}
