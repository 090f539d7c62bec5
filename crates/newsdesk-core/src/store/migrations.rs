//! Schema migrations for the local document store
//!
//! Applied migrations are recorded by name in `schema_migrations`. Each
//! pending migration runs in its own transaction together with its record.

use crate::error::Result;
use rusqlite::Connection;
use std::collections::HashSet;
use tracing::{debug, info};

struct Migration {
    name: &'static str,
    sql: &'static str,
}

const MIGRATIONS: &[Migration] = &[Migration {
    name: "001_documents",
    // `seq` keeps insertion order for listings.
    sql: r#"
        CREATE TABLE IF NOT EXISTS documents (
            seq INTEGER PRIMARY KEY AUTOINCREMENT,
            collection TEXT NOT NULL,
            id TEXT NOT NULL,
            fields TEXT NOT NULL,
            stored_at TEXT NOT NULL,
            UNIQUE (collection, id)
        );
        CREATE INDEX IF NOT EXISTS idx_documents_collection ON documents(collection, seq);
    "#,
}];

/// Bring the schema up to date
pub fn run_migrations(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS schema_migrations (
            name TEXT PRIMARY KEY,
            applied_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
        );",
    )?;

    let applied = applied_names(conn)?;
    let pending: Vec<&Migration> = MIGRATIONS
        .iter()
        .filter(|m| !applied.contains(m.name))
        .collect();

    if pending.is_empty() {
        debug!("Schema is current ({} migrations)", applied.len());
        return Ok(());
    }

    for migration in pending {
        let tx = conn.unchecked_transaction()?;
        tx.execute_batch(migration.sql)?;
        tx.execute(
            "INSERT INTO schema_migrations (name) VALUES (?1)",
            [migration.name],
        )?;
        tx.commit()?;
        info!("Applied migration {}", migration.name);
    }
    Ok(())
}

fn applied_names(conn: &Connection) -> Result<HashSet<String>> {
    let mut stmt = conn.prepare("SELECT name FROM schema_migrations")?;
    let names = stmt
        .query_map([], |row| row.get::<_, String>(0))?
        .collect::<rusqlite::Result<HashSet<_>>>()?;
    Ok(names)
}
