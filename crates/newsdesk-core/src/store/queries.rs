//! Database query implementations

use crate::error::{Result, StoreError};
use crate::types::{Document, Fields};
use rusqlite::{params, Connection};

// ===== Document Queries =====

/// Insert a new document
pub fn insert_document(conn: &Connection, collection: &str, id: &str, fields: &Fields) -> Result<()> {
    conn.execute(
        r#"
        INSERT INTO documents (collection, id, fields, stored_at)
        VALUES (?, ?, ?, ?)
        "#,
        params![
            collection,
            id,
            serde_json::to_string(fields)?,
            chrono::Utc::now().to_rfc3339(),
        ],
    )?;

    Ok(())
}

/// List every document of a collection in insertion order
pub fn list_documents(conn: &Connection, collection: &str) -> Result<Vec<Document>> {
    let mut stmt = conn.prepare(
        r#"
        SELECT id, fields
        FROM documents
        WHERE collection = ?
        ORDER BY seq
        "#,
    )?;

    let rows = stmt
        .query_map(params![collection], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    rows.into_iter()
        .map(|(id, raw)| -> Result<Document> {
            let fields: Fields = serde_json::from_str(&raw).map_err(|e| {
                StoreError::Malformed(format!("{}/{}: {}", collection, id, e))
            })?;
            Ok(Document::new(id, fields))
        })
        .collect()
}

/// Delete a document, returning whether it existed
pub fn delete_document(conn: &Connection, collection: &str, id: &str) -> Result<bool> {
    let removed = conn.execute(
        "DELETE FROM documents WHERE collection = ? AND id = ?",
        params![collection, id],
    )?;
    Ok(removed > 0)
}

/// Number of documents in a collection
#[cfg(test)]
pub(crate) fn count_documents(conn: &Connection, collection: &str) -> Result<usize> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM documents WHERE collection = ?",
        params![collection],
        |row| row.get(0),
    )?;
    Ok(count as usize)
}
