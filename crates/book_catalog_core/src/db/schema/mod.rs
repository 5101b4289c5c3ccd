//! Catalog schema bootstrap.
//!
//! # Responsibility
//! - Create the `books` table and its ISBN uniqueness index.
//! - Stamp `PRAGMA user_version` with the schema version.
//!
//! # Invariants
//! - Bootstrap is idempotent for databases already at `SCHEMA_VERSION`.
//! - The ISBN uniqueness constraint lives in the storage layer, not only in
//!   the store.

use crate::db::{DbError, DbResult};
use rusqlite::Connection;

/// Schema version written by this binary.
pub const SCHEMA_VERSION: u32 = 1;

const SCHEMA_SQL: &str = include_str!("0001_books.sql");

/// Creates the schema on a fresh database, or verifies an existing one.
pub fn ensure_schema(conn: &mut Connection) -> DbResult<()> {
    let current_version = current_user_version(conn)?;

    if current_version > SCHEMA_VERSION {
        return Err(DbError::SchemaTooNew {
            found: current_version,
            readable_up_to: SCHEMA_VERSION,
        });
    }

    if current_version == SCHEMA_VERSION {
        return Ok(());
    }

    let tx = conn.transaction()?;
    tx.execute_batch(SCHEMA_SQL)?;
    tx.execute_batch(&format!("PRAGMA user_version = {SCHEMA_VERSION};"))?;
    tx.commit()?;

    Ok(())
}

/// Reads the schema version stamped on the connection.
pub fn current_user_version(conn: &Connection) -> DbResult<u32> {
    let version = conn.query_row("PRAGMA user_version;", [], |row| row.get::<_, u32>(0))?;
    Ok(version)
}
