//! Connection setup for the SQLite backend.
//!
//! The schema mirrors the ownership tree: `maintenances` → `settings` →
//! `setting_items` → `data_variants`, each child row holding a non-null
//! foreign key to its owner. [`SqliteStore`](crate::SqliteStore) deletes
//! children explicitly; the `ON DELETE CASCADE` clauses are a backstop that
//! only fires when `foreign_keys` is on, which every connection opened here
//! guarantees. `AUTOINCREMENT` keeps deleted ids from being handed out again.

use rusqlite::Connection;
use rusqlite_migration::{Migrations, M};

use crate::error::StorageError;

/// Per-connection settings. `foreign_keys` must be on for the cascade
/// backstop and the parent checks on insert.
const PRAGMAS: [(&str, &str); 3] = [
    ("journal_mode", "WAL"),
    ("synchronous", "NORMAL"),
    ("foreign_keys", "ON"),
];

fn migrations() -> Migrations<'static> {
    Migrations::new(vec![M::up(include_str!(
        "migrations/001_initial_schema.sql"
    ))])
}

/// Opens (or creates) the database file at `path` and brings its schema
/// up to date.
pub fn open_database(path: &str) -> Result<Connection, StorageError> {
    prepare(Connection::open(path)?)
}

/// Opens a private in-memory database with the current schema.
pub fn open_in_memory() -> Result<Connection, StorageError> {
    prepare(Connection::open_in_memory()?)
}

fn prepare(mut conn: Connection) -> Result<Connection, StorageError> {
    for (name, value) in PRAGMAS {
        conn.pragma_update(None, name, value)?;
    }
    migrations()
        .to_latest(&mut conn)
        .map_err(|e| StorageError::Migration(e.to_string()))?;
    Ok(conn)
}
