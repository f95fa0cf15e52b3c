// Storage layer — users, articles, comments and the engagement rows that link them.
//
// Two backends implement the DataStore trait: MemStore keeps everything in
// process memory and is lost on exit; SqliteStore persists to a file through
// rusqlite with the "bundled" feature, so there's no system SQLite dependency.

pub mod error;
pub mod memory;
pub mod models;
pub mod seed;
pub mod table;
pub mod traits;

#[cfg(feature = "sqlite")]
pub mod queries;
#[cfg(feature = "sqlite")]
pub mod schema;
#[cfg(feature = "sqlite")]
pub mod sqlite;

use std::sync::Arc;

pub use error::{StoreError, StoreResult};
pub use memory::MemStore;
pub use traits::DataStore;

#[cfg(feature = "sqlite")]
pub use sqlite::SqliteStore;

/// An in-memory store, optionally preloaded with the sample users and articles.
pub fn open_memory(seed: bool) -> Arc<dyn DataStore> {
    if seed {
        Arc::new(MemStore::seeded())
    } else {
        Arc::new(MemStore::new())
    }
}

/// Open (or create) the SQLite database and run migrations.
///
/// Called by `quillspace init` and by `serve` when the sqlite backend is chosen.
#[cfg(feature = "sqlite")]
pub fn initialize_sqlite(db_path: &str) -> anyhow::Result<Arc<dyn DataStore>> {
    let conn = initialize(db_path)?;
    Ok(Arc::new(SqliteStore::new(conn)))
}

/// Open an existing SQLite database (fails if it doesn't exist yet).
#[cfg(feature = "sqlite")]
pub fn open_sqlite(db_path: &str) -> anyhow::Result<Arc<dyn DataStore>> {
    let conn = open(db_path)?;
    Ok(Arc::new(SqliteStore::new(conn)))
}

#[cfg(feature = "sqlite")]
fn initialize(db_path: &str) -> anyhow::Result<rusqlite::Connection> {
    use anyhow::Context;
    use std::path::Path;

    // Create parent directories if needed
    if let Some(parent) = Path::new(db_path).parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory for database: {db_path}"))?;
        }
    }

    let conn = rusqlite::Connection::open(db_path)
        .with_context(|| format!("Failed to open database at {db_path}"))?;

    // WAL keeps readers from blocking behind a writer
    conn.pragma_update(None, "journal_mode", "WAL")?;
    schema::configure(&conn)?;

    schema::create_tables(&conn)?;

    Ok(conn)
}

#[cfg(feature = "sqlite")]
fn open(db_path: &str) -> anyhow::Result<rusqlite::Connection> {
    use anyhow::Context;
    use std::path::Path;

    if !Path::new(db_path).exists() {
        anyhow::bail!(
            "Database not found at {}. Run `quillspace init` first.",
            db_path
        );
    }

    let conn = rusqlite::Connection::open(db_path)
        .with_context(|| format!("Failed to open database at {db_path}"))?;

    conn.pragma_update(None, "journal_mode", "WAL")?;
    schema::configure(&conn)?;

    Ok(conn)
}
