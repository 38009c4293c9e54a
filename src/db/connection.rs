//! Opening the book database and creating its schema.

use std::fs;
use std::path::Path;

use log::info;
use rusqlite::Connection;

use crate::store::PersistenceError;

/// Open (creating if needed) the book database at `path` and make sure the
/// schema exists.
pub fn open_database(path: &Path) -> Result<Connection, PersistenceError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|source| PersistenceError::DataDir {
            path: parent.to_path_buf(),
            source,
        })?;
    }

    let conn = Connection::open(path).map_err(|source| PersistenceError::Open {
        path: path.to_path_buf(),
        source,
    })?;
    ensure_schema(&conn)?;
    info!(
        "event=db_open module=db status=ok path={}",
        path.display()
    );
    Ok(conn)
}

/// In-memory database with the same schema, for tests and throwaway runs.
pub fn open_in_memory() -> Result<Connection, PersistenceError> {
    let conn = Connection::open_in_memory().map_err(|source| PersistenceError::Open {
        path: ":memory:".into(),
        source,
    })?;
    ensure_schema(&conn)?;
    Ok(conn)
}

/// Create the `books` table when missing. Every column but the key is
/// nullable because new books start out blank.
pub fn ensure_schema(conn: &Connection) -> Result<(), PersistenceError> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS books (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            title TEXT,
            author TEXT,
            year TEXT,
            note TEXT
        )",
        [],
    )
    .map_err(PersistenceError::Schema)?;
    Ok(())
}
