//! SQLite connection utilities for the item store.
//!
//! Runtime defaults:
//! - `journal_mode = WAL` so readers keep a snapshot while a writer holds the lock
//! - `busy_timeout = 5s` so conflicting writers queue instead of failing at once

pub mod migrations;
pub mod schema;

use rusqlite::Connection;
use std::{path::Path, time::Duration};

/// Busy timeout used when the configuration does not set one.
pub const DEFAULT_BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Open (or create) the store database and apply runtime pragmas.
///
/// Does not migrate; see [`open_and_migrate`].
///
/// # Errors
///
/// Returns an error if opening or configuring the connection fails.
pub fn open_connection(path: &Path, busy_timeout: Duration) -> rusqlite::Result<Connection> {
    let conn = Connection::open(path)?;
    configure_connection(&conn, busy_timeout)?;
    Ok(conn)
}

/// Open the store database, creating its directory if needed, and migrate
/// the schema to the latest version.
///
/// # Errors
///
/// Returns an error if the directory cannot be created or opening,
/// configuring, or migrating the database fails.
pub fn open_and_migrate(path: &Path, busy_timeout: Duration) -> crate::StoreResult<Connection> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let mut conn = open_connection(path, busy_timeout)?;
    migrations::migrate(&mut conn)?;
    Ok(conn)
}

fn configure_connection(conn: &Connection, busy_timeout: Duration) -> rusqlite::Result<()> {
    // Set first so the pragmas below also wait on a locked file.
    conn.busy_timeout(busy_timeout)?;
    conn.pragma_update(None, "synchronous", "NORMAL")?;
    let _journal_mode: String =
        conn.query_row("PRAGMA journal_mode = WAL", [], |row| row.get(0))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{DEFAULT_BUSY_TIMEOUT, open_and_migrate};
    use crate::db::migrations;
    use tempfile::TempDir;

    fn temp_db_path() -> (TempDir, std::path::PathBuf) {
        let dir = tempfile::tempdir().expect("create temp dir");
        let path = dir.path().join("nested").join("ordo.db");
        (dir, path)
    }

    #[test]
    fn open_sets_wal_and_busy_timeout() {
        let (_dir, path) = temp_db_path();
        let conn = open_and_migrate(&path, DEFAULT_BUSY_TIMEOUT).expect("open store db");

        let journal_mode: String = conn
            .pragma_query_value(None, "journal_mode", |row| row.get(0))
            .expect("query journal_mode");
        assert_eq!(journal_mode.to_ascii_lowercase(), "wal");

        let busy_timeout_ms: u64 = conn
            .pragma_query_value(None, "busy_timeout", |row| row.get(0))
            .expect("query busy_timeout");
        assert_eq!(
            u128::from(busy_timeout_ms),
            DEFAULT_BUSY_TIMEOUT.as_millis()
        );
    }

    #[test]
    fn open_creates_parent_dir_and_migrates() {
        let (_dir, path) = temp_db_path();
        let conn = open_and_migrate(&path, DEFAULT_BUSY_TIMEOUT).expect("open store db");
        assert!(path.exists());

        let version = migrations::current_schema_version(&conn).expect("schema version query");
        assert_eq!(version, migrations::LATEST_SCHEMA_VERSION);
    }
}
