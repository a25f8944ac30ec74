//! Schema versioning for the item store.
//!
//! The version lives in `PRAGMA user_version`. Opening a store reads it and
//! applies the pending steps inside one `BEGIN IMMEDIATE` transaction, so
//! several processes opening a fresh file at once serialize on the write
//! lock: the first creates the schema and the rest find it current. A file
//! stamped with a version newer than this build is refused untouched.

use super::schema;
use crate::error::{StoreError, StoreResult};
use rusqlite::{Connection, TransactionBehavior, types::Type};
use tracing::{debug, info};

/// Latest schema version understood by this binary.
pub const LATEST_SCHEMA_VERSION: u32 = 1;

/// Step `n` (zero-based) upgrades version `n` to `n + 1`.
const STEPS: &[&str] = &[schema::SCHEMA_V1_SQL];

/// Read `PRAGMA user_version` and convert it to a Rust `u32`.
///
/// # Errors
///
/// Returns an error if querying SQLite fails or the version value cannot be
/// represented as `u32`.
pub fn current_schema_version(conn: &Connection) -> rusqlite::Result<u32> {
    let version: i64 = conn.pragma_query_value(None, "user_version", |row| row.get(0))?;
    u32::try_from(version).map_err(|error| {
        rusqlite::Error::FromSqlConversionFailure(0, Type::Integer, Box::new(error))
    })
}

/// Bring the schema to [`LATEST_SCHEMA_VERSION`] and return it.
///
/// # Errors
///
/// `UnsupportedSchema` when the file is newer than this build, or a storage
/// error if any step fails. Nothing is written in either case.
pub fn migrate(conn: &mut Connection) -> StoreResult<u32> {
    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
    let found = current_schema_version(&tx)?;
    if found > LATEST_SCHEMA_VERSION {
        return Err(StoreError::UnsupportedSchema {
            found,
            supported: LATEST_SCHEMA_VERSION,
        });
    }
    if found == LATEST_SCHEMA_VERSION {
        return Ok(found);
    }

    for (to, sql) in (1u32..).zip(STEPS).filter(|(to, _)| *to > found) {
        tx.execute_batch(sql)?;
        debug!(version = to, "applied schema step");
    }
    tx.pragma_update(None, "user_version", i64::from(LATEST_SCHEMA_VERSION))?;
    tx.commit()?;

    info!(from = found, to = LATEST_SCHEMA_VERSION, "migrated store schema");
    Ok(LATEST_SCHEMA_VERSION)
}
