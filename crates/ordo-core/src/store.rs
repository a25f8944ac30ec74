//! The ordered item store.
//!
//! [`ItemStore`] owns the `items` table. It holds no connection between
//! calls: every operation opens a configured connection, does its work, and
//! drops it, so a handle can be shared across threads (`&ItemStore` is
//! `Sync`) and each thread gets its own connection.
//!
//! # Isolation
//!
//! Operations that read before they write (`insert`, `patch`, `reorder`,
//! `delete`, `renumber`) run in `BEGIN IMMEDIATE` transactions. SQLite hands out the
//! single write lock at `BEGIN`, so the count and position reads of one
//! reorder can never interleave with the writes of another; conflicting
//! writers wait up to the busy timeout and then fail with a storage error.
//! Dropping an uncommitted `rusqlite::Transaction` rolls it back, so every early
//! return leaves the table untouched.

use rusqlite::{Connection, OptionalExtension, Row, TransactionBehavior, params};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{Level, debug, debug_span, info, trace, warn};

use crate::config::StoreConfig;
use crate::db;
use crate::error::{StoreError, StoreResult};
use crate::model::item::{Item, ItemId, ItemPatch, NewItem};
use crate::shift::Shift;

const SELECT_ITEM_COLUMNS: &str = "SELECT id, title, description, completed, position FROM items";

/// Handle to an ordered item store backed by one SQLite file.
#[derive(Debug, Clone)]
pub struct ItemStore {
    path: PathBuf,
    busy_timeout: Duration,
}

/// Result of a density check over all stored positions.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DensityReport {
    /// Number of items.
    pub len: usize,
    /// Positions held by more than one item.
    pub duplicates: Vec<u32>,
    /// Positions in `0..len` held by no item.
    pub gaps: Vec<u32>,
}

impl DensityReport {
    /// True when positions are exactly `0..len`.
    #[must_use]
    pub fn is_dense(&self) -> bool {
        self.duplicates.is_empty() && self.gaps.is_empty()
    }

    fn from_sorted_positions(positions: &[u32]) -> Self {
        let len = positions.len();
        let mut duplicates = Vec::new();
        for pair in positions.windows(2) {
            if pair[0] == pair[1] && duplicates.last() != Some(&pair[0]) {
                duplicates.push(pair[0]);
            }
        }

        let gaps = (0..len)
            .filter_map(|rank| u32::try_from(rank).ok())
            .filter(|rank| positions.binary_search(rank).is_err())
            .collect();

        Self {
            len,
            duplicates,
            gaps,
        }
    }
}

impl ItemStore {
    /// Open the store described by `config`, creating and migrating the
    /// database file as needed.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the file cannot be created, opened, or
    /// migrated.
    pub fn open(config: &StoreConfig) -> StoreResult<Self> {
        Self::open_path(&config.path, config.busy_timeout())
    }

    /// Open a store at an explicit path.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the file cannot be created, opened, or
    /// migrated.
    pub fn open_path(path: &Path, busy_timeout: Duration) -> StoreResult<Self> {
        let conn = db::open_and_migrate(path, busy_timeout)?;
        drop(conn);
        info!(path = %path.display(), "opened item store");
        Ok(Self {
            path: path.to_path_buf(),
            busy_timeout,
        })
    }

    /// Path of the backing database file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn connect(&self) -> StoreResult<Connection> {
        Ok(db::open_connection(&self.path, self.busy_timeout)?)
    }

    /// Checkpoint the write-ahead log and release the handle.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the checkpoint fails.
    pub fn shutdown(self) -> StoreResult<()> {
        let conn = self.connect()?;
        conn.query_row("PRAGMA wal_checkpoint(TRUNCATE)", [], |_| Ok(()))?;
        info!(path = %self.path.display(), "closed item store");
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Reads
    // -----------------------------------------------------------------------

    /// All items, ascending by position.
    ///
    /// Ties (which only a damaged table can contain) break by id so the
    /// listing is deterministic.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the query fails.
    pub fn list_all(&self) -> StoreResult<Vec<Item>> {
        let conn = self.connect()?;
        list_items(&conn)
    }

    /// Fetch one item. Absence is `Ok(None)`, never an error.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the query fails.
    pub fn get(&self, id: &ItemId) -> StoreResult<Option<Item>> {
        let conn = self.connect()?;
        fetch_item(&conn, id)
    }

    /// Number of stored items.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the query fails.
    pub fn len(&self) -> StoreResult<usize> {
        let conn = self.connect()?;
        count_items(&conn)
    }

    /// True when the store holds no items.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the query fails.
    pub fn is_empty(&self) -> StoreResult<bool> {
        Ok(self.len()? == 0)
    }

    // -----------------------------------------------------------------------
    // Writes
    // -----------------------------------------------------------------------

    /// Append a new item at the tail with a freshly generated id.
    ///
    /// The tail rank is `max(position) + 1`, or `0` for an empty list.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the write fails; nothing is persisted.
    pub fn insert(&self, new_item: &NewItem) -> StoreResult<Item> {
        let mut conn = self.connect()?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        let position: u32 = tx.query_row(
            "SELECT COALESCE(MAX(position) + 1, 0) FROM items",
            [],
            |row| row.get(0),
        )?;

        let item = Item {
            id: ItemId::generate(),
            title: new_item.title.clone(),
            description: new_item.description.clone(),
            completed: new_item.completed,
            position,
        };

        tx.execute(
            "INSERT INTO items (id, title, description, completed, position)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                item.id.as_str(),
                item.title,
                item.description,
                item.completed,
                item.position
            ],
        )?;
        tx.commit()?;

        debug!(item_id = %item.id, position, "inserted item");
        Ok(item)
    }

    /// Overwrite title, description, completion and position of the row
    /// whose id matches `item.id`.
    ///
    /// Returns `false` when no row matched. This call does not maintain rank
    /// density and is not atomic with any earlier read; content edits go
    /// through [`Self::patch`] and moves through [`Self::reorder`].
    ///
    /// # Errors
    ///
    /// Returns a storage error if the write fails.
    pub fn update(&self, item: &Item) -> StoreResult<bool> {
        let conn = self.connect()?;
        let changed = conn.execute(
            "UPDATE items SET title = ?1, description = ?2, completed = ?3, position = ?4
             WHERE id = ?5",
            params![
                item.title,
                item.description,
                item.completed,
                item.position,
                item.id.as_str()
            ],
        )?;
        debug!(item_id = %item.id, changed, "updated item");
        Ok(changed > 0)
    }

    /// Apply a content patch to one item and return the stored result.
    ///
    /// The row is read and rewritten inside one IMMEDIATE transaction and the
    /// `UPDATE` never names `position`, so a concurrent reorder, insert or
    /// delete is never undone by an edit. Returns `Ok(None)`, with no writes,
    /// when the id is absent.
    ///
    /// # Errors
    ///
    /// Returns a storage error if any step fails; the transaction is rolled
    /// back.
    pub fn patch(&self, id: &ItemId, patch: &ItemPatch) -> StoreResult<Option<Item>> {
        let mut conn = self.connect()?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        let Some(mut item) = fetch_item(&tx, id)? else {
            return Ok(None);
        };
        patch.apply_to(&mut item);

        let changed = tx.execute(
            "UPDATE items SET title = ?1, description = ?2, completed = ?3 WHERE id = ?4",
            params![item.title, item.description, item.completed, id.as_str()],
        )?;
        if changed == 0 {
            return Ok(None);
        }
        tx.commit()?;

        debug!(item_id = %id, position = item.position, "patched item");
        Ok(Some(item))
    }

    /// Remove an item and close the gap it leaves.
    ///
    /// Every item ranked after the removed one moves back by one inside the
    /// same transaction, so positions stay `0..N-1`. Returns `false`, with no
    /// writes, when the id is absent.
    ///
    /// # Errors
    ///
    /// Returns a storage error if any step fails; the transaction is rolled
    /// back.
    pub fn delete(&self, id: &ItemId) -> StoreResult<bool> {
        let mut conn = self.connect()?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        let Some(position) = current_position(&tx, id)? else {
            return Ok(false);
        };

        let removed = tx.execute("DELETE FROM items WHERE id = ?1", params![id.as_str()])?;
        if removed == 0 {
            return Ok(false);
        }
        let compacted = tx.execute(
            "UPDATE items SET position = position - 1 WHERE position > ?1",
            params![position],
        )?;
        tx.commit()?;

        debug!(item_id = %id, position, compacted, "deleted item");
        Ok(true)
    }

    /// Move one item to rank `new_position`, shifting the items in between
    /// by one step to keep ranks dense.
    ///
    /// Runs as a single transaction:
    /// 1. count items (`EmptyList` if there are none)
    /// 2. reject `new_position` outside `0..N` with `InvalidPosition`
    /// 3. read the item's current rank (`NotFound` if absent)
    /// 4. commit at once if the rank is unchanged
    /// 5. shift the span between the old and new rank
    /// 6. write the new rank (`NotFound` if the row vanished)
    ///
    /// On any error the transaction is dropped uncommitted, so no shift is
    /// ever observable without the final write.
    ///
    /// # Errors
    ///
    /// `NotFound`, `InvalidPosition`, `EmptyList`, or a storage error.
    pub fn reorder(&self, id: &ItemId, new_position: i64) -> StoreResult<()> {
        let span = debug_span!("reorder", item_id = %id, target = new_position);
        let _entered = span.enter();

        let mut conn = self.connect()?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        let len = count_items(&tx)?;
        if len == 0 {
            warn!("reorder requested on an empty list");
            return Err(StoreError::EmptyList);
        }

        let target = u32::try_from(new_position)
            .ok()
            .filter(|target| (*target as usize) < len)
            .ok_or(StoreError::InvalidPosition {
                position: new_position,
                len,
            })?;

        let current = current_position(&tx, id)?.ok_or_else(|| StoreError::NotFound {
            id: id.to_string(),
        })?;

        let shift = Shift::plan(current, target);
        if let Some((sql, low, high)) = shift.statement() {
            if tracing::enabled!(Level::TRACE) {
                trace!(before = ?ordered_titles(&tx)?, "positions before reorder");
            }
            let shifted = tx.execute(sql, params![low, high])?;
            debug!(
                direction = shift.direction(),
                current,
                target,
                width = shift.span(),
                shifted,
                "shifted neighbouring items"
            );

            let updated = tx.execute(
                "UPDATE items SET position = ?1 WHERE id = ?2",
                params![target, id.as_str()],
            )?;
            if updated == 0 {
                warn!("item vanished before its position was written; rolling back");
                return Err(StoreError::NotFound { id: id.to_string() });
            }
            if tracing::enabled!(Level::TRACE) {
                trace!(after = ?ordered_titles(&tx)?, "positions after reorder");
            }
        } else {
            debug!(current, "item already at target position");
        }

        tx.commit()?;
        Ok(())
    }

    /// Report duplicated and missing positions.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the query fails.
    pub fn check_density(&self) -> StoreResult<DensityReport> {
        let conn = self.connect()?;
        let mut stmt = conn.prepare("SELECT position FROM items ORDER BY position")?;
        let positions = stmt
            .query_map([], |row| row.get::<_, u32>(0))?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(DensityReport::from_sorted_positions(&positions))
    }

    /// Rewrite positions to `0..N-1`, keeping the current `(position, id)`
    /// order. Returns how many rows changed.
    ///
    /// # Errors
    ///
    /// Returns a storage error if any step fails; the transaction is rolled
    /// back.
    pub fn renumber(&self) -> StoreResult<usize> {
        let mut conn = self.connect()?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        let rows = ranked_ids(&tx)?;

        let mut changed = 0;
        {
            let mut stmt = tx.prepare("UPDATE items SET position = ?1 WHERE id = ?2")?;
            for (rank, (id, position)) in (0u32..).zip(rows.iter()) {
                if *position != rank {
                    changed += stmt.execute(params![rank, id])?;
                }
            }
        }
        tx.commit()?;

        if changed > 0 {
            info!(changed, "renumbered item positions");
        }
        Ok(changed)
    }
}

fn row_to_item(row: &Row<'_>) -> rusqlite::Result<Item> {
    let id: String = row.get(0)?;
    let id = ItemId::parse(&id).map_err(|error| {
        rusqlite::Error::FromSqlConversionFailure(0, rusqlite::types::Type::Text, Box::new(error))
    })?;
    Ok(Item {
        id,
        title: row.get(1)?,
        description: row.get(2)?,
        completed: row.get(3)?,
        position: row.get(4)?,
    })
}

fn list_items(conn: &Connection) -> StoreResult<Vec<Item>> {
    let mut stmt = conn.prepare(&format!("{SELECT_ITEM_COLUMNS} ORDER BY position, id"))?;
    let items = stmt
        .query_map([], row_to_item)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(items)
}

fn fetch_item(conn: &Connection, id: &ItemId) -> StoreResult<Option<Item>> {
    let item = conn
        .query_row(
            &format!("{SELECT_ITEM_COLUMNS} WHERE id = ?1"),
            params![id.as_str()],
            row_to_item,
        )
        .optional()?;
    Ok(item)
}

fn count_items(conn: &Connection) -> StoreResult<usize> {
    let count: i64 = conn.query_row("SELECT COUNT(*) FROM items", [], |row| row.get(0))?;
    Ok(usize::try_from(count).unwrap_or_default())
}

fn current_position(conn: &Connection, id: &ItemId) -> StoreResult<Option<u32>> {
    let position = conn
        .query_row(
            "SELECT position FROM items WHERE id = ?1",
            params![id.as_str()],
            |row| row.get(0),
        )
        .optional()?;
    Ok(position)
}

fn ranked_ids(conn: &Connection) -> StoreResult<Vec<(String, u32)>> {
    let mut stmt = conn.prepare("SELECT id, position FROM items ORDER BY position, id")?;
    let rows = stmt
        .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(rows)
}

fn ordered_titles(conn: &Connection) -> StoreResult<Vec<(u32, String)>> {
    let mut stmt = conn.prepare("SELECT position, title FROM items ORDER BY position, id")?;
    let rows = stmt
        .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(rows)
}
