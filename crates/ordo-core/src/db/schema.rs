//! SQLite schema for the ordered item store.
//!
//! One row per item in `items`. `position` is the item's zero-based rank and
//! carries no UNIQUE constraint: a range shift passes through duplicate
//! positions mid-statement. Density is kept by the store's transactions.

/// Schema version 1: the items table and the index that ordered listing
/// and range shifts scan.
pub const SCHEMA_V1_SQL: &str = r"
CREATE TABLE IF NOT EXISTS items (
    id TEXT PRIMARY KEY,
    title TEXT NOT NULL CHECK (length(trim(title)) > 0),
    description TEXT,
    completed INTEGER NOT NULL DEFAULT 0 CHECK (completed IN (0, 1)),
    position INTEGER NOT NULL CHECK (position >= 0),
    CHECK (length(id) = 36)
);

CREATE INDEX IF NOT EXISTS idx_items_position
    ON items(position, id);
";

/// Indexes that must exist once the schema is current.
pub const REQUIRED_INDEXES: &[&str] = &["idx_items_position"];
