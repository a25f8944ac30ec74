//! Forced failures inside the reorder transaction.
//!
//! A trigger installed through a second connection makes one of the reorder
//! writes fail (or silently skip). The store must report the failure and
//! leave every position exactly as it was.

use std::path::Path;

use ordo_core::db::DEFAULT_BUSY_TIMEOUT;
use ordo_core::{Item, ItemId, ItemStore, NewItem, StoreError};
use rusqlite::Connection;
use tempfile::TempDir;

fn seeded_store(titles: &[&str]) -> (TempDir, ItemStore, Vec<Item>) {
    let dir = tempfile::tempdir().expect("tempdir");
    let store =
        ItemStore::open_path(&dir.path().join("ordo.db"), DEFAULT_BUSY_TIMEOUT).expect("open");
    let items = titles
        .iter()
        .map(|title| store.insert(&NewItem::titled(*title)).expect("insert"))
        .collect();
    (dir, store, items)
}

/// Install a trigger that acts on position writes to `id`.
fn install_trigger(db: &Path, id: &ItemId, action: &str) {
    let conn = Connection::open(db).expect("open side connection");
    conn.execute_batch(&format!(
        "CREATE TRIGGER inject_fault BEFORE UPDATE OF position ON items
         WHEN OLD.id = '{id}'
         BEGIN SELECT {action}; END;"
    ))
    .expect("install trigger");
}

fn drop_trigger(db: &Path) {
    let conn = Connection::open(db).expect("open side connection");
    conn.execute_batch("DROP TRIGGER inject_fault")
        .expect("drop trigger");
}

#[test]
fn failing_final_write_rolls_back_shift() {
    let (_dir, store, items) = seeded_store(&["A", "B", "C", "D"]);
    let before = store.list_all().expect("list");

    // The shift never touches the moved row, so only the final write fails.
    install_trigger(store.path(), &items[2].id, "RAISE(ABORT, 'injected')");

    let err = store.reorder(&items[2].id, 0).expect_err("injected failure");
    assert!(matches!(err, StoreError::Storage(_)), "unexpected error {err:?}");
    assert!(err.is_storage_failure());
    assert_eq!(store.list_all().expect("list"), before);
    assert!(store.check_density().expect("check").is_dense());

    drop_trigger(store.path());
    store.reorder(&items[2].id, 0).expect("reorder after repair");
    let titles: Vec<String> = store
        .list_all()
        .expect("list")
        .into_iter()
        .map(|item| item.title)
        .collect();
    assert_eq!(titles, vec!["C", "A", "B", "D"]);
}

#[test]
fn failing_shift_leaves_positions_untouched() {
    let (_dir, store, items) = seeded_store(&["A", "B", "C", "D"]);
    let before = store.list_all().expect("list");

    // B sits inside the span shifted by moving D to the front.
    install_trigger(store.path(), &items[1].id, "RAISE(ABORT, 'injected')");

    let err = store.reorder(&items[3].id, 0).expect_err("injected failure");
    assert!(err.is_storage_failure());
    assert_eq!(store.list_all().expect("list"), before);
}

#[test]
fn skipped_final_write_reports_not_found_and_rolls_back() {
    let (_dir, store, items) = seeded_store(&["A", "B", "C"]);
    let before = store.list_all().expect("list");

    // IGNORE drops the row update without an error, as if the row had vanished.
    install_trigger(store.path(), &items[0].id, "RAISE(IGNORE)");

    let err = store.reorder(&items[0].id, 2).expect_err("row skipped");
    assert!(matches!(err, StoreError::NotFound { .. }), "unexpected error {err:?}");
    assert_eq!(store.list_all().expect("list"), before);
}

#[test]
fn failing_compaction_keeps_deleted_row() {
    let (_dir, store, items) = seeded_store(&["A", "B", "C"]);
    let before = store.list_all().expect("list");

    install_trigger(store.path(), &items[2].id, "RAISE(ABORT, 'injected')");

    let err = store.delete(&items[0].id).expect_err("injected failure");
    assert!(err.is_storage_failure());
    assert_eq!(store.list_all().expect("list"), before);
}
