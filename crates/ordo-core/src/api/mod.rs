//! Transport-agnostic request layer.
//!
//! [`Handler`] maps each client operation onto one or two [`ItemStore`]
//! calls and folds the outcome into an [`Envelope`] carrying an HTTP-style
//! status. Identifiers and bodies are validated here, before the store is
//! touched. Storage failures are logged in full and reported with a generic
//! message only.

pub mod validate;

use serde::Serialize;
use tracing::{error, info, warn};

use crate::error::{ErrorCode, StoreError};
use crate::model::item::{Item, ItemId, ItemPatch, NewItem};
use crate::store::ItemStore;
use validate::{CreateItem, ReorderItem, UpdateItem, ValidationError};

/// Response data: one item or the full ordered list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Payload {
    Item(Item),
    Items(Vec<Item>),
}

/// Response envelope: `{status, message, data}` plus an error code on failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Envelope {
    pub status: u16,
    pub message: String,
    pub data: Option<Payload>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_code: Option<ErrorCode>,
}

impl Envelope {
    fn ok(status: u16, message: impl Into<String>, data: Option<Payload>) -> Self {
        Self {
            status,
            message: message.into(),
            data,
            error_code: None,
        }
    }

    fn failure(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            status: code.status(),
            message: message.into(),
            data: None,
            error_code: Some(code),
        }
    }

    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.status >= 200 && self.status < 300
    }

    /// The single item carried by a successful response, if any.
    #[must_use]
    pub const fn item(&self) -> Option<&Item> {
        match &self.data {
            Some(Payload::Item(item)) => Some(item),
            _ => None,
        }
    }

    /// The item list carried by a successful response, if any.
    #[must_use]
    pub fn items(&self) -> Option<&[Item]> {
        match &self.data {
            Some(Payload::Items(items)) => Some(items),
            _ => None,
        }
    }
}

impl From<ValidationError> for Envelope {
    fn from(err: ValidationError) -> Self {
        warn!(field = err.field, reason = %err.reason, "rejected request");
        Self::failure(err.code, err.to_string())
    }
}

/// Request handler with an injected store handle.
#[derive(Debug, Clone)]
pub struct Handler {
    store: ItemStore,
}

impl Handler {
    #[must_use]
    pub const fn new(store: ItemStore) -> Self {
        Self { store }
    }

    #[must_use]
    pub const fn store(&self) -> &ItemStore {
        &self.store
    }

    /// Release the store handle.
    #[must_use]
    pub fn into_store(self) -> ItemStore {
        self.store
    }

    /// All items in rank order.
    #[must_use]
    pub fn list(&self) -> Envelope {
        match self.store.list_all() {
            Ok(items) => {
                let message = format!("fetched {} items", items.len());
                Envelope::ok(200, message, Some(Payload::Items(items)))
            }
            Err(err) => self.store_failure("list", &err),
        }
    }

    /// One item by id.
    #[must_use]
    pub fn fetch(&self, raw_id: &str) -> Envelope {
        let id = match validate::validate_item_id(raw_id) {
            Ok(id) => id,
            Err(err) => return err.into(),
        };
        match self.store.get(&id) {
            Ok(Some(item)) => Envelope::ok(200, "fetched item", Some(Payload::Item(item))),
            Ok(None) => not_found(raw_id),
            Err(err) => self.store_failure("fetch", &err),
        }
    }

    /// Create an item at the tail of the list.
    #[must_use]
    pub fn create(&self, body: CreateItem) -> Envelope {
        let title = match validate::validate_title(body.title.as_deref()) {
            Ok(title) => title,
            Err(err) => return err.into(),
        };
        let new_item = NewItem {
            title,
            description: body.description,
            completed: body.completed.unwrap_or(false),
        };
        match self.store.insert(&new_item) {
            Ok(item) => {
                info!(item_id = %item.id, position = item.position, "created item");
                Envelope::ok(201, "created item", Some(Payload::Item(item)))
            }
            Err(err) => self.store_failure("create", &err),
        }
    }

    /// Replace an item's content. The stored position is kept: order only
    /// changes through [`Self::reorder`].
    #[must_use]
    pub fn update(&self, raw_id: &str, body: UpdateItem) -> Envelope {
        let id = match validate::validate_item_id(raw_id) {
            Ok(id) => id,
            Err(err) => return err.into(),
        };
        let title = match validate::validate_title(body.title.as_deref()) {
            Ok(title) => title,
            Err(err) => return err.into(),
        };
        let completed = body.completed.unwrap_or(false);
        self.apply_patch(&id, raw_id, &ItemPatch::replace_all(title, body.description, completed))
    }

    /// Change only the content fields named in `patch`. Unnamed fields and
    /// the item's rank keep their stored values.
    #[must_use]
    pub fn patch(&self, raw_id: &str, mut patch: ItemPatch) -> Envelope {
        let id = match validate::validate_item_id(raw_id) {
            Ok(id) => id,
            Err(err) => return err.into(),
        };
        if let Some(title) = patch.title.take() {
            match validate::validate_title(Some(&title)) {
                Ok(title) => patch.title = Some(title),
                Err(err) => return err.into(),
            }
        }
        self.apply_patch(&id, raw_id, &patch)
    }

    fn apply_patch(&self, id: &ItemId, raw_id: &str, patch: &ItemPatch) -> Envelope {
        match self.store.patch(id, patch) {
            Ok(Some(item)) => Envelope::ok(200, "updated item", Some(Payload::Item(item))),
            Ok(None) => not_found(raw_id),
            Err(err) => self.store_error("update", raw_id, &err),
        }
    }

    /// Move an item to a new rank and return the freshly ordered list.
    #[must_use]
    pub fn reorder(&self, raw_id: &str, body: &ReorderItem) -> Envelope {
        let id = match validate::validate_item_id(raw_id) {
            Ok(id) => id,
            Err(err) => return err.into(),
        };
        let position = match validate::validate_reorder(body) {
            Ok(position) => position,
            Err(err) => return err.into(),
        };

        if let Err(err) = self.store.reorder(&id, position) {
            return self.store_error("reorder", raw_id, &err);
        }

        match self.store.list_all() {
            Ok(items) => Envelope::ok(200, "reordered item", Some(Payload::Items(items))),
            Err(err) => self.store_failure("reorder", &err),
        }
    }

    /// Delete an item. Success carries no data.
    #[must_use]
    pub fn delete(&self, raw_id: &str) -> Envelope {
        let id = match validate::validate_item_id(raw_id) {
            Ok(id) => id,
            Err(err) => return err.into(),
        };
        match self.store.delete(&id) {
            Ok(true) => {
                info!(item_id = %id, "deleted item");
                Envelope::ok(204, "deleted item", None)
            }
            Ok(false) => not_found(raw_id),
            Err(err) => self.store_failure("delete", &err),
        }
    }

    /// Fold a store error into a response: absent ids are 404, other caller
    /// errors keep their own message, storage failures get a generic one.
    fn store_error(&self, operation: &'static str, raw_id: &str, err: &StoreError) -> Envelope {
        match err {
            StoreError::NotFound { .. } => not_found(raw_id),
            err if err.is_storage_failure() => self.store_failure(operation, err),
            err => {
                warn!(operation, item_id = raw_id, error = %err, "rejected request");
                Envelope::failure(err.code(), err.to_string())
            }
        }
    }

    fn store_failure(&self, operation: &'static str, err: &StoreError) -> Envelope {
        error!(
            operation,
            db = %self.store.path().display(),
            error = %err,
            "store operation failed"
        );
        let code = err.code();
        Envelope::failure(code, code.message())
    }
}

fn not_found(raw_id: &str) -> Envelope {
    Envelope::failure(ErrorCode::ItemNotFound, format!("item not found: {raw_id}"))
}

#[cfg(test)]
mod tests {
    use super::validate::{CreateItem, ReorderItem, UpdateItem};
    use super::{Envelope, Handler};
    use crate::db::DEFAULT_BUSY_TIMEOUT;
    use crate::error::ErrorCode;
    use crate::model::item::{ItemId, ItemPatch};
    use crate::store::ItemStore;
    use tempfile::TempDir;

    fn handler() -> (TempDir, Handler) {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = ItemStore::open_path(&dir.path().join("ordo.db"), DEFAULT_BUSY_TIMEOUT)
            .expect("open store");
        (dir, Handler::new(store))
    }

    fn create(handler: &Handler, title: &str) -> String {
        let response = handler.create(CreateItem {
            title: Some(title.into()),
            ..CreateItem::default()
        });
        assert_eq!(response.status, 201, "{response:?}");
        response.item().expect("item").id.to_string()
    }

    fn listed_titles(response: &Envelope) -> Vec<&str> {
        response
            .items()
            .expect("items payload")
            .iter()
            .map(|item| item.title.as_str())
            .collect()
    }

    #[test]
    fn list_returns_ordered_items() {
        let (_dir, handler) = handler();
        create(&handler, "A");
        create(&handler, "B");
        let response = handler.list();
        assert_eq!(response.status, 200);
        assert_eq!(listed_titles(&response), vec!["A", "B"]);
    }

    #[test]
    fn create_requires_title() {
        let (_dir, handler) = handler();
        let response = handler.create(CreateItem::default());
        assert_eq!(response.status, 400);
        assert_eq!(response.error_code, Some(ErrorCode::InvalidInput));
        assert!(handler.store().is_empty().expect("is_empty"));

        let response = handler.create(CreateItem {
            title: Some("   ".into()),
            ..CreateItem::default()
        });
        assert_eq!(response.status, 400);
    }

    #[test]
    fn fetch_distinguishes_malformed_and_missing() {
        let (_dir, handler) = handler();
        assert_eq!(handler.fetch("not-a-uuid").status, 400);
        assert_eq!(handler.fetch(ItemId::generate().as_str()).status, 404);

        let id = create(&handler, "A");
        let response = handler.fetch(&id);
        assert_eq!(response.status, 200);
        assert_eq!(response.item().expect("item").title, "A");
    }

    #[test]
    fn update_keeps_position() {
        let (_dir, handler) = handler();
        create(&handler, "A");
        let id = create(&handler, "B");

        let response = handler.update(
            &id,
            UpdateItem {
                title: Some("B2".into()),
                description: Some("details".into()),
                completed: Some(true),
            },
        );
        assert_eq!(response.status, 200);
        let item = response.item().expect("item");
        assert_eq!(item.position, 1);
        assert!(item.completed);
        assert_eq!(listed_titles(&handler.list()), vec!["A", "B2"]);
    }

    #[test]
    fn update_from_stale_view_keeps_reordered_rank() {
        let (_dir, handler) = handler();
        let a = create(&handler, "A");
        create(&handler, "B");
        create(&handler, "C");
        let stale = handler.fetch(&a).item().cloned().expect("item");
        assert_eq!(stale.position, 0);

        let moved = handler.reorder(&a, &ReorderItem { position: Some(2) });
        assert_eq!(listed_titles(&moved), vec!["B", "C", "A"]);

        let response = handler.update(
            &a,
            UpdateItem {
                title: Some(format!("{} edited", stale.title)),
                description: stale.description.clone(),
                completed: Some(!stale.completed),
            },
        );
        assert_eq!(response.status, 200, "{response:?}");
        assert_eq!(response.item().expect("item").position, 2);
        assert_eq!(listed_titles(&handler.list()), vec!["B", "C", "A edited"]);
        assert!(handler.store().check_density().expect("check").is_dense());
    }

    #[test]
    fn patch_toggles_completion_only() {
        let (_dir, handler) = handler();
        create(&handler, "A");
        let b = create(&handler, "B");

        let response = handler.patch(&b, ItemPatch::completed(true));
        assert_eq!(response.status, 200);
        let item = response.item().expect("item");
        assert!(item.completed);
        assert_eq!(item.title, "B");
        assert_eq!(item.position, 1);

        let response = handler.patch(&b, ItemPatch::completed(false));
        assert!(!response.item().expect("item").completed);
    }

    #[test]
    fn patch_validates_title_when_present() {
        let (_dir, handler) = handler();
        let a = create(&handler, "A");

        let blank = handler.patch(
            &a,
            ItemPatch {
                title: Some("  ".into()),
                ..ItemPatch::default()
            },
        );
        assert_eq!(blank.status, 400);
        assert_eq!(blank.error_code, Some(ErrorCode::InvalidInput));

        let trimmed = handler.patch(
            &a,
            ItemPatch {
                title: Some("  A2 ".into()),
                ..ItemPatch::default()
            },
        );
        assert_eq!(trimmed.item().expect("item").title, "A2");
        assert_eq!(
            handler.patch("bogus", ItemPatch::completed(true)).status,
            400
        );
        assert_eq!(
            handler
                .patch(ItemId::generate().as_str(), ItemPatch::completed(true))
                .status,
            404
        );
    }

    #[test]
    fn update_missing_item_is_not_found() {
        let (_dir, handler) = handler();
        let response = handler.update(
            ItemId::generate().as_str(),
            UpdateItem {
                title: Some("x".into()),
                ..UpdateItem::default()
            },
        );
        assert_eq!(response.status, 404);
    }

    #[test]
    fn update_with_bad_body_is_rejected() {
        let (_dir, handler) = handler();
        let id = create(&handler, "A");
        let response = handler.update(&id, UpdateItem::default());
        assert_eq!(response.status, 400);
        assert_eq!(listed_titles(&handler.list()), vec!["A"]);
    }

    #[test]
    fn reorder_returns_full_list() {
        let (_dir, handler) = handler();
        create(&handler, "A");
        create(&handler, "B");
        let c = create(&handler, "C");
        create(&handler, "D");

        let response = handler.reorder(&c, &ReorderItem { position: Some(0) });
        assert_eq!(response.status, 200);
        assert_eq!(listed_titles(&response), vec!["C", "A", "B", "D"]);
    }

    #[test]
    fn reorder_failure_statuses() {
        let (_dir, handler) = handler();
        let a = create(&handler, "A");

        assert_eq!(handler.reorder(&a, &ReorderItem::default()).status, 400);
        assert_eq!(handler.reorder("bogus", &ReorderItem { position: Some(0) }).status, 400);

        let out_of_range = handler.reorder(&a, &ReorderItem { position: Some(1) });
        assert_eq!(out_of_range.status, 400);
        assert_eq!(
            out_of_range.error_code,
            Some(ErrorCode::InvalidPosition)
        );

        let missing = handler.reorder(
            ItemId::generate().as_str(),
            &ReorderItem { position: Some(0) },
        );
        assert_eq!(missing.status, 404);
    }

    #[test]
    fn reorder_on_empty_list_is_storage_failure() {
        let (_dir, handler) = handler();
        let response = handler.reorder(
            ItemId::generate().as_str(),
            &ReorderItem { position: Some(0) },
        );
        assert_eq!(response.status, 500);
        assert_eq!(response.data, None);
    }

    #[test]
    fn delete_returns_no_content_then_not_found() {
        let (_dir, handler) = handler();
        let id = create(&handler, "A");
        let response = handler.delete(&id);
        assert_eq!(response.status, 204);
        assert_eq!(response.data, None);
        assert_eq!(handler.delete(&id).status, 404);
        handler.into_store().shutdown().expect("shutdown");
    }

    #[test]
    fn envelope_serializes_status_message_data() {
        let (_dir, handler) = handler();
        create(&handler, "A");
        let json = serde_json::to_value(handler.list()).expect("serialize");
        assert_eq!(json["status"], 200);
        assert_eq!(json["data"][0]["title"], "A");
        assert!(json.get("error_code").is_none());

        let json = serde_json::to_value(handler.fetch("nope")).expect("serialize");
        assert_eq!(json["status"], 400);
        assert!(json["data"].is_null());
        assert_eq!(json["error_code"], ErrorCode::InvalidItemId.code());
    }
}
