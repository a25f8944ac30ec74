//! Request bodies and their validation.

use serde::Deserialize;

use crate::error::ErrorCode;
use crate::model::item::{InvalidId, ItemId};

/// Longest accepted title, in characters.
pub const MAX_TITLE_LEN: usize = 255;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid {field}: {reason}")]
pub struct ValidationError {
    pub field: &'static str,
    pub reason: String,
    pub code: ErrorCode,
}

impl ValidationError {
    pub fn new(field: &'static str, reason: impl Into<String>) -> Self {
        Self {
            field,
            reason: reason.into(),
            code: ErrorCode::InvalidInput,
        }
    }
}

impl From<InvalidId> for ValidationError {
    fn from(err: InvalidId) -> Self {
        Self {
            field: "id",
            reason: err.reason.to_string(),
            code: ErrorCode::InvalidItemId,
        }
    }
}

/// Body of a create request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct CreateItem {
    pub title: Option<String>,
    pub description: Option<String>,
    pub completed: Option<bool>,
}

/// Body of a full update request. Every content field is replaced.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct UpdateItem {
    pub title: Option<String>,
    pub description: Option<String>,
    pub completed: Option<bool>,
}

/// Body of a reorder request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ReorderItem {
    pub position: Option<i64>,
}

/// Parse an identifier taken from a request path.
///
/// # Errors
///
/// Returns a [`ValidationError`] tagged `InvalidItemId` for anything that is
/// not a canonical identifier.
pub fn validate_item_id(raw: &str) -> Result<ItemId, ValidationError> {
    Ok(ItemId::parse(raw)?)
}

/// Check that a title is present, non-blank, bounded and printable, and
/// return it trimmed.
///
/// # Errors
///
/// Returns a [`ValidationError`] describing the first violated rule.
pub fn validate_title(title: Option<&str>) -> Result<String, ValidationError> {
    let Some(title) = title else {
        return Err(ValidationError::new("title", "field is required"));
    };
    let trimmed = title.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::new("title", "must not be blank"));
    }
    if trimmed.chars().count() > MAX_TITLE_LEN {
        return Err(ValidationError::new(
            "title",
            format!("must be <= {MAX_TITLE_LEN} characters"),
        ));
    }
    if trimmed.chars().any(char::is_control) {
        return Err(ValidationError::new(
            "title",
            "must not contain control characters",
        ));
    }
    Ok(trimmed.to_string())
}

/// Require the `position` field of a reorder body.
///
/// Range checks against the item count happen inside the store transaction.
///
/// # Errors
///
/// Returns a [`ValidationError`] when `position` is missing.
pub fn validate_reorder(body: &ReorderItem) -> Result<i64, ValidationError> {
    body.position
        .ok_or_else(|| ValidationError::new("position", "field is required"))
}
