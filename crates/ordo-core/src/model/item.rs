use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};
use uuid::Uuid;

/// Length of a canonical hyphenated identifier.
pub const ITEM_ID_LEN: usize = 36;

/// Opaque item identifier in canonical lowercase hyphenated UUID form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ItemId(String);

/// Returned when a string is not a canonical item identifier.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid item ID '{value}': {reason}")]
pub struct InvalidId {
    pub value: String,
    pub reason: &'static str,
}

impl ItemId {
    /// Generate a fresh random identifier.
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4().hyphenated().to_string())
    }

    /// Parse a caller-supplied identifier.
    ///
    /// Only the 36-character lowercase hyphenated form is accepted, so two
    /// spellings of the same UUID never address different rows.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidId`] when the value is not in canonical form.
    pub fn parse(value: &str) -> Result<Self, InvalidId> {
        let invalid = |reason| InvalidId {
            value: value.to_string(),
            reason,
        };

        if value.len() != ITEM_ID_LEN {
            return Err(invalid("must be 36 characters"));
        }
        if !value
            .chars()
            .all(|c| c == '-' || c.is_ascii_digit() || ('a'..='f').contains(&c))
        {
            return Err(invalid("must contain only lowercase hex digits and hyphens"));
        }
        let parsed = Uuid::parse_str(value).map_err(|_| invalid("must be a hyphenated UUID"))?;
        if parsed.hyphenated().to_string() != value {
            return Err(invalid("must be a hyphenated UUID"));
        }

        Ok(Self(value.to_string()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for ItemId {
    type Err = InvalidId;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for ItemId {
    type Error = InvalidId;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<ItemId> for String {
    fn from(id: ItemId) -> Self {
        id.0
    }
}

/// A persisted task item.
///
/// `position` is the zero-based rank in the list. It is assigned on insert
/// and afterwards only moved by the store's reorder and delete operations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub id: ItemId,
    pub title: String,
    pub description: Option<String>,
    pub completed: bool,
    pub position: u32,
}

/// Content of an item about to be created. The store assigns id and position.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NewItem {
    pub title: String,
    pub description: Option<String>,
    pub completed: bool,
}

impl NewItem {
    #[must_use]
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }
}

/// Content changes for an existing item. `None` keeps the stored value;
/// `description: Some(None)` clears it. Position is never part of a patch.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ItemPatch {
    pub title: Option<String>,
    pub description: Option<Option<String>>,
    pub completed: Option<bool>,
}

impl ItemPatch {
    /// A patch that overwrites every content field.
    #[must_use]
    pub const fn replace_all(title: String, description: Option<String>, completed: bool) -> Self {
        Self {
            title: Some(title),
            description: Some(description),
            completed: Some(completed),
        }
    }

    /// Completion toggle only.
    #[must_use]
    pub const fn completed(completed: bool) -> Self {
        Self {
            title: None,
            description: None,
            completed: Some(completed),
        }
    }

    /// Apply to a stored item, leaving its id and position alone.
    pub fn apply_to(&self, item: &mut Item) {
        if let Some(title) = &self.title {
            item.title.clone_from(title);
        }
        if let Some(description) = &self.description {
            item.description.clone_from(description);
        }
        if let Some(completed) = self.completed {
            item.completed = completed;
        }
    }
}
