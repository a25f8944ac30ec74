use serde::{Serialize, Serializer};
use std::fmt;

/// Machine-readable error codes for callers that branch on failure class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    ConfigParseError,
    InvalidItemId,
    InvalidInput,
    ItemNotFound,
    InvalidPosition,
    EmptyList,
    StorageFailure,
    UnsupportedSchema,
}

impl ErrorCode {
    /// Stable code identifier (`E####`) for machine parsing.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::ConfigParseError => "E1002",
            Self::ItemNotFound => "E2001",
            Self::InvalidItemId => "E2004",
            Self::InvalidInput => "E2005",
            Self::InvalidPosition => "E2006",
            Self::EmptyList => "E3001",
            Self::StorageFailure => "E5001",
            Self::UnsupportedSchema => "E5002",
        }
    }

    /// Short human-facing summary for logs and terminal output.
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::ConfigParseError => "Config file parse error",
            Self::InvalidItemId => "Malformed item ID",
            Self::InvalidInput => "Invalid request body",
            Self::ItemNotFound => "Item not found",
            Self::InvalidPosition => "Position out of range",
            Self::EmptyList => "List is empty",
            Self::StorageFailure => "Storage failure",
            Self::UnsupportedSchema => "Database written by a newer ordo",
        }
    }

    /// Optional remediation hint that can be surfaced to operators.
    #[must_use]
    pub const fn hint(self) -> Option<&'static str> {
        match self {
            Self::ConfigParseError => Some("Fix syntax in .ordo/config.toml and retry."),
            Self::InvalidItemId => Some("Use the full 36-character ID shown by `ordo list`."),
            Self::InvalidInput => None,
            Self::ItemNotFound => None,
            Self::InvalidPosition => Some("Positions are zero-based and must be below the item count."),
            Self::EmptyList => Some("Create an item before reordering."),
            Self::StorageFailure => Some("Retry once. If persistent, check the database file and logs."),
            Self::UnsupportedSchema => Some("Upgrade ordo, or point --db at another file."),
        }
    }

    /// HTTP-style status class the request layer reports for this code.
    #[must_use]
    pub const fn status(self) -> u16 {
        match self {
            Self::InvalidItemId | Self::InvalidInput | Self::InvalidPosition => 400,
            Self::ItemNotFound => 404,
            Self::ConfigParseError
            | Self::EmptyList
            | Self::StorageFailure
            | Self::UnsupportedSchema => 500,
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

impl Serialize for ErrorCode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.code())
    }
}

/// Failure outcomes of [`crate::store::ItemStore`] operations.
///
/// `NotFound` and `InvalidPosition` are ordinary results of a well-formed
/// call and never leave writes behind. `EmptyList`, `Storage` and `Io` are
/// storage-class failures: whatever transaction was open has been rolled back.
/// `UnsupportedSchema` is raised on open, before anything is written.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("item not found: {id}")]
    NotFound { id: String },

    #[error("position {position} out of range for {len} items")]
    InvalidPosition { position: i64, len: usize },

    #[error("cannot reorder an empty list")]
    EmptyList,

    #[error("storage failure: {0}")]
    Storage(#[from] rusqlite::Error),

    #[error("storage I/O failure: {0}")]
    Io(#[from] std::io::Error),

    #[error("database schema version {found} is newer than supported version {supported}")]
    UnsupportedSchema { found: u32, supported: u32 },
}

impl StoreError {
    /// Machine-readable classification of this error.
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::NotFound { .. } => ErrorCode::ItemNotFound,
            Self::InvalidPosition { .. } => ErrorCode::InvalidPosition,
            Self::EmptyList => ErrorCode::EmptyList,
            Self::Storage(_) | Self::Io(_) => ErrorCode::StorageFailure,
            Self::UnsupportedSchema { .. } => ErrorCode::UnsupportedSchema,
        }
    }

    /// True for failures that come from the backing store rather than the
    /// caller's input.
    #[must_use]
    pub const fn is_storage_failure(&self) -> bool {
        matches!(
            self,
            Self::EmptyList | Self::Storage(_) | Self::Io(_) | Self::UnsupportedSchema { .. }
        )
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

#[cfg(test)]
mod tests {
    use super::{ErrorCode, StoreError};
    use std::collections::HashSet;

    const ALL: [ErrorCode; 8] = [
        ErrorCode::ConfigParseError,
        ErrorCode::InvalidItemId,
        ErrorCode::InvalidInput,
        ErrorCode::ItemNotFound,
        ErrorCode::InvalidPosition,
        ErrorCode::EmptyList,
        ErrorCode::StorageFailure,
        ErrorCode::UnsupportedSchema,
    ];

    #[test]
    fn all_codes_are_unique() {
        let mut seen = HashSet::new();
        for code in ALL {
            assert!(seen.insert(code.code()), "duplicate code {}", code.code());
        }
    }

    #[test]
    fn code_format_is_machine_friendly() {
        for code in ALL {
            let code = code.code();
            assert_eq!(code.len(), 5);
            assert!(code.starts_with('E'));
            assert!(code.chars().skip(1).all(|c| c.is_ascii_digit()));
        }
    }

    #[test]
    fn error_code_serializes_as_code_string() {
        let json = serde_json::to_string(&ErrorCode::InvalidPosition).expect("serialize");
        assert_eq!(json, "\"E2006\"");
    }

    #[test]
    fn store_errors_map_to_expected_status() {
        let not_found = StoreError::NotFound { id: "x".into() };
        assert_eq!(not_found.code().status(), 404);
        assert!(!not_found.is_storage_failure());

        let invalid = StoreError::InvalidPosition {
            position: 9,
            len: 3,
        };
        assert_eq!(invalid.code().status(), 400);
        assert_eq!(invalid.to_string(), "position 9 out of range for 3 items");

        let storage = StoreError::Storage(rusqlite::Error::InvalidQuery);
        assert_eq!(storage.code().status(), 500);
        assert!(storage.is_storage_failure());
        assert!(StoreError::EmptyList.is_storage_failure());

        let newer = StoreError::UnsupportedSchema {
            found: 3,
            supported: 1,
        };
        assert_eq!(newer.code().code(), "E5002");
        assert!(newer.is_storage_failure());
    }
}
