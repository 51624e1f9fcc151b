//! # Store Error Types
//!
//! Error types for persistence operations.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Propagation                                    │
//! │                                                                         │
//! │  std::io::Error / serde_json::Error        CoreError (ledger rule)      │
//! │       │                                         │                       │
//! │       ▼                                         ▼                       │
//! │  StoreError (this module) ← Adds the key or path involved              │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  CliError (in app) ← Code + message for the user                       │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;

use geststock_core::CoreError;
use thiserror::Error;

/// Persistence errors.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Reading or writing a file failed.
    ///
    /// ## When This Occurs
    /// - Data directory can't be created
    /// - File permissions issue
    /// - Disk full
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A value could not be encoded or a document could not be parsed.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A stored value exists but does not have the expected shape.
    ///
    /// ## When This Occurs
    /// - File edited by hand
    /// - Truncated write from a crash outside the rename window
    #[error("Stored value for '{key}' is corrupt: {reason}")]
    Corrupt { key: String, reason: String },

    /// Data was written by a newer version of GestStock.
    #[error("Schema version {found} is newer than supported version {supported}")]
    SchemaMismatch { found: u32, supported: u32 },

    /// The operation broke a ledger rule; nothing was written.
    #[error(transparent)]
    Domain(#[from] CoreError),
}

impl StoreError {
    /// Wraps an I/O error with the path it happened on.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        StoreError::Io {
            path: path.into(),
            source,
        }
    }

    /// Creates a Corrupt error for a given key.
    pub fn corrupt(key: impl Into<String>, reason: impl ToString) -> Self {
        StoreError::Corrupt {
            key: key.into(),
            reason: reason.to_string(),
        }
    }

    /// Returns the ledger error if this is one.
    pub fn as_domain(&self) -> Option<&CoreError> {
        match self {
            StoreError::Domain(err) => Some(err),
            _ => None,
        }
    }
}

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_domain_errors_pass_through() {
        let err: StoreError = CoreError::ProductNotFound("p-1".to_string()).into();
        assert_eq!(err.to_string(), "Product not found: p-1");
        assert!(matches!(
            err.as_domain(),
            Some(CoreError::ProductNotFound(_))
        ));
    }

    #[test]
    fn test_corrupt_message_names_key() {
        let err = StoreError::corrupt("geststock-products", "expected an array");
        assert_eq!(
            err.to_string(),
            "Stored value for 'geststock-products' is corrupt: expected an array"
        );
    }
}
