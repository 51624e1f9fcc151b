//! # CLI Error Type
//!
//! Unified error type for commands.
//!
//! ## Error Handling Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Flow in GestStock                              │
//! │                                                                         │
//! │  geststock adjust p-1 -5                                                │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │  Command Function                                                │  │
//! │  │  Result<(), CliError>                                            │  │
//! │  │         │                                                        │  │
//! │  │         ▼                                                        │  │
//! │  │  Store Error? ──── StoreError::Io(...) ──────────┐              │  │
//! │  │         │                                         │              │  │
//! │  │         ▼                                         ▼              │  │
//! │  │  Ledger Error? ─── CoreError::NegativeStock ──── CliError ──────►│  │
//! │  └──────────────────────────────────────────────────────────────────┘  │
//! │                                                                         │
//! │  stderr: [NEGATIVE_STOCK] Stock of p-1 would go negative: 3 + -5        │
//! │  exit code: 1 (domain) or 2 (storage/internal)                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::Serialize;
use thiserror::Error;

use geststock_core::CoreError;
use geststock_store::StoreError;

/// Error returned from commands.
///
/// ## Serialization
/// With `--json`, this is what gets printed when a command fails:
/// ```json
/// {
///   "code": "NOT_FOUND",
///   "message": "Product not found: p-123"
/// }
/// ```
#[derive(Debug, Clone, Serialize, Error)]
#[serde(rename_all = "camelCase")]
#[error("[{code}] {message}")]
pub struct CliError {
    /// Machine-readable error code for scripts
    pub code: ErrorCode,

    /// Human-readable error message
    pub message: String,
}

/// Error codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Entity does not exist
    NotFound,

    /// Input validation failed
    ValidationError,

    /// Not enough stock for a sale
    InsufficientStock,

    /// Adjustment would drive stock below zero
    NegativeStock,

    /// Wrong status for the requested transition
    InvalidStatus,

    /// Non-positive or malformed amount
    InvalidAmount,

    /// Command-line argument could not be used
    InvalidArgument,

    /// Reading or writing the store failed
    StorageError,

    /// Data was written by a newer version
    SchemaMismatch,

    /// Internal error
    Internal,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::NotFound => "NOT_FOUND",
            ErrorCode::ValidationError => "VALIDATION_ERROR",
            ErrorCode::InsufficientStock => "INSUFFICIENT_STOCK",
            ErrorCode::NegativeStock => "NEGATIVE_STOCK",
            ErrorCode::InvalidStatus => "INVALID_STATUS",
            ErrorCode::InvalidAmount => "INVALID_AMOUNT",
            ErrorCode::InvalidArgument => "INVALID_ARGUMENT",
            ErrorCode::StorageError => "STORAGE_ERROR",
            ErrorCode::SchemaMismatch => "SCHEMA_MISMATCH",
            ErrorCode::Internal => "INTERNAL",
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl CliError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        CliError {
            code,
            message: message.into(),
        }
    }

    pub fn invalid_argument(message: impl Into<String>) -> Self {
        CliError::new(ErrorCode::InvalidArgument, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        CliError::new(ErrorCode::Internal, message)
    }

    /// Process exit code: 1 for rejected operations, 2 when the tool
    /// itself could not work.
    pub fn exit_code(&self) -> u8 {
        match self.code {
            ErrorCode::StorageError | ErrorCode::SchemaMismatch | ErrorCode::Internal => 2,
            _ => 1,
        }
    }
}

/// Converts ledger errors to CLI errors.
impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        let message = err.to_string();
        let code = match err {
            CoreError::ProductNotFound(_)
            | CoreError::CustomerNotFound(_)
            | CoreError::SupplierNotFound(_)
            | CoreError::SaleNotFound(_)
            | CoreError::PurchaseNotFound(_) => ErrorCode::NotFound,
            CoreError::InsufficientStock { .. } => ErrorCode::InsufficientStock,
            CoreError::NegativeStock { .. } => ErrorCode::NegativeStock,
            CoreError::AlreadyCancelled(_)
            | CoreError::InvalidSaleStatus { .. }
            | CoreError::InvalidPurchaseStatus { .. } => ErrorCode::InvalidStatus,
            CoreError::InvalidAmount { .. } => ErrorCode::InvalidAmount,
            CoreError::Validation(_) => ErrorCode::ValidationError,
        };
        CliError::new(code, message)
    }
}

/// Converts store errors to CLI errors.
impl From<StoreError> for CliError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Domain(e) => e.into(),
            StoreError::SchemaMismatch { .. } => {
                CliError::new(ErrorCode::SchemaMismatch, err.to_string())
            }
            StoreError::Io { .. } | StoreError::Corrupt { .. } => {
                tracing::error!(error = %err, "Storage failure");
                CliError::new(ErrorCode::StorageError, err.to_string())
            }
            StoreError::Serialization(e) => {
                tracing::error!("Serialization failed: {}", e);
                CliError::new(ErrorCode::StorageError, format!("Invalid JSON: {}", e))
            }
        }
    }
}

impl From<std::io::Error> for CliError {
    fn from(err: std::io::Error) -> Self {
        tracing::error!("I/O failed: {}", err);
        CliError::new(ErrorCode::StorageError, err.to_string())
    }
}

impl From<serde_json::Error> for CliError {
    fn from(err: serde_json::Error) -> Self {
        CliError::internal(format!("JSON output failed: {}", err))
    }
}

pub type CliResult<T> = Result<T, CliError>;
