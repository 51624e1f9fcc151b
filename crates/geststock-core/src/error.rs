//! # Error Types
//!
//! Domain-specific error types for geststock-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  geststock-core errors (this file)                                     │
//! │  ├── CoreError        - Ledger rule violations (abort, no mutation)    │
//! │  ├── ValidationError  - Input validation failures                      │
//! │  └── LedgerWarning    - Non-blocking conditions (operation completes)  │
//! │                                                                         │
//! │  geststock-store errors (separate crate)                               │
//! │  └── StoreError       - Persistence failures                           │
//! │                                                                         │
//! │  CLI errors (in app)                                                   │
//! │  └── CliError         - What the user sees (code + message)            │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → StoreError → CliError → User      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (ids, quantities)
//! 3. Errors are enum variants, never String
//! 4. Warnings are values returned next to the result, not errors

use serde::{Deserialize, Serialize};
use thiserror::Error;
use ts_rs::TS;

use crate::money::Money;

// =============================================================================
// Core Error
// =============================================================================

/// Ledger and repository rule violations.
///
/// Any of these aborts the operation before anything is mutated.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CoreError {
    /// Product id is unknown.
    #[error("Product not found: {0}")]
    ProductNotFound(String),

    #[error("Customer not found: {0}")]
    CustomerNotFound(String),

    #[error("Supplier not found: {0}")]
    SupplierNotFound(String),

    #[error("Sale not found: {0}")]
    SaleNotFound(String),

    #[error("Purchase not found: {0}")]
    PurchaseNotFound(String),

    /// Insufficient stock to complete a sale.
    ///
    /// ## User Workflow
    /// ```text
    /// Sale: 2 lines (A × 2, B × 5)
    ///      │
    ///      ▼
    /// Check every line first: B available=3
    ///      │
    ///      ▼
    /// InsufficientStock { product_id: B, requested: 5, available: 3 }
    ///      │
    ///      ▼
    /// Neither A nor B changes
    /// ```
    #[error("Insufficient stock for {product_id}: available {available}, requested {requested}")]
    InsufficientStock {
        product_id: String,
        requested: i64,
        available: i64,
    },

    /// A manual adjustment would take stock below zero.
    #[error("Stock for {product_id} would become negative ({current} {delta:+})")]
    NegativeStock {
        product_id: String,
        current: i64,
        delta: i64,
    },

    /// The sale was already cancelled.
    #[error("Sale {0} is already cancelled")]
    AlreadyCancelled(String),

    /// Sale is not in a state that allows the requested operation.
    #[error("Sale {sale_id} is {status}, cannot perform operation")]
    InvalidSaleStatus { sale_id: String, status: String },

    /// Purchase is not in a state that allows the requested operation.
    ///
    /// ## When This Occurs
    /// - Receiving an order twice
    /// - Receiving or cancelling a cancelled order
    #[error("Purchase {purchase_id} is {status}, cannot perform operation")]
    InvalidPurchaseStatus { purchase_id: String, status: String },

    /// Amount is zero or negative where a positive amount is required.
    #[error("Invalid amount: {reason}")]
    InvalidAmount { reason: String },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

impl CoreError {
    pub fn invalid_amount(reason: impl Into<String>) -> Self {
        CoreError::InvalidAmount {
            reason: reason.into(),
        }
    }
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These errors occur when user input doesn't meet requirements.
/// Used for early validation before ledger logic runs.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Value must not be negative.
    #[error("{field} must not be negative")]
    Negative { field: String },

    /// Invalid format (e.g., malformed email).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
}

// =============================================================================
// Ledger Warning
// =============================================================================

/// Non-blocking conditions raised while an operation completes.
///
/// They are returned next to the result so the presentation layer can show
/// an alert, and logged at `warn` level.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum LedgerWarning {
    /// A credit sale took the customer's debt above their limit.
    #[serde(rename_all = "camelCase")]
    CreditLimitWarning {
        customer_id: String,
        credit_limit: Money,
        current_debt: Money,
    },

    /// The ledger found a state that should not happen and had to clamp or
    /// skip something. Needs a human to look at it.
    #[serde(rename_all = "camelCase")]
    LedgerInconsistency {
        entity_id: String,
        detail: String,
    },

    /// A receipt took stock above the product's maximum.
    #[serde(rename_all = "camelCase")]
    AboveMaxStock {
        product_id: String,
        max_stock: i64,
        current_stock: i64,
    },
}

impl std::fmt::Display for LedgerWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LedgerWarning::CreditLimitWarning {
                customer_id,
                credit_limit,
                current_debt,
            } => write!(
                f,
                "Customer {} debt {} exceeds credit limit {}",
                customer_id, current_debt, credit_limit
            ),
            LedgerWarning::LedgerInconsistency { entity_id, detail } => {
                write!(f, "Ledger inconsistency on {}: {}", entity_id, detail)
            }
            LedgerWarning::AboveMaxStock {
                product_id,
                max_stock,
                current_stock,
            } => write!(
                f,
                "Product {} stock {} is above maximum {}",
                product_id, current_stock, max_stock
            ),
        }
    }
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================
