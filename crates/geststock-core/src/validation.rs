//! # Validation Module
//!
//! Input validation for everything a form can submit.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Presentation (CLI / web form)                                │
//! │  ├── Parsing (numbers, enums)                                          │
//! │  └── Immediate user feedback                                           │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE                                                  │
//! │  ├── Field rules (required, length, ranges)                            │
//! │  └── Cross-field rules (maxStock ≥ minStock)                           │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Ledgers                                                      │
//! │  ├── Referential checks (ProductNotFound, CustomerNotFound)            │
//! │  └── Stock and status rules (InsufficientStock, AlreadyCancelled)      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use geststock_core::validation::{validate_name, validate_quantity};
//!
//! validate_name("name", "Savon de Marseille").unwrap();
//! validate_quantity(5).unwrap();
//! ```

use crate::error::ValidationError;
use crate::money::Money;
use crate::types::{CustomerInput, ProductInput, SupplierInput};
use crate::{MAX_AMOUNT, MAX_LINES, MAX_LINE_QUANTITY, MAX_STOCK_LEVEL};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

const MAX_NAME_LEN: usize = 200;
const MAX_QUERY_LEN: usize = 100;

// =============================================================================
// String Validators
// =============================================================================

/// Validates a required display name (product, customer, supplier, contact).
///
/// ## Rules
/// - Must not be empty after trimming
/// - At most 200 characters
///
/// ## Example
/// ```rust
/// use geststock_core::validation::validate_name;
///
/// assert!(validate_name("name", "Huile Mayor 1L").is_ok());
/// assert!(validate_name("name", "   ").is_err());
/// ```
pub fn validate_name(field: &str, value: &str) -> ValidationResult<()> {
    let value = value.trim();

    if value.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    if value.chars().count() > MAX_NAME_LEN {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max: MAX_NAME_LEN,
        });
    }

    Ok(())
}

/// Validates an optional email address.
///
/// Only the shape `something@something` is checked.
pub fn validate_email(email: Option<&str>) -> ValidationResult<()> {
    let Some(email) = email.map(str::trim).filter(|e| !e.is_empty()) else {
        return Ok(());
    };

    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && !domain.is_empty() => Ok(()),
        _ => Err(ValidationError::InvalidFormat {
            field: "email".to_string(),
            reason: "must look like name@domain".to_string(),
        }),
    }
}

/// Validates a search query.
///
/// ## Rules
/// - Can be empty (returns everything)
/// - Maximum 100 characters
///
/// ## Returns
/// The trimmed query string.
pub fn validate_search_query(query: &str) -> ValidationResult<String> {
    let query = query.trim();

    if query.chars().count() > MAX_QUERY_LEN {
        return Err(ValidationError::TooLong {
            field: "query".to_string(),
            max: MAX_QUERY_LEN,
        });
    }

    Ok(query.to_string())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a sale or purchase line quantity.
///
/// ## Rules
/// - Must be positive (> 0)
/// - Must not exceed MAX_LINE_QUANTITY
pub fn validate_quantity(qty: i64) -> ValidationResult<()> {
    if qty <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }

    if qty > MAX_LINE_QUANTITY {
        return Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: 1,
            max: MAX_LINE_QUANTITY,
        });
    }

    Ok(())
}

/// Validates the number of lines on a sale or purchase.
pub fn validate_line_count(field: &str, count: usize) -> ValidationResult<()> {
    if count == 0 {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    if count > MAX_LINES {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            min: 1,
            max: MAX_LINES as i64,
        });
    }

    Ok(())
}

/// Validates a price or limit.
///
/// ## Rules
/// - Must be non-negative (>= 0)
/// - Zero is allowed (free samples, cash-only customers)
/// - Must not exceed MAX_AMOUNT
///
/// ## Example
/// ```rust
/// use geststock_core::money::Money;
/// use geststock_core::validation::validate_amount;
///
/// assert!(validate_amount("sellPrice", Money::from_units(1_500)).is_ok());
/// assert!(validate_amount("sellPrice", Money::zero()).is_ok());
/// assert!(validate_amount("sellPrice", Money::from_units(-1)).is_err());
/// assert!(validate_amount("sellPrice", Money::from_units(i64::MAX)).is_err());
/// ```
pub fn validate_amount(field: &str, amount: Money) -> ValidationResult<()> {
    if amount.is_negative() {
        return Err(ValidationError::Negative {
            field: field.to_string(),
        });
    }

    if amount.units() > MAX_AMOUNT {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            min: 0,
            max: MAX_AMOUNT,
        });
    }

    Ok(())
}

/// Validates stock thresholds: `0 ≤ min ≤ max`.
pub fn validate_stock_bounds(min_stock: i64, max_stock: i64) -> ValidationResult<()> {
    if min_stock < 0 {
        return Err(ValidationError::Negative {
            field: "minStock".to_string(),
        });
    }

    if max_stock < min_stock || max_stock > MAX_STOCK_LEVEL {
        return Err(ValidationError::OutOfRange {
            field: "maxStock".to_string(),
            min: min_stock,
            max: MAX_STOCK_LEVEL,
        });
    }

    Ok(())
}

/// Validates a stock level entered by hand, e.g. a product's opening stock.
///
/// ## Rules
/// - Must be non-negative (>= 0)
/// - Must not exceed MAX_STOCK_LEVEL
pub fn validate_stock_level(field: &str, level: i64) -> ValidationResult<()> {
    if level < 0 {
        return Err(ValidationError::Negative {
            field: field.to_string(),
        });
    }

    if level > MAX_STOCK_LEVEL {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            min: 0,
            max: MAX_STOCK_LEVEL,
        });
    }

    Ok(())
}

/// Validates a supplier delivery delay in days (> 0).
pub fn validate_delivery_delay(days: u32) -> ValidationResult<()> {
    if days == 0 {
        return Err(ValidationError::MustBePositive {
            field: "deliveryDelay".to_string(),
        });
    }

    Ok(())
}

/// Validates a tax rate in basis points.
///
/// ## Rules
/// - Must be between 0 and 10000 (0% to 100%)
pub fn validate_tax_rate_bps(bps: u32) -> ValidationResult<()> {
    if bps > 10000 {
        return Err(ValidationError::OutOfRange {
            field: "taxRate".to_string(),
            min: 0,
            max: 10000,
        });
    }

    Ok(())
}

// =============================================================================
// Form Validators
// =============================================================================

pub fn validate_product_input(input: &ProductInput) -> ValidationResult<()> {
    validate_name("name", &input.name)?;
    validate_stock_bounds(input.min_stock, input.max_stock)?;
    validate_amount("buyPrice", input.buy_price)?;
    validate_amount("sellPrice", input.sell_price)?;
    Ok(())
}

pub fn validate_customer_input(input: &CustomerInput) -> ValidationResult<()> {
    validate_name("name", &input.name)?;
    validate_name("phone", &input.phone)?;
    validate_email(input.email.as_deref())?;
    validate_amount("creditLimit", input.credit_limit)?;
    Ok(())
}

pub fn validate_supplier_input(input: &SupplierInput) -> ValidationResult<()> {
    validate_name("name", &input.name)?;
    validate_name("contact", &input.contact)?;
    validate_name("phone", &input.phone)?;
    validate_email(input.email.as_deref())?;
    validate_delivery_delay(input.delivery_delay)?;
    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
