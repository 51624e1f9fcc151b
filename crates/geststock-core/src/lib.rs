//! # geststock-core: Pure Business Logic for GestStock
//!
//! This crate is the **heart** of GestStock. It holds the stock ledger, the
//! credit ledger and the aggregation engine as plain functions over an
//! explicit [`AppState`] value. Nothing in here touches the disk or reads
//! the clock.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        GestStock Architecture                           │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    geststock-cli                                │   │
//! │  │    dashboard, report, adjust, receive, pay, backup, ...        │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    geststock-store                              │   │
//! │  │    Inventory handle: stage → run core op → persist → swap      │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ geststock-core (THIS CRATE) ★                   │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │  ledger   │  │  report   │  │  catalog  │  │   │
//! │  │   │  Product  │  │   stock   │  │ dashboard │  │   CRUD    │  │   │
//! │  │   │   Sale    │  │  credit   │  │  periods  │  │  search   │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO CLOCK • NO GLOBAL STATE • PURE FUNCTIONS         │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Product, Sale, StockMovement, etc.)
//! - [`money`] - Money type with integer arithmetic (no floating point!)
//! - [`error`] - Domain errors and ledger warnings
//! - [`validation`] - Input validation
//! - [`state`] - The in-memory `AppState` and its collections
//! - [`catalog`] - Create/update/delete/search for products, customers, suppliers
//! - [`ledger`] - Stock and credit ledgers
//! - [`report`] - Dashboard statistics and period reports
//! - [`audit`] - Movement log replay
//! - [`settings`] - Company settings and locale
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: same state + same input + same `now` = same output
//! 2. **All or Nothing**: a failing operation leaves the state untouched
//! 3. **Integer Money**: amounts are whole F CFA units in an i64
//! 4. **Warnings Are Values**: non-blocking conditions come back in
//!    [`Recorded::warnings`], they never abort anything
//!
//! ## Example Usage
//!
//! ```rust
//! use chrono::Utc;
//! use geststock_core::{ledger::stock, AppState, PaymentMethod, SaleDraft, SaleLine};
//!
//! let mut state = AppState::default();
//! let draft = SaleDraft {
//!     customer_id: None,
//!     items: vec![SaleLine { product_id: "missing".into(), quantity: 1 }],
//!     payment_method: PaymentMethod::Cash,
//!     notes: None,
//! };
//!
//! // Unknown product: the sale is refused and nothing is recorded
//! assert!(stock::record_sale(&mut state, draft, Utc::now()).is_err());
//! assert!(state.sales.is_empty());
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod audit;
pub mod catalog;
pub mod error;
pub mod ledger;
pub mod money;
pub mod report;
pub mod settings;
pub mod state;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================
// These allow users to do `use geststock_core::Money` instead of
// `use geststock_core::money::Money`

pub use error::{CoreError, CoreResult, LedgerWarning, ValidationError};
pub use money::Money;
pub use settings::{Locale, Settings};
pub use state::{AppState, Collection, Recorded};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Version of the stored data layout.
///
/// Written under the `schema` key and into every backup. Bump it when a
/// stored collection changes shape.
pub const SCHEMA_VERSION: u32 = 1;

/// A product is "low" (not yet critical) up to 150% of its minimum stock.
pub const LOW_STOCK_RATIO_PCT: i64 = 150;

/// A customer's debt is flagged once it passes 80% of the credit limit.
pub const DEBT_WARNING_RATIO_PCT: i64 = 80;

/// Number of best sellers listed in a period report.
pub const TOP_PRODUCTS_LIMIT: usize = 5;

/// Number of movements shown on the dashboard unless configured otherwise.
pub const DEFAULT_RECENT_MOVEMENTS: usize = 10;

/// Maximum quantity on a single sale or purchase line.
///
/// ## Business Reason
/// Catches typing mistakes (an extra zero or two) before they move stock.
pub const MAX_LINE_QUANTITY: i64 = 100_000;

/// Maximum number of lines on a single sale or purchase.
pub const MAX_LINES: usize = 200;

/// Largest price, credit limit or payment accepted, in F CFA.
///
/// With `MAX_LINE_QUANTITY` and `MAX_LINES` a sale total stays far below
/// `i64::MAX`.
pub const MAX_AMOUNT: i64 = 10_000_000_000;

/// Largest minimum/maximum stock threshold on a product.
pub const MAX_STOCK_LEVEL: i64 = 1_000_000_000;
