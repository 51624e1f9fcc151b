//! # geststock-store: Persistence Layer for GestStock
//!
//! Loads the application state from a key-value store, runs ledger
//! operations against it and writes back what changed.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        GestStock Data Flow                              │
//! │                                                                         │
//! │  CLI command (geststock adjust ...)                                     │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                 geststock-store (THIS CRATE)                    │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │   Inventory   │    │  Repositories │    │    Backup    │  │   │
//! │  │   │ (inventory.rs)│    │ (product.rs)  │    │ (backup.rs)  │  │   │
//! │  │   │               │    │               │    │              │  │   │
//! │  │   │ AppState      │◄───│ ProductRepo   │    │ export       │  │   │
//! │  │   │ transact()    │    │ SaleRepo      │    │ import       │  │   │
//! │  │   └───────┬───────┘    └───────────────┘    └──────────────┘  │   │
//! │  │           │                                                     │   │
//! │  └───────────┼─────────────────────────────────────────────────────┘   │
//! │              ▼                                                          │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │  KeyValueStore: MemoryStore │ JsonFileStore                     │   │
//! │  │  ~/.local/share/geststock/geststock-products.json ...           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`store`] - The key-value contract and its implementations
//! - [`inventory`] - State handle, transactions, ledger entry points
//! - [`repository`] - Per-collection CRUD and search
//! - [`backup`] - Whole-state export and import
//! - [`error`] - Store error types
//!
//! ## Usage
//!
//! ```rust,ignore
//! use geststock_store::{Inventory, JsonFileStore, StoreConfig};
//!
//! let store = JsonFileStore::open(StoreConfig::new("path/to/data"))?;
//! let mut inventory = Inventory::open(store)?;
//!
//! let products = inventory.products().search("riz")?;
//! let recorded = inventory.record_sale(draft)?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod backup;
pub mod error;
pub mod inventory;
pub mod repository;
pub mod store;

// =============================================================================
// Re-exports
// =============================================================================

pub use backup::{BackupDocument, ImportSummary};
pub use error::{StoreError, StoreResult};
pub use inventory::{Inventory, SCHEMA_KEY};
pub use store::{JsonFileStore, KeyValueStore, MemoryStore, StoreConfig, DEFAULT_KEY_PREFIX};

// Repository re-exports for convenience
pub use repository::customer::CustomerRepository;
pub use repository::product::ProductRepository;
pub use repository::purchase::PurchaseRepository;
pub use repository::sale::SaleRepository;
pub use repository::supplier::SupplierRepository;
