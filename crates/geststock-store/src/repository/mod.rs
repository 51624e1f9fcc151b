//! # Repository Module
//!
//! Per-collection access on top of an [`Inventory`](crate::Inventory).
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  CLI command                                                            │
//! │       │                                                                 │
//! │       │  inventory.products().search("riz")                             │
//! │       ▼                                                                 │
//! │  ProductRepository<'_, S>                                               │
//! │  ├── list / get / search          reads from the loaded state          │
//! │  └── create / update / delete     go through Inventory::transact        │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  KeyValueStore (only the changed collections are written)              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Reads return owned values so a repository can be dropped right after the
//! call.
//!
//! ## Available Repositories
//!
//! - [`ProductRepository`](product::ProductRepository) - Catalogue and movement history
//! - [`CustomerRepository`](customer::CustomerRepository) - Customers and repayments
//! - [`SupplierRepository`](supplier::SupplierRepository) - Suppliers
//! - [`SaleRepository`](sale::SaleRepository) - Sales history
//! - [`PurchaseRepository`](purchase::PurchaseRepository) - Purchase orders

pub mod customer;
pub mod product;
pub mod purchase;
pub mod sale;
pub mod supplier;
