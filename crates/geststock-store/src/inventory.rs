//! # Inventory Handle
//!
//! Owns the [`AppState`] and the store it is persisted to. Every write goes
//! through [`Inventory::transact`].
//!
//! ## Write Path
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  inventory.record_sale(draft)                                           │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  staged = state.clone()                                                │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  core op on staged ──── Err ──► return, state and store untouched       │
//! │       │ Ok                                                              │
//! │       ▼                                                                 │
//! │  store.set_many(changed collections) ── Err ──► return, state untouched │
//! │       │ Ok                                                              │
//! │       ▼                                                                 │
//! │  state = staged                                                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The handle takes `&mut self` for every write, so there is exactly one
//! writer at a time.

use chrono::{DateTime, FixedOffset, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info, warn};

use geststock_core::audit::{self, AuditReport};
use geststock_core::ledger::{credit, stock};
use geststock_core::report::{self, DashboardStats, PeriodReport, ReportRange};
use geststock_core::validation::validate_tax_rate_bps;
use geststock_core::{
    AdjustmentReason, AppState, Collection, CoreResult, Customer, Locale, Money, Purchase,
    PurchaseDraft, Recorded, Sale, SaleDraft, Settings, StockMovement, SCHEMA_VERSION,
};

use crate::error::{StoreError, StoreResult};
use crate::repository::{
    customer::CustomerRepository, product::ProductRepository, purchase::PurchaseRepository,
    sale::SaleRepository, supplier::SupplierRepository,
};
use crate::store::KeyValueStore;

/// Key holding the schema marker.
pub const SCHEMA_KEY: &str = "schema";

/// Content of the `schema` key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaMarker {
    pub version: u32,
}

/// Source of "now" for ledger timestamps.
pub type Clock = fn() -> DateTime<Utc>;

/// Main handle: state + store.
///
/// ## Usage
/// ```rust
/// use geststock_store::{Inventory, MemoryStore};
///
/// let mut inventory = Inventory::open(MemoryStore::new()).unwrap();
/// assert!(inventory.products().list().is_empty());
/// ```
#[derive(Debug)]
pub struct Inventory<S: KeyValueStore> {
    store: S,
    state: AppState,
    clock: Clock,
}

impl<S: KeyValueStore> Inventory<S> {
    // =========================================================================
    // Opening
    // =========================================================================

    /// Loads every collection from `store`.
    ///
    /// ## What This Does
    /// 1. Checks the schema marker (writes it on a fresh store)
    /// 2. Loads each collection; a missing key means an empty collection
    ///
    /// ## Errors
    /// - `SchemaMismatch` if the data was written by a newer version
    /// - `Corrupt` if a stored value does not parse
    pub fn open(mut store: S) -> StoreResult<Self> {
        match store.get(SCHEMA_KEY)? {
            Some(value) => {
                let marker: SchemaMarker = serde_json::from_value(value)
                    .map_err(|e| StoreError::corrupt(SCHEMA_KEY, e))?;
                check_schema(marker.version)?;
            }
            None => {
                store.set(SCHEMA_KEY, schema_marker()?)?;
                debug!(version = SCHEMA_VERSION, "Schema marker written");
            }
        }

        let state = AppState {
            products: load(&store, Collection::Products)?,
            customers: load(&store, Collection::Customers)?,
            suppliers: load(&store, Collection::Suppliers)?,
            sales: load(&store, Collection::Sales)?,
            purchases: load(&store, Collection::Purchases)?,
            movements: load(&store, Collection::Movements)?,
            payments: load(&store, Collection::Payments)?,
            settings: load(&store, Collection::Settings)?,
            language: load(&store, Collection::Language)?,
        };

        info!(
            products = state.products.len(),
            sales = state.sales.len(),
            movements = state.movements.len(),
            "Inventory loaded"
        );

        Ok(Inventory {
            store,
            state,
            clock: Utc::now,
        })
    }

    /// Replaces the clock used to timestamp writes.
    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    pub fn now(&self) -> DateTime<Utc> {
        (self.clock)()
    }

    /// Read-only view of the whole state.
    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Gives the store back.
    pub fn into_store(self) -> S {
        self.store
    }

    // =========================================================================
    // Transactions
    // =========================================================================

    /// Runs `op` on a staged copy, persists what changed, then commits.
    ///
    /// If `op` fails, or persisting fails, neither the in-memory state nor
    /// the store has changed.
    pub fn transact<T, F>(&mut self, op: F) -> StoreResult<T>
    where
        F: FnOnce(&mut AppState) -> CoreResult<T>,
    {
        let mut staged = self.state.clone();
        let value = op(&mut staged)?;

        let changed = staged.changed_since(&self.state);
        if !changed.is_empty() {
            let mut entries = Vec::with_capacity(changed.len());
            for collection in &changed {
                entries.push((collection.key().to_string(), encode(&staged, *collection)?));
            }
            self.store.set_many(entries)?;
            debug!(collections = ?changed, "Transaction committed");
        }

        self.state = staged;
        Ok(value)
    }

    /// Rewrites every collection and the schema marker.
    pub(crate) fn persist_all(&mut self) -> StoreResult<()> {
        let mut entries = vec![(SCHEMA_KEY.to_string(), schema_marker()?)];
        for collection in Collection::ALL {
            entries.push((
                collection.key().to_string(),
                encode(&self.state, collection)?,
            ));
        }
        self.store.set_many(entries)
    }

    pub(crate) fn replace_state(&mut self, state: AppState) -> StoreResult<()> {
        let previous = std::mem::replace(&mut self.state, state);
        if let Err(err) = self.persist_all() {
            self.state = previous;
            return Err(err);
        }
        Ok(())
    }

    // =========================================================================
    // Repositories
    // =========================================================================

    /// Returns the product repository.
    ///
    /// ## Example
    /// ```rust,ignore
    /// let hits = inventory.products().search("savon")?;
    /// ```
    pub fn products(&mut self) -> ProductRepository<'_, S> {
        ProductRepository::new(self)
    }

    pub fn customers(&mut self) -> CustomerRepository<'_, S> {
        CustomerRepository::new(self)
    }

    pub fn suppliers(&mut self) -> SupplierRepository<'_, S> {
        SupplierRepository::new(self)
    }

    pub fn sales(&mut self) -> SaleRepository<'_, S> {
        SaleRepository::new(self)
    }

    pub fn purchases(&mut self) -> PurchaseRepository<'_, S> {
        PurchaseRepository::new(self)
    }

    // =========================================================================
    // Ledger Operations
    // =========================================================================

    /// Records a sale. See [`stock::record_sale`].
    pub fn record_sale(&mut self, draft: SaleDraft) -> StoreResult<Recorded<Sale>> {
        let now = self.now();
        self.transact(|state| stock::record_sale(state, draft, now))
    }

    /// Receives a pending purchase. See [`stock::record_purchase_receipt`].
    pub fn record_purchase_receipt(&mut self, purchase_id: &str) -> StoreResult<Recorded<Purchase>> {
        let now = self.now();
        self.transact(|state| stock::record_purchase_receipt(state, purchase_id, now))
    }

    /// Manually corrects stock. See [`stock::adjust_stock`].
    pub fn adjust_stock(
        &mut self,
        product_id: &str,
        delta: i64,
        reason: AdjustmentReason,
        notes: Option<String>,
    ) -> StoreResult<Recorded<StockMovement>> {
        let now = self.now();
        self.transact(|state| stock::adjust_stock(state, product_id, delta, reason, notes, now))
    }

    /// Cancels a completed sale. See [`stock::cancel_sale`].
    pub fn cancel_sale(&mut self, sale_id: &str) -> StoreResult<Recorded<Sale>> {
        let now = self.now();
        self.transact(|state| stock::cancel_sale(state, sale_id, now))
    }

    /// Records a customer repayment. See [`credit::record_payment`].
    pub fn record_payment(
        &mut self,
        customer_id: &str,
        amount: Money,
    ) -> StoreResult<Recorded<Customer>> {
        let now = self.now();
        self.transact(|state| credit::record_payment(state, customer_id, amount, now))
    }

    pub fn create_purchase(&mut self, draft: PurchaseDraft) -> StoreResult<Purchase> {
        let now = self.now();
        self.transact(|state| stock::create_purchase(state, draft, now))
    }

    pub fn cancel_purchase(&mut self, purchase_id: &str) -> StoreResult<Purchase> {
        self.transact(|state| stock::cancel_purchase(state, purchase_id))
    }

    // =========================================================================
    // Reports
    // =========================================================================

    pub fn dashboard_stats(&self, as_of: DateTime<FixedOffset>, recent_limit: usize) -> DashboardStats {
        report::dashboard_stats(&self.state, as_of, recent_limit)
    }

    pub fn period_report(&self, range: ReportRange, as_of: DateTime<FixedOffset>) -> PeriodReport {
        report::period_report(&self.state, range, as_of)
    }

    pub fn audit(&self) -> AuditReport {
        audit::audit_ledger(&self.state)
    }

    // =========================================================================
    // Settings
    // =========================================================================

    pub fn settings(&self) -> &Settings {
        &self.state.settings
    }

    pub fn update_settings(&mut self, settings: Settings) -> StoreResult<Settings> {
        self.transact(|state| {
            validate_tax_rate_bps(settings.tax_rate.bps())?;
            state.settings = settings;
            Ok(state.settings.clone())
        })
    }

    pub fn language(&self) -> Locale {
        self.state.language
    }

    pub fn set_language(&mut self, locale: Locale) -> StoreResult<()> {
        self.transact(|state| {
            state.language = locale;
            Ok(())
        })
    }

    // =========================================================================
    // Reset
    // =========================================================================

    /// Deletes every stored key and starts over with an empty state.
    ///
    /// Settings and language go back to their defaults and the schema
    /// marker is written again, so the store reopens as a fresh one. If the
    /// store fails while clearing, the current state is written back and
    /// the error returned.
    pub fn clear_all(&mut self) -> StoreResult<()> {
        if let Err(err) = self.store.clear() {
            warn!(error = %err, "Clear failed, restoring previous data");
            if let Err(restore) = self.persist_all() {
                warn!(error = %restore, "Could not restore previous data");
            }
            return Err(err);
        }

        self.state = AppState::default();
        self.store.set(SCHEMA_KEY, schema_marker()?)?;
        info!("All data cleared");
        Ok(())
    }
}

// =============================================================================
// Encoding Helpers
// =============================================================================

fn check_schema(found: u32) -> StoreResult<()> {
    if found > SCHEMA_VERSION {
        return Err(StoreError::SchemaMismatch {
            found,
            supported: SCHEMA_VERSION,
        });
    }
    Ok(())
}

pub(crate) fn ensure_supported(found: u32) -> StoreResult<()> {
    check_schema(found)
}

fn schema_marker() -> StoreResult<Value> {
    Ok(serde_json::to_value(SchemaMarker {
        version: SCHEMA_VERSION,
    })?)
}

fn load<S, T>(store: &S, collection: Collection) -> StoreResult<T>
where
    S: KeyValueStore,
    T: DeserializeOwned + Default,
{
    match store.get(collection.key())? {
        Some(value) => {
            serde_json::from_value(value).map_err(|e| StoreError::corrupt(collection.key(), e))
        }
        None => Ok(T::default()),
    }
}

fn encode(state: &AppState, collection: Collection) -> StoreResult<Value> {
    let value = match collection {
        Collection::Products => serde_json::to_value(&state.products)?,
        Collection::Customers => serde_json::to_value(&state.customers)?,
        Collection::Suppliers => serde_json::to_value(&state.suppliers)?,
        Collection::Sales => serde_json::to_value(&state.sales)?,
        Collection::Purchases => serde_json::to_value(&state.purchases)?,
        Collection::Movements => serde_json::to_value(&state.movements)?,
        Collection::Payments => serde_json::to_value(&state.payments)?,
        Collection::Settings => serde_json::to_value(&state.settings)?,
        Collection::Language => serde_json::to_value(state.language)?,
    };
    Ok(value)
}

// =============================================================================
// Unit Tests
// =============================================================================
