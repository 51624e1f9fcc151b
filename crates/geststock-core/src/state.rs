//! # Application State
//!
//! Everything GestStock knows, as one plain value.
//!
//! ## Ownership
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  AppState                                                               │
//! │  ├── products    ─┐                                                    │
//! │  ├── customers    │  entity collections (repositories)                 │
//! │  ├── suppliers    │                                                    │
//! │  ├── sales        │  append + status transitions only                  │
//! │  ├── purchases   ─┘                                                    │
//! │  ├── movements      append-only stock log                              │
//! │  ├── payments       append-only repayment log                          │
//! │  ├── settings                                                          │
//! │  └── language                                                          │
//! │                                                                         │
//! │  Each field maps to exactly one store key (see `Collection`).          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Transactions
//! [`AppState::transact`] runs an operation against a staged copy and only
//! swaps it in when the operation succeeds. [`AppState::changed_since`]
//! tells the persistence layer which keys it has to rewrite.

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult, LedgerWarning};
use crate::settings::{Locale, Settings};
use crate::types::{Customer, CustomerPayment, Product, Purchase, Sale, StockMovement, Supplier};

// =============================================================================
// Collections
// =============================================================================

/// One persisted collection of the state, i.e. one store key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Collection {
    Products,
    Customers,
    Suppliers,
    Sales,
    Purchases,
    Movements,
    Payments,
    Settings,
    Language,
}

impl Collection {
    /// Every collection, in the order they are written.
    pub const ALL: [Collection; 9] = [
        Collection::Products,
        Collection::Customers,
        Collection::Suppliers,
        Collection::Sales,
        Collection::Purchases,
        Collection::Movements,
        Collection::Payments,
        Collection::Settings,
        Collection::Language,
    ];

    /// Store key (without prefix).
    pub fn key(&self) -> &'static str {
        match self {
            Collection::Products => "products",
            Collection::Customers => "customers",
            Collection::Suppliers => "suppliers",
            Collection::Sales => "sales",
            Collection::Purchases => "purchases",
            Collection::Movements => "movements",
            Collection::Payments => "payments",
            Collection::Settings => "settings",
            Collection::Language => "language",
        }
    }
}

// =============================================================================
// AppState
// =============================================================================

/// The whole in-memory state.
///
/// Replaces the module-level singletons a browser app would use. The
/// persistence layer owns one of these and hands `&mut` to the ledgers.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppState {
    pub products: Vec<Product>,
    pub customers: Vec<Customer>,
    pub suppliers: Vec<Supplier>,
    pub sales: Vec<Sale>,
    pub purchases: Vec<Purchase>,
    pub movements: Vec<StockMovement>,
    pub payments: Vec<CustomerPayment>,
    pub settings: Settings,
    pub language: Locale,
}

impl AppState {
    // -------------------------------------------------------------------------
    // Lookups
    // -------------------------------------------------------------------------

    pub fn product(&self, id: &str) -> CoreResult<&Product> {
        self.products
            .iter()
            .find(|p| p.id == id)
            .ok_or_else(|| CoreError::ProductNotFound(id.to_string()))
    }

    pub fn product_mut(&mut self, id: &str) -> CoreResult<&mut Product> {
        self.products
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or_else(|| CoreError::ProductNotFound(id.to_string()))
    }

    pub fn customer(&self, id: &str) -> CoreResult<&Customer> {
        self.customers
            .iter()
            .find(|c| c.id == id)
            .ok_or_else(|| CoreError::CustomerNotFound(id.to_string()))
    }

    pub fn customer_mut(&mut self, id: &str) -> CoreResult<&mut Customer> {
        self.customers
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or_else(|| CoreError::CustomerNotFound(id.to_string()))
    }

    pub fn supplier(&self, id: &str) -> CoreResult<&Supplier> {
        self.suppliers
            .iter()
            .find(|s| s.id == id)
            .ok_or_else(|| CoreError::SupplierNotFound(id.to_string()))
    }

    pub fn sale(&self, id: &str) -> CoreResult<&Sale> {
        self.sales
            .iter()
            .find(|s| s.id == id)
            .ok_or_else(|| CoreError::SaleNotFound(id.to_string()))
    }

    pub fn sale_mut(&mut self, id: &str) -> CoreResult<&mut Sale> {
        self.sales
            .iter_mut()
            .find(|s| s.id == id)
            .ok_or_else(|| CoreError::SaleNotFound(id.to_string()))
    }

    pub fn purchase(&self, id: &str) -> CoreResult<&Purchase> {
        self.purchases
            .iter()
            .find(|p| p.id == id)
            .ok_or_else(|| CoreError::PurchaseNotFound(id.to_string()))
    }

    pub fn purchase_mut(&mut self, id: &str) -> CoreResult<&mut Purchase> {
        self.purchases
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or_else(|| CoreError::PurchaseNotFound(id.to_string()))
    }

    /// Movements of one product, in log order.
    pub fn movements_for<'a>(
        &'a self,
        product_id: &'a str,
    ) -> impl Iterator<Item = &'a StockMovement> + 'a {
        self.movements
            .iter()
            .filter(move |m| m.product_id == product_id)
    }

    // -------------------------------------------------------------------------
    // Transactions
    // -------------------------------------------------------------------------

    /// Lists the collections that differ from `before`.
    ///
    /// ## Example
    /// ```rust
    /// use geststock_core::{AppState, Collection, Locale};
    ///
    /// let before = AppState::default();
    /// let mut after = before.clone();
    /// after.language = Locale::En;
    /// assert_eq!(after.changed_since(&before), vec![Collection::Language]);
    /// ```
    pub fn changed_since(&self, before: &AppState) -> Vec<Collection> {
        Collection::ALL
            .into_iter()
            .filter(|c| match c {
                Collection::Products => self.products != before.products,
                Collection::Customers => self.customers != before.customers,
                Collection::Suppliers => self.suppliers != before.suppliers,
                Collection::Sales => self.sales != before.sales,
                Collection::Purchases => self.purchases != before.purchases,
                Collection::Movements => self.movements != before.movements,
                Collection::Payments => self.payments != before.payments,
                Collection::Settings => self.settings != before.settings,
                Collection::Language => self.language != before.language,
            })
            .collect()
    }

    /// Runs `op` on a staged copy; commits it only if `op` succeeds.
    ///
    /// ```text
    /// self ──clone──► staged ──op──► Ok  ──► self = staged
    ///                              └► Err ──► self untouched
    /// ```
    ///
    /// Returns the operation's value and the collections it changed.
    pub fn transact<T, F>(&mut self, op: F) -> CoreResult<(T, Vec<Collection>)>
    where
        F: FnOnce(&mut AppState) -> CoreResult<T>,
    {
        let mut staged = self.clone();
        let value = op(&mut staged)?;
        let changed = staged.changed_since(self);
        *self = staged;
        Ok((value, changed))
    }
}

// =============================================================================
// Recorded
// =============================================================================

/// Result of a write operation: the updated entity plus any warnings.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Recorded<T> {
    pub value: T,
    pub warnings: Vec<LedgerWarning>,
}

impl<T> Recorded<T> {
    /// A result with no warnings.
    pub fn clean(value: T) -> Self {
        Recorded {
            value,
            warnings: Vec::new(),
        }
    }

    pub fn with_warnings(value: T, warnings: Vec<LedgerWarning>) -> Self {
        Recorded { value, warnings }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Recorded<U> {
        Recorded {
            value: f(self.value),
            warnings: self.warnings,
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_unknown_ids() {
        let state = AppState::default();
        assert!(matches!(
            state.product("p-404"),
            Err(CoreError::ProductNotFound(id)) if id == "p-404"
        ));
        assert!(matches!(
            state.customer("c-404"),
            Err(CoreError::CustomerNotFound(_))
        ));
        assert!(matches!(state.sale("s-404"), Err(CoreError::SaleNotFound(_))));
    }

    #[test]
    fn test_transact_rolls_back_on_error() {
        let mut state = AppState::default();
        let result: CoreResult<((), Vec<Collection>)> = state.transact(|staged| {
            staged.language = Locale::En;
            Err(CoreError::invalid_amount("boom"))
        });

        assert!(result.is_err());
        assert_eq!(state.language, Locale::Fr);
    }

    #[test]
    fn test_transact_commits_and_reports_changes() {
        let mut state = AppState::default();
        let (value, changed) = state
            .transact(|staged| {
                staged.settings.company_name = "Alimentation Bonanjo".to_string();
                Ok(42)
            })
            .unwrap();

        assert_eq!(value, 42);
        assert_eq!(changed, vec![Collection::Settings]);
        assert_eq!(state.settings.company_name, "Alimentation Bonanjo");
    }

    #[test]
    fn test_collection_keys_are_unique() {
        let mut keys: Vec<_> = Collection::ALL.iter().map(|c| c.key()).collect();
        keys.sort_unstable();
        keys.dedup();
        assert_eq!(keys.len(), Collection::ALL.len());
    }
}
