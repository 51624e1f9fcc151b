//! # Backup Export / Import
//!
//! A backup is one JSON document holding every collection except the UI
//! language.
//!
//! ## Document Shape
//! ```text
//! {
//!   "schemaVersion": 1,
//!   "products":  [...],   "sales":     [...],
//!   "customers": [...],   "suppliers": [...],
//!   "purchases": [...],   "movements": [...],   ← may be absent
//!   "payments":  [...],                          ← may be absent
//!   "settings":  {...}
//! }
//! ```
//!
//! Backups made before movements and payments were tracked load with empty
//! logs. Products whose stock is not explained by any movement then get an
//! opening movement so the ledger audit stays clean.

use serde::{Deserialize, Serialize};
use tracing::info;

use geststock_core::ledger::stock::open_missing_balances;
use geststock_core::{
    AppState, Customer, CustomerPayment, Product, Purchase, Sale, Settings, StockMovement,
    Supplier, SCHEMA_VERSION,
};

use crate::error::StoreResult;
use crate::inventory::{ensure_supported, Inventory};
use crate::store::KeyValueStore;

fn legacy_schema_version() -> u32 {
    1
}

/// Full backup document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackupDocument {
    #[serde(default = "legacy_schema_version")]
    pub schema_version: u32,
    pub products: Vec<Product>,
    pub sales: Vec<Sale>,
    pub customers: Vec<Customer>,
    pub suppliers: Vec<Supplier>,
    pub purchases: Vec<Purchase>,
    #[serde(default)]
    pub movements: Vec<StockMovement>,
    #[serde(default)]
    pub payments: Vec<CustomerPayment>,
    #[serde(default)]
    pub settings: Settings,
}

impl BackupDocument {
    /// Snapshot of `state`.
    pub fn from_state(state: &AppState) -> Self {
        BackupDocument {
            schema_version: SCHEMA_VERSION,
            products: state.products.clone(),
            sales: state.sales.clone(),
            customers: state.customers.clone(),
            suppliers: state.suppliers.clone(),
            purchases: state.purchases.clone(),
            movements: state.movements.clone(),
            payments: state.payments.clone(),
            settings: state.settings.clone(),
        }
    }

    /// Parses a backup from JSON text.
    pub fn from_json(text: &str) -> StoreResult<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// Pretty-printed JSON text.
    pub fn to_json(&self) -> StoreResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// What an import brought in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportSummary {
    pub products: usize,
    pub customers: usize,
    pub suppliers: usize,
    pub sales: usize,
    pub purchases: usize,
    pub movements: usize,
    /// Opening movements added for products with unexplained stock.
    pub opened_balances: usize,
}

impl<S: KeyValueStore> Inventory<S> {
    /// Snapshot of the current state as a backup document.
    pub fn export_backup(&self) -> BackupDocument {
        BackupDocument::from_state(self.state())
    }

    pub fn export_backup_json(&self) -> StoreResult<String> {
        self.export_backup().to_json()
    }

    /// Replaces every collection with the backup's content.
    ///
    /// ## What This Does
    /// 1. Rejects backups written by a newer version
    /// 2. Keeps the current UI language
    /// 3. Opens missing stock balances (see module docs)
    /// 4. Rewrites every key in one commit
    ///
    /// On error the previous state and store are kept.
    pub fn import_backup(&mut self, document: BackupDocument) -> StoreResult<ImportSummary> {
        ensure_supported(document.schema_version)?;

        let mut state = AppState {
            products: document.products,
            customers: document.customers,
            suppliers: document.suppliers,
            sales: document.sales,
            purchases: document.purchases,
            movements: document.movements,
            payments: document.payments,
            settings: document.settings,
            language: self.language(),
        };
        let opened = open_missing_balances(&mut state, self.now());

        let summary = ImportSummary {
            products: state.products.len(),
            customers: state.customers.len(),
            suppliers: state.suppliers.len(),
            sales: state.sales.len(),
            purchases: state.purchases.len(),
            movements: state.movements.len(),
            opened_balances: opened.len(),
        };

        self.replace_state(state)?;

        info!(
            products = summary.products,
            sales = summary.sales,
            opened_balances = summary.opened_balances,
            "Backup imported"
        );
        Ok(summary)
    }

    pub fn import_backup_json(&mut self, text: &str) -> StoreResult<ImportSummary> {
        self.import_backup(BackupDocument::from_json(text)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StoreError;
    use crate::store::MemoryStore;
    use geststock_core::{Locale, Money, ProductCategory, Unit};
    use serde_json::json;

    fn product_json(id: &str, stock: i64) -> serde_json::Value {
        json!({
            "id": id,
            "name": "Lait Nido 400g",
            "description": null,
            "category": "food",
            "unit": "piece",
            "currentStock": stock,
            "minStock": 5,
            "maxStock": 40,
            "buyPrice": 2800,
            "sellPrice": 3200,
            "supplierId": null,
            "createdAt": "2025-01-10T08:00:00Z",
            "updatedAt": "2025-01-10T08:00:00Z"
        })
    }

    #[test]
    fn test_backup_without_logs_gets_opening_balances() {
        let text = json!({
            "products": [product_json("p-1", 12), product_json("p-2", 0)],
            "sales": [],
            "customers": [],
            "suppliers": [],
            "purchases": [],
            "settings": { "companyName": "Boutique Ndogbong" }
        })
        .to_string();

        let mut inventory = Inventory::open(MemoryStore::new()).unwrap();
        let summary = inventory.import_backup_json(&text).unwrap();

        assert_eq!(summary.products, 2);
        assert_eq!(summary.opened_balances, 1);
        assert_eq!(inventory.settings().company_name, "Boutique Ndogbong");
        assert_eq!(inventory.settings().currency, "F CFA");
        assert!(inventory.audit().is_clean());
    }

    #[test]
    fn test_import_keeps_language() {
        let mut inventory = Inventory::open(MemoryStore::new()).unwrap();
        inventory.set_language(Locale::En).unwrap();

        inventory
            .import_backup(BackupDocument::from_state(&AppState::default()))
            .unwrap();

        assert_eq!(inventory.language(), Locale::En);
    }

    #[test]
    fn test_newer_backup_is_rejected() {
        let mut inventory = Inventory::open(MemoryStore::new()).unwrap();
        let existing = inventory
            .products()
            .create(
                geststock_core::ProductInput {
                    name: "Bière 65cl".to_string(),
                    description: None,
                    category: ProductCategory::Food,
                    unit: Unit::Piece,
                    min_stock: 24,
                    max_stock: 480,
                    buy_price: Money::from_units(500),
                    sell_price: Money::from_units(650),
                    supplier_id: None,
                },
                48,
            )
            .unwrap();

        let mut document = BackupDocument::from_state(&AppState::default());
        document.schema_version = SCHEMA_VERSION + 1;

        assert!(matches!(
            inventory.import_backup(document),
            Err(StoreError::SchemaMismatch { .. })
        ));
        assert_eq!(inventory.products().get(&existing.id).unwrap().current_stock, 48);
    }
}
