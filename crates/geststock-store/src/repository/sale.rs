//! # Sale Repository
//!
//! Sales history and the two sale transitions.
//!
//! ## Sale Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Sale Lifecycle                                    │
//! │                                                                         │
//! │  1. RECORD                                                              │
//! │     └── record(draft) → Sale { status: Completed }                     │
//! │         stock out for every line, debt up on a credit sale              │
//! │                                                                         │
//! │  2. (OPTIONAL) CANCEL                                                  │
//! │     └── cancel(id) → Sale { status: Cancelled }                        │
//! │         stock back for every line, debt down on a credit sale           │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, FixedOffset};

use geststock_core::report::{self, SalesSummary};
use geststock_core::{Recorded, Sale, SaleDraft, SaleStatus};

use crate::error::StoreResult;
use crate::inventory::Inventory;
use crate::store::KeyValueStore;

#[derive(Debug)]
pub struct SaleRepository<'a, S: KeyValueStore> {
    inventory: &'a mut Inventory<S>,
}

impl<'a, S: KeyValueStore> SaleRepository<'a, S> {
    pub fn new(inventory: &'a mut Inventory<S>) -> Self {
        SaleRepository { inventory }
    }

    /// All sales, newest first.
    pub fn list(&self) -> Vec<Sale> {
        self.inventory.state().sales.iter().rev().cloned().collect()
    }

    pub fn list_by_status(&self, status: SaleStatus) -> Vec<Sale> {
        self.inventory
            .state()
            .sales
            .iter()
            .rev()
            .filter(|s| s.status == status)
            .cloned()
            .collect()
    }

    pub fn get(&self, id: &str) -> StoreResult<Sale> {
        Ok(self.inventory.state().sale(id)?.clone())
    }

    pub fn summary(&self, as_of: DateTime<FixedOffset>) -> SalesSummary {
        report::sales_summary(self.inventory.state(), as_of)
    }

    pub fn record(&mut self, draft: SaleDraft) -> StoreResult<Recorded<Sale>> {
        self.inventory.record_sale(draft)
    }

    pub fn cancel(&mut self, id: &str) -> StoreResult<Recorded<Sale>> {
        self.inventory.cancel_sale(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use geststock_core::{Money, PaymentMethod, ProductCategory, ProductInput, SaleLine, Unit};

    fn inventory_with_product(stock: i64) -> (Inventory<MemoryStore>, String) {
        let mut inventory = Inventory::open(MemoryStore::new()).unwrap();
        let product = inventory
            .products()
            .create(
                ProductInput {
                    name: "Savon de Marseille".to_string(),
                    description: None,
                    category: ProductCategory::Household,
                    unit: Unit::Piece,
                    min_stock: 2,
                    max_stock: 60,
                    buy_price: Money::from_units(300),
                    sell_price: Money::from_units(500),
                    supplier_id: None,
                },
                stock,
            )
            .unwrap();
        (inventory, product.id)
    }

    fn draft(product_id: &str, quantity: i64) -> SaleDraft {
        SaleDraft {
            customer_id: None,
            items: vec![SaleLine {
                product_id: product_id.to_string(),
                quantity,
            }],
            payment_method: PaymentMethod::MobileMoney,
            notes: None,
        }
    }

    #[test]
    fn test_list_is_newest_first() {
        let (mut inventory, product_id) = inventory_with_product(10);
        let first = inventory.sales().record(draft(&product_id, 1)).unwrap().value;
        let second = inventory.sales().record(draft(&product_id, 2)).unwrap().value;

        let ids: Vec<String> = inventory.sales().list().into_iter().map(|s| s.id).collect();
        assert_eq!(ids, vec![second.id, first.id]);
    }

    #[test]
    fn test_cancel_moves_sale_to_cancelled_list() {
        let (mut inventory, product_id) = inventory_with_product(10);
        let sale = inventory.sales().record(draft(&product_id, 4)).unwrap().value;

        inventory.sales().cancel(&sale.id).unwrap();

        assert!(inventory.sales().list_by_status(SaleStatus::Completed).is_empty());
        assert_eq!(inventory.sales().list_by_status(SaleStatus::Cancelled).len(), 1);
        assert_eq!(inventory.products().get(&product_id).unwrap().current_stock, 10);
    }
}
