//! # Purchase Repository
//!
//! Purchase orders: `pending → received` or `pending → cancelled`.

use geststock_core::report::{self, PurchaseSummary};
use geststock_core::{Purchase, PurchaseDraft, PurchaseStatus, Recorded};

use crate::error::StoreResult;
use crate::inventory::Inventory;
use crate::store::KeyValueStore;

#[derive(Debug)]
pub struct PurchaseRepository<'a, S: KeyValueStore> {
    inventory: &'a mut Inventory<S>,
}

impl<'a, S: KeyValueStore> PurchaseRepository<'a, S> {
    pub fn new(inventory: &'a mut Inventory<S>) -> Self {
        PurchaseRepository { inventory }
    }

    /// All purchase orders, newest first.
    pub fn list(&self) -> Vec<Purchase> {
        self.inventory.state().purchases.iter().rev().cloned().collect()
    }

    pub fn pending(&self) -> Vec<Purchase> {
        self.inventory
            .state()
            .purchases
            .iter()
            .rev()
            .filter(|p| p.status == PurchaseStatus::Pending)
            .cloned()
            .collect()
    }

    pub fn get(&self, id: &str) -> StoreResult<Purchase> {
        Ok(self.inventory.state().purchase(id)?.clone())
    }

    pub fn summary(&self) -> PurchaseSummary {
        report::purchase_summary(self.inventory.state())
    }

    pub fn create(&mut self, draft: PurchaseDraft) -> StoreResult<Purchase> {
        self.inventory.create_purchase(draft)
    }

    /// Receives the order; stock goes up for every line.
    pub fn receive(&mut self, id: &str) -> StoreResult<Recorded<Purchase>> {
        self.inventory.record_purchase_receipt(id)
    }

    pub fn cancel(&mut self, id: &str) -> StoreResult<Purchase> {
        self.inventory.cancel_purchase(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use geststock_core::{
        CoreError, LedgerWarning, Money, ProductCategory, ProductInput, PurchaseLine,
        SupplierInput, Unit,
    };

    fn setup() -> (Inventory<MemoryStore>, String, String) {
        let mut inventory = Inventory::open(MemoryStore::new()).unwrap();
        let supplier = inventory
            .suppliers()
            .create(SupplierInput {
                name: "Sodecoton".to_string(),
                contact: "Awa Hamadou".to_string(),
                phone: "+237 222 27 10 00".to_string(),
                email: None,
                address: "Garoua".to_string(),
                payment_terms: "Comptant".to_string(),
                delivery_delay: 7,
            })
            .unwrap();
        let product = inventory
            .products()
            .create(
                ProductInput {
                    name: "Huile Diamaor 1L".to_string(),
                    description: None,
                    category: ProductCategory::Food,
                    unit: Unit::Liter,
                    min_stock: 10,
                    max_stock: 50,
                    buy_price: Money::from_units(1_100),
                    sell_price: Money::from_units(1_400),
                    supplier_id: Some(supplier.id.clone()),
                },
                20,
            )
            .unwrap();
        (inventory, supplier.id, product.id)
    }

    fn draft(supplier_id: &str, product_id: &str, quantity: i64) -> PurchaseDraft {
        PurchaseDraft {
            supplier_id: supplier_id.to_string(),
            items: vec![PurchaseLine {
                product_id: product_id.to_string(),
                quantity,
            }],
            notes: None,
        }
    }

    #[test]
    fn test_receive_raises_stock_and_warns_above_max() {
        let (mut inventory, supplier_id, product_id) = setup();
        let purchase = inventory
            .purchases()
            .create(draft(&supplier_id, &product_id, 40))
            .unwrap();
        assert_eq!(inventory.purchases().pending().len(), 1);

        let recorded = inventory.purchases().receive(&purchase.id).unwrap();

        assert_eq!(recorded.value.status, PurchaseStatus::Received);
        assert!(matches!(
            recorded.warnings.as_slice(),
            [LedgerWarning::AboveMaxStock { current_stock: 60, .. }]
        ));
        assert_eq!(inventory.products().get(&product_id).unwrap().current_stock, 60);
        assert!(inventory.purchases().pending().is_empty());
    }

    #[test]
    fn test_cancelled_order_cannot_be_received() {
        let (mut inventory, supplier_id, product_id) = setup();
        let purchase = inventory
            .purchases()
            .create(draft(&supplier_id, &product_id, 5))
            .unwrap();
        inventory.purchases().cancel(&purchase.id).unwrap();

        let err = inventory.purchases().receive(&purchase.id).unwrap_err();
        assert!(matches!(
            err.as_domain(),
            Some(CoreError::InvalidPurchaseStatus { .. })
        ));
        assert_eq!(inventory.products().get(&product_id).unwrap().current_stock, 20);
        assert!(inventory.purchases().summary().total_value.is_zero());
    }
}
