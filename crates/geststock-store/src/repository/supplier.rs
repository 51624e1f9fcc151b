//! # Supplier Repository

use geststock_core::catalog;
use geststock_core::{Product, Purchase, Supplier, SupplierInput};

use crate::error::StoreResult;
use crate::inventory::Inventory;
use crate::store::KeyValueStore;

#[derive(Debug)]
pub struct SupplierRepository<'a, S: KeyValueStore> {
    inventory: &'a mut Inventory<S>,
}

impl<'a, S: KeyValueStore> SupplierRepository<'a, S> {
    pub fn new(inventory: &'a mut Inventory<S>) -> Self {
        SupplierRepository { inventory }
    }

    pub fn list(&self) -> Vec<Supplier> {
        self.inventory.state().suppliers.clone()
    }

    pub fn get(&self, id: &str) -> StoreResult<Supplier> {
        Ok(self.inventory.state().supplier(id)?.clone())
    }

    /// Case-insensitive search on name, contact and phone.
    pub fn search(&self, query: &str) -> StoreResult<Vec<Supplier>> {
        Ok(catalog::search_suppliers(self.inventory.state(), query)?
            .into_iter()
            .cloned()
            .collect())
    }

    /// Products that name this supplier as preferred.
    pub fn products(&self, id: &str) -> Vec<Product> {
        self.inventory
            .state()
            .products
            .iter()
            .filter(|p| p.supplier_id.as_deref() == Some(id))
            .cloned()
            .collect()
    }

    pub fn purchases(&self, id: &str) -> Vec<Purchase> {
        self.inventory
            .state()
            .purchases
            .iter()
            .filter(|p| p.supplier_id == id)
            .cloned()
            .collect()
    }

    pub fn create(&mut self, input: SupplierInput) -> StoreResult<Supplier> {
        let now = self.inventory.now();
        self.inventory
            .transact(|state| catalog::create_supplier(state, input, now))
    }

    pub fn update(&mut self, id: &str, input: SupplierInput) -> StoreResult<Supplier> {
        self.inventory
            .transact(|state| catalog::update_supplier(state, id, input))
    }

    /// Deletes the supplier and unlinks its products in one commit.
    pub fn delete(&mut self, id: &str) -> StoreResult<Supplier> {
        self.inventory
            .transact(|state| catalog::delete_supplier(state, id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use geststock_core::{Money, ProductCategory, ProductInput, Unit};

    fn input() -> SupplierInput {
        SupplierInput {
            name: "Brasseries du Cameroun".to_string(),
            contact: "Jean Mbarga".to_string(),
            phone: "+237 233 42 00 00".to_string(),
            email: None,
            address: "Douala, Bassa".to_string(),
            payment_terms: "30 jours".to_string(),
            delivery_delay: 3,
        }
    }

    #[test]
    fn test_delete_unlinks_products() {
        let mut inventory = Inventory::open(MemoryStore::new()).unwrap();
        let supplier = inventory.suppliers().create(input()).unwrap();
        let product = inventory
            .products()
            .create(
                ProductInput {
                    name: "Eau minérale 1,5L".to_string(),
                    description: None,
                    category: ProductCategory::Food,
                    unit: Unit::Piece,
                    min_stock: 12,
                    max_stock: 240,
                    buy_price: Money::from_units(250),
                    sell_price: Money::from_units(350),
                    supplier_id: Some(supplier.id.clone()),
                },
                24,
            )
            .unwrap();
        assert_eq!(inventory.suppliers().products(&supplier.id).len(), 1);

        inventory.suppliers().delete(&supplier.id).unwrap();

        assert_eq!(inventory.products().get(&product.id).unwrap().supplier_id, None);
        assert!(inventory.suppliers().list().is_empty());
    }

    #[test]
    fn test_search_matches_contact() {
        let mut inventory = Inventory::open(MemoryStore::new()).unwrap();
        inventory.suppliers().create(input()).unwrap();

        assert_eq!(inventory.suppliers().search("mbarga").unwrap().len(), 1);
        assert!(inventory.suppliers().search("yaoundé").unwrap().is_empty());
    }
}
