//! # Product Repository
//!
//! Catalogue operations and per-product movement history.
//!
//! ## Stock Is Read-Only Here
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  create(input, initial_stock)  ──► product + "initial stock" movement   │
//! │  update(id, input)             ──► fields only, stock untouched         │
//! │  delete(id)                    ──► product gone, movements kept         │
//! │                                                                         │
//! │  Stock changes go through Inventory::record_sale,                       │
//! │  record_purchase_receipt, adjust_stock and cancel_sale.                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use tracing::debug;

use geststock_core::catalog;
use geststock_core::{Product, ProductInput, StockMovement};

use crate::error::StoreResult;
use crate::inventory::Inventory;
use crate::store::KeyValueStore;

/// Repository for product operations.
///
/// ## Usage
/// ```rust,ignore
/// let mut products = inventory.products();
///
/// // Search products
/// let results = products.search("riz")?;
///
/// // Get by ID
/// let product = products.get("uuid-here")?;
/// ```
#[derive(Debug)]
pub struct ProductRepository<'a, S: KeyValueStore> {
    inventory: &'a mut Inventory<S>,
}

impl<'a, S: KeyValueStore> ProductRepository<'a, S> {
    pub fn new(inventory: &'a mut Inventory<S>) -> Self {
        ProductRepository { inventory }
    }

    /// All products, in creation order.
    pub fn list(&self) -> Vec<Product> {
        self.inventory.state().products.clone()
    }

    pub fn get(&self, id: &str) -> StoreResult<Product> {
        Ok(self.inventory.state().product(id)?.clone())
    }

    /// Case-insensitive search on name and category.
    ///
    /// ## Example
    /// ```rust,ignore
    /// // Empty query returns every product
    /// let all = repo.search("")?;
    /// ```
    pub fn search(&self, query: &str) -> StoreResult<Vec<Product>> {
        let hits: Vec<Product> = catalog::search_products(self.inventory.state(), query)?
            .into_iter()
            .cloned()
            .collect();
        debug!(query = %query, count = hits.len(), "Searched products");
        Ok(hits)
    }

    /// Products at or below their minimum stock.
    pub fn low_stock(&self) -> Vec<Product> {
        self.inventory
            .state()
            .products
            .iter()
            .filter(|p| p.is_low_stock())
            .cloned()
            .collect()
    }

    /// Movement history of one product, in log order.
    pub fn movements(&self, id: &str) -> Vec<StockMovement> {
        self.inventory.state().movements_for(id).cloned().collect()
    }

    /// Creates a product with `initial_stock` units on the shelf.
    pub fn create(&mut self, input: ProductInput, initial_stock: i64) -> StoreResult<Product> {
        let now = self.inventory.now();
        self.inventory
            .transact(|state| catalog::create_product(state, input, initial_stock, now))
    }

    pub fn update(&mut self, id: &str, input: ProductInput) -> StoreResult<Product> {
        let now = self.inventory.now();
        self.inventory
            .transact(|state| catalog::update_product(state, id, input, now))
    }

    pub fn delete(&mut self, id: &str) -> StoreResult<Product> {
        self.inventory
            .transact(|state| catalog::delete_product(state, id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use geststock_core::{CoreError, Money, ProductCategory, Unit};

    fn input(name: &str) -> ProductInput {
        ProductInput {
            name: name.to_string(),
            description: None,
            category: ProductCategory::Food,
            unit: Unit::Kg,
            min_stock: 5,
            max_stock: 100,
            buy_price: Money::from_units(450),
            sell_price: Money::from_units(600),
            supplier_id: None,
        }
    }

    #[test]
    fn test_create_persists_product_and_movement() {
        let mut inventory = Inventory::open(MemoryStore::new()).unwrap();
        let product = inventory.products().create(input("Riz parfumé"), 12).unwrap();

        assert_eq!(product.current_stock, 12);
        assert_eq!(inventory.products().movements(&product.id).len(), 1);
        assert!(inventory.store().get("products").unwrap().is_some());
        assert!(inventory.store().get("movements").unwrap().is_some());
    }

    #[test]
    fn test_update_keeps_stock() {
        let mut inventory = Inventory::open(MemoryStore::new()).unwrap();
        let product = inventory.products().create(input("Huile"), 8).unwrap();

        let mut edited = input("Huile de palme");
        edited.sell_price = Money::from_units(1_500);
        let updated = inventory.products().update(&product.id, edited).unwrap();

        assert_eq!(updated.name, "Huile de palme");
        assert_eq!(updated.current_stock, 8);
    }

    #[test]
    fn test_delete_then_get_is_not_found() {
        let mut inventory = Inventory::open(MemoryStore::new()).unwrap();
        let product = inventory.products().create(input("Sucre"), 0).unwrap();
        inventory.products().delete(&product.id).unwrap();

        let err = inventory.products().get(&product.id).unwrap_err();
        assert!(matches!(err.as_domain(), Some(CoreError::ProductNotFound(_))));
    }

    #[test]
    fn test_search_and_low_stock() {
        let mut inventory = Inventory::open(MemoryStore::new()).unwrap();
        inventory.products().create(input("Riz"), 3).unwrap();
        inventory.products().create(input("Farine"), 50).unwrap();

        let hits = inventory.products().search("RIZ").unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(inventory.products().search("").unwrap().len(), 2);

        let low = inventory.products().low_stock();
        assert_eq!(low.len(), 1);
        assert_eq!(low[0].name, "Riz");
    }
}
