//! # Customer Repository
//!
//! Customers, their debt and their repayments.

use geststock_core::catalog;
use geststock_core::report::{self, CustomerSummary};
use geststock_core::{Customer, CustomerInput, CustomerPayment, Money, Recorded, Sale};

use crate::error::StoreResult;
use crate::inventory::Inventory;
use crate::store::KeyValueStore;

#[derive(Debug)]
pub struct CustomerRepository<'a, S: KeyValueStore> {
    inventory: &'a mut Inventory<S>,
}

impl<'a, S: KeyValueStore> CustomerRepository<'a, S> {
    pub fn new(inventory: &'a mut Inventory<S>) -> Self {
        CustomerRepository { inventory }
    }

    pub fn list(&self) -> Vec<Customer> {
        self.inventory.state().customers.clone()
    }

    pub fn get(&self, id: &str) -> StoreResult<Customer> {
        Ok(self.inventory.state().customer(id)?.clone())
    }

    /// Case-insensitive search on name and phone.
    pub fn search(&self, query: &str) -> StoreResult<Vec<Customer>> {
        Ok(catalog::search_customers(self.inventory.state(), query)?
            .into_iter()
            .cloned()
            .collect())
    }

    /// Customers whose debt exceeds their credit limit.
    pub fn over_limit(&self) -> Vec<Customer> {
        self.inventory
            .state()
            .customers
            .iter()
            .filter(|c| c.is_over_limit())
            .cloned()
            .collect()
    }

    /// Sales made to one customer, newest first.
    pub fn sales(&self, id: &str) -> Vec<Sale> {
        let mut sales: Vec<Sale> = self
            .inventory
            .state()
            .sales
            .iter()
            .filter(|s| s.customer_id.as_deref() == Some(id))
            .cloned()
            .collect();
        sales.reverse();
        sales
    }

    /// Repayments recorded for one customer, in the order they were made.
    pub fn payments(&self, id: &str) -> Vec<CustomerPayment> {
        self.inventory
            .state()
            .payments
            .iter()
            .filter(|p| p.customer_id == id)
            .cloned()
            .collect()
    }

    pub fn summary(&self) -> CustomerSummary {
        report::customer_summary(self.inventory.state())
    }

    pub fn create(&mut self, input: CustomerInput) -> StoreResult<Customer> {
        let now = self.inventory.now();
        self.inventory
            .transact(|state| catalog::create_customer(state, input, now))
    }

    pub fn update(&mut self, id: &str, input: CustomerInput) -> StoreResult<Customer> {
        self.inventory
            .transact(|state| catalog::update_customer(state, id, input))
    }

    pub fn delete(&mut self, id: &str) -> StoreResult<Customer> {
        self.inventory
            .transact(|state| catalog::delete_customer(state, id))
    }

    /// Records a repayment. Same as [`Inventory::record_payment`].
    pub fn record_payment(&mut self, id: &str, amount: Money) -> StoreResult<Recorded<Customer>> {
        self.inventory.record_payment(id, amount)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use geststock_core::CustomerType;

    fn input(name: &str, phone: &str) -> CustomerInput {
        CustomerInput {
            name: name.to_string(),
            phone: phone.to_string(),
            email: None,
            customer_type: CustomerType::Individual,
            credit_limit: Money::from_units(50_000),
            address: Some("Douala, Akwa".to_string()),
        }
    }

    #[test]
    fn test_create_search_and_summary() {
        let mut inventory = Inventory::open(MemoryStore::new()).unwrap();
        inventory
            .customers()
            .create(input("Marie Ngo", "+237 677 11 22 33"))
            .unwrap();
        inventory
            .customers()
            .create(input("Paul Etoa", "+237 699 44 55 66"))
            .unwrap();

        let hits = inventory.customers().search("699").unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].name, "Paul Etoa");

        let summary = inventory.customers().summary();
        assert_eq!(summary.individual_count, 2);
        assert_eq!(summary.debt_free_count, 2);
        assert!(summary.total_debt.is_zero());
    }

    #[test]
    fn test_payment_on_debt_free_customer_is_recorded() {
        let mut inventory = Inventory::open(MemoryStore::new()).unwrap();
        let customer = inventory
            .customers()
            .create(input("Aïcha Bello", "+237 650 00 00 00"))
            .unwrap();

        let recorded = inventory
            .customers()
            .record_payment(&customer.id, Money::from_units(1_000))
            .unwrap();

        assert!(recorded.value.current_debt.is_zero());
        let payments = inventory.customers().payments(&customer.id);
        assert_eq!(payments.len(), 1);
        assert!(payments[0].applied.is_zero());
    }
}
