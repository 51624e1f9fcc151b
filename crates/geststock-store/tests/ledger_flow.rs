//! End-to-end ledger flows against an in-memory store.

use std::io;

use chrono::{DateTime, FixedOffset, TimeZone, Utc};
use serde_json::Value;

use geststock_core::report::ReportRange;
use geststock_core::{
    AdjustmentReason, CoreError, CustomerInput, CustomerType, LedgerWarning, Money,
    PaymentMethod, ProductCategory, ProductInput, SaleDraft, SaleLine, Unit,
};
use geststock_store::{Inventory, KeyValueStore, MemoryStore, StoreError, StoreResult};

fn fixed_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 3, 14, 10, 0, 0).unwrap()
}

fn as_of() -> DateTime<FixedOffset> {
    fixed_now().with_timezone(&FixedOffset::east_opt(3600).unwrap())
}

fn product(name: &str, sell_price: i64) -> ProductInput {
    ProductInput {
        name: name.to_string(),
        description: None,
        category: ProductCategory::Food,
        unit: Unit::Piece,
        min_stock: 2,
        max_stock: 100,
        buy_price: Money::from_units(sell_price * 3 / 4),
        sell_price: Money::from_units(sell_price),
        supplier_id: None,
    }
}

fn sale<S: AsRef<str>>(
    customer_id: Option<&str>,
    method: PaymentMethod,
    lines: &[(S, i64)],
) -> SaleDraft {
    SaleDraft {
        customer_id: customer_id.map(str::to_string),
        items: lines
            .iter()
            .map(|(id, quantity)| SaleLine {
                product_id: id.as_ref().to_string(),
                quantity: *quantity,
            })
            .collect(),
        payment_method: method,
        notes: None,
    }
}

fn open() -> Inventory<MemoryStore> {
    Inventory::open(MemoryStore::new())
        .unwrap()
        .with_clock(fixed_now)
}

/// Store whose writes start failing after a set number of entries.
///
/// Entries go one at a time into a staged copy, as a disk commit would,
/// and the copy is only kept when every entry made it.
#[derive(Debug, Default)]
struct FlakyStore {
    inner: MemoryStore,
    /// Entries still accepted; `None` never fails.
    fail_after: Option<usize>,
}

impl FlakyStore {
    fn refuse() -> StoreError {
        StoreError::io("flaky", io::Error::new(io::ErrorKind::Other, "disk full"))
    }
}

impl KeyValueStore for FlakyStore {
    fn get(&self, key: &str) -> StoreResult<Option<Value>> {
        self.inner.get(key)
    }

    fn set_many(&mut self, entries: Vec<(String, Value)>) -> StoreResult<()> {
        let mut staged = self.inner.clone();
        for (key, value) in entries {
            match self.fail_after.as_mut() {
                Some(0) => return Err(Self::refuse()),
                Some(left) => *left -= 1,
                None => {}
            }
            staged.set(&key, value)?;
        }
        self.inner = staged;
        Ok(())
    }

    fn remove(&mut self, key: &str) -> StoreResult<()> {
        self.inner.remove(key)
    }

    fn clear(&mut self) -> StoreResult<()> {
        self.inner.clear()
    }
}

#[test]
fn test_stock_always_matches_movement_log() {
    let mut inventory = open();
    let rice = inventory.products().create(product("Riz 5kg", 4_500), 30).unwrap();
    let oil = inventory.products().create(product("Huile 1L", 1_400), 10).unwrap();

    let recorded = inventory
        .record_sale(sale(None, PaymentMethod::Cash, &[(&rice.id, 4), (&oil.id, 2)]))
        .unwrap();
    inventory
        .adjust_stock(&rice.id, -1, AdjustmentReason::Loss, Some("sac percé".to_string()))
        .unwrap();
    inventory.cancel_sale(&recorded.value.id).unwrap();
    inventory
        .adjust_stock(&oil.id, 5, AdjustmentReason::Correction, None)
        .unwrap();

    for id in [&rice.id, &oil.id] {
        let logged: i64 = inventory
            .products()
            .movements(id)
            .iter()
            .map(|m| m.quantity)
            .sum();
        assert_eq!(inventory.products().get(id).unwrap().current_stock, logged);
    }
    assert_eq!(inventory.products().get(&rice.id).unwrap().current_stock, 29);
    assert_eq!(inventory.products().get(&oil.id).unwrap().current_stock, 15);
    assert!(inventory.audit().is_clean());
}

#[test]
fn test_sale_with_one_unaffordable_line_changes_nothing() {
    let mut inventory = open();
    let rice = inventory.products().create(product("Riz 5kg", 4_500), 10).unwrap();
    let sugar = inventory.products().create(product("Sucre 1kg", 900), 1).unwrap();
    let before = inventory.state().clone();

    let err = inventory
        .record_sale(sale(None, PaymentMethod::Cash, &[(&rice.id, 3), (&sugar.id, 2)]))
        .unwrap_err();

    assert!(matches!(
        err.as_domain(),
        Some(CoreError::InsufficientStock { requested: 2, available: 1, .. })
    ));
    assert_eq!(inventory.state(), &before);
}

#[test]
fn test_cancelling_twice_restocks_once() {
    let mut inventory = open();
    let soap = inventory.products().create(product("Savon", 500), 8).unwrap();
    let sold = inventory
        .record_sale(sale(None, PaymentMethod::Cash, &[(&soap.id, 3)]))
        .unwrap()
        .value;

    inventory.cancel_sale(&sold.id).unwrap();
    let err = inventory.cancel_sale(&sold.id).unwrap_err();

    assert!(matches!(err.as_domain(), Some(CoreError::AlreadyCancelled(_))));
    assert_eq!(inventory.products().get(&soap.id).unwrap().current_stock, 8);
}

#[test]
fn test_credit_flow_warns_then_repays_to_zero() {
    let mut inventory = open();
    let cloth = inventory.products().create(product("Pagne wax", 10_000), 5).unwrap();
    let customer = inventory
        .customers()
        .create(CustomerInput {
            name: "Restaurant Le Bao".to_string(),
            phone: "+237 655 78 90 12".to_string(),
            email: None,
            customer_type: CustomerType::Business,
            credit_limit: Money::from_units(5_000),
            address: None,
        })
        .unwrap();

    let recorded = inventory
        .record_sale(sale(
            Some(&customer.id),
            PaymentMethod::Credit,
            &[(&cloth.id, 1)],
        ))
        .unwrap();
    assert!(matches!(
        recorded.warnings.as_slice(),
        [LedgerWarning::CreditLimitWarning { .. }]
    ));
    assert_eq!(
        inventory.customers().get(&customer.id).unwrap().current_debt,
        Money::from_units(10_000)
    );

    inventory
        .record_payment(&customer.id, Money::from_units(7_000))
        .unwrap();
    let repaid = inventory
        .record_payment(&customer.id, Money::from_units(5_000))
        .unwrap()
        .value;

    assert!(repaid.current_debt.is_zero());
    let applied: Vec<Money> = inventory
        .customers()
        .payments(&customer.id)
        .iter()
        .map(|p| p.applied)
        .collect();
    assert_eq!(applied, vec![Money::from_units(7_000), Money::from_units(3_000)]);
}

#[test]
fn test_today_report_and_dashboard() {
    let mut inventory = open();
    let small = inventory.products().create(product("Allumettes", 1_000), 10).unwrap();
    let large = inventory.products().create(product("Bougies", 3_000), 10).unwrap();

    inventory
        .record_sale(sale(None, PaymentMethod::Cash, &[(&small.id, 1)]))
        .unwrap();
    inventory
        .record_sale(sale(None, PaymentMethod::MobileMoney, &[(&large.id, 1)]))
        .unwrap();

    let report = inventory.period_report(ReportRange::Today, as_of());
    assert_eq!(report.total_revenue, Money::from_units(4_000));
    assert_eq!(report.total_sales_count, 2);
    assert_eq!(report.average_sale, Money::from_units(2_000));

    let stats = inventory.dashboard_stats(as_of(), 3);
    assert_eq!(stats.today_sales, Money::from_units(4_000));
    assert_eq!(stats.total_products, 2);
    assert_eq!(stats.recent_movements.len(), 3);
}

#[test]
fn test_failed_commit_leaves_memory_unchanged() {
    let mut inventory = Inventory::open(FlakyStore::default())
        .unwrap()
        .with_clock(fixed_now);
    let beans = inventory.products().create(product("Haricots", 800), 6).unwrap();
    let before = inventory.state().clone();

    // Inventory owns the store; rebuild it around a store that now refuses writes
    let mut store = inventory.into_store();
    store.fail_after = Some(0);
    let mut inventory = Inventory::open(store).unwrap().with_clock(fixed_now);

    let err = inventory
        .record_sale(sale(None, PaymentMethod::Cash, &[(&beans.id, 2)]))
        .unwrap_err();

    assert!(matches!(err, StoreError::Io { .. }));
    assert_eq!(inventory.state(), &before);
    assert_eq!(inventory.products().get(&beans.id).unwrap().current_stock, 6);
}

#[test]
fn test_write_failing_midway_commits_nothing() {
    let mut inventory = Inventory::open(FlakyStore::default())
        .unwrap()
        .with_clock(fixed_now);
    let flour = inventory.products().create(product("Farine 1kg", 700), 10).unwrap();
    let movements = inventory.state().movements.len();

    // A sale rewrites products, sales and movements; the second write fails
    let mut store = inventory.into_store();
    store.fail_after = Some(1);
    let mut inventory = Inventory::open(store).unwrap().with_clock(fixed_now);
    assert!(inventory
        .record_sale(sale(None, PaymentMethod::Cash, &[(&flour.id, 3)]))
        .is_err());

    let mut reopened = Inventory::open(inventory.into_store().inner).unwrap();
    assert_eq!(reopened.products().get(&flour.id).unwrap().current_stock, 10);
    assert!(reopened.sales().list().is_empty());
    assert_eq!(reopened.state().movements.len(), movements);
    assert!(reopened.audit().is_clean());
}
