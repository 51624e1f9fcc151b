//! JsonFileStore persistence and backup round trips.

use geststock_core::{
    Collection, CustomerInput, CustomerType, Locale, Money, PaymentMethod, ProductCategory,
    ProductInput, PurchaseDraft, PurchaseLine, SaleDraft, SaleLine, SupplierInput, Unit,
};
use geststock_store::{
    Inventory, JsonFileStore, KeyValueStore, MemoryStore, StoreConfig, StoreError, SCHEMA_KEY,
};
use serde_json::json;

fn product(name: &str) -> ProductInput {
    ProductInput {
        name: name.to_string(),
        description: Some("Carton de 24".to_string()),
        category: ProductCategory::Food,
        unit: Unit::Box,
        min_stock: 3,
        max_stock: 30,
        buy_price: Money::from_units(9_000),
        sell_price: Money::from_units(11_500),
        supplier_id: None,
    }
}

fn open_dir(dir: &std::path::Path) -> Inventory<JsonFileStore> {
    let store = JsonFileStore::open(StoreConfig::new(dir)).unwrap();
    Inventory::open(store).unwrap()
}

#[test]
fn test_state_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();

    let (product_id, sale_id) = {
        let mut inventory = open_dir(dir.path());
        let product = inventory.products().create(product("Jus de fruits"), 12).unwrap();
        let sale = inventory
            .record_sale(SaleDraft {
                customer_id: None,
                items: vec![SaleLine {
                    product_id: product.id.clone(),
                    quantity: 5,
                }],
                payment_method: PaymentMethod::Card,
                notes: Some("livraison".to_string()),
            })
            .unwrap();
        inventory.set_language(Locale::En).unwrap();
        (product.id, sale.value.id)
    };

    let mut reopened = open_dir(dir.path());
    assert_eq!(reopened.products().get(&product_id).unwrap().current_stock, 7);
    assert_eq!(reopened.sales().get(&sale_id).unwrap().total_amount, Money::from_units(57_500));
    assert_eq!(reopened.language(), Locale::En);
    assert!(reopened.audit().is_clean());

    assert!(dir.path().join("geststock-products.json").exists());
    assert!(dir.path().join("geststock-schema.json").exists());
    assert!(!dir.path().join("geststock-products.json.tmp").exists());
}

#[test]
fn test_failed_commit_leaves_files_as_they_were() {
    let dir = tempfile::tempdir().unwrap();
    let product_id = {
        let mut inventory = open_dir(dir.path());
        let product = inventory.products().create(product("Tomates concentrées"), 10).unwrap();

        // Block the sales file: its previous version cannot be moved aside
        let sales = dir.path().join("geststock-sales.json");
        for blocked in [sales.clone(), dir.path().join("geststock-sales.json.bak")] {
            std::fs::create_dir(&blocked).unwrap();
            std::fs::write(blocked.join("keep"), "x").unwrap();
        }

        let err = inventory
            .record_sale(SaleDraft {
                customer_id: None,
                items: vec![SaleLine {
                    product_id: product.id.clone(),
                    quantity: 3,
                }],
                payment_method: PaymentMethod::Cash,
                notes: None,
            })
            .unwrap_err();
        assert!(matches!(err, StoreError::Io { .. }));
        assert_eq!(inventory.products().get(&product.id).unwrap().current_stock, 10);

        std::fs::remove_dir_all(&sales).unwrap();
        std::fs::remove_dir_all(dir.path().join("geststock-sales.json.bak")).unwrap();
        product.id
    };

    let mut reopened = open_dir(dir.path());
    assert_eq!(reopened.products().get(&product_id).unwrap().current_stock, 10);
    assert!(reopened.sales().list().is_empty());
    assert_eq!(reopened.products().movements(&product_id).len(), 1);
    assert!(reopened.audit().is_clean());
    assert!(!dir.path().join("geststock-products.json.bak").exists());
}

#[test]
fn test_clear_only_removes_prefixed_files() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("notes.txt"), "à garder").unwrap();

    let mut store = JsonFileStore::open(StoreConfig::new(dir.path()).pretty(false)).unwrap();
    store.set("language", json!("fr")).unwrap();
    store.clear().unwrap();

    assert_eq!(store.get("language").unwrap(), None);
    assert!(dir.path().join("notes.txt").exists());
}

#[test]
fn test_corrupt_file_is_reported_with_its_key() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("geststock-sales.json"), "{ not json").unwrap();

    let store = JsonFileStore::open(StoreConfig::new(dir.path())).unwrap();
    match Inventory::open(store) {
        Err(StoreError::Corrupt { key, .. }) => assert_eq!(key, "geststock-sales.json"),
        other => panic!("expected Corrupt, got {:?}", other.map(|_| ())),
    }
}

#[test]
fn test_newer_schema_on_disk_is_refused() {
    let dir = tempfile::tempdir().unwrap();
    let mut store = JsonFileStore::open(StoreConfig::new(dir.path())).unwrap();
    store.set(SCHEMA_KEY, json!({ "version": 99 })).unwrap();

    assert!(matches!(
        Inventory::open(store),
        Err(StoreError::SchemaMismatch { found: 99, .. })
    ));
}

#[test]
fn test_export_then_import_into_empty_store() {
    let dir = tempfile::tempdir().unwrap();
    let mut source = open_dir(dir.path());

    let supplier = source
        .suppliers()
        .create(SupplierInput {
            name: "Nestlé Cameroun".to_string(),
            contact: "Service commercial".to_string(),
            phone: "+237 233 42 10 00".to_string(),
            email: Some("ventes@nestle.cm".to_string()),
            address: "Bonabéri, Douala".to_string(),
            payment_terms: "30 jours".to_string(),
            delivery_delay: 3,
        })
        .unwrap();
    let mut input = product("Lait concentré");
    input.supplier_id = Some(supplier.id.clone());
    let milk = source.products().create(input, 20).unwrap();
    let customer = source
        .customers()
        .create(CustomerInput {
            name: "Snack La Joie".to_string(),
            phone: "+237 677 55 44 33".to_string(),
            email: None,
            customer_type: CustomerType::Business,
            credit_limit: Money::from_units(100_000),
            address: Some("Akwa".to_string()),
        })
        .unwrap();

    let line = |quantity| SaleLine {
        product_id: milk.id.clone(),
        quantity,
    };
    source
        .record_sale(SaleDraft {
            customer_id: None,
            items: vec![line(3)],
            payment_method: PaymentMethod::Cash,
            notes: None,
        })
        .unwrap();
    source
        .record_sale(SaleDraft {
            customer_id: Some(customer.id.clone()),
            items: vec![line(2)],
            payment_method: PaymentMethod::Credit,
            notes: Some("à régler fin du mois".to_string()),
        })
        .unwrap();
    source
        .customers()
        .record_payment(&customer.id, Money::from_units(10_000))
        .unwrap();
    let order = source
        .purchases()
        .create(PurchaseDraft {
            supplier_id: supplier.id.clone(),
            items: vec![PurchaseLine {
                product_id: milk.id.clone(),
                quantity: 6,
            }],
            notes: None,
        })
        .unwrap();
    source.purchases().receive(&order.id).unwrap();
    let text = source.export_backup_json().unwrap();

    let mut target = Inventory::open(MemoryStore::new()).unwrap();
    let summary = target.import_backup_json(&text).unwrap();

    assert_eq!(summary.opened_balances, 0);
    assert_eq!(
        (summary.products, summary.customers, summary.suppliers),
        (1, 1, 1)
    );
    assert_eq!((summary.sales, summary.purchases), (2, 1));
    assert_eq!(target.state(), source.state());
    assert!(!target.state().payments.is_empty());
    assert_eq!(
        target.customers().get(&customer.id).unwrap().current_debt,
        Money::from_units(13_000)
    );
    for collection in Collection::ALL {
        assert!(
            target.store().get(collection.key()).unwrap().is_some(),
            "{} not written",
            collection.key()
        );
    }

    let reopened = Inventory::open(target.into_store()).unwrap();
    assert_eq!(reopened.state(), source.state());
}
