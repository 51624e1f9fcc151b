//! # Seed Data Generator
//!
//! Populates a data directory with a demo shop for development.
//!
//! ## Usage
//! ```bash
//! # Seed the default directory (./geststock_dev)
//! cargo run -p geststock-store --bin seed
//!
//! # Specify data directory
//! cargo run -p geststock-store --bin seed -- --data-dir ./data
//! ```
//!
//! ## Generated Data
//! - Suppliers from Douala, Yaoundé and Garoua
//! - Products across every category, priced in F CFA
//! - Individual and business customers with credit limits
//! - A few sales, one of them on credit
//!
//! Stock levels vary so that the dashboard shows critical products.

use std::env;

use geststock_core::{
    CustomerInput, CustomerType, Money, PaymentMethod, ProductCategory, ProductInput, SaleDraft,
    SaleLine, SupplierInput, Unit,
};
use geststock_store::{Inventory, JsonFileStore, StoreConfig};

/// (category, unit, [(name, sell price)])
const CATEGORIES: &[(ProductCategory, Unit, &[(&str, i64)])] = &[
    (
        ProductCategory::Food,
        Unit::Piece,
        &[
            ("Riz parfumé 5kg", 4_500),
            ("Huile raffinée 1L", 1_400),
            ("Sucre en morceaux 1kg", 900),
            ("Lait Nido 400g", 3_200),
            ("Farine de blé 1kg", 750),
            ("Eau minérale 1,5L", 350),
            ("Bière 65cl", 650),
            ("Café moulu 250g", 1_800),
        ],
    ),
    (
        ProductCategory::Electronics,
        Unit::Piece,
        &[
            ("Chargeur USB-C", 3_500),
            ("Écouteurs filaires", 2_500),
            ("Ampoule LED 12W", 1_200),
            ("Torche rechargeable", 6_000),
        ],
    ),
    (
        ProductCategory::Clothing,
        Unit::Piece,
        &[
            ("Pagne wax 6 yards", 12_000),
            ("T-shirt coton", 3_000),
            ("Sandales", 2_500),
        ],
    ),
    (
        ProductCategory::Beauty,
        Unit::Piece,
        &[
            ("Savon de Marseille", 500),
            ("Lait de toilette", 1_500),
            ("Beurre de karité 250g", 2_000),
        ],
    ),
    (
        ProductCategory::Household,
        Unit::Piece,
        &[
            ("Détergent en poudre 1kg", 1_300),
            ("Eau de Javel 1L", 600),
            ("Allumettes (lot de 10)", 250),
        ],
    ),
    (
        ProductCategory::Other,
        Unit::Box,
        &[("Bougies (boîte)", 1_000), ("Piles AA (boîte)", 2_200)],
    ),
];

/// (name, contact, phone, address, payment terms, delivery delay)
const SUPPLIERS: &[(&str, &str, &str, &str, &str, u32)] = &[
    ("Société Camerounaise de Distribution", "Jean Mbarga", "+237 233 42 10 10", "Douala, Bonabéri", "30 jours", 3),
    ("Central Import Yaoundé", "Florence Atangana", "+237 222 23 45 67", "Yaoundé, Mvog-Mbi", "Comptant", 2),
    ("Nord Commerce", "Awa Hamadou", "+237 222 27 10 00", "Garoua", "15 jours", 7),
];

/// (name, phone, type, credit limit)
const CUSTOMERS: &[(&str, &str, CustomerType, i64)] = &[
    ("Marie Ngo Biyong", "+237 677 11 22 33", CustomerType::Individual, 50_000),
    ("Paul Etoa", "+237 699 44 55 66", CustomerType::Individual, 25_000),
    ("Restaurant Le Bao", "+237 655 78 90 12", CustomerType::Business, 300_000),
    ("Épicerie Mokolo", "+237 691 20 30 40", CustomerType::Business, 150_000),
];

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Parse command line arguments
    let args: Vec<String> = env::args().collect();

    let mut data_dir = String::from("./geststock_dev");

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--data-dir" | "-d" => {
                if i + 1 < args.len() {
                    data_dir = args[i + 1].clone();
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("GestStock Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -d, --data-dir <PATH>  Data directory (default: ./geststock_dev)");
                println!("  -h, --help             Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("🌱 GestStock Seed Data Generator");
    println!("================================");
    println!("Data directory: {}", data_dir);
    println!();

    let store = JsonFileStore::open(StoreConfig::new(&data_dir))?;
    let mut inventory = Inventory::open(store)?;
    println!("✓ Store opened");

    // Check existing products
    let existing = inventory.state().products.len();
    if existing > 0 {
        println!("⚠ Store already has {} products", existing);
        println!("  Skipping seed to avoid duplicates.");
        println!("  Delete the data directory to regenerate.");
        return Ok(());
    }

    println!();
    println!("Generating suppliers...");
    let mut supplier_ids = Vec::new();
    for (name, contact, phone, address, terms, delay) in SUPPLIERS {
        let supplier = inventory.suppliers().create(SupplierInput {
            name: name.to_string(),
            contact: contact.to_string(),
            phone: phone.to_string(),
            email: None,
            address: address.to_string(),
            payment_terms: terms.to_string(),
            delivery_delay: *delay,
        })?;
        supplier_ids.push(supplier.id);
    }
    println!("  ✓ {} suppliers", supplier_ids.len());

    println!("Generating products...");
    let mut product_ids = Vec::new();
    let mut seed = 0usize;
    for (category, unit, products) in CATEGORIES {
        for (name, sell_price) in products.iter() {
            let product = inventory.products().create(
                generate_product(name, *category, *unit, *sell_price, &supplier_ids, seed),
                initial_stock(seed),
            )?;
            product_ids.push(product.id);
            seed += 1;
        }
    }
    println!("  ✓ {} products", product_ids.len());

    println!("Generating customers...");
    let mut customer_ids = Vec::new();
    for (name, phone, customer_type, limit) in CUSTOMERS {
        let customer = inventory.customers().create(CustomerInput {
            name: name.to_string(),
            phone: phone.to_string(),
            email: None,
            customer_type: *customer_type,
            credit_limit: Money::from_units(*limit),
            address: None,
        })?;
        customer_ids.push(customer.id);
    }
    println!("  ✓ {} customers", customer_ids.len());

    println!("Recording sample sales...");
    let samples = [
        (None, PaymentMethod::Cash, vec![(0, 2), (5, 6)]),
        (None, PaymentMethod::MobileMoney, vec![(3, 1)]),
        (customer_ids.get(2).cloned(), PaymentMethod::Credit, vec![(0, 4), (1, 6)]),
    ];
    let mut recorded = 0;
    for (customer_id, payment_method, lines) in samples {
        let draft = SaleDraft {
            customer_id,
            items: lines
                .into_iter()
                .filter_map(|(index, quantity)| {
                    product_ids.get(index).map(|id| SaleLine {
                        product_id: id.clone(),
                        quantity,
                    })
                })
                .collect(),
            payment_method,
            notes: None,
        };
        if let Err(e) = inventory.record_sale(draft) {
            eprintln!("Failed to record sample sale: {}", e);
            continue;
        }
        recorded += 1;
    }
    println!("  ✓ {} sales", recorded);

    // Verify the ledger
    println!();
    println!("Verifying ledger...");
    let audit = inventory.audit();
    println!(
        "  {} products, {} movements, {} discrepancies",
        audit.products_checked,
        audit.movements_checked,
        audit.discrepancies.len()
    );

    println!();
    println!("✓ Seed complete!");

    Ok(())
}

/// Builds one product with deterministic prices and thresholds.
fn generate_product(
    name: &str,
    category: ProductCategory,
    unit: Unit,
    sell_price: i64,
    supplier_ids: &[String],
    seed: usize,
) -> ProductInput {
    // Buying price: 65-80% of the selling price, rounded to 25 F
    let margin_pct = 65 + (seed * 7 % 16) as i64;
    let buy_price = (sell_price * margin_pct / 100) / 25 * 25;

    let min_stock = 5 + (seed % 4) as i64 * 5;

    ProductInput {
        name: name.to_string(),
        description: None,
        category,
        unit,
        min_stock,
        max_stock: min_stock * 10,
        buy_price: Money::from_units(buy_price),
        sell_price: Money::from_units(sell_price),
        supplier_id: supplier_ids.get(seed % supplier_ids.len().max(1)).cloned(),
    }
}

/// Every fourth product starts at or below its minimum.
fn initial_stock(seed: usize) -> i64 {
    if seed % 4 == 3 {
        (seed % 5) as i64
    } else {
        20 + (seed * 13 % 60) as i64
    }
}
