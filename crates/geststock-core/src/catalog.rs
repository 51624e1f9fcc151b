//! # Catalog
//!
//! Create, update, delete and search for products, customers and suppliers.
//!
//! ## What CRUD May Not Touch
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Field                    Written by                                    │
//! │  ─────────────────────    ──────────────────────────────────────────    │
//! │  Product.current_stock    stock ledger only (initial stock excepted)    │
//! │  Customer.current_debt    credit ledger only                            │
//! │  everything else          this module                                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The input types have no stock or debt field, so an update cannot change
//! them even by accident.

use chrono::{DateTime, Utc};
use tracing::{debug, info};

use crate::error::{CoreError, CoreResult};
use crate::ledger::stock;
use crate::money::Money;
use crate::state::AppState;
use crate::types::{
    new_id, Customer, CustomerInput, Product, ProductInput, Supplier, SupplierInput,
};
use crate::validation::{
    validate_customer_input, validate_product_input, validate_search_query, validate_stock_level,
    validate_supplier_input,
};

// =============================================================================
// Products
// =============================================================================

/// Creates a product, optionally with stock already on the shelf.
///
/// A non-zero `initial_stock` is recorded as an `adjustment` movement so the
/// movement log explains the product's stock from day one.
pub fn create_product(
    state: &mut AppState,
    input: ProductInput,
    initial_stock: i64,
    now: DateTime<Utc>,
) -> CoreResult<Product> {
    validate_product_input(&input)?;
    validate_stock_level("currentStock", initial_stock)?;
    check_supplier(state, input.supplier_id.as_deref())?;

    let product = Product {
        id: new_id(),
        name: input.name.trim().to_string(),
        description: input.description,
        category: input.category,
        unit: input.unit,
        current_stock: 0,
        min_stock: input.min_stock,
        max_stock: input.max_stock,
        buy_price: input.buy_price,
        sell_price: input.sell_price,
        supplier_id: input.supplier_id,
        created_at: now,
        updated_at: now,
    };
    let id = product.id.clone();
    state.products.push(product);

    if initial_stock > 0 {
        stock::record_initial_stock(state, &id, initial_stock, now)?;
    }

    let created = state.product(&id)?.clone();
    info!(product_id = %created.id, name = %created.name, "Product created");
    Ok(created)
}

/// Replaces a product's editable fields. Stock is kept as is.
pub fn update_product(
    state: &mut AppState,
    id: &str,
    input: ProductInput,
    now: DateTime<Utc>,
) -> CoreResult<Product> {
    validate_product_input(&input)?;
    check_supplier(state, input.supplier_id.as_deref())?;

    let product = state.product_mut(id)?;
    product.name = input.name.trim().to_string();
    product.description = input.description;
    product.category = input.category;
    product.unit = input.unit;
    product.min_stock = input.min_stock;
    product.max_stock = input.max_stock;
    product.buy_price = input.buy_price;
    product.sell_price = input.sell_price;
    product.supplier_id = input.supplier_id;
    product.updated_at = now;

    debug!(product_id = %product.id, "Product updated");
    Ok(product.clone())
}

/// Removes a product from the catalogue.
///
/// Its movements stay in the log, and past sales keep their snapshots.
pub fn delete_product(state: &mut AppState, id: &str) -> CoreResult<Product> {
    let index = state
        .products
        .iter()
        .position(|p| p.id == id)
        .ok_or_else(|| CoreError::ProductNotFound(id.to_string()))?;
    let removed = state.products.remove(index);
    info!(product_id = %removed.id, "Product deleted");
    Ok(removed)
}

/// Case-insensitive search on name and category. An empty query lists all.
pub fn search_products<'a>(state: &'a AppState, query: &str) -> CoreResult<Vec<&'a Product>> {
    let query = validate_search_query(query)?;
    Ok(state
        .products
        .iter()
        .filter(|p| query.is_empty() || p.matches(&query))
        .collect())
}

fn check_supplier(state: &AppState, supplier_id: Option<&str>) -> CoreResult<()> {
    if let Some(id) = supplier_id {
        state.supplier(id)?;
    }
    Ok(())
}

// =============================================================================
// Customers
// =============================================================================

/// Creates a customer with no debt.
pub fn create_customer(
    state: &mut AppState,
    input: CustomerInput,
    now: DateTime<Utc>,
) -> CoreResult<Customer> {
    validate_customer_input(&input)?;

    let customer = Customer {
        id: new_id(),
        name: input.name.trim().to_string(),
        phone: input.phone.trim().to_string(),
        email: input.email,
        customer_type: input.customer_type,
        credit_limit: input.credit_limit,
        current_debt: Money::zero(),
        address: input.address,
        created_at: now,
    };

    state.customers.push(customer.clone());
    info!(customer_id = %customer.id, "Customer created");
    Ok(customer)
}

/// Replaces a customer's editable fields. Debt is kept as is.
pub fn update_customer(
    state: &mut AppState,
    id: &str,
    input: CustomerInput,
) -> CoreResult<Customer> {
    validate_customer_input(&input)?;

    let customer = state.customer_mut(id)?;
    customer.name = input.name.trim().to_string();
    customer.phone = input.phone.trim().to_string();
    customer.email = input.email;
    customer.customer_type = input.customer_type;
    customer.credit_limit = input.credit_limit;
    customer.address = input.address;

    debug!(customer_id = %customer.id, "Customer updated");
    Ok(customer.clone())
}

pub fn delete_customer(state: &mut AppState, id: &str) -> CoreResult<Customer> {
    let index = state
        .customers
        .iter()
        .position(|c| c.id == id)
        .ok_or_else(|| CoreError::CustomerNotFound(id.to_string()))?;
    let removed = state.customers.remove(index);
    info!(customer_id = %removed.id, "Customer deleted");
    Ok(removed)
}

/// Case-insensitive search on name and phone.
pub fn search_customers<'a>(state: &'a AppState, query: &str) -> CoreResult<Vec<&'a Customer>> {
    let query = validate_search_query(query)?;
    Ok(state
        .customers
        .iter()
        .filter(|c| query.is_empty() || c.matches(&query))
        .collect())
}

// =============================================================================
// Suppliers
// =============================================================================

pub fn create_supplier(
    state: &mut AppState,
    input: SupplierInput,
    now: DateTime<Utc>,
) -> CoreResult<Supplier> {
    validate_supplier_input(&input)?;

    let supplier = Supplier {
        id: new_id(),
        name: input.name.trim().to_string(),
        contact: input.contact.trim().to_string(),
        phone: input.phone.trim().to_string(),
        email: input.email,
        address: input.address,
        payment_terms: input.payment_terms,
        delivery_delay: input.delivery_delay,
        created_at: now,
    };

    state.suppliers.push(supplier.clone());
    info!(supplier_id = %supplier.id, "Supplier created");
    Ok(supplier)
}

pub fn update_supplier(
    state: &mut AppState,
    id: &str,
    input: SupplierInput,
) -> CoreResult<Supplier> {
    validate_supplier_input(&input)?;

    let supplier = state
        .suppliers
        .iter_mut()
        .find(|s| s.id == id)
        .ok_or_else(|| CoreError::SupplierNotFound(id.to_string()))?;
    supplier.name = input.name.trim().to_string();
    supplier.contact = input.contact.trim().to_string();
    supplier.phone = input.phone.trim().to_string();
    supplier.email = input.email;
    supplier.address = input.address;
    supplier.payment_terms = input.payment_terms;
    supplier.delivery_delay = input.delivery_delay;

    debug!(supplier_id = %supplier.id, "Supplier updated");
    Ok(supplier.clone())
}

/// Removes a supplier. Products that referenced it lose their preferred
/// supplier; purchase orders keep their snapshot of its name.
pub fn delete_supplier(state: &mut AppState, id: &str) -> CoreResult<Supplier> {
    let index = state
        .suppliers
        .iter()
        .position(|s| s.id == id)
        .ok_or_else(|| CoreError::SupplierNotFound(id.to_string()))?;
    let removed = state.suppliers.remove(index);

    for product in state
        .products
        .iter_mut()
        .filter(|p| p.supplier_id.as_deref() == Some(id))
    {
        product.supplier_id = None;
    }

    info!(supplier_id = %removed.id, "Supplier deleted");
    Ok(removed)
}

/// Case-insensitive search on name, contact and phone.
pub fn search_suppliers<'a>(state: &'a AppState, query: &str) -> CoreResult<Vec<&'a Supplier>> {
    let query = validate_search_query(query)?;
    Ok(state
        .suppliers
        .iter()
        .filter(|s| query.is_empty() || s.matches(&query))
        .collect())
}

// =============================================================================
// Unit Tests
// =============================================================================
