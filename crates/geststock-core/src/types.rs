//! # Domain Types
//!
//! Core domain types used throughout GestStock.
//!
//! ## Type Map
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  Catalogue                 Transactions               Ledger log        │
//! │  ─────────                 ────────────               ──────────        │
//! │  Product  ◄─────────────── SaleItem / PurchaseItem    StockMovement     │
//! │  Supplier ◄─────────────── Purchase                   CustomerPayment   │
//! │  Customer ◄─────────────── Sale                                         │
//! │                                                                         │
//! │  Arrows are id references. Line items also carry a SNAPSHOT of the      │
//! │  product name and price, so history never changes when the catalogue   │
//! │  is edited.                                                            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Input Types
//! Forms never build entities directly. They fill an input type
//! (`ProductInput`, `CustomerInput`, `SaleDraft`, ...) and the ledger or
//! repository turns it into an entity. Input types have no `current_stock`
//! or `current_debt`: those are owned by the ledgers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

use crate::money::Money;
use crate::{DEBT_WARNING_RATIO_PCT, LOW_STOCK_RATIO_PCT};

/// Generates a new entity id (UUID v4).
pub fn new_id() -> String {
    Uuid::new_v4().to_string()
}

// =============================================================================
// Product
// =============================================================================

/// Product category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum ProductCategory {
    Food,
    Electronics,
    Clothing,
    Beauty,
    Household,
    Other,
}

impl ProductCategory {
    /// Stable machine name, as stored.
    pub fn as_str(&self) -> &'static str {
        match self {
            ProductCategory::Food => "food",
            ProductCategory::Electronics => "electronics",
            ProductCategory::Clothing => "clothing",
            ProductCategory::Beauty => "beauty",
            ProductCategory::Household => "household",
            ProductCategory::Other => "other",
        }
    }
}

/// Unit a product is counted in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum Unit {
    Piece,
    Box,
    Liter,
    Kg,
    Meter,
}

/// A product held in stock.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Display name.
    pub name: String,

    pub description: Option<String>,

    pub category: ProductCategory,

    pub unit: Unit,

    /// Quantity on hand. Only the stock ledger writes this field.
    pub current_stock: i64,

    /// At or below this level the product is critical.
    pub min_stock: i64,

    /// Receiving above this level raises a warning.
    pub max_stock: i64,

    /// Purchase price, snapshotted into purchase orders.
    pub buy_price: Money,

    /// Selling price, snapshotted into sales.
    pub sell_price: Money,

    /// Preferred supplier.
    pub supplier_id: Option<String>,

    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,

    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Checks if the product is at or below its minimum stock.
    #[inline]
    pub fn is_low_stock(&self) -> bool {
        self.current_stock <= self.min_stock
    }

    /// Classifies the stock level for list badges.
    ///
    /// ```text
    /// current ≤ min          → Critical
    /// current ≤ 1.5 × min    → Low
    /// otherwise              → Ok
    /// ```
    pub fn stock_status(&self) -> StockStatus {
        if self.is_low_stock() {
            StockStatus::Critical
        } else if i128::from(self.current_stock) * 100
            <= i128::from(self.min_stock) * i128::from(LOW_STOCK_RATIO_PCT)
        {
            StockStatus::Low
        } else {
            StockStatus::Ok
        }
    }

    /// Value of the stock on hand at purchase price.
    pub fn stock_value(&self) -> Money {
        self.buy_price.multiply_quantity(self.current_stock)
    }

    /// Case-insensitive match on name or category.
    pub fn matches(&self, needle: &str) -> bool {
        contains_ci(&self.name, needle) || contains_ci(self.category.as_str(), needle)
    }
}

/// Stock badge shown next to a product.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum StockStatus {
    Critical,
    Low,
    Ok,
}

/// Editable product fields.
///
/// `current_stock` is deliberately absent: stock only moves through the
/// stock ledger.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct ProductInput {
    pub name: String,
    pub description: Option<String>,
    pub category: ProductCategory,
    pub unit: Unit,
    pub min_stock: i64,
    pub max_stock: i64,
    pub buy_price: Money,
    pub sell_price: Money,
    pub supplier_id: Option<String>,
}

// =============================================================================
// Customer
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum CustomerType {
    Individual,
    Business,
}

/// A customer, optionally buying on credit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    pub id: String,
    pub name: String,
    pub phone: String,
    pub email: Option<String>,
    #[serde(rename = "type")]
    pub customer_type: CustomerType,
    /// Credit allowed before a warning is raised. Not a hard cap.
    pub credit_limit: Money,
    /// Outstanding debt. Only the credit ledger writes this field.
    pub current_debt: Money,
    pub address: Option<String>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

impl Customer {
    /// Classifies the debt for list badges.
    ///
    /// ```text
    /// debt == 0            → UpToDate
    /// debt > 80% of limit  → LimitReached
    /// otherwise            → InProgress
    /// ```
    pub fn debt_status(&self) -> DebtStatus {
        if self.current_debt.is_zero() {
            DebtStatus::UpToDate
        } else if i128::from(self.current_debt.units()) * 100
            > i128::from(self.credit_limit.units()) * i128::from(DEBT_WARNING_RATIO_PCT)
        {
            DebtStatus::LimitReached
        } else {
            DebtStatus::InProgress
        }
    }

    /// Checks if the debt exceeds the credit limit.
    #[inline]
    pub fn is_over_limit(&self) -> bool {
        self.current_debt > self.credit_limit
    }

    /// Case-insensitive match on name or phone.
    pub fn matches(&self, needle: &str) -> bool {
        contains_ci(&self.name, needle) || contains_ci(&self.phone, needle)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum DebtStatus {
    UpToDate,
    InProgress,
    LimitReached,
}

/// Editable customer fields (no `current_debt`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CustomerInput {
    pub name: String,
    pub phone: String,
    pub email: Option<String>,
    #[serde(rename = "type")]
    pub customer_type: CustomerType,
    pub credit_limit: Money,
    pub address: Option<String>,
}

// =============================================================================
// Supplier
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Supplier {
    pub id: String,
    pub name: String,
    /// Contact person.
    pub contact: String,
    pub phone: String,
    pub email: Option<String>,
    pub address: String,
    /// Free text, e.g. "30 jours".
    pub payment_terms: String,
    /// Delivery delay in days.
    pub delivery_delay: u32,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

impl Supplier {
    /// Case-insensitive match on name, contact or phone.
    pub fn matches(&self, needle: &str) -> bool {
        contains_ci(&self.name, needle)
            || contains_ci(&self.contact, needle)
            || contains_ci(&self.phone, needle)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct SupplierInput {
    pub name: String,
    pub contact: String,
    pub phone: String,
    pub email: Option<String>,
    pub address: String,
    pub payment_terms: String,
    pub delivery_delay: u32,
}

// =============================================================================
// Sale
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    Cash,
    MobileMoney,
    /// Deferred payment: increases the customer's debt.
    Credit,
    Card,
}

impl PaymentMethod {
    /// Every method, in display order.
    pub const ALL: [PaymentMethod; 4] = [
        PaymentMethod::Cash,
        PaymentMethod::MobileMoney,
        PaymentMethod::Credit,
        PaymentMethod::Card,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Cash => "cash",
            PaymentMethod::MobileMoney => "mobile_money",
            PaymentMethod::Credit => "credit",
            PaymentMethod::Card => "card",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum SaleStatus {
    Completed,
    Pending,
    Cancelled,
}

impl SaleStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SaleStatus::Completed => "completed",
            SaleStatus::Pending => "pending",
            SaleStatus::Cancelled => "cancelled",
        }
    }
}

/// A line in a sale.
/// Uses snapshot pattern to freeze product data at time of sale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct SaleItem {
    pub product_id: String,
    /// Product name at time of sale (frozen).
    pub product_name: String,
    pub quantity: i64,
    /// Selling price at time of sale (frozen).
    pub unit_price: Money,
    /// quantity × unit_price.
    pub total: Money,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Sale {
    pub id: String,
    /// None for anonymous walk-in sales.
    pub customer_id: Option<String>,
    pub customer_name: Option<String>,
    pub items: Vec<SaleItem>,
    pub total_amount: Money,
    pub payment_method: PaymentMethod,
    pub status: SaleStatus,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    pub notes: Option<String>,
}

impl Sale {
    /// Cancelled sales are kept for history but excluded from revenue.
    #[inline]
    pub fn counts_as_revenue(&self) -> bool {
        self.status != SaleStatus::Cancelled
    }

    /// Checks if this sale puts the amount on a customer's account.
    #[inline]
    pub fn is_on_credit(&self) -> bool {
        self.payment_method == PaymentMethod::Credit && self.customer_id.is_some()
    }
}

/// A requested sale line: which product, how many.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct SaleLine {
    pub product_id: String,
    pub quantity: i64,
}

/// What the sale form submits. Prices and names are looked up by the ledger.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct SaleDraft {
    pub customer_id: Option<String>,
    pub items: Vec<SaleLine>,
    pub payment_method: PaymentMethod,
    pub notes: Option<String>,
}

// =============================================================================
// Purchase
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum PurchaseStatus {
    Pending,
    Received,
    Cancelled,
}

impl PurchaseStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PurchaseStatus::Pending => "pending",
            PurchaseStatus::Received => "received",
            PurchaseStatus::Cancelled => "cancelled",
        }
    }
}

/// A line in a purchase order. Snapshots the buying price.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseItem {
    pub product_id: String,
    pub product_name: String,
    pub quantity: i64,
    pub unit_price: Money,
    pub total: Money,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Purchase {
    pub id: String,
    pub supplier_id: String,
    /// Supplier name at time of ordering (frozen).
    pub supplier_name: String,
    pub items: Vec<PurchaseItem>,
    pub total_amount: Money,
    pub status: PurchaseStatus,
    #[ts(as = "String")]
    pub order_date: DateTime<Utc>,
    /// Set only on the pending → received transition.
    #[ts(as = "Option<String>")]
    pub received_date: Option<DateTime<Utc>>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseLine {
    pub product_id: String,
    pub quantity: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseDraft {
    pub supplier_id: String,
    pub items: Vec<PurchaseLine>,
    pub notes: Option<String>,
}

// =============================================================================
// Stock Movement
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum MovementType {
    Sale,
    Purchase,
    Adjustment,
    Loss,
}

impl MovementType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MovementType::Sale => "sale",
            MovementType::Purchase => "purchase",
            MovementType::Adjustment => "adjustment",
            MovementType::Loss => "loss",
        }
    }
}

/// One signed change to a product's stock.
///
/// ## Replay Invariant
/// For one product, in log order:
/// `balance_after[i] == balance_after[i - 1] + quantity[i]`, starting at 0.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct StockMovement {
    pub id: String,
    pub product_id: String,
    /// Product name at time of movement (frozen).
    pub product_name: String,
    #[serde(rename = "type")]
    pub movement_type: MovementType,
    /// Negative for sales and losses.
    pub quantity: i64,
    /// Stock immediately after this movement.
    pub balance_after: i64,
    /// Sale or purchase id that caused the movement.
    pub reference: Option<String>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    pub notes: Option<String>,
}

/// Why a manual stock adjustment is made.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum AdjustmentReason {
    /// Inventory count correction, either sign.
    Correction,
    /// Breakage, theft, expiry. Always decreases stock.
    Loss,
}

// =============================================================================
// Customer Payment
// =============================================================================

/// A repayment recorded against a customer's debt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CustomerPayment {
    pub id: String,
    pub customer_id: String,
    /// Amount handed over.
    pub amount: Money,
    /// Amount actually deducted from the debt (≤ amount).
    pub applied: Money,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Helpers
// =============================================================================

fn contains_ci(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn product(current: i64, min: i64) -> Product {
        Product {
            id: new_id(),
            name: "Riz parfumé 25kg".to_string(),
            description: None,
            category: ProductCategory::Food,
            unit: Unit::Box,
            current_stock: current,
            min_stock: min,
            max_stock: 100,
            buy_price: Money::from_units(15_000),
            sell_price: Money::from_units(18_000),
            supplier_id: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn customer(limit: i64, debt: i64) -> Customer {
        Customer {
            id: new_id(),
            name: "Boutique Mballa".to_string(),
            phone: "+237 699 000 111".to_string(),
            email: None,
            customer_type: CustomerType::Business,
            credit_limit: Money::from_units(limit),
            current_debt: Money::from_units(debt),
            address: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_stock_status_thresholds() {
        assert_eq!(product(10, 10).stock_status(), StockStatus::Critical);
        assert_eq!(product(0, 0).stock_status(), StockStatus::Critical);
        assert_eq!(product(15, 10).stock_status(), StockStatus::Low);
        assert_eq!(product(16, 10).stock_status(), StockStatus::Ok);
        assert_eq!(product(i64::MAX, 10).stock_status(), StockStatus::Ok);
    }

    #[test]
    fn test_debt_status_thresholds() {
        assert_eq!(customer(10_000, 0).debt_status(), DebtStatus::UpToDate);
        assert_eq!(customer(10_000, 8_000).debt_status(), DebtStatus::InProgress);
        assert_eq!(customer(10_000, 8_001).debt_status(), DebtStatus::LimitReached);
        assert!(customer(5_000, 10_000).is_over_limit());
        assert_eq!(customer(10_000, i64::MAX).debt_status(), DebtStatus::LimitReached);
    }

    #[test]
    fn test_search_is_case_insensitive() {
        let p = product(5, 1);
        assert!(p.matches("RIZ"));
        assert!(p.matches("food"));
        assert!(!p.matches("savon"));

        let c = customer(0, 0);
        assert!(c.matches("mballa"));
        assert!(c.matches("699"));
    }

    #[test]
    fn test_entity_json_uses_camel_case_and_type_key() {
        let json = serde_json::to_value(customer(5_000, 0)).unwrap();
        assert_eq!(json["type"], "business");
        assert_eq!(json["creditLimit"], 5_000);
        assert_eq!(json["currentDebt"], 0);
    }

    #[test]
    fn test_payment_method_wire_names() {
        let json = serde_json::to_string(&PaymentMethod::MobileMoney).unwrap();
        assert_eq!(json, "\"mobile_money\"");
        assert_eq!(PaymentMethod::MobileMoney.as_str(), "mobile_money");
    }
}
