//! # Aggregation Engine
//!
//! Read-only statistics derived from the state: the dashboard, period
//! reports and the small summaries shown above each list.
//!
//! ## Time Handling
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Timestamps are stored in UTC. Calendar questions ("today", "this       │
//! │  month") are answered in the fixed offset carried by `as_of`.           │
//! │                                                                         │
//! │  as_of = 2026-03-01 00:30 +01:00                                        │
//! │  sale  = 2026-02-28 23:45 UTC  = 2026-03-01 00:45 +01:00  → today ✓     │
//! │                                                                         │
//! │  Range   Start                                                          │
//! │  today   local midnight of as_of                                        │
//! │  week    as_of − 7 × 24h (rolling, not a calendar week)                 │
//! │  month   local midnight on the 1st                                      │
//! │  year    local midnight on January 1st                                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Cancelled sales stay in the history but never count as revenue.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Datelike, Duration, FixedOffset, NaiveDateTime, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;
use crate::state::AppState;
use crate::types::{
    CustomerType, PaymentMethod, Product, PurchaseStatus, Sale, StockMovement,
};
use crate::TOP_PRODUCTS_LIMIT;

// =============================================================================
// Report Range
// =============================================================================

/// Period covered by a report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum ReportRange {
    Today,
    Week,
    Month,
    Year,
}

impl ReportRange {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReportRange::Today => "today",
            ReportRange::Week => "week",
            ReportRange::Month => "month",
            ReportRange::Year => "year",
        }
    }

    /// Local start of the range, in `as_of`'s offset.
    pub fn start(&self, as_of: DateTime<FixedOffset>) -> NaiveDateTime {
        let local = as_of.naive_local();
        let date = local.date();
        match self {
            ReportRange::Today => date.and_time(NaiveTime::MIN),
            ReportRange::Week => local - Duration::days(7),
            ReportRange::Month => {
                (date - Duration::days(i64::from(date.day0()))).and_time(NaiveTime::MIN)
            }
            ReportRange::Year => {
                (date - Duration::days(i64::from(date.ordinal0()))).and_time(NaiveTime::MIN)
            }
        }
    }
}

impl fmt::Display for ReportRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReportRange {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "today" => Ok(ReportRange::Today),
            "week" => Ok(ReportRange::Week),
            "month" => Ok(ReportRange::Month),
            "year" => Ok(ReportRange::Year),
            other => Err(format!("unknown report range: {}", other)),
        }
    }
}

/// A stored UTC timestamp seen in `as_of`'s offset.
fn local(at: DateTime<Utc>, as_of: &DateTime<FixedOffset>) -> NaiveDateTime {
    at.with_timezone(as_of.offset()).naive_local()
}

fn revenue_sales(state: &AppState) -> impl Iterator<Item = &Sale> {
    state.sales.iter().filter(|s| s.counts_as_revenue())
}

fn low_stock(state: &AppState) -> impl Iterator<Item = &Product> {
    state.products.iter().filter(|p| p.is_low_stock())
}

// =============================================================================
// Dashboard
// =============================================================================

/// Figures shown on the dashboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub today_sales: Money,
    pub month_sales: Money,
    pub total_products: usize,
    pub low_stock_count: usize,
    pub total_suppliers: usize,
    pub total_customers: usize,
    pub pending_orders: usize,
    pub recent_movements: Vec<StockMovement>,
}

/// Computes the dashboard as seen at `as_of`.
///
/// `recent_movements` holds the `recent_limit` latest movements, newest
/// first. Movements with the same timestamp keep log order (later first).
pub fn dashboard_stats(
    state: &AppState,
    as_of: DateTime<FixedOffset>,
    recent_limit: usize,
) -> DashboardStats {
    let today = as_of.date_naive();
    let (year, month) = (today.year(), today.month());

    let mut today_sales = Money::zero();
    let mut month_sales = Money::zero();
    for sale in revenue_sales(state) {
        let date = local(sale.created_at, &as_of).date();
        if date.year() == year && date.month() == month {
            month_sales += sale.total_amount;
            if date == today {
                today_sales += sale.total_amount;
            }
        }
    }

    DashboardStats {
        today_sales,
        month_sales,
        total_products: state.products.len(),
        low_stock_count: low_stock(state).count(),
        total_suppliers: state.suppliers.len(),
        total_customers: state.customers.len(),
        pending_orders: state
            .purchases
            .iter()
            .filter(|p| p.status == PurchaseStatus::Pending)
            .count(),
        recent_movements: recent_movements(state, recent_limit),
    }
}

/// The `limit` most recent movements, newest first.
pub fn recent_movements(state: &AppState, limit: usize) -> Vec<StockMovement> {
    let mut indexed: Vec<(usize, &StockMovement)> = state.movements.iter().enumerate().collect();
    indexed.sort_by(|(ia, a), (ib, b)| b.created_at.cmp(&a.created_at).then(ib.cmp(ia)));
    indexed
        .into_iter()
        .take(limit)
        .map(|(_, m)| m.clone())
        .collect()
}

// =============================================================================
// Period Report
// =============================================================================

/// Units and revenue of one product over a period.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct ProductSales {
    pub product_id: String,
    /// Name as written on the first sale line of the period.
    pub name: String,
    pub quantity: i64,
    pub revenue: Money,
}

/// Share of revenue taken by one payment method.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct PaymentBreakdown {
    pub method: PaymentMethod,
    pub count: usize,
    pub amount: Money,
    /// amount / total revenue × 100, 0 when there is no revenue.
    pub percentage: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct PeriodReport {
    pub range: ReportRange,
    #[ts(as = "String")]
    pub start: NaiveDateTime,
    pub total_revenue: Money,
    pub total_sales_count: usize,
    pub average_sale: Money,
    pub top_products: Vec<ProductSales>,
    /// Only methods used in the period, in `PaymentMethod::ALL` order.
    pub payment_methods: Vec<PaymentBreakdown>,
    /// Critical products right now, whatever the range.
    pub low_stock_products: Vec<Product>,
}

/// Builds the report for `range` as seen at `as_of`.
///
/// ## Example
/// ```rust
/// use chrono::{FixedOffset, Utc};
/// use geststock_core::report::{period_report, ReportRange};
/// use geststock_core::AppState;
///
/// let as_of = Utc::now().with_timezone(&FixedOffset::east_opt(3600).unwrap());
/// let report = period_report(&AppState::default(), ReportRange::Week, as_of);
/// assert_eq!(report.total_sales_count, 0);
/// assert!(report.average_sale.is_zero());
/// ```
pub fn period_report(
    state: &AppState,
    range: ReportRange,
    as_of: DateTime<FixedOffset>,
) -> PeriodReport {
    let start = range.start(as_of);
    let sales: Vec<&Sale> = revenue_sales(state)
        .filter(|s| local(s.created_at, &as_of) >= start)
        .collect();

    let total_revenue: Money = sales.iter().map(|s| s.total_amount).sum();
    let total_sales_count = sales.len();

    PeriodReport {
        range,
        start,
        total_revenue,
        total_sales_count,
        average_sale: total_revenue.average_over(total_sales_count),
        top_products: top_products(&sales, TOP_PRODUCTS_LIMIT),
        payment_methods: payment_breakdown(&sales, total_revenue),
        low_stock_products: low_stock(state).cloned().collect(),
    }
}

/// Best sellers by revenue.
///
/// Products are collected in order of first appearance and the sort is
/// stable, so equal revenues keep that order.
fn top_products(sales: &[&Sale], limit: usize) -> Vec<ProductSales> {
    let mut rows: Vec<ProductSales> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();

    for item in sales.iter().flat_map(|s| s.items.iter()) {
        match index.get(item.product_id.as_str()) {
            Some(&i) => {
                rows[i].quantity += item.quantity;
                rows[i].revenue += item.total;
            }
            None => {
                index.insert(&item.product_id, rows.len());
                rows.push(ProductSales {
                    product_id: item.product_id.clone(),
                    name: item.product_name.clone(),
                    quantity: item.quantity,
                    revenue: item.total,
                });
            }
        }
    }

    rows.sort_by(|a, b| b.revenue.cmp(&a.revenue));
    rows.truncate(limit);
    rows
}

fn payment_breakdown(sales: &[&Sale], total_revenue: Money) -> Vec<PaymentBreakdown> {
    PaymentMethod::ALL
        .into_iter()
        .filter_map(|method| {
            let (count, amount) = sales
                .iter()
                .filter(|s| s.payment_method == method)
                .fold((0usize, Money::zero()), |(n, sum), s| (n + 1, sum + s.total_amount));
            (count > 0).then(|| PaymentBreakdown {
                method,
                count,
                amount,
                percentage: amount.percentage_of(total_revenue),
            })
        })
        .collect()
}

// =============================================================================
// Report Export
// =============================================================================

/// Report document as downloaded by users (French keys).
///
/// ```text
/// {
///   "periode": "month",
///   "resume": { "totalVentes": 12, "chiffreAffaires": 85000, "venteMoyenne": 7083 },
///   "produitsPopulaires": [ { "productId": .., "name": .., "quantity": .., "revenue": .. } ],
///   "modesPayement": { "cash": { "count": 8, "amount": 50000 }, ... },
///   "stockCritique": [ { "nom": .., "stockActuel": .., "stockMinimum": .. } ]
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportExport {
    pub periode: ReportRange,
    pub resume: ExportSummary,
    pub produits_populaires: Vec<ProductSales>,
    pub modes_payement: BTreeMap<PaymentMethod, ExportMethodTotals>,
    pub stock_critique: Vec<ExportLowStock>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportSummary {
    pub total_ventes: usize,
    pub chiffre_affaires: Money,
    pub vente_moyenne: Money,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportMethodTotals {
    pub count: usize,
    pub amount: Money,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportLowStock {
    pub nom: String,
    pub stock_actuel: i64,
    pub stock_minimum: i64,
}

impl From<&PeriodReport> for ReportExport {
    fn from(report: &PeriodReport) -> Self {
        ReportExport {
            periode: report.range,
            resume: ExportSummary {
                total_ventes: report.total_sales_count,
                chiffre_affaires: report.total_revenue,
                vente_moyenne: report.average_sale,
            },
            produits_populaires: report.top_products.clone(),
            modes_payement: report
                .payment_methods
                .iter()
                .map(|b| {
                    (
                        b.method,
                        ExportMethodTotals {
                            count: b.count,
                            amount: b.amount,
                        },
                    )
                })
                .collect(),
            stock_critique: report
                .low_stock_products
                .iter()
                .map(|p| ExportLowStock {
                    nom: p.name.clone(),
                    stock_actuel: p.current_stock,
                    stock_minimum: p.min_stock,
                })
                .collect(),
        }
    }
}

// =============================================================================
// List Summaries
// =============================================================================

/// Header figures of the customers list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CustomerSummary {
    pub total_debt: Money,
    pub individual_count: usize,
    pub business_count: usize,
    pub debt_free_count: usize,
}

pub fn customer_summary(state: &AppState) -> CustomerSummary {
    let customers = &state.customers;
    CustomerSummary {
        total_debt: customers.iter().map(|c| c.current_debt).sum(),
        individual_count: customers
            .iter()
            .filter(|c| c.customer_type == CustomerType::Individual)
            .count(),
        business_count: customers
            .iter()
            .filter(|c| c.customer_type == CustomerType::Business)
            .count(),
        debt_free_count: customers.iter().filter(|c| c.current_debt.is_zero()).count(),
    }
}

/// Header figures of the purchases list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseSummary {
    pub pending_count: usize,
    pub received_count: usize,
    /// Ordered value of every purchase that was not cancelled.
    pub total_value: Money,
}

pub fn purchase_summary(state: &AppState) -> PurchaseSummary {
    let purchases = &state.purchases;
    PurchaseSummary {
        pending_count: purchases
            .iter()
            .filter(|p| p.status == PurchaseStatus::Pending)
            .count(),
        received_count: purchases
            .iter()
            .filter(|p| p.status == PurchaseStatus::Received)
            .count(),
        total_value: purchases
            .iter()
            .filter(|p| p.status != PurchaseStatus::Cancelled)
            .map(|p| p.total_amount)
            .sum(),
    }
}

/// Header figures of the sales list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct SalesSummary {
    pub today_count: usize,
    pub today_revenue: Money,
    /// Average over all revenue sales ever recorded.
    pub average_sale: Money,
}

pub fn sales_summary(state: &AppState, as_of: DateTime<FixedOffset>) -> SalesSummary {
    let today = as_of.date_naive();
    let (mut today_count, mut today_revenue) = (0, Money::zero());
    let (mut count, mut revenue) = (0, Money::zero());

    for sale in revenue_sales(state) {
        count += 1;
        revenue += sale.total_amount;
        if local(sale.created_at, &as_of).date() == today {
            today_count += 1;
            today_revenue += sale.total_amount;
        }
    }

    SalesSummary {
        today_count,
        today_revenue,
        average_sale: revenue.average_over(count),
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{new_id, SaleItem, SaleStatus};
    use chrono::TimeZone;

    fn offset() -> FixedOffset {
        FixedOffset::east_opt(3600).unwrap()
    }

    /// 2026-03-15 10:00 at UTC+1.
    fn as_of() -> DateTime<FixedOffset> {
        offset().with_ymd_and_hms(2026, 3, 15, 10, 0, 0).unwrap()
    }

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Utc> {
        offset()
            .with_ymd_and_hms(y, m, d, h, min, 0)
            .unwrap()
            .with_timezone(&Utc)
    }

    fn sale(lines: &[(&str, i64, i64)], method: PaymentMethod, created_at: DateTime<Utc>) -> Sale {
        let items: Vec<SaleItem> = lines
            .iter()
            .map(|(product_id, qty, price)| SaleItem {
                product_id: product_id.to_string(),
                product_name: format!("Produit {}", product_id),
                quantity: *qty,
                unit_price: Money::from_units(*price),
                total: Money::from_units(qty * price),
            })
            .collect();
        Sale {
            id: new_id(),
            customer_id: None,
            customer_name: None,
            total_amount: items.iter().map(|i| i.total).sum(),
            items,
            payment_method: method,
            status: SaleStatus::Completed,
            created_at,
            notes: None,
        }
    }

    #[test]
    fn test_today_report_sums_and_averages() {
        let mut state = AppState::default();
        state.sales.push(sale(&[("a", 1, 1_000)], PaymentMethod::Cash, at(2026, 3, 15, 8, 0)));
        state.sales.push(sale(&[("b", 1, 3_000)], PaymentMethod::Cash, at(2026, 3, 15, 9, 30)));
        state.sales.push(sale(&[("a", 1, 9_999)], PaymentMethod::Cash, at(2026, 3, 14, 23, 59)));

        let report = period_report(&state, ReportRange::Today, as_of());
        assert_eq!(report.total_revenue.units(), 4_000);
        assert_eq!(report.total_sales_count, 2);
        assert_eq!(report.average_sale.units(), 2_000);
    }

    #[test]
    fn test_top_products_stable_on_ties() {
        let mut state = AppState::default();
        let when = at(2026, 3, 15, 8, 0);
        state.sales.push(sale(&[("p500", 1, 500)], PaymentMethod::Cash, when));
        state.sales.push(sale(&[("p1500a", 3, 500)], PaymentMethod::Cash, when));
        state.sales.push(sale(&[("p1500b", 1, 1_500)], PaymentMethod::Cash, when));

        let report = period_report(&state, ReportRange::Today, as_of());
        let order: Vec<&str> = report
            .top_products
            .iter()
            .map(|p| p.product_id.as_str())
            .collect();
        assert_eq!(order, vec!["p1500a", "p1500b", "p500"]);
        assert_eq!(report.top_products[0].quantity, 3);
    }

    #[test]
    fn test_top_products_limited_to_five() {
        let mut state = AppState::default();
        let when = at(2026, 3, 15, 8, 0);
        for (i, id) in ["a", "b", "c", "d", "e", "f", "g"].into_iter().enumerate() {
            state
                .sales
                .push(sale(&[(id, 1, 100 * (i as i64 + 1))], PaymentMethod::Cash, when));
        }

        let report = period_report(&state, ReportRange::Today, as_of());
        assert_eq!(report.top_products.len(), TOP_PRODUCTS_LIMIT);
        assert_eq!(report.top_products[0].product_id, "g");
    }

    #[test]
    fn test_payment_breakdown_percentages() {
        let mut state = AppState::default();
        let when = at(2026, 3, 10, 12, 0);
        state.sales.push(sale(&[("a", 1, 3_000)], PaymentMethod::Credit, when));
        state.sales.push(sale(&[("a", 1, 1_000)], PaymentMethod::Cash, when));

        let report = period_report(&state, ReportRange::Month, as_of());
        assert_eq!(report.payment_methods.len(), 2);
        assert_eq!(report.payment_methods[0].method, PaymentMethod::Cash);
        assert!((report.payment_methods[0].percentage - 25.0).abs() < 1e-9);
        assert_eq!(report.payment_methods[1].method, PaymentMethod::Credit);
        assert_eq!(report.payment_methods[1].count, 1);
        assert!((report.payment_methods[1].percentage - 75.0).abs() < 1e-9);
    }

    #[test]
    fn test_empty_period_has_zero_average_and_no_breakdown() {
        let report = period_report(&AppState::default(), ReportRange::Year, as_of());
        assert!(report.total_revenue.is_zero());
        assert!(report.average_sale.is_zero());
        assert!(report.payment_methods.is_empty());
    }

    #[test]
    fn test_range_boundaries() {
        let now = as_of();
        let mut state = AppState::default();
        // 8 days ago: outside the week, inside the month
        state.sales.push(sale(&[("a", 1, 100)], PaymentMethod::Cash, at(2026, 3, 7, 10, 0)));
        // 6 days ago
        state.sales.push(sale(&[("a", 1, 200)], PaymentMethod::Cash, at(2026, 3, 9, 10, 0)));
        // Last month, same year
        state.sales.push(sale(&[("a", 1, 400)], PaymentMethod::Cash, at(2026, 2, 20, 10, 0)));
        // Last year
        state.sales.push(sale(&[("a", 1, 800)], PaymentMethod::Cash, at(2025, 12, 31, 23, 0)));

        let revenue = |range| period_report(&state, range, now).total_revenue.units();
        assert_eq!(revenue(ReportRange::Week), 200);
        assert_eq!(revenue(ReportRange::Month), 300);
        assert_eq!(revenue(ReportRange::Year), 700);
    }

    #[test]
    fn test_calendar_day_uses_local_offset() {
        let mut state = AppState::default();
        // 23:30 UTC on the 14th is 00:30 on the 15th at UTC+1
        let late = Utc.with_ymd_and_hms(2026, 3, 14, 23, 30, 0).unwrap();
        state.sales.push(sale(&[("a", 1, 700)], PaymentMethod::Cash, late));

        let stats = dashboard_stats(&state, as_of(), 10);
        assert_eq!(stats.today_sales.units(), 700);
    }

    #[test]
    fn test_cancelled_sales_are_not_revenue() {
        let mut state = AppState::default();
        let mut cancelled = sale(&[("a", 2, 500)], PaymentMethod::Cash, at(2026, 3, 15, 9, 0));
        cancelled.status = SaleStatus::Cancelled;
        state.sales.push(cancelled);

        let stats = dashboard_stats(&state, as_of(), 10);
        assert!(stats.today_sales.is_zero());
        let report = period_report(&state, ReportRange::Today, as_of());
        assert_eq!(report.total_sales_count, 0);
        assert!(report.top_products.is_empty());
    }

    #[test]
    fn test_recent_movements_newest_first() {
        let mut state = AppState::default();
        for (i, minute) in [5u32, 1, 5, 3].iter().enumerate() {
            state.movements.push(StockMovement {
                id: format!("m{}", i),
                product_id: "a".to_string(),
                product_name: "A".to_string(),
                movement_type: crate::types::MovementType::Adjustment,
                quantity: 1,
                balance_after: i as i64 + 1,
                reference: None,
                created_at: at(2026, 3, 15, 9, *minute),
                notes: None,
            });
        }

        let ids: Vec<String> = recent_movements(&state, 3).into_iter().map(|m| m.id).collect();
        assert_eq!(ids, vec!["m2", "m0", "m3"]);
    }

    #[test]
    fn test_report_export_uses_french_keys() {
        let mut state = AppState::default();
        state.sales.push(sale(&[("a", 2, 1_000)], PaymentMethod::MobileMoney, at(2026, 3, 15, 9, 0)));

        let report = period_report(&state, ReportRange::Today, as_of());
        let json = serde_json::to_value(ReportExport::from(&report)).unwrap();

        assert_eq!(json["periode"], "today");
        assert_eq!(json["resume"]["totalVentes"], 1);
        assert_eq!(json["resume"]["chiffreAffaires"], 2_000);
        assert_eq!(json["resume"]["venteMoyenne"], 2_000);
        assert_eq!(json["modesPayement"]["mobile_money"]["count"], 1);
        assert!(json["stockCritique"].as_array().unwrap().is_empty());
        assert_eq!(json["produitsPopulaires"][0]["revenue"], 2_000);
    }
}
