//! # Stock Ledger
//!
//! Keeps `Product.current_stock` equal to the sum of its movements.
//!
//! ## Movement Types
//! ```text
//! ┌──────────────┬──────────┬──────────────────────────────────────────────┐
//! │ Operation    │ Type     │ Quantity                                     │
//! ├──────────────┼──────────┼──────────────────────────────────────────────┤
//! │ record_sale  │ sale     │ −line.quantity, reference = sale id          │
//! │ receipt      │ purchase │ +line.quantity, reference = purchase id      │
//! │ cancel_sale  │ adjust.  │ +line.quantity, reference = sale id          │
//! │ adjust_stock │ adjust.  │ ± delta (correction)                         │
//! │ adjust_stock │ loss     │ − delta (loss)                               │
//! │ new product  │ adjust.  │ + initial stock                              │
//! └──────────────┴──────────┴──────────────────────────────────────────────┘
//! ```
//!
//! Every operation checks everything it can before mutating anything, so a
//! returned error means the state was not touched.

use chrono::{DateTime, Utc};
use tracing::{info, warn};

use super::{append_movement, checked_total, credit, line_total};
use crate::error::{CoreError, CoreResult, LedgerWarning};
use crate::state::{AppState, Recorded};
use crate::types::{
    new_id, AdjustmentReason, MovementType, Purchase, PurchaseDraft, PurchaseItem,
    PurchaseStatus, Sale, SaleDraft, SaleItem, SaleStatus, StockMovement,
};
use crate::validation::{validate_line_count, validate_quantity};

/// Note written on movements that restock a cancelled sale.
pub const SALE_CANCELLED_NOTE: &str = "sale cancelled";

/// Note written on the movement that records a product's starting stock.
pub const INITIAL_STOCK_NOTE: &str = "initial stock";

// =============================================================================
// Sales
// =============================================================================

/// Records a completed sale.
///
/// ## Steps
/// 1. Validate lines, customer and stock for every product
/// 2. Snapshot names and selling prices into the sale items
/// 3. Decrement stock and append one `sale` movement per line
/// 4. Run the credit ledger (credit sales with a customer only)
///
/// Quantities are summed per product before the stock check, so two lines
/// of the same product cannot together oversell it.
///
/// ## Errors
/// - `Validation` for an empty sale or a bad quantity
/// - `CustomerNotFound` when `customer_id` is unknown
/// - `ProductNotFound` / `InsufficientStock` for any line
pub fn record_sale(
    state: &mut AppState,
    draft: SaleDraft,
    now: DateTime<Utc>,
) -> CoreResult<Recorded<Sale>> {
    validate_line_count("items", draft.items.len())?;
    for line in &draft.items {
        validate_quantity(line.quantity)?;
    }

    let customer_name = match &draft.customer_id {
        Some(id) => Some(state.customer(id)?.name.clone()),
        None => None,
    };

    let mut requested: Vec<(&str, i64)> = Vec::new();
    for line in &draft.items {
        match requested.iter_mut().find(|(id, _)| *id == line.product_id) {
            Some((_, qty)) => *qty = qty.saturating_add(line.quantity),
            None => requested.push((line.product_id.as_str(), line.quantity)),
        }
    }

    for (product_id, qty) in &requested {
        let product = state.product(product_id)?;
        if product.current_stock < *qty {
            return Err(CoreError::InsufficientStock {
                product_id: product.id.clone(),
                requested: *qty,
                available: product.current_stock,
            });
        }
    }

    let items = draft
        .items
        .iter()
        .map(|line| {
            let product = state.product(&line.product_id)?;
            Ok(SaleItem {
                product_id: product.id.clone(),
                product_name: product.name.clone(),
                quantity: line.quantity,
                unit_price: product.sell_price,
                total: line_total(product.sell_price, line.quantity)?,
            })
        })
        .collect::<CoreResult<Vec<_>>>()?;

    let sale = Sale {
        id: new_id(),
        customer_id: draft.customer_id,
        customer_name,
        total_amount: checked_total(items.iter().map(|item| item.total))?,
        items,
        payment_method: draft.payment_method,
        status: SaleStatus::Completed,
        created_at: now,
        notes: draft.notes,
    };
    credit::check_sale(state, &sale)?;

    for item in &sale.items {
        append_movement(
            state,
            &item.product_id,
            MovementType::Sale,
            -item.quantity,
            Some(&sale.id),
            None,
            now,
        )?;
    }
    state.sales.push(sale.clone());

    let warnings = credit::on_sale_completed(state, &sale)?;

    info!(
        sale_id = %sale.id,
        total = sale.total_amount.units(),
        payment_method = sale.payment_method.as_str(),
        lines = sale.items.len(),
        "Sale recorded"
    );

    Ok(Recorded::with_warnings(sale, warnings))
}

/// Cancels a completed sale and puts its goods back on the shelf.
///
/// Each line is restocked with an `adjustment` movement referencing the
/// sale. Lines whose product was deleted since are skipped and reported as
/// a `LedgerInconsistency`.
///
/// ## Errors
/// - `SaleNotFound`
/// - `AlreadyCancelled` on a second call
/// - `InvalidSaleStatus` for a pending sale (it never took stock)
pub fn cancel_sale(
    state: &mut AppState,
    sale_id: &str,
    now: DateTime<Utc>,
) -> CoreResult<Recorded<Sale>> {
    let sale = state.sale(sale_id)?.clone();
    match sale.status {
        SaleStatus::Completed => {}
        SaleStatus::Cancelled => return Err(CoreError::AlreadyCancelled(sale.id)),
        SaleStatus::Pending => {
            return Err(CoreError::InvalidSaleStatus {
                sale_id: sale.id,
                status: sale.status.as_str().to_string(),
            })
        }
    }

    let mut warnings = Vec::new();
    for item in &sale.items {
        if state.product(&item.product_id).is_err() {
            let warning = LedgerWarning::LedgerInconsistency {
                entity_id: item.product_id.clone(),
                detail: format!(
                    "product deleted, {} units of sale {} not restocked",
                    item.quantity, sale.id
                ),
            };
            warn!(%warning, "Ledger warning");
            warnings.push(warning);
            continue;
        }

        append_movement(
            state,
            &item.product_id,
            MovementType::Adjustment,
            item.quantity,
            Some(&sale.id),
            Some(SALE_CANCELLED_NOTE.to_string()),
            now,
        )?;
    }

    let cancelled = {
        let stored = state.sale_mut(sale_id)?;
        stored.status = SaleStatus::Cancelled;
        stored.clone()
    };

    warnings.extend(credit::on_sale_cancelled(state, &cancelled));

    info!(sale_id = %cancelled.id, "Sale cancelled");
    Ok(Recorded::with_warnings(cancelled, warnings))
}

// =============================================================================
// Purchases
// =============================================================================

/// Creates a pending purchase order. No stock moves until it is received.
///
/// Buying prices and the supplier name are snapshotted.
pub fn create_purchase(
    state: &mut AppState,
    draft: PurchaseDraft,
    now: DateTime<Utc>,
) -> CoreResult<Purchase> {
    validate_line_count("items", draft.items.len())?;
    for line in &draft.items {
        validate_quantity(line.quantity)?;
    }

    let supplier_name = state.supplier(&draft.supplier_id)?.name.clone();

    let items = draft
        .items
        .iter()
        .map(|line| {
            let product = state.product(&line.product_id)?;
            Ok(PurchaseItem {
                product_id: product.id.clone(),
                product_name: product.name.clone(),
                quantity: line.quantity,
                unit_price: product.buy_price,
                total: line_total(product.buy_price, line.quantity)?,
            })
        })
        .collect::<CoreResult<Vec<_>>>()?;

    let purchase = Purchase {
        id: new_id(),
        supplier_id: draft.supplier_id,
        supplier_name,
        total_amount: checked_total(items.iter().map(|item| item.total))?,
        items,
        status: PurchaseStatus::Pending,
        order_date: now,
        received_date: None,
        notes: draft.notes,
    };

    state.purchases.push(purchase.clone());
    info!(
        purchase_id = %purchase.id,
        total = purchase.total_amount.units(),
        "Purchase order created"
    );
    Ok(purchase)
}

/// Receives a pending purchase: stock goes up, `received_date` is set.
///
/// Products that end up above their `max_stock` are reported with
/// `AboveMaxStock`; the receipt still goes through.
///
/// ## Errors
/// - `PurchaseNotFound`
/// - `InvalidPurchaseStatus` unless the order is pending
/// - `ProductNotFound` if any line's product was deleted (whole receipt fails)
pub fn record_purchase_receipt(
    state: &mut AppState,
    purchase_id: &str,
    now: DateTime<Utc>,
) -> CoreResult<Recorded<Purchase>> {
    let purchase = state.purchase(purchase_id)?.clone();
    if purchase.status != PurchaseStatus::Pending {
        return Err(CoreError::InvalidPurchaseStatus {
            purchase_id: purchase.id,
            status: purchase.status.as_str().to_string(),
        });
    }

    for item in &purchase.items {
        state.product(&item.product_id)?;
    }

    let mut touched: Vec<&str> = Vec::new();
    for item in &purchase.items {
        append_movement(
            state,
            &item.product_id,
            MovementType::Purchase,
            item.quantity,
            Some(&purchase.id),
            None,
            now,
        )?;
        if !touched.contains(&item.product_id.as_str()) {
            touched.push(&item.product_id);
        }
    }

    let mut warnings = Vec::new();
    for product_id in touched {
        let product = state.product(product_id)?;
        if product.current_stock > product.max_stock {
            let warning = LedgerWarning::AboveMaxStock {
                product_id: product.id.clone(),
                max_stock: product.max_stock,
                current_stock: product.current_stock,
            };
            warn!(%warning, "Ledger warning");
            warnings.push(warning);
        }
    }

    let received = {
        let stored = state.purchase_mut(purchase_id)?;
        stored.status = PurchaseStatus::Received;
        stored.received_date = Some(now);
        stored.clone()
    };

    info!(purchase_id = %received.id, "Purchase received");
    Ok(Recorded::with_warnings(received, warnings))
}

/// Cancels a purchase order that has not been received.
pub fn cancel_purchase(state: &mut AppState, purchase_id: &str) -> CoreResult<Purchase> {
    let stored = state.purchase_mut(purchase_id)?;
    if stored.status != PurchaseStatus::Pending {
        return Err(CoreError::InvalidPurchaseStatus {
            purchase_id: stored.id.clone(),
            status: stored.status.as_str().to_string(),
        });
    }

    stored.status = PurchaseStatus::Cancelled;
    info!(purchase_id = %stored.id, "Purchase cancelled");
    Ok(stored.clone())
}

// =============================================================================
// Manual Adjustments
// =============================================================================

/// Manually corrects a product's stock.
///
/// ## Reasons
/// - `Correction`: inventory count fix, either sign → `adjustment` movement
/// - `Loss`: breakage, theft, expiry; `delta` must be negative → `loss` movement
///
/// ## Errors
/// - `InvalidAmount` for a zero delta or a positive loss
/// - `Validation` if `|delta|` is above `MAX_LINE_QUANTITY`
/// - `ProductNotFound`
/// - `NegativeStock` if the stock would drop below zero
pub fn adjust_stock(
    state: &mut AppState,
    product_id: &str,
    delta: i64,
    reason: AdjustmentReason,
    notes: Option<String>,
    now: DateTime<Utc>,
) -> CoreResult<Recorded<StockMovement>> {
    if delta == 0 {
        return Err(CoreError::invalid_amount("adjustment delta must not be zero"));
    }
    if reason == AdjustmentReason::Loss && delta > 0 {
        return Err(CoreError::invalid_amount("a loss must decrease stock"));
    }
    validate_quantity(delta.checked_abs().unwrap_or(i64::MAX))?;

    let product = state.product(product_id)?;
    if product.current_stock.saturating_add(delta) < 0 {
        return Err(CoreError::NegativeStock {
            product_id: product.id.clone(),
            current: product.current_stock,
            delta,
        });
    }

    let movement_type = match reason {
        AdjustmentReason::Correction => MovementType::Adjustment,
        AdjustmentReason::Loss => MovementType::Loss,
    };

    let movement = append_movement(state, product_id, movement_type, delta, None, notes, now)?;
    info!(
        product_id = %movement.product_id,
        delta,
        balance_after = movement.balance_after,
        "Stock adjusted"
    );
    Ok(Recorded::clean(movement))
}

/// Records the starting stock of a freshly created product.
pub(crate) fn record_initial_stock(
    state: &mut AppState,
    product_id: &str,
    quantity: i64,
    now: DateTime<Utc>,
) -> CoreResult<StockMovement> {
    append_movement(
        state,
        product_id,
        MovementType::Adjustment,
        quantity,
        None,
        Some(INITIAL_STOCK_NOTE.to_string()),
        now,
    )
}

/// Gives every product that has stock but no movement an opening movement.
///
/// Data restored from an older backup carries stock levels without the log
/// that produced them. The opening movement makes the replay invariant hold
/// again without changing any stock level. Products that already have
/// movements are left alone: a broken chain there is for the audit to
/// report, not for this function to paper over.
pub fn open_missing_balances(state: &mut AppState, now: DateTime<Utc>) -> Vec<StockMovement> {
    let orphans: Vec<(String, String, i64)> = state
        .products
        .iter()
        .filter(|p| p.current_stock != 0)
        .filter(|p| state.movements_for(&p.id).next().is_none())
        .map(|p| (p.id.clone(), p.name.clone(), p.current_stock))
        .collect();

    let mut opened = Vec::with_capacity(orphans.len());
    for (product_id, product_name, stock) in orphans {
        let movement = StockMovement {
            id: new_id(),
            product_id,
            product_name,
            movement_type: MovementType::Adjustment,
            quantity: stock,
            balance_after: stock,
            reference: None,
            created_at: now,
            notes: Some(INITIAL_STOCK_NOTE.to_string()),
        };
        state.movements.push(movement.clone());
        opened.push(movement);
    }

    if !opened.is_empty() {
        info!(count = opened.len(), "Opening balances recorded");
    }
    opened
}

// =============================================================================
// Unit Tests
// =============================================================================
