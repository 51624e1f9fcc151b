//! # Ledgers
//!
//! The only code allowed to change `Product.current_stock` and
//! `Customer.current_debt`.
//!
//! ## Flow of a Credit Sale
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  stock::record_sale(draft)                                              │
//! │     │                                                                   │
//! │     ├── 1. validate every line (nothing mutated yet)                   │
//! │     │       └── InsufficientStock? → Err, state untouched               │
//! │     │                                                                   │
//! │     ├── 2. decrement stock + append one `sale` movement per line        │
//! │     │                                                                   │
//! │     ├── 3. push the Sale (status completed)                             │
//! │     │                                                                   │
//! │     └── 4. credit::on_sale_completed(sale)                              │
//! │             └── debt += total, CreditLimitWarning if over limit         │
//! │                                                                         │
//! │  Result: Recorded { value: Sale, warnings: [..] }                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Callers that need all-or-nothing semantics across several operations run
//! them inside [`AppState::transact`](crate::AppState::transact).

pub mod credit;
pub mod stock;

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::state::AppState;
use crate::types::{new_id, MovementType, StockMovement};

/// Applies `delta` to a product's stock and appends the matching movement.
///
/// The caller has already checked that the result is not negative.
/// A result outside `i64` is `InvalidAmount` and leaves the product as is.
pub(crate) fn append_movement(
    state: &mut AppState,
    product_id: &str,
    movement_type: MovementType,
    delta: i64,
    reference: Option<&str>,
    notes: Option<String>,
    now: DateTime<Utc>,
) -> CoreResult<StockMovement> {
    let product = state.product_mut(product_id)?;
    product.current_stock = product.current_stock.checked_add(delta).ok_or_else(|| {
        CoreError::invalid_amount(format!(
            "stock of {} cannot change by {}",
            product.id, delta
        ))
    })?;
    product.updated_at = now;

    let movement = StockMovement {
        id: new_id(),
        product_id: product.id.clone(),
        product_name: product.name.clone(),
        movement_type,
        quantity: delta,
        balance_after: product.current_stock,
        reference: reference.map(str::to_string),
        created_at: now,
        notes,
    };

    debug!(
        product_id = %movement.product_id,
        movement_type = movement.movement_type.as_str(),
        quantity = movement.quantity,
        balance_after = movement.balance_after,
        "Stock movement"
    );

    state.movements.push(movement.clone());
    Ok(movement)
}

/// `unit_price × quantity`, or `InvalidAmount` on overflow.
pub(crate) fn line_total(unit_price: Money, quantity: i64) -> CoreResult<Money> {
    unit_price
        .checked_multiply_quantity(quantity)
        .ok_or_else(|| CoreError::invalid_amount("line total exceeds the supported range"))
}

/// Sums amounts, or `InvalidAmount` on overflow.
pub(crate) fn checked_total(amounts: impl IntoIterator<Item = Money>) -> CoreResult<Money> {
    amounts.into_iter().try_fold(Money::zero(), |sum, amount| {
        sum.checked_add(amount)
            .ok_or_else(|| CoreError::invalid_amount("total exceeds the supported range"))
    })
}
