//! # Credit Ledger
//!
//! Keeps `Customer.current_debt` equal to completed credit sales minus
//! repayments.
//!
//! ```text
//! credit sale completed  ──► debt += total      (warn if debt > limit)
//! credit sale cancelled  ──► debt −= total      (floored at 0, warn if clamped)
//! payment recorded       ──► debt −= amount     (floored at 0)
//! ```
//!
//! The credit limit is advisory: going over it raises a
//! `CreditLimitWarning`, it never blocks a sale.

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use crate::error::{CoreError, CoreResult, LedgerWarning};
use crate::money::Money;
use crate::state::{AppState, Recorded};
use crate::types::{new_id, Customer, CustomerPayment, Sale};
use crate::MAX_AMOUNT;

/// Fails with `InvalidAmount` if `sale` would push its customer's debt out
/// of range. Runs before any stock is touched.
pub fn check_sale(state: &AppState, sale: &Sale) -> CoreResult<()> {
    let Some(customer_id) = sale.customer_id.as_deref().filter(|_| sale.is_on_credit()) else {
        return Ok(());
    };

    add_debt(state.customer(customer_id)?.current_debt, sale.total_amount).map(|_| ())
}

fn add_debt(debt: Money, amount: Money) -> CoreResult<Money> {
    debt.checked_add(amount)
        .ok_or_else(|| CoreError::invalid_amount("debt exceeds the supported range"))
}

/// Puts a completed credit sale on the customer's account.
///
/// Cash, card and mobile money sales, and credit sales without a customer,
/// leave every debt unchanged.
pub fn on_sale_completed(state: &mut AppState, sale: &Sale) -> CoreResult<Vec<LedgerWarning>> {
    let Some(customer_id) = sale.customer_id.as_deref().filter(|_| sale.is_on_credit()) else {
        return Ok(Vec::new());
    };

    let customer = state.customer_mut(customer_id)?;
    customer.current_debt = add_debt(customer.current_debt, sale.total_amount)?;

    debug!(
        customer_id = %customer.id,
        sale_id = %sale.id,
        debt = customer.current_debt.units(),
        "Debt increased"
    );

    let mut warnings = Vec::new();
    if customer.is_over_limit() {
        let warning = LedgerWarning::CreditLimitWarning {
            customer_id: customer.id.clone(),
            credit_limit: customer.credit_limit,
            current_debt: customer.current_debt,
        };
        warn!(%warning, "Ledger warning");
        warnings.push(warning);
    }

    Ok(warnings)
}

/// Takes a cancelled credit sale back off the customer's account.
///
/// The debt never goes below zero. If the sale total is larger than the
/// debt left (part of it was already repaid), the debt is clamped to zero
/// and a `LedgerInconsistency` is returned for someone to look at.
pub fn on_sale_cancelled(state: &mut AppState, sale: &Sale) -> Vec<LedgerWarning> {
    let Some(customer_id) = sale.customer_id.as_deref().filter(|_| sale.is_on_credit()) else {
        return Vec::new();
    };

    let mut warnings = Vec::new();
    match state.customer_mut(customer_id) {
        Ok(customer) => {
            let (left, applied) = customer.current_debt.floor_sub(sale.total_amount);
            customer.current_debt = left;

            debug!(
                customer_id = %customer.id,
                sale_id = %sale.id,
                debt = left.units(),
                "Debt reversed"
            );

            if applied < sale.total_amount {
                warnings.push(LedgerWarning::LedgerInconsistency {
                    entity_id: customer.id.clone(),
                    detail: format!(
                        "cancelling sale {} removes {} but only {} was owed, debt clamped to 0",
                        sale.id, sale.total_amount, applied
                    ),
                });
            }
        }
        Err(_) => warnings.push(LedgerWarning::LedgerInconsistency {
            entity_id: customer_id.to_string(),
            detail: format!("customer deleted, debt of sale {} not reversed", sale.id),
        }),
    }

    for warning in &warnings {
        warn!(%warning, "Ledger warning");
    }
    warnings
}

/// Records a repayment from a customer.
///
/// The debt is reduced by `amount`, stopping at zero. The payment record
/// keeps both what was handed over and what was actually applied.
///
/// ## Errors
/// - `InvalidAmount` if `amount ≤ 0` or above `MAX_AMOUNT`
/// - `CustomerNotFound`
pub fn record_payment(
    state: &mut AppState,
    customer_id: &str,
    amount: Money,
    now: DateTime<Utc>,
) -> CoreResult<Recorded<Customer>> {
    if !amount.is_positive() {
        return Err(CoreError::invalid_amount(format!(
            "payment must be positive, got {}",
            amount
        )));
    }
    if amount.units() > MAX_AMOUNT {
        return Err(CoreError::invalid_amount(format!(
            "payment above {} F CFA",
            MAX_AMOUNT
        )));
    }

    let customer = state.customer_mut(customer_id)?;
    let (left, applied) = customer.current_debt.floor_sub(amount);
    customer.current_debt = left;
    let updated = customer.clone();

    state.payments.push(CustomerPayment {
        id: new_id(),
        customer_id: updated.id.clone(),
        amount,
        applied,
        created_at: now,
    });

    info!(
        customer_id = %updated.id,
        amount = amount.units(),
        applied = applied.units(),
        debt = updated.current_debt.units(),
        "Payment recorded"
    );

    Ok(Recorded::clean(updated))
}

// =============================================================================
// Unit Tests
// =============================================================================
