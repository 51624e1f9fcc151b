//! # Ledger Audit
//!
//! Replays the movement log and compares it with the stock on each product.
//!
//! ```text
//! balance = 0
//! for movement of product (log order):
//!     balance += movement.quantity
//!     movement.balance_after == balance ?      → else BrokenChain
//! product.current_stock == balance ?           → else StockMismatch
//! ```
//!
//! The audit is read-only. It reports, it never repairs.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::state::AppState;

/// One disagreement between the log and the products.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Discrepancy {
    /// A movement's recorded balance does not follow from the ones before it.
    #[serde(rename_all = "camelCase")]
    BrokenChain {
        product_id: String,
        movement_id: String,
        expected: i64,
        recorded: i64,
    },

    /// The product's stock differs from the replayed log.
    #[serde(rename_all = "camelCase")]
    StockMismatch {
        product_id: String,
        replayed: i64,
        current_stock: i64,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct AuditReport {
    pub products_checked: usize,
    pub movements_checked: usize,
    /// Movements of products that no longer exist. Not an error.
    pub orphan_movements: usize,
    pub discrepancies: Vec<Discrepancy>,
}

impl AuditReport {
    pub fn is_clean(&self) -> bool {
        self.discrepancies.is_empty()
    }
}

/// Replays every product's movements in log order.
pub fn audit_ledger(state: &AppState) -> AuditReport {
    let mut discrepancies = Vec::new();
    let mut movements_checked = 0;

    for product in &state.products {
        let mut balance = 0;
        for movement in state.movements_for(&product.id) {
            movements_checked += 1;
            balance += movement.quantity;
            if movement.balance_after != balance {
                discrepancies.push(Discrepancy::BrokenChain {
                    product_id: product.id.clone(),
                    movement_id: movement.id.clone(),
                    expected: balance,
                    recorded: movement.balance_after,
                });
            }
        }

        if product.current_stock != balance {
            discrepancies.push(Discrepancy::StockMismatch {
                product_id: product.id.clone(),
                replayed: balance,
                current_stock: product.current_stock,
            });
        }
    }

    AuditReport {
        products_checked: state.products.len(),
        movements_checked,
        orphan_movements: state.movements.len() - movements_checked,
        discrepancies,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog;
    use crate::ledger::stock;
    use crate::money::Money;
    use crate::types::{AdjustmentReason, ProductCategory, ProductInput, Unit};
    use chrono::Utc;

    fn input(name: &str) -> ProductInput {
        ProductInput {
            name: name.to_string(),
            description: None,
            category: ProductCategory::Beauty,
            unit: Unit::Piece,
            min_stock: 1,
            max_stock: 40,
            buy_price: Money::from_units(900),
            sell_price: Money::from_units(1_200),
            supplier_id: None,
        }
    }

    #[test]
    fn test_clean_ledger() {
        let mut state = AppState::default();
        let product = catalog::create_product(&mut state, input("Lait de toilette"), 10, Utc::now())
            .unwrap();
        stock::adjust_stock(
            &mut state,
            &product.id,
            -4,
            AdjustmentReason::Loss,
            None,
            Utc::now(),
        )
        .unwrap();

        let report = audit_ledger(&state);
        assert!(report.is_clean());
        assert_eq!(report.products_checked, 1);
        assert_eq!(report.movements_checked, 2);
    }

    #[test]
    fn test_detects_stock_edited_out_of_band() {
        let mut state = AppState::default();
        let product =
            catalog::create_product(&mut state, input("Parfum"), 5, Utc::now()).unwrap();
        state.product_mut(&product.id).unwrap().current_stock = 9;

        let report = audit_ledger(&state);
        assert_eq!(
            report.discrepancies,
            vec![Discrepancy::StockMismatch {
                product_id: product.id,
                replayed: 5,
                current_stock: 9,
            }]
        );
    }

    #[test]
    fn test_detects_broken_chain_and_counts_orphans() {
        let mut state = AppState::default();
        let kept = catalog::create_product(&mut state, input("Gel douche"), 3, Utc::now()).unwrap();
        let gone = catalog::create_product(&mut state, input("Déodorant"), 2, Utc::now()).unwrap();
        catalog::delete_product(&mut state, &gone.id).unwrap();
        state.movements[0].balance_after = 30;

        let report = audit_ledger(&state);
        assert_eq!(report.orphan_movements, 1);
        assert!(matches!(
            report.discrepancies.as_slice(),
            [Discrepancy::BrokenChain { product_id, expected: 3, recorded: 30, .. }]
                if *product_id == kept.id
        ));
    }
}
