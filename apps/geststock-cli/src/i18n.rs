//! # Translations
//!
//! Labels for French (default) and English output. A key missing from the
//! table is printed as is.

use geststock_core::{Locale, MovementType, PaymentMethod};

/// (key, français, English)
const ENTRIES: &[(&str, &str, &str)] = &[
    // Dashboard
    ("dashboard.title", "Tableau de bord", "Dashboard"),
    ("dashboard.today_sales", "Ventes du jour", "Today's sales"),
    ("dashboard.month_sales", "Ventes du mois", "Month's sales"),
    ("dashboard.products", "Produits", "Products"),
    ("dashboard.low_stock", "Stock critique", "Low stock"),
    ("dashboard.suppliers", "Fournisseurs", "Suppliers"),
    ("dashboard.customers", "Clients", "Customers"),
    ("dashboard.pending_orders", "Commandes en attente", "Pending orders"),
    ("dashboard.recent_movements", "Mouvements récents", "Recent movements"),
    // Reports
    ("report.title", "Rapport", "Report"),
    ("report.range.today", "Aujourd'hui", "Today"),
    ("report.range.week", "7 derniers jours", "Last 7 days"),
    ("report.range.month", "Ce mois", "This month"),
    ("report.range.year", "Cette année", "This year"),
    ("report.revenue", "Chiffre d'affaires", "Revenue"),
    ("report.sales_count", "Nombre de ventes", "Number of sales"),
    ("report.average_sale", "Vente moyenne", "Average sale"),
    ("report.top_products", "Produits populaires", "Top products"),
    ("report.payment_methods", "Modes de paiement", "Payment methods"),
    ("report.exported", "Rapport exporté vers", "Report exported to"),
    // Entities
    ("products.title", "Produits", "Products"),
    ("customers.title", "Clients", "Customers"),
    ("suppliers.title", "Fournisseurs", "Suppliers"),
    ("common.none", "Aucun résultat", "No results"),
    ("common.stock", "Stock", "Stock"),
    ("common.debt", "Dette", "Debt"),
    ("common.limit", "Plafond", "Limit"),
    ("common.warning", "Attention", "Warning"),
    // Movements
    ("movement.sale", "Vente", "Sale"),
    ("movement.purchase", "Achat", "Purchase"),
    ("movement.adjustment", "Ajustement", "Adjustment"),
    ("movement.loss", "Perte", "Loss"),
    // Payment methods
    ("payment.cash", "Espèces", "Cash"),
    ("payment.mobile_money", "Mobile Money", "Mobile Money"),
    ("payment.credit", "Crédit", "Credit"),
    ("payment.card", "Carte", "Card"),
    // Operations
    ("ops.adjusted", "Stock ajusté", "Stock adjusted"),
    ("ops.sold", "Vente enregistrée", "Sale recorded"),
    ("ops.sale_cancelled", "Vente annulée", "Sale cancelled"),
    ("ops.ordered", "Commande créée", "Purchase order created"),
    ("ops.received", "Commande reçue", "Purchase received"),
    ("ops.paid", "Paiement enregistré", "Payment recorded"),
    ("ops.language", "Langue", "Language"),
    // Audit
    ("audit.clean", "Registre cohérent", "Ledger is consistent"),
    ("audit.discrepancies", "Écarts détectés", "Discrepancies found"),
    // Backup
    ("backup.exported", "Sauvegarde exportée vers", "Backup exported to"),
    ("backup.imported", "Sauvegarde importée", "Backup imported"),
    ("reset.done", "Toutes les données ont été supprimées", "All data deleted"),
];

/// Label lookup for one locale.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dictionary {
    locale: Locale,
}

impl Dictionary {
    pub fn new(locale: Locale) -> Self {
        Dictionary { locale }
    }

    pub fn locale(&self) -> Locale {
        self.locale
    }

    /// Returns the label for `key`, or `key` itself when there is none.
    ///
    /// ## Example
    /// ```rust
    /// use geststock_cli::i18n::Dictionary;
    /// use geststock_core::Locale;
    ///
    /// let dict = Dictionary::new(Locale::En);
    /// assert_eq!(dict.t("dashboard.title"), "Dashboard");
    /// assert_eq!(dict.t("nope.missing"), "nope.missing");
    /// ```
    pub fn t<'a>(&self, key: &'a str) -> &'a str {
        match ENTRIES.iter().find(|(k, _, _)| *k == key) {
            Some((_, fr, en)) => match self.locale {
                Locale::Fr => *fr,
                Locale::En => *en,
            },
            None => key,
        }
    }

    pub fn movement(&self, movement_type: MovementType) -> &'static str {
        match ENTRIES
            .iter()
            .find(|(k, _, _)| k.strip_prefix("movement.") == Some(movement_type.as_str()))
        {
            Some(entry) => self.pick(entry),
            None => movement_type.as_str(),
        }
    }

    pub fn payment(&self, method: PaymentMethod) -> &'static str {
        match ENTRIES
            .iter()
            .find(|(k, _, _)| k.strip_prefix("payment.") == Some(method.as_str()))
        {
            Some(entry) => self.pick(entry),
            None => method.as_str(),
        }
    }

    fn pick(&self, entry: &'static (&'static str, &'static str, &'static str)) -> &'static str {
        match self.locale {
            Locale::Fr => entry.1,
            Locale::En => entry.2,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_french_is_default_table() {
        let dict = Dictionary::new(Locale::default());
        assert_eq!(dict.t("report.revenue"), "Chiffre d'affaires");
        assert_eq!(dict.payment(PaymentMethod::Cash), "Espèces");
        assert_eq!(dict.movement(MovementType::Loss), "Perte");
    }

    #[test]
    fn test_english_labels() {
        let dict = Dictionary::new(Locale::En);
        assert_eq!(dict.t("audit.clean"), "Ledger is consistent");
        assert_eq!(dict.payment(PaymentMethod::MobileMoney), "Mobile Money");
    }

    #[test]
    fn test_missing_key_falls_back_to_key() {
        let dict = Dictionary::new(Locale::Fr);
        assert_eq!(dict.t("report.unknown_label"), "report.unknown_label");
    }

    #[test]
    fn test_every_key_is_unique() {
        for (i, (key, _, _)) in ENTRIES.iter().enumerate() {
            assert!(
                ENTRIES[i + 1..].iter().all(|(other, _, _)| other != key),
                "duplicate key {}",
                key
            );
        }
    }
}
