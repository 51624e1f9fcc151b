//! # Settings
//!
//! Company profile and preferences, persisted under the `settings` key and
//! included in every backup.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

// =============================================================================
// Tax Rate
// =============================================================================

/// Tax rate represented in basis points (bps).
///
/// ## Why Basis Points?
/// 1 basis point = 0.01% = 1/10000
/// 1925 bps = 19.25% (Cameroon VAT)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct TaxRate(u32);

impl TaxRate {
    /// Creates a tax rate from basis points.
    #[inline]
    pub const fn from_bps(bps: u32) -> Self {
        TaxRate(bps)
    }

    /// Creates a tax rate from a percentage (for convenience).
    pub fn from_percentage(pct: f64) -> Self {
        TaxRate((pct * 100.0).round() as u32)
    }

    /// Returns the rate in basis points.
    #[inline]
    pub const fn bps(&self) -> u32 {
        self.0
    }

    /// Returns the rate as a percentage (for display only).
    #[inline]
    pub fn percentage(&self) -> f64 {
        self.0 as f64 / 100.0
    }
}

impl Default for TaxRate {
    fn default() -> Self {
        TaxRate::from_bps(1925)
    }
}

// =============================================================================
// Locale
// =============================================================================

/// UI language, persisted under the `language` key.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    #[default]
    Fr,
    En,
}

impl Locale {
    pub fn as_str(&self) -> &'static str {
        match self {
            Locale::Fr => "fr",
            Locale::En => "en",
        }
    }

    /// Parses `fr` / `en` (case-insensitive).
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "fr" => Some(Locale::Fr),
            "en" => Some(Locale::En),
            _ => None,
        }
    }
}

// =============================================================================
// Settings
// =============================================================================

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum BackupFrequency {
    #[default]
    Daily,
    Weekly,
    Monthly,
}

/// Which alerts the user wants.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct NotificationSettings {
    pub low_stock: bool,
    pub new_sale: bool,
    pub daily_report: bool,
}

impl Default for NotificationSettings {
    fn default() -> Self {
        NotificationSettings {
            low_stock: true,
            new_sale: false,
            daily_report: true,
        }
    }
}

/// Application settings.
///
/// Unknown or missing fields in a stored document fall back to the defaults
/// below, so older backups keep loading.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    pub company_name: String,
    pub company_address: String,
    pub company_phone: String,
    pub company_email: String,
    /// Currency label used in displays, e.g. "F CFA".
    pub currency: String,
    #[serde(rename = "taxRateBps")]
    pub tax_rate: TaxRate,
    /// Default minimum stock suggested for new products.
    pub low_stock_threshold: i64,
    pub notifications: NotificationSettings,
    pub theme: Theme,
    pub auto_backup: bool,
    pub backup_frequency: BackupFrequency,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            company_name: "GestStock237".to_string(),
            company_address: "Yaoundé, Cameroun".to_string(),
            company_phone: "+237 698 123 456".to_string(),
            company_email: "contact@geststock237.cm".to_string(),
            currency: "F CFA".to_string(),
            tax_rate: TaxRate::default(),
            low_stock_threshold: 10,
            notifications: NotificationSettings::default(),
            theme: Theme::Light,
            auto_backup: true,
            backup_frequency: BackupFrequency::Daily,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tax_rate_from_percentage() {
        let rate = TaxRate::from_percentage(19.25);
        assert_eq!(rate.bps(), 1925);
        assert!((rate.percentage() - 19.25).abs() < 0.001);
    }

    #[test]
    fn test_locale_parse() {
        assert_eq!(Locale::parse("FR"), Some(Locale::Fr));
        assert_eq!(Locale::parse(" en "), Some(Locale::En));
        assert_eq!(Locale::parse("de"), None);
    }

    #[test]
    fn test_partial_settings_fill_defaults() {
        let settings: Settings =
            serde_json::from_str(r#"{"companyName":"Quincaillerie Akwa"}"#).unwrap();
        assert_eq!(settings.company_name, "Quincaillerie Akwa");
        assert_eq!(settings.currency, "F CFA");
        assert_eq!(settings.tax_rate.bps(), 1925);
        assert!(settings.notifications.low_stock);
    }
}
