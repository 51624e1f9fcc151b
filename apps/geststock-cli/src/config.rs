//! # CLI Configuration
//!
//! Settings read once at startup.
//!
//! ## Configuration Sources (Priority Order)
//! 1. Environment variables (`GESTSTOCK_*`)
//! 2. Defaults (this file)
//!
//! Shop-level preferences (company name, tax rate, ...) live in the store's
//! `settings` key, not here.

use std::path::PathBuf;

use chrono::{DateTime, FixedOffset, Utc};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use tracing::warn;

use geststock_core::{Locale, DEFAULT_RECENT_MOVEMENTS};

use crate::error::{CliError, CliResult};

/// Cameroon is on UTC+1 all year.
pub const DEFAULT_UTC_OFFSET_MINUTES: i32 = 60;

/// Fallback directory when no platform data directory can be found.
const FALLBACK_DATA_DIR: &str = "./geststock-data";

/// Application configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CliConfig {
    /// Directory holding the JSON store.
    pub data_dir: PathBuf,

    /// Display language override. `None` uses the stored language.
    pub language: Option<Locale>,

    /// Offset of the shop's clock, in minutes east of UTC.
    /// Report day/month/year boundaries are computed in this offset.
    /// Default: 60 (Africa/Douala)
    pub utc_offset_minutes: i32,

    /// Movements listed on the dashboard.
    /// Default: 10
    pub recent_limit: usize,
}

impl Default for CliConfig {
    fn default() -> Self {
        CliConfig {
            data_dir: default_data_dir(),
            language: None,
            utc_offset_minutes: DEFAULT_UTC_OFFSET_MINUTES,
            recent_limit: DEFAULT_RECENT_MOVEMENTS,
        }
    }
}

impl CliConfig {
    /// Creates a CliConfig from environment variables and defaults.
    ///
    /// ## Environment Variables
    /// - `GESTSTOCK_DATA_DIR`: Override the data directory
    /// - `GESTSTOCK_LANG`: `fr` or `en`
    /// - `GESTSTOCK_UTC_OFFSET`: Minutes east of UTC (e.g. "60")
    /// - `GESTSTOCK_RECENT_LIMIT`: Dashboard movement count
    ///
    /// Unparseable values are ignored with a warning.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Same as [`CliConfig::from_env`] with an injectable variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = CliConfig::default();

        if let Some(dir) = lookup("GESTSTOCK_DATA_DIR") {
            config.data_dir = PathBuf::from(dir);
        }

        if let Some(lang) = lookup("GESTSTOCK_LANG") {
            match Locale::parse(&lang) {
                Some(locale) => config.language = Some(locale),
                None => warn!(value = %lang, "Ignoring unknown GESTSTOCK_LANG"),
            }
        }

        if let Some(offset) = lookup("GESTSTOCK_UTC_OFFSET") {
            match offset.trim().parse::<i32>() {
                Ok(minutes) if minutes.abs() < 24 * 60 => config.utc_offset_minutes = minutes,
                _ => warn!(value = %offset, "Ignoring invalid GESTSTOCK_UTC_OFFSET"),
            }
        }

        if let Some(limit) = lookup("GESTSTOCK_RECENT_LIMIT") {
            match limit.trim().parse::<usize>() {
                Ok(n) => config.recent_limit = n,
                Err(_) => warn!(value = %limit, "Ignoring invalid GESTSTOCK_RECENT_LIMIT"),
            }
        }

        config
    }

    pub fn offset(&self) -> CliResult<FixedOffset> {
        FixedOffset::east_opt(self.utc_offset_minutes * 60).ok_or_else(|| {
            CliError::invalid_argument(format!(
                "UTC offset out of range: {} minutes",
                self.utc_offset_minutes
            ))
        })
    }

    /// `now` seen on the shop's clock.
    pub fn as_of(&self, now: DateTime<Utc>) -> CliResult<DateTime<FixedOffset>> {
        Ok(now.with_timezone(&self.offset()?))
    }
}

/// Platform data directory.
///
/// ## Platform-Specific Paths
/// - **macOS**: `~/Library/Application Support/cm.geststock.GestStock`
/// - **Windows**: `%APPDATA%\geststock\GestStock\data`
/// - **Linux**: `~/.local/share/geststock`
fn default_data_dir() -> PathBuf {
    ProjectDirs::from("cm", "geststock", "GestStock")
        .map(|dirs| dirs.data_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from(FALLBACK_DATA_DIR))
}
