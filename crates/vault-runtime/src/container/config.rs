//! # Vault Configuration
//!
//! Runtime parameters grouped by subsystem. Every value has a default and
//! can be overridden from the environment:
//!
//! | Variable | Field |
//! |----------|-------|
//! | `BV_DATA_DIR` | `storage.data_dir` |
//! | `COOLDOWN_HOURS` | `packs.cooldown` |
//! | `BV_PRICE_CHECK_SECS` | `prices.check_interval` |
//! | `BV_PRUNE_AFTER_MISSES` | `prices.prune_after_misses` |
//! | `BV_CATALOG_URL` | `catalog.base_url` |
//! | `BV_CATALOG_TIMEOUT_SECS` | `catalog.timeout` |
//! | `BV_CATALOG_LANGUAGE` | `catalog.language` (empty disables) |
//! | `BV_CATALOG_REFRESH_HOURS` | `catalog.refresh_interval` |
//! | `POKEMONTCG_API_KEY` | `catalog.api_key` |
//!
//! Unparseable values keep the default and log a warning.

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use bv_02_catalog::DEFAULT_BASE_URL;
use bv_03_pack_opening::DEFAULT_COOLDOWN;
use bv_04_price_watch::DEFAULT_PRUNE_AFTER_MISSES;
use thiserror::Error;
use tracing::{info, warn};

const HOUR: u64 = 60 * 60;

/// Complete runtime configuration.
#[derive(Debug, Clone, Default)]
pub struct VaultConfig {
    pub storage: StorageConfig,
    pub packs: PackConfig,
    pub prices: PriceWatchConfig,
    pub catalog: CatalogConfig,
}

#[derive(Debug, Clone)]
pub struct StorageConfig {
    /// Directory holding one JSON file per state category.
    pub data_dir: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("./data"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct PackConfig {
    pub cooldown: Duration,
}

impl Default for PackConfig {
    fn default() -> Self {
        Self {
            cooldown: DEFAULT_COOLDOWN,
        }
    }
}

#[derive(Debug, Clone)]
pub struct PriceWatchConfig {
    /// Period of the reconciliation pass.
    pub check_interval: Duration,
    /// `0` keeps missing cards forever.
    pub prune_after_misses: u32,
    pub notify_timeout: Duration,
}

impl Default for PriceWatchConfig {
    fn default() -> Self {
        Self {
            check_interval: Duration::from_secs(HOUR),
            prune_after_misses: DEFAULT_PRUNE_AFTER_MISSES,
            notify_timeout: Duration::from_secs(5),
        }
    }
}

#[derive(Debug, Clone)]
pub struct CatalogConfig {
    pub base_url: String,
    pub api_key: Option<String>,
    /// Bound on every provider call.
    pub timeout: Duration,
    /// Preferred printing language for price lookups.
    pub language: Option<String>,
    pub refresh_interval: Duration,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: None,
            timeout: Duration::from_secs(10),
            language: Some("fr".to_string()),
            refresh_interval: Duration::from_secs(24 * HOUR),
        }
    }
}

/// Configuration errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("{0} must be greater than zero")]
    ZeroDuration(&'static str),

    #[error("catalog base URL is empty")]
    EmptyBaseUrl,
}

impl VaultConfig {
    /// Defaults overridden by the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Defaults overridden by `lookup(variable)`.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(dir) = lookup("BV_DATA_DIR") {
            config.storage.data_dir = PathBuf::from(dir);
        }
        if let Some(hours) = parse::<u64>(&lookup, "COOLDOWN_HOURS") {
            config.packs.cooldown = Duration::from_secs(hours.saturating_mul(HOUR));
        }
        if let Some(secs) = parse::<u64>(&lookup, "BV_PRICE_CHECK_SECS") {
            config.prices.check_interval = Duration::from_secs(secs);
        }
        if let Some(misses) = parse::<u32>(&lookup, "BV_PRUNE_AFTER_MISSES") {
            config.prices.prune_after_misses = misses;
        }
        if let Some(url) = lookup("BV_CATALOG_URL") {
            config.catalog.base_url = url;
        }
        if let Some(secs) = parse::<u64>(&lookup, "BV_CATALOG_TIMEOUT_SECS") {
            config.catalog.timeout = Duration::from_secs(secs);
        }
        if let Some(lang) = lookup("BV_CATALOG_LANGUAGE") {
            let lang = lang.trim();
            config.catalog.language = (!lang.is_empty()).then(|| lang.to_string());
        }
        if let Some(hours) = parse::<u64>(&lookup, "BV_CATALOG_REFRESH_HOURS") {
            config.catalog.refresh_interval = Duration::from_secs(hours.saturating_mul(HOUR));
        }
        if let Some(key) = lookup("POKEMONTCG_API_KEY").filter(|k| !k.trim().is_empty()) {
            config.catalog.api_key = Some(key.trim().to_string());
            info!("Loaded catalog API key from environment");
        }

        config
    }

    /// Reject settings the runtime cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let periods = [
            ("COOLDOWN_HOURS", self.packs.cooldown),
            ("BV_PRICE_CHECK_SECS", self.prices.check_interval),
            ("BV_CATALOG_TIMEOUT_SECS", self.catalog.timeout),
            ("BV_CATALOG_REFRESH_HOURS", self.catalog.refresh_interval),
        ];
        if let Some(&(name, _)) = periods.iter().find(|(_, d)| d.is_zero()) {
            return Err(ConfigError::ZeroDuration(name));
        }
        if self.catalog.base_url.trim().is_empty() {
            return Err(ConfigError::EmptyBaseUrl);
        }
        Ok(())
    }
}

fn parse<T: FromStr>(lookup: &impl Fn(&str) -> Option<String>, name: &str) -> Option<T> {
    let raw = lookup(name)?;
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(_) => {
            warn!(variable = name, value = %raw, "Ignoring invalid value, keeping default");
            None
        }
    }
}
