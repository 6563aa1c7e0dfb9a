//! Storefront configuration.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{bail, Context, Result};
use green_commerce::cart::PricingPolicy;
use green_commerce::money::{Currency, Money};
use serde::{Deserialize, Serialize};

/// Environment variable overriding `api.base_url`.
pub const ENV_API_URL: &str = "GLOBALGREEN_API_URL";
/// Environment variable overriding `api.timeout_secs`.
pub const ENV_TIMEOUT_SECS: &str = "GLOBALGREEN_TIMEOUT_SECS";

/// Storefront configuration file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StorefrontConfig {
    /// Remote API settings.
    #[serde(default)]
    pub api: ApiConfig,

    /// Tax, shipping and discount rules.
    #[serde(default)]
    pub pricing: PricingConfig,

    /// Session handling.
    #[serde(default)]
    pub session: SessionConfig,
}

impl StorefrontConfig {
    /// Load config from a file, TOML unless the extension is `.json`.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        if path.extension().is_some_and(|ext| ext == "json") {
            serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse JSON config: {}", path.display()))
        } else {
            toml::from_str(&content)
                .with_context(|| format!("Failed to parse TOML config: {}", path.display()))
        }
    }

    /// Load config from a file and apply environment overrides.
    pub fn load_with_env(path: impl AsRef<Path>) -> Result<Self> {
        let mut config = Self::load(path)?;
        config.apply_env()?;
        Ok(config)
    }

    /// Save config to a file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let content = if path.extension().is_some_and(|ext| ext == "json") {
            serde_json::to_string_pretty(self)?
        } else {
            toml::to_string_pretty(self)?
        };

        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config file: {}", path.display()))
    }

    /// Apply `GLOBALGREEN_*` overrides from the process environment.
    pub fn apply_env(&mut self) -> Result<()> {
        self.apply_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides from any key lookup.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<()> {
        if let Some(url) = lookup(ENV_API_URL) {
            self.api.base_url = url;
        }
        if let Some(secs) = lookup(ENV_TIMEOUT_SECS) {
            self.api.timeout_secs = secs
                .trim()
                .parse()
                .with_context(|| format!("{} is not a number of seconds: {:?}", ENV_TIMEOUT_SECS, secs))?;
        }
        Ok(())
    }

    /// Check the values that cannot be defaulted.
    pub fn validate(&self) -> Result<()> {
        let url = self.api.base_url.trim();
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            bail!("api.base_url must be an http(s) URL, got {:?}", self.api.base_url);
        }
        if self.api.timeout_secs == 0 {
            bail!("api.timeout_secs must be positive");
        }
        self.pricing_policy()?;
        Ok(())
    }

    /// Request timeout.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.api.timeout_secs)
    }

    /// Build the pricing policy described by `[pricing]`.
    pub fn pricing_policy(&self) -> Result<PricingPolicy> {
        let pricing = &self.pricing;
        let currency = Currency::from_code(&pricing.currency)
            .with_context(|| format!("Unknown currency: {}", pricing.currency))?;

        let mut policy = PricingPolicy::for_currency(currency)
            .with_tax_percent(pricing.tax_percent)
            .with_clamped_discount(pricing.clamp_discount);

        if pricing.shipping_fee.is_some() || pricing.free_shipping_threshold.is_some() {
            let fee = match &pricing.shipping_fee {
                Some(fee) => Money::parse_decimal(fee, currency)
                    .with_context(|| format!("Invalid pricing.shipping_fee: {}", fee))?,
                None => policy.shipping_fee,
            };
            let threshold = match &pricing.free_shipping_threshold {
                Some(t) => Money::parse_decimal(t, currency)
                    .with_context(|| format!("Invalid pricing.free_shipping_threshold: {}", t))?,
                None => policy.free_shipping_threshold,
            };
            policy = policy.with_shipping(fee, threshold);
        }

        policy.validate().context("Invalid [pricing] section")?;
        Ok(policy)
    }
}

/// Remote API settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL of the marketplace API.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_base_url() -> String {
    "http://localhost:5000/api".to_string()
}

fn default_timeout_secs() -> u64 {
    15
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Pricing settings. Amounts are decimal strings in major units.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricingConfig {
    /// Currency code (default: IDR).
    #[serde(default = "default_currency")]
    pub currency: String,

    /// Tax rate in percent (default: 10).
    #[serde(default = "default_tax_percent")]
    pub tax_percent: f64,

    /// Flat shipping fee; the currency's default when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shipping_fee: Option<String>,

    /// Discounted subtotal that earns free shipping; currency default when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub free_shipping_threshold: Option<String>,

    /// Cap discounts at the subtotal.
    #[serde(default)]
    pub clamp_discount: bool,
}

fn default_currency() -> String {
    Currency::default().code().to_string()
}

fn default_tax_percent() -> f64 {
    PricingPolicy::STANDARD_TAX_PERCENT
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self {
            currency: default_currency(),
            tax_percent: default_tax_percent(),
            shipping_fee: None,
            free_shipping_threshold: None,
            clamp_discount: false,
        }
    }
}

/// Session settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionConfig {
    /// File holding the session token; memory only when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_path: Option<PathBuf>,

    /// Seconds a token is still accepted past its expiry.
    #[serde(default)]
    pub leeway_secs: i64,
}
