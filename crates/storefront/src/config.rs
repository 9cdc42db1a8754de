//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `STOREFRONT_BACKEND_URL` - Base URL of the shop backend API
//!
//! ## Optional
//! - `STOREFRONT_STORAGE_PATH` - Durable client storage file (default: .shopfront/storage.json)
//! - `STOREFRONT_CURRENCY` - Currency symbol used for display (default: Rs.)
//! - `STOREFRONT_DELIVERY_FEE` - Flat delivery fee added at checkout (default: 10)
//! - `STOREFRONT_PROMO_CODES` - Promo registry override, e.g. `SAVE10=10,NEWUSER20=20`
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name

use std::path::PathBuf;

use rust_decimal::Decimal;
use shopfront_core::PromoRegistry;
use thiserror::Error;
use url::Url;

const DEFAULT_STORAGE_PATH: &str = ".shopfront/storage.json";
const DEFAULT_CURRENCY: &str = "Rs.";
const DEFAULT_DELIVERY_FEE: &str = "10";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Storefront client configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// Base URL of the shop backend
    pub backend_url: Url,
    /// Path of the durable client storage file
    pub storage_path: PathBuf,
    /// Currency symbol for display
    pub currency: String,
    /// Flat delivery fee for non-empty carts
    pub delivery_fee: Decimal,
    /// Valid promo codes
    pub promo_codes: PromoRegistry,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment name
    pub sentry_environment: Option<String>,
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let backend_url = parse_backend_url(&required(&lookup, "STOREFRONT_BACKEND_URL")?)?;

        let storage_path = PathBuf::from(or_default(
            &lookup,
            "STOREFRONT_STORAGE_PATH",
            DEFAULT_STORAGE_PATH,
        ));
        let currency = or_default(&lookup, "STOREFRONT_CURRENCY", DEFAULT_CURRENCY);

        let delivery_fee = or_default(&lookup, "STOREFRONT_DELIVERY_FEE", DEFAULT_DELIVERY_FEE)
            .parse::<Decimal>()
            .map_err(|e| invalid("STOREFRONT_DELIVERY_FEE", e))?;
        if delivery_fee.is_sign_negative() {
            return Err(invalid("STOREFRONT_DELIVERY_FEE", "must not be negative"));
        }

        let promo_codes = match lookup("STOREFRONT_PROMO_CODES") {
            Some(raw) => raw
                .parse::<PromoRegistry>()
                .map_err(|e| invalid("STOREFRONT_PROMO_CODES", e))?,
            None => PromoRegistry::default(),
        };

        Ok(Self {
            backend_url,
            storage_path,
            currency,
            delivery_fee,
            promo_codes,
            sentry_dsn: lookup("SENTRY_DSN"),
            sentry_environment: lookup("SENTRY_ENVIRONMENT"),
        })
    }

    /// Configuration for `backend_url` with every optional setting at its
    /// default.
    #[must_use]
    pub fn for_backend(backend_url: Url) -> Self {
        Self {
            backend_url,
            storage_path: PathBuf::from(DEFAULT_STORAGE_PATH),
            currency: DEFAULT_CURRENCY.to_string(),
            delivery_fee: Decimal::TEN,
            promo_codes: PromoRegistry::default(),
            sentry_dsn: None,
            sentry_environment: None,
        }
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required variable.
fn required(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Result<String, ConfigError> {
    lookup(key)
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get a variable with a default value.
fn or_default(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: &str) -> String {
    lookup(key).unwrap_or_else(|| default.to_string())
}

fn invalid(key: &str, reason: impl ToString) -> ConfigError {
    ConfigError::InvalidEnvVar(key.to_string(), reason.to_string())
}

/// Parse the backend URL, requiring an http(s) scheme.
fn parse_backend_url(raw: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(raw.trim()).map_err(|e| invalid("STOREFRONT_BACKEND_URL", e))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(invalid(
            "STOREFRONT_BACKEND_URL",
            format!("unsupported scheme '{}'", url.scheme()),
        ));
    }
    Ok(url)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn load(vars: &[(&str, &str)]) -> Result<StorefrontConfig, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        StorefrontConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = load(&[("STOREFRONT_BACKEND_URL", "http://localhost:4000")]).unwrap();
        assert_eq!(config.backend_url.as_str(), "http://localhost:4000/");
        assert_eq!(config.storage_path, PathBuf::from(DEFAULT_STORAGE_PATH));
        assert_eq!(config.currency, "Rs.");
        assert_eq!(config.delivery_fee, Decimal::from(10));
        assert_eq!(config.promo_codes, PromoRegistry::default());
        assert!(config.sentry_dsn.is_none());
    }

    #[test]
    fn test_missing_backend_url() {
        let err = load(&[]).unwrap_err();
        assert!(matches!(err, ConfigError::MissingEnvVar(ref k) if k == "STOREFRONT_BACKEND_URL"));
    }

    #[test]
    fn test_rejects_non_http_backend() {
        let err = load(&[("STOREFRONT_BACKEND_URL", "ftp://shop.example")]).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar(_, _)));
    }

    #[test]
    fn test_overrides() {
        let config = load(&[
            ("STOREFRONT_BACKEND_URL", "https://api.shop.example"),
            ("STOREFRONT_STORAGE_PATH", "/tmp/shop.json"),
            ("STOREFRONT_CURRENCY", "$"),
            ("STOREFRONT_DELIVERY_FEE", "4.99"),
            ("STOREFRONT_PROMO_CODES", "VIP=30"),
            ("SENTRY_DSN", "https://key@sentry.example/1"),
        ])
        .unwrap();
        assert_eq!(config.currency, "$");
        assert_eq!(config.delivery_fee, Decimal::new(499, 2));
        assert_eq!(config.promo_codes.len(), 1);
        assert_eq!(config.promo_codes.lookup("VIP").unwrap().get(), 30);
        assert!(config.sentry_dsn.is_some());
    }

    #[test]
    fn test_invalid_delivery_fee() {
        let err = load(&[
            ("STOREFRONT_BACKEND_URL", "http://localhost:4000"),
            ("STOREFRONT_DELIVERY_FEE", "-1"),
        ])
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar(ref k, _) if k == "STOREFRONT_DELIVERY_FEE"));
    }

    #[test]
    fn test_invalid_promo_codes() {
        let err = load(&[
            ("STOREFRONT_BACKEND_URL", "http://localhost:4000"),
            ("STOREFRONT_PROMO_CODES", "VIP=300"),
        ])
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar(ref k, _) if k == "STOREFRONT_PROMO_CODES"));
    }
}
