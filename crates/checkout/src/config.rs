//! Checkout engine configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `VETMART_API_BASE_URL` - Base URL of the marketplace API, used to resolve
//!   relative image paths
//!
//! ## Optional
//! - `VETMART_PRICE_POLICY` - `strict` or `lenient` (default: strict)
//! - `VETMART_DELIVERY_DAYS` - Days until estimated delivery (default: 7)
//! - `VETMART_IMAGE_TYPO_FILE` - YAML typo table replacing the built-in one

use std::path::Path;

use thiserror::Error;
use url::Url;

use crate::catalog::CatalogNormalizer;
use crate::confirmation::{DEFAULT_DELIVERY_DAYS, MAX_DELIVERY_DAYS, OrderConfirmationGenerator};
use crate::image::{ImageResolver, TypoTable};
use crate::price::PricePolicy;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Invalid typo table {0}: {1}")]
    TypoTable(String, String),
}

/// Checkout engine configuration.
#[derive(Debug, Clone)]
pub struct CheckoutConfig {
    /// API base URL without trailing slash
    pub api_base_url: String,
    /// How malformed catalog prices are handled
    pub price_policy: PricePolicy,
    /// Days between order and estimated delivery
    pub delivery_days: u32,
    /// Known image reference typos
    pub typo_table: TypoTable,
}

impl CheckoutConfig {
    /// Configuration with defaults for everything but the base URL.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidEnvVar` if `api_base_url` is not an
    /// absolute http(s) URL.
    pub fn new(api_base_url: &str) -> Result<Self, ConfigError> {
        Ok(Self {
            api_base_url: validate_base_url(api_base_url)?,
            price_policy: PricePolicy::default(),
            delivery_days: DEFAULT_DELIVERY_DAYS,
            typo_table: TypoTable::default(),
        })
    }

    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid, or
    /// if the typo table file cannot be read.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary variable source.
    ///
    /// # Errors
    ///
    /// Same as [`CheckoutConfig::from_env`].
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let base_url = get_required(&lookup, "VETMART_API_BASE_URL")?;
        let mut config = Self::new(&base_url)?;

        if let Some(policy) = lookup("VETMART_PRICE_POLICY") {
            config.price_policy = policy.parse().map_err(|e: String| {
                ConfigError::InvalidEnvVar("VETMART_PRICE_POLICY".to_string(), e)
            })?;
        }

        if let Some(days) = lookup("VETMART_DELIVERY_DAYS") {
            config.delivery_days = parse_delivery_days(&days)?;
        }

        if let Some(path) = lookup("VETMART_IMAGE_TYPO_FILE") {
            config.typo_table = load_typo_table(Path::new(&path))?;
        }

        Ok(config)
    }

    /// Image resolver for this configuration.
    #[must_use]
    pub fn image_resolver(&self) -> ImageResolver {
        ImageResolver::new(&self.api_base_url).with_typo_table(self.typo_table.clone())
    }

    /// Catalog normalizer for this configuration.
    #[must_use]
    pub fn catalog_normalizer(&self) -> CatalogNormalizer {
        CatalogNormalizer::new(self.price_policy, self.image_resolver())
    }

    /// Fresh confirmation generator for one checkout session.
    #[must_use]
    pub fn confirmation_generator(&self) -> OrderConfirmationGenerator {
        OrderConfirmationGenerator::new().with_delivery_days(self.delivery_days)
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required variable from the lookup.
fn get_required<F>(lookup: &F, key: &str) -> Result<String, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key).ok_or_else(|| ConfigError::MissingEnvVar(key.to_string()))
}

/// Check the base URL is absolute http(s) and strip any trailing slash.
fn validate_base_url(raw: &str) -> Result<String, ConfigError> {
    let invalid =
        |reason: String| ConfigError::InvalidEnvVar("VETMART_API_BASE_URL".to_string(), reason);
    let url = Url::parse(raw.trim()).map_err(|e| invalid(e.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(invalid(format!("unsupported scheme '{}'", url.scheme())));
    }
    Ok(raw.trim().trim_end_matches('/').to_string())
}

fn parse_delivery_days(raw: &str) -> Result<u32, ConfigError> {
    let invalid =
        |reason: String| ConfigError::InvalidEnvVar("VETMART_DELIVERY_DAYS".to_string(), reason);
    let days = raw.trim().parse::<u32>().map_err(|e| invalid(e.to_string()))?;
    if !(1..=MAX_DELIVERY_DAYS).contains(&days) {
        return Err(invalid(format!("must be between 1 and {MAX_DELIVERY_DAYS}")));
    }
    Ok(days)
}

fn load_typo_table(path: &Path) -> Result<TypoTable, ConfigError> {
    let display = path.display().to_string();
    let yaml = std::fs::read_to_string(path)
        .map_err(|e| ConfigError::TypoTable(display.clone(), e.to_string()))?;
    TypoTable::from_yaml(&yaml).map_err(|e| ConfigError::TypoTable(display, e.to_string()))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config =
            CheckoutConfig::from_lookup(lookup(&[("VETMART_API_BASE_URL", "http://h:3000/")]))
                .unwrap();
        assert_eq!(config.api_base_url, "http://h:3000");
        assert_eq!(config.price_policy, PricePolicy::Strict);
        assert_eq!(config.delivery_days, 7);
        assert_eq!(config.typo_table, TypoTable::default());
    }

    #[test]
    fn test_missing_base_url() {
        let err = CheckoutConfig::from_lookup(lookup(&[])).unwrap_err();
        assert!(
            matches!(err, ConfigError::MissingEnvVar(ref key) if key == "VETMART_API_BASE_URL")
        );
    }

    #[test]
    fn test_invalid_base_url() {
        for raw in ["not a url", "/relative", "ftp://h/"] {
            let err = CheckoutConfig::new(raw).unwrap_err();
            assert!(matches!(err, ConfigError::InvalidEnvVar(_, _)), "{raw}");
        }
    }

    #[test]
    fn test_overrides() {
        let config = CheckoutConfig::from_lookup(lookup(&[
            ("VETMART_API_BASE_URL", "https://api.vetmart.example"),
            ("VETMART_PRICE_POLICY", "lenient"),
            ("VETMART_DELIVERY_DAYS", "3"),
        ]))
        .unwrap();
        assert_eq!(config.price_policy, PricePolicy::Lenient);
        assert_eq!(config.delivery_days, 3);
        assert_eq!(config.confirmation_generator().delivery_days(), 3);
        assert_eq!(config.catalog_normalizer().policy(), PricePolicy::Lenient);
    }

    #[test]
    fn test_invalid_overrides() {
        for (key, value) in [
            ("VETMART_PRICE_POLICY", "zero"),
            ("VETMART_DELIVERY_DAYS", "0"),
            ("VETMART_DELIVERY_DAYS", "90"),
            ("VETMART_DELIVERY_DAYS", "soon"),
        ] {
            let result = CheckoutConfig::from_lookup(lookup(&[
                ("VETMART_API_BASE_URL", "http://h:3000"),
                (key, value),
            ]));
            assert!(
                matches!(result, Err(ConfigError::InvalidEnvVar(_, _))),
                "{key}={value}"
            );
        }
    }

    #[test]
    fn test_missing_typo_file() {
        let result = CheckoutConfig::from_lookup(lookup(&[
            ("VETMART_API_BASE_URL", "http://h:3000"),
            ("VETMART_IMAGE_TYPO_FILE", "/nonexistent/typos.yaml"),
        ]));
        assert!(matches!(result, Err(ConfigError::TypoTable(_, _))));
    }

    #[test]
    fn test_image_resolver_uses_base_url() {
        let config = CheckoutConfig::new("http://h:3000").unwrap();
        assert_eq!(config.image_resolver().base_url(), "http://h:3000");
    }
}
