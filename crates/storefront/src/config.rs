//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `CATALOG_API_URL` - Base URL of the catalog API (e.g. `https://api.example.ma/api/`)
//! - `ORDER_ENDPOINT_URL` - Order-intake endpoint that receives the order JSON
//! - `ORDER_ACCESS_KEY` - Access key sent with every order (high entropy)
//!
//! ## Optional
//! - `CATALOG_MEDIA_URL` - Base URL for product image paths (default: API origin)
//! - `CATALOG_API_TOKEN` - Catalog API token (`Authorization: Token ...`)
//! - `CATALOG_USERNAME` / `CATALOG_PASSWORD` - Log in for a token instead
//! - `ORDER_SUBJECT` - Subject line prefix for order notifications (default: `New order`)
//! - `CONTACT_SUBJECT` - Subject line of contact messages (default: `New Contact Form Submission`)
//! - `CART_STORAGE_DIR` - Directory holding the persisted cart (default: `.medina`)
//! - `SHIPPING_POLICY` - `flat` or `city` (default: `flat`)
//! - `SHIPPING_FLAT_AMOUNT` - Amount for the flat policy (default: `0`)
//! - `SHIPPING_RATES` - `city=amount,...` for the city policy; `other` is the
//!   amount for unlisted cities (default: `casablanca=35,other=50`)
//! - `SHIPPING_FALLBACK` - Overrides the `other` amount
//! - `EXCHANGE_RATE` - Dirhams per US dollar (default: `10.0`)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name

use std::collections::HashMap;
use std::path::PathBuf;
use std::str::FromStr;

use medina_core::{ExchangeRate, Price, ShippingPolicy, ShippingRules};
use rust_decimal::Decimal;
use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;
use url::Url;

const MIN_ENTROPY_BITS_PER_CHAR: f64 = 3.3;

/// Blocklist of common placeholder patterns (case-insensitive)
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "your-",
    "changeme",
    "replace",
    "placeholder",
    "example",
    "secret",
    "password",
    "xxx",
    "todo",
    "fixme",
    "insert",
    "enter-",
    "put-your",
    "add-your",
];

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Insecure secret in {0}: {1}")]
    InsecureSecret(String, String),
}

/// Storefront configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    pub catalog: CatalogConfig,
    pub orders: OrderConfig,
    /// Directory for the file-backed cart store
    pub cart_storage_dir: PathBuf,
    pub shipping: ShippingPolicy,
    pub exchange_rate: ExchangeRate,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    pub sentry_environment: Option<String>,
}

/// Catalog API configuration.
///
/// Implements `Debug` manually to redact secret fields.
#[derive(Clone)]
pub struct CatalogConfig {
    /// API base; always ends with `/` so relative joins keep its path
    pub api_url: Url,
    /// Base that relative image paths are resolved against
    pub media_url: Url,
    /// Static API token, if the deployment issues one
    pub api_token: Option<SecretString>,
    /// Account used to log in for a token when no static token is set
    pub credentials: Option<CatalogCredentials>,
}

impl std::fmt::Debug for CatalogConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CatalogConfig")
            .field("api_url", &self.api_url.as_str())
            .field("media_url", &self.media_url.as_str())
            .field("api_token", &self.api_token.as_ref().map(|_| "[REDACTED]"))
            .field("credentials", &self.credentials)
            .finish()
    }
}

/// Catalog login credentials.
#[derive(Clone)]
pub struct CatalogCredentials {
    pub username: String,
    pub password: SecretString,
}

impl std::fmt::Debug for CatalogCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CatalogCredentials")
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

/// Order-intake configuration.
///
/// Implements `Debug` manually to redact secret fields.
#[derive(Clone)]
pub struct OrderConfig {
    pub endpoint: Url,
    pub access_key: SecretString,
    /// Prefix of the notification subject line
    pub subject: String,
    /// Subject line of contact messages
    pub contact_subject: String,
}

impl std::fmt::Debug for OrderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OrderConfig")
            .field("endpoint", &self.endpoint.as_str())
            .field("access_key", &"[REDACTED]")
            .field("subject", &self.subject)
            .field("contact_subject", &self.contact_subject)
            .finish()
    }
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing, invalid, or
    /// if secrets fail validation (placeholder detection, entropy check).
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Same as [`StorefrontConfig::from_env`].
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let env = Env(&lookup);

        Ok(Self {
            catalog: CatalogConfig::from_env(&env)?,
            orders: OrderConfig::from_env(&env)?,
            cart_storage_dir: PathBuf::from(env.or_default("CART_STORAGE_DIR", ".medina")),
            shipping: shipping_policy(&env)?,
            exchange_rate: exchange_rate(&env)?,
            sentry_dsn: env.optional("SENTRY_DSN"),
            sentry_environment: env.optional("SENTRY_ENVIRONMENT"),
        })
    }
}

impl CatalogConfig {
    fn from_env(env: &Env<'_>) -> Result<Self, ConfigError> {
        let api_url = base_url("CATALOG_API_URL", &env.required("CATALOG_API_URL")?)?;
        let media_url = match env.optional("CATALOG_MEDIA_URL") {
            Some(raw) => base_url("CATALOG_MEDIA_URL", &raw)?,
            None => origin_of(&api_url)?,
        };

        let credentials = match (
            env.optional("CATALOG_USERNAME"),
            env.optional("CATALOG_PASSWORD"),
        ) {
            (Some(username), Some(password)) => Some(CatalogCredentials {
                username,
                password: SecretString::from(password),
            }),
            (None, None) => None,
            (Some(_), None) => return Err(ConfigError::MissingEnvVar("CATALOG_PASSWORD".into())),
            (None, Some(_)) => return Err(ConfigError::MissingEnvVar("CATALOG_USERNAME".into())),
        };

        Ok(Self {
            api_url,
            media_url,
            api_token: env.optional("CATALOG_API_TOKEN").map(SecretString::from),
            credentials,
        })
    }
}

impl OrderConfig {
    fn from_env(env: &Env<'_>) -> Result<Self, ConfigError> {
        let raw = env.required("ORDER_ENDPOINT_URL")?;
        let endpoint = Url::parse(&raw)
            .map_err(|e| ConfigError::InvalidEnvVar("ORDER_ENDPOINT_URL".into(), e.to_string()))?;

        Ok(Self {
            endpoint,
            access_key: env.validated_secret("ORDER_ACCESS_KEY")?,
            subject: env.or_default("ORDER_SUBJECT", "New order"),
            contact_subject: env.or_default("CONTACT_SUBJECT", "New Contact Form Submission"),
        })
    }
}

fn shipping_policy(env: &Env<'_>) -> Result<ShippingPolicy, ConfigError> {
    match env.or_default("SHIPPING_POLICY", "flat").to_lowercase().as_str() {
        "flat" => Ok(ShippingPolicy::Flat(amount(env, "SHIPPING_FLAT_AMOUNT", "0")?)),
        "city" => {
            let rates = env.or_default("SHIPPING_RATES", "casablanca=35,other=50");
            let mut rules = ShippingRules::parse(&rates)
                .map_err(|e| ConfigError::InvalidEnvVar("SHIPPING_RATES".into(), e.to_string()))?;
            if env.optional("SHIPPING_FALLBACK").is_some() {
                rules = rules.with_fallback(amount(env, "SHIPPING_FALLBACK", "0")?);
            }
            Ok(ShippingPolicy::ByCity(rules))
        }
        other => Err(ConfigError::InvalidEnvVar(
            "SHIPPING_POLICY".into(),
            format!("expected `flat` or `city`, got `{other}`"),
        )),
    }
}

fn exchange_rate(env: &Env<'_>) -> Result<ExchangeRate, ConfigError> {
    let raw = env.or_default("EXCHANGE_RATE", "10.0");
    let invalid = |reason: String| ConfigError::InvalidEnvVar("EXCHANGE_RATE".into(), reason);
    let rate = Decimal::from_str(raw.trim()).map_err(|e| invalid(e.to_string()))?;
    ExchangeRate::new(rate).map_err(|e| invalid(e.to_string()))
}

fn amount(env: &Env<'_>, key: &str, default: &str) -> Result<Decimal, ConfigError> {
    Price::parse(&env.or_default(key, default))
        .map(|price| price.amount())
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
}

/// Parse a base URL, adding the trailing slash `Url::join` needs.
fn base_url(key: &str, raw: &str) -> Result<Url, ConfigError> {
    let mut url =
        Url::parse(raw.trim()).map_err(|e| ConfigError::InvalidEnvVar(key.into(), e.to_string()))?;
    if url.cannot_be_a_base() {
        return Err(ConfigError::InvalidEnvVar(
            key.into(),
            "must be an absolute http(s) URL".into(),
        ));
    }
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}

fn origin_of(url: &Url) -> Result<Url, ConfigError> {
    Url::parse(&format!("{}/", url.origin().ascii_serialization()))
        .map_err(|e| ConfigError::InvalidEnvVar("CATALOG_API_URL".into(), e.to_string()))
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Variable lookup with the usual required/optional/default helpers.
struct Env<'a>(&'a dyn Fn(&str) -> Option<String>);

impl Env<'_> {
    /// Get a required variable; blank counts as missing.
    fn required(&self, key: &str) -> Result<String, ConfigError> {
        self.optional(key)
            .ok_or_else(|| ConfigError::MissingEnvVar(key.to_string()))
    }

    /// Get an optional variable; blank counts as unset.
    fn optional(&self, key: &str) -> Option<String> {
        (self.0)(key).filter(|value| !value.trim().is_empty())
    }

    /// Get a variable with a default value.
    fn or_default(&self, key: &str, default: &str) -> String {
        self.optional(key).unwrap_or_else(|| default.to_string())
    }

    /// Load and validate a secret.
    fn validated_secret(&self, key: &str) -> Result<SecretString, ConfigError> {
        let secret = SecretString::from(self.required(key)?);
        validate_secret_strength(secret.expose_secret(), key)?;
        Ok(secret)
    }
}

/// Calculate Shannon entropy in bits per character.
fn shannon_entropy(s: &str) -> f64 {
    if s.is_empty() {
        return 0.0;
    }

    let mut freq: HashMap<char, usize> = HashMap::new();
    for c in s.chars() {
        *freq.entry(c).or_insert(0) += 1;
    }

    #[allow(clippy::cast_precision_loss)] // String length will never exceed f64 precision
    let len = s.chars().count() as f64;
    freq.values()
        .map(|&count| {
            #[allow(clippy::cast_precision_loss)] // Character count will never exceed f64 precision
            let p = count as f64 / len;
            -p * p.log2()
        })
        .sum()
}

/// Validate that a secret is not a placeholder and has sufficient entropy.
fn validate_secret_strength(secret: &str, var_name: &str) -> Result<(), ConfigError> {
    let lower = secret.to_lowercase();

    if let Some(pattern) = PLACEHOLDER_PATTERNS.iter().find(|p| lower.contains(*p)) {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!("appears to be a placeholder (contains '{pattern}')"),
        ));
    }

    let entropy = shannon_entropy(secret);
    if entropy < MIN_ENTROPY_BITS_PER_CHAR {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "entropy too low ({entropy:.2} bits/char, need >= {MIN_ENTROPY_BITS_PER_CHAR:.1}). Use a randomly generated key."
            ),
        ));
    }

    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const ACCESS_KEY: &str = "aB3$xY9!mK2@nL5#pQ7&rT0*uW4^zC6";

    fn load(vars: &[(&str, &str)]) -> Result<StorefrontConfig, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        StorefrontConfig::from_lookup(|key| vars.get(key).cloned())
    }

    fn minimal() -> Vec<(&'static str, &'static str)> {
        vec![
            ("CATALOG_API_URL", "https://shop.example.ma/api"),
            ("ORDER_ENDPOINT_URL", "https://orders.example.ma/submit"),
            ("ORDER_ACCESS_KEY", ACCESS_KEY),
        ]
    }

    #[test]
    fn test_defaults() {
        let config = load(&minimal()).unwrap();

        assert_eq!(config.catalog.api_url.as_str(), "https://shop.example.ma/api/");
        assert_eq!(config.catalog.media_url.as_str(), "https://shop.example.ma/");
        assert!(config.catalog.api_token.is_none());
        assert!(config.catalog.credentials.is_none());
        assert_eq!(config.orders.subject, "New order");
        assert_eq!(config.orders.contact_subject, "New Contact Form Submission");
        assert_eq!(config.cart_storage_dir, PathBuf::from(".medina"));
        assert_eq!(config.shipping, ShippingPolicy::free());
        assert_eq!(config.exchange_rate, ExchangeRate::default());
        assert!(config.sentry_dsn.is_none());
    }

    #[test]
    fn test_missing_required() {
        let err = load(&[("CATALOG_API_URL", "https://shop.example.ma/api")]).unwrap_err();
        assert!(matches!(err, ConfigError::MissingEnvVar(key) if key == "ORDER_ENDPOINT_URL"));
    }

    #[test]
    fn test_city_shipping() {
        let mut vars = minimal();
        vars.push(("SHIPPING_POLICY", "city"));
        let config = load(&vars).unwrap();

        assert_eq!(config.shipping.shipping_for("Casablanca"), Decimal::new(35, 0));
        assert_eq!(config.shipping.shipping_for(""), Decimal::new(50, 0));

        vars.push(("SHIPPING_FALLBACK", "45"));
        let config = load(&vars).unwrap();
        assert_eq!(config.shipping.shipping_for("Tanger"), Decimal::new(45, 0));

        vars.push(("SHIPPING_RATES", "rabat=40"));
        let config = load(&vars).unwrap();
        assert_eq!(config.shipping.shipping_for("rabat"), Decimal::new(40, 0));
        assert_eq!(config.shipping.shipping_for("Casablanca"), Decimal::new(45, 0));
        vars.pop();
        vars.pop();

        vars.push(("SHIPPING_RATES", "rabat=40,fes=oops"));
        assert!(matches!(
            load(&vars).unwrap_err(),
            ConfigError::InvalidEnvVar(key, _) if key == "SHIPPING_RATES"
        ));
    }

    #[test]
    fn test_unknown_shipping_policy() {
        let mut vars = minimal();
        vars.push(("SHIPPING_POLICY", "free"));
        assert!(load(&vars).is_err());
    }

    #[test]
    fn test_exchange_rate_must_be_positive() {
        let mut vars = minimal();
        vars.push(("EXCHANGE_RATE", "0"));
        assert!(matches!(
            load(&vars).unwrap_err(),
            ConfigError::InvalidEnvVar(key, _) if key == "EXCHANGE_RATE"
        ));
    }

    #[test]
    fn test_credentials_need_both_halves() {
        let mut vars = minimal();
        vars.push(("CATALOG_USERNAME", "shop"));
        assert!(matches!(
            load(&vars).unwrap_err(),
            ConfigError::MissingEnvVar(key) if key == "CATALOG_PASSWORD"
        ));

        vars.push(("CATALOG_PASSWORD", "hunter2"));
        let config = load(&vars).unwrap();
        assert_eq!(config.catalog.credentials.unwrap().username, "shop");
    }

    #[test]
    fn test_placeholder_access_key_rejected() {
        let mut vars = minimal();
        vars.retain(|(k, _)| *k != "ORDER_ACCESS_KEY");
        vars.push(("ORDER_ACCESS_KEY", "your-access-key-here"));
        assert!(matches!(
            load(&vars).unwrap_err(),
            ConfigError::InsecureSecret(_, _)
        ));
    }

    #[test]
    fn test_shannon_entropy() {
        assert!((shannon_entropy("") - 0.0).abs() < f64::EPSILON);
        assert!((shannon_entropy("aaaaaaa") - 0.0).abs() < f64::EPSILON);
        assert!((shannon_entropy("ab") - 1.0).abs() < 0.01);
        assert!(shannon_entropy("aB3$xY9!mK2@nL5#") > 3.3);
    }

    #[test]
    fn test_validate_secret_strength() {
        assert!(validate_secret_strength("changeme123", "TEST_VAR").is_err());
        assert!(validate_secret_strength("aaaaaaaaaaaaaaaaaaaaaaaa", "TEST_VAR").is_err());
        assert!(validate_secret_strength(ACCESS_KEY, "TEST_VAR").is_ok());
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let mut vars = minimal();
        vars.push(("CATALOG_API_TOKEN", "tok_live_1234"));
        vars.push(("CATALOG_USERNAME", "shop"));
        vars.push(("CATALOG_PASSWORD", "hunter2"));
        let debug_output = format!("{:?}", load(&vars).unwrap());

        assert!(debug_output.contains("https://orders.example.ma/submit"));
        assert!(debug_output.contains("[REDACTED]"));
        assert!(!debug_output.contains(ACCESS_KEY));
        assert!(!debug_output.contains("tok_live_1234"));
        assert!(!debug_output.contains("hunter2"));
    }
}
