//! Cart configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! All variables are optional.
//!
//! - `CART_API_URL` - Storefront API base URL (default: `http://localhost:3333`)
//! - `CART_API_TOKEN` - Bearer token sent with every API request
//! - `CART_HTTP_TIMEOUT_SECS` - Per-request timeout (default: 10)
//! - `CART_CATALOG_CACHE_TTL_SECS` - Catalog cache lifetime (default: 300)
//! - `CART_STORAGE_DIR` - Directory holding the persisted cart (default: `.rocketshoes`)
//! - `CART_STORAGE_KEY` - Key of the persisted cart slot (default: `@RocketShoes:cart`)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name

use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

use secrecy::SecretString;
use thiserror::Error;
use url::Url;

/// Default storefront API (the json-server the storefront ships with).
pub const DEFAULT_API_URL: &str = "http://localhost:3333";

/// Default key of the persisted cart slot.
pub const DEFAULT_STORAGE_KEY: &str = "@RocketShoes:cart";

const MIN_ENTROPY_BITS_PER_CHAR: f64 = 3.0;

/// Blocklist of common placeholder patterns (case-insensitive)
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "your-",
    "changeme",
    "replace",
    "placeholder",
    "example",
    "xxx",
    "todo",
    "insert",
];

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Insecure secret in {0}: {1}")]
    InsecureSecret(String, String),
}

/// Cart application configuration.
#[derive(Debug, Clone)]
pub struct CartConfig {
    /// Storefront API configuration
    pub api: ApiConfig,
    /// Persistence configuration
    pub storage: StorageConfig,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment name (e.g. production, staging)
    pub sentry_environment: Option<String>,
}

/// Storefront API configuration.
///
/// Implements `Debug` manually to redact the token.
#[derive(Clone)]
pub struct ApiConfig {
    /// Base URL; `/stock/{id}` and `/products/{id}` are resolved against it
    pub base_url: Url,
    /// Optional bearer token
    pub token: Option<SecretString>,
    /// Per-request timeout
    pub timeout: Duration,
    /// Lifetime of cached catalog records
    pub catalog_cache_ttl: Duration,
}

impl std::fmt::Debug for ApiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiConfig")
            .field("base_url", &self.base_url.as_str())
            .field("token", &self.token.as_ref().map(|_| "[REDACTED]"))
            .field("timeout", &self.timeout)
            .field("catalog_cache_ttl", &self.catalog_cache_ttl)
            .finish()
    }
}

impl ApiConfig {
    /// Configuration for an API at `base_url` with default timeouts.
    #[must_use]
    pub const fn new(base_url: Url) -> Self {
        Self {
            base_url,
            token: None,
            timeout: Duration::from_secs(10),
            catalog_cache_ttl: Duration::from_secs(300),
        }
    }
}

/// Persistence configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageConfig {
    /// Directory holding one file per key
    pub dir: PathBuf,
    /// Key of the cart slot
    pub key: String,
}

impl CartConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set to an unparseable value or
    /// the API token looks like a placeholder.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// See [`CartConfig::from_env`].
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let env = Env(lookup);

        let base_url = env
            .or_default("CART_API_URL", DEFAULT_API_URL)
            .parse::<Url>()
            .map_err(|e| ConfigError::InvalidEnvVar("CART_API_URL".to_string(), e.to_string()))?;
        let token = match env.optional("CART_API_TOKEN") {
            Some(value) => {
                validate_secret_strength(&value, "CART_API_TOKEN")?;
                Some(SecretString::from(value))
            }
            None => None,
        };
        let timeout = Duration::from_secs(env.parse_or("CART_HTTP_TIMEOUT_SECS", 10)?);
        let catalog_cache_ttl =
            Duration::from_secs(env.parse_or("CART_CATALOG_CACHE_TTL_SECS", 300)?);

        let storage = StorageConfig {
            dir: PathBuf::from(env.or_default("CART_STORAGE_DIR", ".rocketshoes")),
            key: env.or_default("CART_STORAGE_KEY", DEFAULT_STORAGE_KEY),
        };

        Ok(Self {
            api: ApiConfig {
                base_url,
                token,
                timeout,
                catalog_cache_ttl,
            },
            storage,
            sentry_dsn: env.optional("SENTRY_DSN"),
            sentry_environment: env.optional("SENTRY_ENVIRONMENT"),
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

struct Env<F>(F);

impl<F: Fn(&str) -> Option<String>> Env<F> {
    /// Get an optional variable, treating empty values as unset.
    fn optional(&self, key: &str) -> Option<String> {
        (self.0)(key).filter(|value| !value.trim().is_empty())
    }

    /// Get a variable with a default value.
    fn or_default(&self, key: &str, default: &str) -> String {
        self.optional(key).unwrap_or_else(|| default.to_string())
    }

    /// Parse a numeric variable with a default value.
    fn parse_or(&self, key: &str, default: u64) -> Result<u64, ConfigError> {
        self.optional(key).map_or(Ok(default), |value| {
            value
                .trim()
                .parse::<u64>()
                .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
        })
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
                "entropy too low ({entropy:.2} bits/char, need >= {MIN_ENTROPY_BITS_PER_CHAR:.1})"
            ),
        ));
    }

    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = CartConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.api.base_url.as_str(), "http://localhost:3333/");
        assert!(config.api.token.is_none());
        assert_eq!(config.api.timeout, Duration::from_secs(10));
        assert_eq!(config.api.catalog_cache_ttl, Duration::from_secs(300));
        assert_eq!(config.storage.dir, PathBuf::from(".rocketshoes"));
        assert_eq!(config.storage.key, "@RocketShoes:cart");
        assert!(config.sentry_dsn.is_none());
    }

    #[test]
    fn test_overrides() {
        let config = CartConfig::from_lookup(lookup(&[
            ("CART_API_URL", "https://api.rocketshoes.dev/v1/"),
            ("CART_HTTP_TIMEOUT_SECS", "3"),
            ("CART_CATALOG_CACHE_TTL_SECS", "0"),
            ("CART_STORAGE_DIR", "/tmp/carts"),
            ("CART_STORAGE_KEY", "cart"),
            ("SENTRY_DSN", "https://key@sentry.io/1"),
        ]))
        .unwrap();
        assert_eq!(config.api.base_url.as_str(), "https://api.rocketshoes.dev/v1/");
        assert_eq!(config.api.timeout, Duration::from_secs(3));
        assert_eq!(config.api.catalog_cache_ttl, Duration::ZERO);
        assert_eq!(config.storage.dir, PathBuf::from("/tmp/carts"));
        assert_eq!(config.storage.key, "cart");
        assert_eq!(config.sentry_dsn.as_deref(), Some("https://key@sentry.io/1"));
    }

    #[test]
    fn test_empty_values_fall_back_to_defaults() {
        let config = CartConfig::from_lookup(lookup(&[("CART_STORAGE_KEY", "  ")])).unwrap();
        assert_eq!(config.storage.key, DEFAULT_STORAGE_KEY);
    }

    #[test]
    fn test_invalid_url() {
        let err = CartConfig::from_lookup(lookup(&[("CART_API_URL", "not a url")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar(ref key, _) if key == "CART_API_URL"));
    }

    #[test]
    fn test_invalid_timeout() {
        let err =
            CartConfig::from_lookup(lookup(&[("CART_HTTP_TIMEOUT_SECS", "soon")])).unwrap_err();
        assert!(
            matches!(err, ConfigError::InvalidEnvVar(ref key, _) if key == "CART_HTTP_TIMEOUT_SECS")
        );
    }

    #[test]
    fn test_token_is_kept_secret() {
        let config =
            CartConfig::from_lookup(lookup(&[("CART_API_TOKEN", "aB3$xY9!mK2@nL5#pQ7&rT0*")]))
                .unwrap();
        assert_eq!(
            config.api.token.as_ref().unwrap().expose_secret(),
            "aB3$xY9!mK2@nL5#pQ7&rT0*"
        );
        let debug = format!("{:?}", config.api);
        assert!(debug.contains("[REDACTED]"));
        assert!(!debug.contains("aB3$"));
    }

    #[test]
    fn test_placeholder_token_rejected() {
        let err = CartConfig::from_lookup(lookup(&[("CART_API_TOKEN", "your-token-here")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::InsecureSecret(_, _)));
    }

    #[test]
    fn test_low_entropy_token_rejected() {
        let result = validate_secret_strength("aaaaaaaaaaaaaaaa", "TEST_VAR");
        assert!(matches!(result, Err(ConfigError::InsecureSecret(_, _))));
    }

    #[test]
    fn test_short_token_rejected_through_lookup() {
        // "abc123" carries ~2.58 bits/char
        let err = CartConfig::from_lookup(lookup(&[("CART_API_TOKEN", "abc123")])).unwrap_err();
        assert!(matches!(err, ConfigError::InsecureSecret(ref key, _) if key == "CART_API_TOKEN"));
    }

    #[test]
    fn test_shannon_entropy() {
        assert!((shannon_entropy("") - 0.0).abs() < f64::EPSILON);
        assert!((shannon_entropy("aaaa") - 0.0).abs() < f64::EPSILON);
        assert!((shannon_entropy("ab") - 1.0).abs() < 0.01);
    }
}
