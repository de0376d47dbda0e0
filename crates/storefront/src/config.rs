//! Storefront client configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `CARTWHEEL_API_BASE_URL` - Base URL of the order-service HTTP API
//! - `CARTWHEEL_ACCESS_TOKEN` - Bearer token issued by the identity provider
//!
//! ## Optional
//! - `CARTWHEEL_DEBOUNCE_MS` - Upload quiescence window (default: 1000)
//! - `CARTWHEEL_RETRY_ATTEMPTS` - Read retry attempts (default: 3)
//! - `CARTWHEEL_RETRY_DELAY_MS` - Fixed delay between retries (default: 1500)
//! - `CARTWHEEL_CART_CACHE` - Path of the device cart cache file
//!   (default: .cartwheel/cart.json)

use std::path::PathBuf;
use std::time::Duration;

use secrecy::SecretString;
use thiserror::Error;

use crate::api::RetryPolicy;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Storefront client configuration.
///
/// Implements `Debug` manually to redact the access token.
#[derive(Clone)]
pub struct StorefrontConfig {
    /// Base URL of the order-service HTTP API.
    pub api_base_url: String,
    /// Bearer token from the external identity provider.
    pub access_token: SecretString,
    /// Quiescence window for debounced cart uploads.
    pub debounce_window: Duration,
    /// Retry policy for read requests.
    pub retry: RetryPolicy,
    /// Location of the device cart cache file.
    pub cart_cache_path: PathBuf,
}

impl std::fmt::Debug for StorefrontConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StorefrontConfig")
            .field("api_base_url", &self.api_base_url)
            .field("access_token", &"[REDACTED]")
            .field("debounce_window", &self.debounce_window)
            .field("retry", &self.retry)
            .field("cart_cache_path", &self.cart_cache_path)
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
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let api_base_url = get_required_env("CARTWHEEL_API_BASE_URL")?;
        let access_token = SecretString::from(get_required_env("CARTWHEEL_ACCESS_TOKEN")?);
        let debounce_window =
            Duration::from_millis(get_parsed_or_default("CARTWHEEL_DEBOUNCE_MS", 1000)?);
        let retry = RetryPolicy {
            attempts: get_parsed_or_default("CARTWHEEL_RETRY_ATTEMPTS", 3)?,
            delay: Duration::from_millis(get_parsed_or_default("CARTWHEEL_RETRY_DELAY_MS", 1500)?),
        };
        let cart_cache_path =
            PathBuf::from(get_env_or_default("CARTWHEEL_CART_CACHE", ".cartwheel/cart.json"));

        Ok(Self {
            api_base_url,
            access_token,
            debounce_window,
            retry,
            cart_cache_path,
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Get an environment variable parsed into `T`, falling back to a default.
fn get_parsed_or_default<T: std::str::FromStr>(key: &str, default: T) -> Result<T, ConfigError>
where
    T::Err: std::fmt::Display,
{
    match std::env::var(key) {
        Ok(value) => value
            .parse::<T>()
            .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string())),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_redacts_access_token() {
        let config = StorefrontConfig {
            api_base_url: "https://shop.test".to_string(),
            access_token: SecretString::from("tok_super_secret"),
            debounce_window: Duration::from_millis(1000),
            retry: RetryPolicy::default(),
            cart_cache_path: PathBuf::from(".cartwheel/cart.json"),
        };

        let debug_output = format!("{config:?}");
        assert!(debug_output.contains("https://shop.test"));
        assert!(debug_output.contains("[REDACTED]"));
        assert!(!debug_output.contains("tok_super_secret"));
    }

    #[test]
    fn test_get_parsed_or_default_uses_default_when_absent() {
        let value: u64 =
            get_parsed_or_default("CARTWHEEL_TEST_UNSET_VARIABLE", 1500).expect("default");
        assert_eq!(value, 1500);
    }
}
