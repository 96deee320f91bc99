//! # Stripe Configuration
//!
//! Configuration management for Stripe integration.
//! The secret key is loaded from the environment.

use orbit_core::StorefrontError;
use std::env;

const DEFAULT_API_BASE_URL: &str = "https://api.stripe.com";
const DEFAULT_API_VERSION: &str = "2024-12-18.acacia";

/// Stripe API configuration
#[derive(Clone)]
pub struct StripeConfig {
    /// Secret API key (sk_test_... or sk_live_...)
    pub secret_key: String,

    /// API base URL (for testing/mocking)
    pub api_base_url: String,

    pub api_version: String,

    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl StripeConfig {
    /// Load configuration from environment variables.
    ///
    /// Required env vars:
    /// - `STRIPE_SECRET_KEY`
    pub fn from_env() -> Result<Self, StorefrontError> {
        dotenvy::dotenv().ok();

        Self::from_env_value(env::var("STRIPE_SECRET_KEY").ok())
    }

    /// Validate the already-read value of `STRIPE_SECRET_KEY`
    fn from_env_value(value: Option<String>) -> Result<Self, StorefrontError> {
        let secret_key = value.ok_or_else(|| {
            StorefrontError::Configuration("STRIPE_SECRET_KEY not set".to_string())
        })?;

        if !secret_key.starts_with("sk_test_") && !secret_key.starts_with("sk_live_") {
            return Err(StorefrontError::Configuration(
                "STRIPE_SECRET_KEY must start with sk_test_ or sk_live_".to_string(),
            ));
        }

        Ok(Self::new(secret_key))
    }

    /// Create config with an explicit key (for testing)
    pub fn new(secret_key: impl Into<String>) -> Self {
        Self {
            secret_key: secret_key.into(),
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            api_version: DEFAULT_API_VERSION.to_string(),
            timeout_secs: 30,
        }
    }

    pub fn is_test_mode(&self) -> bool {
        self.secret_key.starts_with("sk_test_")
    }

    /// Get authorization header value
    pub fn auth_header(&self) -> String {
        format!("Bearer {}", self.secret_key)
    }

    /// Builder: set custom API base URL (for testing)
    pub fn with_api_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = url.into();
        self
    }
}

impl std::fmt::Debug for StripeConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StripeConfig")
            .field("test_mode", &self.is_test_mode())
            .field("api_base_url", &self.api_base_url)
            .field("api_version", &self.api_version)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_detection() {
        assert!(StripeConfig::new("sk_test_abc123").is_test_mode());
        assert!(!StripeConfig::new("sk_live_abc123").is_test_mode());
    }

    #[test]
    fn test_auth_header() {
        let config = StripeConfig::new("sk_test_abc123");
        assert_eq!(config.auth_header(), "Bearer sk_test_abc123");
    }

    #[test]
    fn test_debug_hides_key() {
        let config = StripeConfig::new("sk_test_abc123");
        assert!(!format!("{:?}", config).contains("abc123"));
    }

    #[test]
    fn test_key_validation() {
        assert!(matches!(
            StripeConfig::from_env_value(Some("pk_test_wrong".into())),
            Err(StorefrontError::Configuration(_))
        ));
        assert!(matches!(
            StripeConfig::from_env_value(None),
            Err(StorefrontError::Configuration(_))
        ));
        assert!(StripeConfig::from_env_value(Some("sk_live_abc".into())).is_ok());
    }
}
