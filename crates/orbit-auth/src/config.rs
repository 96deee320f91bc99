//! # Auth Configuration
//!
//! The signing secret is loaded once at startup and never regenerated.
//! A missing secret is a fatal startup error.

use orbit_core::StorefrontError;
use std::env;

/// Environment variable holding the token signing secret
pub const SECRET_ENV_VAR: &str = "ACCESS_TOKEN_SECRET";

/// Token signing configuration
#[derive(Clone)]
pub struct AuthConfig {
    secret: String,
}

impl AuthConfig {
    /// Load configuration from environment variables.
    ///
    /// Required env vars:
    /// - `ACCESS_TOKEN_SECRET`
    pub fn from_env() -> Result<Self, StorefrontError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        Self::from_env_value(env::var(SECRET_ENV_VAR).ok())
    }

    /// Build from the already-read value of `ACCESS_TOKEN_SECRET`
    fn from_env_value(value: Option<String>) -> Result<Self, StorefrontError> {
        let secret = value.ok_or_else(|| {
            StorefrontError::Configuration(format!("{} not set", SECRET_ENV_VAR))
        })?;

        Self::new(secret)
    }

    /// Create config with an explicit secret (tests, embedding)
    pub fn new(secret: impl Into<String>) -> Result<Self, StorefrontError> {
        let secret = secret.into();
        if secret.trim().is_empty() {
            return Err(StorefrontError::Configuration(format!(
                "{} must not be empty",
                SECRET_ENV_VAR
            )));
        }
        Ok(Self { secret })
    }

    pub(crate) fn secret(&self) -> &[u8] {
        self.secret.as_bytes()
    }
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("secret", &"<redacted>")
            .finish()
    }
}
