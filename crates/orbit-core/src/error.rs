//! # Storefront Error Types
//!
//! Typed error handling for the orbit-store backend.
//! Store, gate and provider operations all return `Result<T, StorefrontError>`.

use thiserror::Error;

/// Core error type for all storefront operations
#[derive(Debug, Error)]
pub enum StorefrontError {
    /// No credential presented
    #[error("Unauthorized access")]
    Unauthorized,

    /// Credential invalid or expired, or insufficient role / ownership
    #[error("Forbidden access: {reason}")]
    Forbidden { reason: String },

    /// Document store fault during a required lookup or write
    #[error("Store unavailable: {0}")]
    StoreUnavailable(String),

    /// Document not found
    #[error("{entity} not found: {key}")]
    NotFound { entity: &'static str, key: String },

    /// Invalid request data
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Request conflicts with the current document state
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Configuration errors (missing secret, invalid keys)
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Payment provider API error
    #[error("Provider error [{provider}]: {message}")]
    ProviderError { provider: String, message: String },

    /// Network/HTTP error communicating with provider
    #[error("Network error: {0}")]
    NetworkError(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Internal error (should not happen)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl StorefrontError {
    /// Shorthand for a forbidden error
    pub fn forbidden(reason: impl Into<String>) -> Self {
        StorefrontError::Forbidden {
            reason: reason.into(),
        }
    }

    /// Shorthand for a not-found error
    pub fn not_found(entity: &'static str, key: impl Into<String>) -> Self {
        StorefrontError::NotFound {
            entity,
            key: key.into(),
        }
    }

    /// Returns the HTTP status code appropriate for this error
    pub fn status_code(&self) -> u16 {
        match self {
            StorefrontError::Unauthorized => 401,
            StorefrontError::Forbidden { .. } => 403,
            StorefrontError::StoreUnavailable(_) => 503,
            StorefrontError::NotFound { .. } => 404,
            StorefrontError::InvalidRequest(_) => 400,
            StorefrontError::Conflict(_) => 409,
            StorefrontError::Configuration(_) => 500,
            StorefrontError::ProviderError { .. } => 502,
            StorefrontError::NetworkError(_) => 503,
            StorefrontError::Serialization(_) => 500,
            StorefrontError::Internal(_) => 500,
        }
    }
}

/// Result type alias for storefront operations
pub type StorefrontResult<T> = Result<T, StorefrontError>;
