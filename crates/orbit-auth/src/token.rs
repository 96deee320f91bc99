//! # Token Service
//!
//! Issues and verifies HS256-signed access tokens.
//!
//! A token asserts a single subject (the identity's email) and expires
//! exactly one hour after issuance. Tokens are stateless: validity depends
//! only on the signature and the expiry at verification time, so tokens
//! survive a restart as long as the configured secret is unchanged.

use crate::config::AuthConfig;
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

/// Fixed token lifetime
pub const TOKEN_LIFETIME_SECS: i64 = 60 * 60;

/// Decoded, verified token payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject email
    pub sub: String,
    /// Issued-at (unix seconds)
    pub iat: i64,
    /// Expiry (unix seconds)
    pub exp: i64,
}

impl Claims {
    pub fn subject(&self) -> &str {
        &self.sub
    }

    /// Expired strictly after `exp`
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now.timestamp() > self.exp
    }

    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.exp, 0)
    }
}

/// An issued token together with the claims it carries
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    /// Compact encoded form, sent as `Authorization: Bearer <value>`
    pub value: String,
    pub claims: Claims,
}

/// Token verification failures
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TokenError {
    /// Bad signature or malformed structure
    #[error("Invalid token: {0}")]
    Invalid(String),

    #[error("Token expired")]
    Expired,

    #[error("Token signing failed: {0}")]
    Signing(String),
}

/// Issues and verifies access tokens against an injected secret
#[derive(Clone)]
pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
}

impl TokenService {
    pub fn new(config: &AuthConfig) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        // Expiry is checked in `verify_at` against the caller's clock.
        validation.validate_exp = false;
        validation.leeway = 0;
        validation.set_required_spec_claims(&["sub", "exp"]);

        Self {
            encoding: EncodingKey::from_secret(config.secret()),
            decoding: DecodingKey::from_secret(config.secret()),
            validation,
        }
    }

    /// Issue a token for `subject`, valid for one hour from now.
    pub fn issue(&self, subject: &str) -> Result<Token, TokenError> {
        self.issue_at(subject, Utc::now())
    }

    /// Issue a token as if the current time were `now`.
    pub fn issue_at(&self, subject: &str, now: DateTime<Utc>) -> Result<Token, TokenError> {
        let iat = now.timestamp();
        let claims = Claims {
            sub: subject.to_string(),
            iat,
            exp: (now + Duration::seconds(TOKEN_LIFETIME_SECS)).timestamp(),
        };

        let value = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| TokenError::Signing(e.to_string()))?;

        debug!(subject = %subject, exp = claims.exp, "issued access token");
        Ok(Token { value, claims })
    }

    /// Verify signature and expiry against the current time.
    pub fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        self.verify_at(token, Utc::now())
    }

    /// Verify signature and expiry as if the current time were `now`.
    pub fn verify_at(&self, token: &str, now: DateTime<Utc>) -> Result<Claims, TokenError> {
        let claims = decode::<Claims>(token, &self.decoding, &self.validation)
            .map_err(|e| TokenError::Invalid(e.to_string()))?
            .claims;

        if claims.is_expired_at(now) {
            return Err(TokenError::Expired);
        }

        Ok(claims)
    }
}

impl std::fmt::Debug for TokenService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenService")
            .field("lifetime_secs", &TOKEN_LIFETIME_SECS)
            .finish()
    }
}
