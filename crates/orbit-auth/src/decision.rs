//! # Authorization Decisions
//!
//! Every gate produces a [`Decision`]. A `Deny` is terminal for the request
//! and is never downgraded to "proceed".

use crate::token::TokenError;
use orbit_core::{StorefrontError, StorefrontResult};
use serde::Serialize;

/// Why a request was denied
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DenyReason {
    /// No `Authorization` header
    MissingCredential,
    /// Bad signature or malformed token
    InvalidToken,
    ExpiredToken,
    /// Requester is not an admin (or has no identity record)
    NotAdmin,
    /// Requester is not the owner of the resource
    NotOwner,
}

impl DenyReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            DenyReason::MissingCredential => "missing credential",
            DenyReason::InvalidToken => "invalid token",
            DenyReason::ExpiredToken => "expired token",
            DenyReason::NotAdmin => "admin role required",
            DenyReason::NotOwner => "not the resource owner",
        }
    }
}

impl std::fmt::Display for DenyReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&TokenError> for DenyReason {
    fn from(err: &TokenError) -> Self {
        match err {
            TokenError::Expired => DenyReason::ExpiredToken,
            TokenError::Invalid(_) | TokenError::Signing(_) => DenyReason::InvalidToken,
        }
    }
}

impl From<DenyReason> for StorefrontError {
    fn from(reason: DenyReason) -> Self {
        match reason {
            DenyReason::MissingCredential => StorefrontError::Unauthorized,
            other => StorefrontError::forbidden(other.as_str()),
        }
    }
}

/// Outcome of a gate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allow,
    Deny(DenyReason),
}

impl Decision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Decision::Allow)
    }

    /// Allow when `condition` holds, otherwise deny with `reason`
    pub fn allow_if(condition: bool, reason: DenyReason) -> Self {
        if condition {
            Decision::Allow
        } else {
            Decision::Deny(reason)
        }
    }

    /// Turn a denial into the matching `Unauthorized` / `Forbidden` error
    pub fn into_result(self) -> StorefrontResult<()> {
        match self {
            Decision::Allow => Ok(()),
            Decision::Deny(reason) => Err(reason.into()),
        }
    }
}
