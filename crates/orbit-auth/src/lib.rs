//! # orbit-auth
//!
//! Authorization core for orbit-store.
//!
//! This crate provides:
//! - `TokenService` for issuing and verifying signed, one-hour access tokens
//! - `AuthContext`, the typed per-request authorization state
//! - `Decision` / `DenyReason`, the outcome of every gate
//! - `authenticate`, `require_admin` and `require_owner` gates, plus
//!   `GatePipeline` for composing them in a fixed order
//! - `AuthConfig`, the injected signing secret
//!
//! ## Example
//!
//! ```rust,ignore
//! use orbit_auth::{AuthConfig, AuthContext, Authenticate, GatePipeline, RequireAdmin, TokenService};
//!
//! let tokens = Arc::new(TokenService::new(&AuthConfig::from_env()?));
//! let token = tokens.issue("ann@example.com")?;
//!
//! let pipeline = GatePipeline::new()
//!     .then(Authenticate::new(tokens.clone()))
//!     .then(RequireAdmin::new(identities));
//!
//! let mut ctx = AuthContext::from_authorization_header(Some(&format!("Bearer {}", token.value)));
//! pipeline.evaluate(&mut ctx).await?.into_result()?;
//! ```

pub mod config;
pub mod context;
pub mod decision;
pub mod gate;
pub mod token;

// Re-exports
pub use config::AuthConfig;
pub use context::AuthContext;
pub use decision::{Decision, DenyReason};
pub use gate::{
    authenticate, require_admin, require_owner, Authenticate, Gate, GatePipeline, RequireAdmin,
    RequireOwner,
};
pub use token::{Claims, Token, TokenError, TokenService, TOKEN_LIFETIME_SECS};
