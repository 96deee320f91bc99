//! # orbit-stripe
//!
//! Stripe payment provider for orbit-store.
//!
//! **StripePaymentIntents** creates card PaymentIntents and returns the
//! client secret the storefront passes to Stripe.js.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use orbit_stripe::StripePaymentIntents;
//! use orbit_core::{Currency, PaymentProvider};
//!
//! let provider = StripePaymentIntents::from_env()?;
//! let intent = provider.create_payment_intent(4999, Currency::USD).await?;
//!
//! // Return intent.client_secret to the browser
//! ```

pub mod config;
pub mod intent;

// Re-exports
pub use config::StripeConfig;
pub use intent::StripePaymentIntents;
