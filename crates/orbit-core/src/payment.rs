//! # Payment Provider Trait
//!
//! Strategy trait for payment providers. The storefront only needs a
//! charge intent whose client secret is handed to the browser; the card
//! flow itself runs between the browser and the provider.

use crate::error::StorefrontResult;
use crate::product::Currency;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// A charge intent created by a payment provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentIntent {
    /// Provider's intent id
    pub id: String,

    /// Secret the client uses to confirm the payment
    pub client_secret: String,

    /// Amount in smallest currency unit
    pub amount: i64,

    pub currency: Currency,
}

/// Core trait for payment provider implementations.
#[async_trait]
pub trait PaymentProvider: Send + Sync {
    /// Create a charge intent for `amount` (smallest currency unit).
    async fn create_payment_intent(
        &self,
        amount: i64,
        currency: Currency,
    ) -> StorefrontResult<PaymentIntent>;

    /// Get the provider name (for logging).
    fn provider_name(&self) -> &'static str;
}

/// Type alias for a shared payment provider (dynamic dispatch)
pub type SharedPaymentProvider = Arc<dyn PaymentProvider>;
