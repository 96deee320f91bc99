//! # Order and Review Types
//!
//! Orders are owned by the email that placed them; order history is only
//! visible to that owner. Reviews are public once posted.

use crate::error::{StorefrontError, StorefrontResult};
use crate::product::{Price, Product};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A customer order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    /// Document id
    pub id: String,

    /// Owner email (the token subject that placed the order)
    pub email: String,

    pub product_id: String,

    /// Product name (denormalized for display)
    pub product_name: String,

    pub quantity: u32,

    pub total_price: Price,

    #[serde(default)]
    pub paid: bool,

    #[serde(default)]
    pub shipped: bool,

    /// Payment provider transaction id, set once paid
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transaction_id: Option<String>,

    pub created_at: DateTime<Utc>,
}

impl Order {
    /// Create an unpaid order for `quantity` units of `product`.
    ///
    /// Fails with `InvalidRequest` when the total does not fit in an `i64`.
    pub fn new(
        email: impl Into<String>,
        product: &Product,
        quantity: u32,
    ) -> StorefrontResult<Self> {
        let total_price = product.price.checked_times(quantity).ok_or_else(|| {
            StorefrontError::InvalidRequest(format!(
                "order total overflows for {} x {}",
                quantity, product.id
            ))
        })?;

        Ok(Self {
            id: Uuid::new_v4().to_string(),
            email: email.into(),
            product_id: product.id.clone(),
            product_name: product.name.clone(),
            quantity,
            total_price,
            paid: false,
            shipped: false,
            transaction_id: None,
            created_at: Utc::now(),
        })
    }

    pub fn is_owned_by(&self, email: &str) -> bool {
        self.email == email
    }

    /// Mark paid with the provider's transaction id
    pub fn mark_paid(&mut self, transaction_id: impl Into<String>) {
        self.paid = true;
        self.transaction_id = Some(transaction_id.into());
    }
}

/// A product review
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Review {
    pub id: String,

    /// Author email
    pub email: String,

    /// Author display name
    pub name: String,

    /// 1 to 5 stars
    pub rating: u8,

    pub comment: String,

    pub created_at: DateTime<Utc>,
}

impl Review {
    pub const MIN_RATING: u8 = 1;
    pub const MAX_RATING: u8 = 5;

    pub fn new(
        email: impl Into<String>,
        name: impl Into<String>,
        rating: u8,
        comment: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            email: email.into(),
            name: name.into(),
            rating,
            comment: comment.into(),
            created_at: Utc::now(),
        }
    }

    pub fn has_valid_rating(&self) -> bool {
        (Self::MIN_RATING..=Self::MAX_RATING).contains(&self.rating)
    }
}
