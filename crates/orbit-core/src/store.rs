//! # Document Store Contracts
//!
//! Async traits for the document store collaborator. The authorization core
//! only needs [`IdentityStore`]; the route layer uses the rest.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │ IdentityStore   find_by_email / upsert_by_email / list       │
//! │ ProductStore    list / find / insert / set_quantity / delete │
//! │ OrderStore      insert / find / list_by_email / replace      │
//! │ ReviewStore     insert / list                                │
//! └──────────────────────────────────────────────────────────────┘
//!                             ▲
//!                   ┌─────────┴─────────┐
//!                   │   MemoryStore     │
//!                   └───────────────────┘
//! ```
//!
//! Implementations report collaborator faults as
//! [`StorefrontError::StoreUnavailable`](crate::StorefrontError::StoreUnavailable).
//! A missing document is `Ok(None)`, never an error.

use crate::error::StorefrontResult;
use crate::identity::{Identity, IdentityUpdate};
use crate::order::{Order, Review};
use crate::product::Product;
use async_trait::async_trait;
use serde::Serialize;
use std::sync::Arc;

/// Outcome of an insert, update or upsert
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct WriteResult {
    /// Documents matched by the filter
    pub matched: u64,
    /// Documents whose content changed
    pub modified: u64,
    /// Id of a document created by the write
    #[serde(skip_serializing_if = "Option::is_none")]
    pub upserted_id: Option<String>,
}

impl WriteResult {
    pub fn inserted(id: impl Into<String>) -> Self {
        Self {
            matched: 0,
            modified: 0,
            upserted_id: Some(id.into()),
        }
    }

    pub fn updated(modified: bool) -> Self {
        Self {
            matched: 1,
            modified: modified as u64,
            upserted_id: None,
        }
    }

    pub fn unmatched() -> Self {
        Self::default()
    }

    pub fn is_match(&self) -> bool {
        self.matched > 0 || self.upserted_id.is_some()
    }
}

/// Identity lookup and upsert, keyed on email
#[async_trait]
pub trait IdentityStore: Send + Sync {
    /// Find an identity by exact email.
    async fn find_by_email(&self, email: &str) -> StorefrontResult<Option<Identity>>;

    /// Create the identity if absent, then apply `update`.
    async fn upsert_by_email(
        &self,
        email: &str,
        update: IdentityUpdate,
    ) -> StorefrontResult<WriteResult>;

    /// All identities.
    async fn list(&self) -> StorefrontResult<Vec<Identity>>;
}

#[async_trait]
pub trait ProductStore: Send + Sync {
    async fn list(&self) -> StorefrontResult<Vec<Product>>;

    async fn find(&self, id: &str) -> StorefrontResult<Option<Product>>;

    async fn insert(&self, product: Product) -> StorefrontResult<WriteResult>;

    /// Overwrite the stock count of a product.
    async fn set_available_quantity(
        &self,
        id: &str,
        available_quantity: u32,
    ) -> StorefrontResult<WriteResult>;

    /// Returns true if a product was removed.
    async fn delete(&self, id: &str) -> StorefrontResult<bool>;
}

#[async_trait]
pub trait OrderStore: Send + Sync {
    async fn insert(&self, order: Order) -> StorefrontResult<WriteResult>;

    async fn find(&self, id: &str) -> StorefrontResult<Option<Order>>;

    /// Orders placed by exactly `email`, oldest first.
    async fn list_by_email(&self, email: &str) -> StorefrontResult<Vec<Order>>;

    async fn list(&self) -> StorefrontResult<Vec<Order>>;

    /// Replace the stored order with the same id.
    async fn replace(&self, order: Order) -> StorefrontResult<WriteResult>;

    /// Returns true if an order was removed.
    async fn delete(&self, id: &str) -> StorefrontResult<bool>;
}

#[async_trait]
pub trait ReviewStore: Send + Sync {
    async fn insert(&self, review: Review) -> StorefrontResult<WriteResult>;

    async fn list(&self) -> StorefrontResult<Vec<Review>>;
}

pub type SharedIdentityStore = Arc<dyn IdentityStore>;
pub type SharedProductStore = Arc<dyn ProductStore>;
pub type SharedOrderStore = Arc<dyn OrderStore>;
pub type SharedReviewStore = Arc<dyn ReviewStore>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_result_match() {
        assert!(WriteResult::inserted("x").is_match());
        assert!(WriteResult::updated(false).is_match());
        assert!(!WriteResult::unmatched().is_match());
    }

    #[test]
    fn test_write_result_serialization() {
        let json = serde_json::to_value(WriteResult::updated(true)).unwrap();
        assert_eq!(json["matched"], 1);
        assert_eq!(json["modified"], 1);
        assert!(json.get("upserted_id").is_none());
    }
}
