//! # In-Memory Document Store
//!
//! Process-local implementation of every store trait. Used by the server
//! when no external document store is configured, and by tests.

use crate::error::{StorefrontError, StorefrontResult};
use crate::identity::{Identity, IdentityUpdate};
use crate::order::{Order, Review};
use crate::product::Product;
use crate::store::{IdentityStore, OrderStore, ProductStore, ReviewStore, WriteResult};
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use tokio::sync::RwLock;
use tracing::debug;

#[derive(Default)]
struct Collections {
    identities: BTreeMap<String, Identity>,
    products: Vec<Product>,
    orders: Vec<Order>,
    reviews: Vec<Review>,
}

/// In-memory document store
#[derive(Default)]
pub struct MemoryStore {
    collections: RwLock<Collections>,
    unavailable: AtomicBool,
    writes: AtomicU64,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed products (e.g. from a catalog file)
    pub async fn with_products(self, products: impl IntoIterator<Item = Product>) -> Self {
        self.collections.write().await.products.extend(products);
        self
    }

    /// Seed an identity
    pub async fn with_identity(self, identity: Identity) -> Self {
        self.collections
            .write()
            .await
            .identities
            .insert(identity.email.clone(), identity);
        self
    }

    /// Simulate an outage: every call fails with `StoreUnavailable` while set.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Number of successful writes since construction
    pub fn write_count(&self) -> u64 {
        self.writes.load(Ordering::SeqCst)
    }

    fn check_available(&self) -> StorefrontResult<()> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(StorefrontError::StoreUnavailable(
                "memory store offline".to_string(),
            ));
        }
        Ok(())
    }

    fn record_write(&self) {
        self.writes.fetch_add(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl IdentityStore for MemoryStore {
    async fn find_by_email(&self, email: &str) -> StorefrontResult<Option<Identity>> {
        self.check_available()?;
        Ok(self.collections.read().await.identities.get(email).cloned())
    }

    async fn upsert_by_email(
        &self,
        email: &str,
        update: IdentityUpdate,
    ) -> StorefrontResult<WriteResult> {
        self.check_available()?;
        let mut collections = self.collections.write().await;

        let result = match collections.identities.get_mut(email) {
            Some(identity) => WriteResult::updated(identity.apply(&update)),
            None => {
                let mut identity = Identity::new(email);
                identity.apply(&update);
                collections.identities.insert(email.to_string(), identity);
                WriteResult::inserted(email)
            }
        };

        self.record_write();
        debug!(email = %email, modified = result.modified, "identity upserted");
        Ok(result)
    }

    async fn list(&self) -> StorefrontResult<Vec<Identity>> {
        self.check_available()?;
        Ok(self
            .collections
            .read()
            .await
            .identities
            .values()
            .cloned()
            .collect())
    }
}

#[async_trait]
impl ProductStore for MemoryStore {
    async fn list(&self) -> StorefrontResult<Vec<Product>> {
        self.check_available()?;
        Ok(self.collections.read().await.products.clone())
    }

    async fn find(&self, id: &str) -> StorefrontResult<Option<Product>> {
        self.check_available()?;
        Ok(self
            .collections
            .read()
            .await
            .products
            .iter()
            .find(|p| p.id == id)
            .cloned())
    }

    async fn insert(&self, product: Product) -> StorefrontResult<WriteResult> {
        self.check_available()?;
        let mut collections = self.collections.write().await;
        if collections.products.iter().any(|p| p.id == product.id) {
            return Err(StorefrontError::Conflict(format!(
                "product {} already exists",
                product.id
            )));
        }
        let result = WriteResult::inserted(product.id.clone());
        collections.products.push(product);
        self.record_write();
        Ok(result)
    }

    async fn set_available_quantity(
        &self,
        id: &str,
        available_quantity: u32,
    ) -> StorefrontResult<WriteResult> {
        self.check_available()?;
        let mut collections = self.collections.write().await;
        match collections.products.iter_mut().find(|p| p.id == id) {
            Some(product) => {
                let modified = product.available_quantity != available_quantity;
                product.available_quantity = available_quantity;
                self.record_write();
                Ok(WriteResult::updated(modified))
            }
            None => Ok(WriteResult::unmatched()),
        }
    }

    async fn delete(&self, id: &str) -> StorefrontResult<bool> {
        self.check_available()?;
        let mut collections = self.collections.write().await;
        let before = collections.products.len();
        collections.products.retain(|p| p.id != id);
        let removed = collections.products.len() != before;
        if removed {
            self.record_write();
        }
        Ok(removed)
    }
}

#[async_trait]
impl OrderStore for MemoryStore {
    async fn insert(&self, order: Order) -> StorefrontResult<WriteResult> {
        self.check_available()?;
        let result = WriteResult::inserted(order.id.clone());
        self.collections.write().await.orders.push(order);
        self.record_write();
        Ok(result)
    }

    async fn find(&self, id: &str) -> StorefrontResult<Option<Order>> {
        self.check_available()?;
        Ok(self
            .collections
            .read()
            .await
            .orders
            .iter()
            .find(|o| o.id == id)
            .cloned())
    }

    async fn list_by_email(&self, email: &str) -> StorefrontResult<Vec<Order>> {
        self.check_available()?;
        Ok(self
            .collections
            .read()
            .await
            .orders
            .iter()
            .filter(|o| o.email == email)
            .cloned()
            .collect())
    }

    async fn list(&self) -> StorefrontResult<Vec<Order>> {
        self.check_available()?;
        Ok(self.collections.read().await.orders.clone())
    }

    async fn replace(&self, order: Order) -> StorefrontResult<WriteResult> {
        self.check_available()?;
        let mut collections = self.collections.write().await;
        match collections.orders.iter_mut().find(|o| o.id == order.id) {
            Some(existing) => {
                let modified = *existing != order;
                *existing = order;
                self.record_write();
                Ok(WriteResult::updated(modified))
            }
            None => Ok(WriteResult::unmatched()),
        }
    }

    async fn delete(&self, id: &str) -> StorefrontResult<bool> {
        self.check_available()?;
        let mut collections = self.collections.write().await;
        let before = collections.orders.len();
        collections.orders.retain(|o| o.id != id);
        let removed = collections.orders.len() != before;
        if removed {
            self.record_write();
        }
        Ok(removed)
    }
}

#[async_trait]
impl ReviewStore for MemoryStore {
    async fn insert(&self, review: Review) -> StorefrontResult<WriteResult> {
        self.check_available()?;
        let result = WriteResult::inserted(review.id.clone());
        self.collections.write().await.reviews.push(review);
        self.record_write();
        Ok(result)
    }

    async fn list(&self) -> StorefrontResult<Vec<Review>> {
        self.check_available()?;
        Ok(self.collections.read().await.reviews.clone())
    }
}
