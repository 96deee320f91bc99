//! # orbit-core
//!
//! Core types and traits for the orbit-store backend.
//!
//! This crate provides:
//! - `Identity` and `Role` for user profiles
//! - `Product`, `Order` and `Review` for the storefront documents
//! - `IdentityStore`, `ProductStore`, `OrderStore`, `ReviewStore` store contracts
//! - `PaymentProvider` for charge-intent creation
//! - `MemoryStore`, an in-process implementation of every store trait
//! - `StorefrontError` for typed error handling
//!
//! ## Example
//!
//! ```rust,ignore
//! use orbit_core::{IdentityStore, IdentityUpdate, MemoryStore, Role};
//!
//! let store = MemoryStore::new();
//! store.upsert_by_email("ann@example.com", IdentityUpdate::role(Role::Admin)).await?;
//!
//! let ann = store.find_by_email("ann@example.com").await?;
//! assert!(ann.map(|i| i.is_admin()).unwrap_or(false));
//! ```

pub mod error;
pub mod identity;
pub mod memory;
pub mod order;
pub mod payment;
pub mod product;
pub mod store;

// Re-exports for convenience
pub use error::{StorefrontError, StorefrontResult};
pub use identity::{Identity, IdentityUpdate, Role};
pub use memory::MemoryStore;
pub use order::{Order, Review};
pub use payment::{PaymentIntent, PaymentProvider, SharedPaymentProvider};
pub use product::{Currency, Price, Product, ProductCatalog};
pub use store::{
    IdentityStore, OrderStore, ProductStore, ReviewStore, SharedIdentityStore, SharedOrderStore,
    SharedProductStore, SharedReviewStore, WriteResult,
};
