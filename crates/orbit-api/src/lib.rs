//! # orbit-api
//!
//! HTTP API layer for orbit-store.
//!
//! This crate provides:
//! - Axum-based HTTP server
//! - Bearer-token authentication and admin middleware
//! - REST endpoints for products, users, orders, reviews and payment intents
//!
//! ## Endpoints
//!
//! | Method | Path | Guard | Description |
//! |--------|------|-------|-------------|
//! | GET | `/health` | - | Health check |
//! | GET | `/products` | - | List products |
//! | GET | `/products/{id}` | - | Get product |
//! | PUT | `/products/{id}` | auth | Set available quantity |
//! | POST | `/products` | admin | Add product |
//! | DELETE | `/products/{id}` | admin | Remove product |
//! | PUT | `/users/{email}` | - | Upsert profile, returns a token |
//! | GET | `/users/{email}` | owner | Get profile |
//! | GET | `/users` | admin | List users |
//! | GET | `/admin/{email}` | auth | Is `email` an admin |
//! | PUT | `/users/admin/{email}` | admin | Grant admin role |
//! | POST | `/orders` | auth | Place order |
//! | GET | `/orders?email=` | owner | Order history |
//! | GET | `/orders/all` | admin | All orders |
//! | GET | `/orders/{id}` | owner | Get order |
//! | PATCH | `/orders/{id}/pay` | owner | Record payment |
//! | PATCH | `/orders/{id}/ship` | admin | Mark shipped |
//! | DELETE | `/orders/{id}` | owner | Cancel unpaid order |
//! | GET | `/reviews` | - | List reviews |
//! | POST | `/reviews` | auth | Add review |
//! | POST | `/create-payment-intent` | auth | Create payment intent |

pub mod error;
pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod state;

pub use error::{ApiError, ApiResult, ErrorResponse};
pub use middleware::Authenticated;
pub use routes::create_router;
pub use state::{AppConfig, AppState};
