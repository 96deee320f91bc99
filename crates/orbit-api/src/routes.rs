//! # Routes
//!
//! Axum router configuration for the storefront API.
//! Routes are grouped by guard: public, authenticated, and admin.

use crate::handlers;
use crate::middleware::{authenticate, require_admin};
use crate::state::AppState;
use axum::{
    middleware::from_fn_with_state,
    routing::{delete, get, patch, post, put},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

/// Create the main application router
///
/// Routes:
/// - Public:
///   - GET  /, /health
///   - GET  /products, /products/{id}
///   - PUT  /users/{email} - upsert profile, returns a token
///   - GET  /reviews
///
/// - Authenticated:
///   - PUT    /products/{id}
///   - GET    /users/{email}, /admin/{email}
///   - POST   /orders, GET /orders?email=
///   - GET    /orders/{id}, PATCH /orders/{id}/pay, DELETE /orders/{id}
///   - POST   /reviews
///   - POST   /create-payment-intent
///
/// - Admin:
///   - POST   /products, DELETE /products/{id}
///   - GET    /users, PUT /users/admin/{email}
///   - GET    /orders/all, PATCH /orders/{id}/ship
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .merge(public_routes())
        .merge(authenticated_routes(state.clone()))
        .merge(admin_routes(state.clone()))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn public_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::health))
        .route("/health", get(handlers::health))
        .route("/products", get(handlers::list_products))
        .route("/products/{product_id}", get(handlers::get_product))
        .route("/users/{email}", put(handlers::upsert_user))
        .route("/reviews", get(handlers::list_reviews))
}

fn authenticated_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route(
            "/products/{product_id}",
            put(handlers::update_product_quantity),
        )
        .route("/users/{email}", get(handlers::get_user))
        .route("/admin/{email}", get(handlers::check_admin))
        .route(
            "/orders",
            post(handlers::create_order).get(handlers::list_orders),
        )
        .route(
            "/orders/{order_id}",
            get(handlers::get_order).delete(handlers::cancel_order),
        )
        .route("/orders/{order_id}/pay", patch(handlers::pay_order))
        .route("/reviews", post(handlers::add_review))
        .route(
            "/create-payment-intent",
            post(handlers::create_payment_intent),
        )
        .route_layer(from_fn_with_state(state, authenticate))
}

fn admin_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/products", post(handlers::add_product))
        .route("/products/{product_id}", delete(handlers::delete_product))
        .route("/users", get(handlers::list_users))
        .route("/users/admin/{email}", put(handlers::make_admin))
        .route("/orders/all", get(handlers::list_all_orders))
        .route("/orders/{order_id}/ship", patch(handlers::ship_order))
        .route_layer(from_fn_with_state(state, require_admin))
}
