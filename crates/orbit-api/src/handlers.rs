//! # Request Handlers
//!
//! Axum request handlers for the storefront API.
//! Authentication and admin checks run as middleware before these handlers;
//! ownership checks run here, once the owner of the resource is known.

use crate::error::{ApiError, ApiResult};
use crate::middleware::Authenticated;
use crate::state::AppState;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use orbit_auth::{AuthContext, Claims, Gate, RequireOwner};
use orbit_core::{
    Currency, Identity, IdentityUpdate, Order, Price, Product, Review, Role, StorefrontError,
    WriteResult,
};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

// =============================================================================
// Request/Response Types
// =============================================================================

/// New product (admin)
#[derive(Debug, Deserialize)]
pub struct NewProductRequest {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub image: Option<String>,
    /// Unit price as a decimal amount
    pub price: f64,
    #[serde(default)]
    pub currency: Currency,
    #[serde(default = "default_quantity")]
    pub minimum_quantity: u32,
    pub available_quantity: u32,
}

fn default_quantity() -> u32 {
    1
}

/// Stock update
#[derive(Debug, Deserialize)]
pub struct UpdateQuantityRequest {
    pub available_quantity: u32,
}

/// Profile upsert response: the write result plus a fresh token for the client
#[derive(Debug, Serialize)]
pub struct UpsertUserResponse {
    pub result: WriteResult,
    pub token: String,
    /// RFC 3339 expiry of `token`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<String>,
}

/// Place an order
#[derive(Debug, Deserialize)]
pub struct CreateOrderRequest {
    pub product_id: String,
    pub quantity: u32,
}

/// Order history filter
#[derive(Debug, Deserialize)]
pub struct OrderHistoryQuery {
    pub email: String,
}

/// Record a payment against an order
#[derive(Debug, Deserialize)]
pub struct PayOrderRequest {
    pub transaction_id: String,
}

/// Post a review
#[derive(Debug, Deserialize)]
pub struct CreateReviewRequest {
    #[serde(default)]
    pub name: Option<String>,
    pub rating: u8,
    #[serde(default)]
    pub comment: String,
}

/// Create a payment intent
#[derive(Debug, Deserialize)]
pub struct PaymentIntentRequest {
    /// Decimal amount to charge
    pub price: f64,
    #[serde(default)]
    pub currency: Currency,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentIntentResponse {
    pub client_secret: String,
}

// =============================================================================
// Handlers
// =============================================================================

/// Health check endpoint
pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "service": "orbit-store",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

// ----- Products --------------------------------------------------------------

/// List the catalog
pub async fn list_products(State(state): State<AppState>) -> ApiResult<impl IntoResponse> {
    let products = state.products.list().await?;
    Ok(Json(serde_json::json!({
        "products": products,
        "count": products.len()
    })))
}

/// Get single product
pub async fn get_product(
    State(state): State<AppState>,
    Path(product_id): Path<String>,
) -> ApiResult<Json<Product>> {
    let product = state
        .products
        .find(&product_id)
        .await?
        .ok_or_else(|| StorefrontError::not_found("Product", &product_id))?;

    Ok(Json(product))
}

/// Overwrite a product's stock count
#[instrument(skip(state, caller, request), fields(subject = %caller.subject()))]
pub async fn update_product_quantity(
    State(state): State<AppState>,
    caller: Authenticated,
    Path(product_id): Path<String>,
    Json(request): Json<UpdateQuantityRequest>,
) -> ApiResult<Json<WriteResult>> {
    let result = state
        .products
        .set_available_quantity(&product_id, request.available_quantity)
        .await?;

    if !result.is_match() {
        return Err(StorefrontError::not_found("Product", product_id).into());
    }

    info!(
        "Stock for {} set to {}",
        product_id, request.available_quantity
    );
    Ok(Json(result))
}

/// Add a product (admin)
#[instrument(skip(state, request), fields(name = %request.name))]
pub async fn add_product(
    State(state): State<AppState>,
    Json(request): Json<NewProductRequest>,
) -> ApiResult<(StatusCode, Json<Product>)> {
    let price = Price::new(request.price, request.currency);
    if !price.is_within_limit() {
        return Err(StorefrontError::InvalidRequest(format!(
            "price must be positive and at most {}",
            Price::from_cents(Price::MAX_AMOUNT, price.currency).display()
        ))
        .into());
    }
    if request.minimum_quantity == 0 {
        return Err(
            StorefrontError::InvalidRequest("minimum_quantity must be at least 1".to_string())
                .into(),
        );
    }

    let mut product = Product::new(request.name, price, request.available_quantity)
        .with_description(request.description)
        .with_minimum_quantity(request.minimum_quantity);
    product.image = request.image;

    state.products.insert(product.clone()).await?;
    info!("Added product {}", product.id);

    Ok((StatusCode::CREATED, Json(product)))
}

/// Remove a product (admin)
pub async fn delete_product(
    State(state): State<AppState>,
    Path(product_id): Path<String>,
) -> ApiResult<StatusCode> {
    if !state.products.delete(&product_id).await? {
        return Err(StorefrontError::not_found("Product", product_id).into());
    }
    Ok(StatusCode::NO_CONTENT)
}

// ----- Users -----------------------------------------------------------------

/// Create or update a profile and hand back a token for that email
#[instrument(skip(state, update))]
pub async fn upsert_user(
    State(state): State<AppState>,
    Path(email): Path<String>,
    Json(update): Json<IdentityUpdate>,
) -> ApiResult<Json<UpsertUserResponse>> {
    if email.trim().is_empty() {
        return Err(StorefrontError::InvalidRequest("email must not be empty".to_string()).into());
    }

    // Body deserialization never sets the role; elevation has its own endpoint.
    let result = state.identities.upsert_by_email(&email, update).await?;
    let token = state.tokens.issue(&email)?;

    Ok(Json(UpsertUserResponse {
        result,
        expires_at: token.claims.expires_at().map(|t| t.to_rfc3339()),
        token: token.value,
    }))
}

/// Get the caller's own profile
pub async fn get_user(
    State(state): State<AppState>,
    Authenticated(claims): Authenticated,
    Path(email): Path<String>,
) -> ApiResult<Json<Identity>> {
    ensure_owner(&claims, &email).await?;

    let identity = state
        .identities
        .find_by_email(&email)
        .await?
        .ok_or_else(|| StorefrontError::not_found("User", &email))?;

    Ok(Json(identity))
}

/// List all identities (admin)
pub async fn list_users(State(state): State<AppState>) -> ApiResult<Json<Vec<Identity>>> {
    Ok(Json(state.identities.list().await?))
}

/// Whether `email` holds the admin role
pub async fn check_admin(
    State(state): State<AppState>,
    _caller: Authenticated,
    Path(email): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let admin = state
        .identities
        .find_by_email(&email)
        .await?
        .map(|identity| identity.is_admin())
        .unwrap_or(false);

    Ok(Json(serde_json::json!({ "admin": admin })))
}

/// Grant the admin role to `email` (admin)
#[instrument(skip(state, caller), fields(requester = %caller.subject()))]
pub async fn make_admin(
    State(state): State<AppState>,
    caller: Authenticated,
    Path(email): Path<String>,
) -> ApiResult<Json<WriteResult>> {
    let result = state
        .identities
        .upsert_by_email(&email, IdentityUpdate::role(Role::Admin))
        .await?;

    info!("Granted admin role to {}", email);
    Ok(Json(result))
}

// ----- Orders ----------------------------------------------------------------

/// Place an order for the caller
#[instrument(skip(state, claims, request), fields(subject = %claims.sub, product_id = %request.product_id))]
pub async fn create_order(
    State(state): State<AppState>,
    Authenticated(claims): Authenticated,
    Json(request): Json<CreateOrderRequest>,
) -> ApiResult<(StatusCode, Json<Order>)> {
    let product = state
        .products
        .find(&request.product_id)
        .await?
        .ok_or_else(|| StorefrontError::not_found("Product", &request.product_id))?;

    if !product.accepts_quantity(request.quantity) {
        return Err(StorefrontError::InvalidRequest(format!(
            "quantity must be between {} and {}",
            product.minimum_quantity, product.available_quantity
        ))
        .into());
    }

    let order = Order::new(claims.sub, &product, request.quantity)?;
    state.orders.insert(order.clone()).await?;

    info!(
        "Created order {}: {} x {}, total={}",
        order.id,
        order.quantity,
        order.product_name,
        order.total_price.display()
    );
    Ok((StatusCode::CREATED, Json(order)))
}

/// Order history for `?email=`, visible only to that email
pub async fn list_orders(
    State(state): State<AppState>,
    Authenticated(claims): Authenticated,
    Query(query): Query<OrderHistoryQuery>,
) -> ApiResult<Json<Vec<Order>>> {
    ensure_owner(&claims, &query.email).await?;
    Ok(Json(state.orders.list_by_email(&query.email).await?))
}

/// Every order (admin)
pub async fn list_all_orders(State(state): State<AppState>) -> ApiResult<Json<Vec<Order>>> {
    Ok(Json(state.orders.list().await?))
}

/// Run the ownership gate for `owner` against the verified caller
async fn ensure_owner(claims: &Claims, owner: &str) -> ApiResult<()> {
    let mut ctx = AuthContext::authenticated(claims.clone());
    RequireOwner::new(owner)
        .check(&mut ctx)
        .await?
        .into_result()?;
    Ok(())
}

/// Load an order and require the caller to own it
async fn owned_order(
    state: &AppState,
    claims: &Claims,
    order_id: &str,
) -> ApiResult<Order> {
    let order = state
        .orders
        .find(order_id)
        .await?
        .ok_or_else(|| StorefrontError::not_found("Order", order_id))?;

    ensure_owner(claims, &order.email).await?;
    Ok(order)
}

pub async fn get_order(
    State(state): State<AppState>,
    Authenticated(claims): Authenticated,
    Path(order_id): Path<String>,
) -> ApiResult<Json<Order>> {
    Ok(Json(owned_order(&state, &claims, &order_id).await?))
}

/// Record the provider transaction for an order
#[instrument(skip(state, claims, request), fields(subject = %claims.sub))]
pub async fn pay_order(
    State(state): State<AppState>,
    Authenticated(claims): Authenticated,
    Path(order_id): Path<String>,
    Json(request): Json<PayOrderRequest>,
) -> ApiResult<Json<Order>> {
    let mut order = owned_order(&state, &claims, &order_id).await?;

    if order.paid {
        return Err(StorefrontError::Conflict(format!("order {} already paid", order_id)).into());
    }
    if request.transaction_id.trim().is_empty() {
        return Err(
            StorefrontError::InvalidRequest("transaction_id must not be empty".to_string()).into(),
        );
    }

    order.mark_paid(request.transaction_id);
    state.orders.replace(order.clone()).await?;

    info!("Order {} paid", order.id);
    Ok(Json(order))
}

/// Mark a paid order shipped (admin)
pub async fn ship_order(
    State(state): State<AppState>,
    Path(order_id): Path<String>,
) -> ApiResult<Json<Order>> {
    let mut order = state
        .orders
        .find(&order_id)
        .await?
        .ok_or_else(|| StorefrontError::not_found("Order", &order_id))?;

    if !order.paid {
        return Err(StorefrontError::Conflict(format!("order {} is not paid", order_id)).into());
    }

    order.shipped = true;
    state.orders.replace(order.clone()).await?;
    Ok(Json(order))
}

/// Cancel an unpaid order
pub async fn cancel_order(
    State(state): State<AppState>,
    Authenticated(claims): Authenticated,
    Path(order_id): Path<String>,
) -> ApiResult<StatusCode> {
    let order = owned_order(&state, &claims, &order_id).await?;

    if order.paid {
        return Err(
            StorefrontError::Conflict(format!("order {} is paid and cannot be cancelled", order_id))
                .into(),
        );
    }

    state.orders.delete(&order.id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ----- Reviews ---------------------------------------------------------------

pub async fn list_reviews(State(state): State<AppState>) -> ApiResult<Json<Vec<Review>>> {
    Ok(Json(state.reviews.list().await?))
}

/// Post a review as the caller
pub async fn add_review(
    State(state): State<AppState>,
    Authenticated(claims): Authenticated,
    Json(request): Json<CreateReviewRequest>,
) -> ApiResult<(StatusCode, Json<Review>)> {
    let name = request.name.unwrap_or_else(|| claims.sub.clone());
    let review = Review::new(claims.sub, name, request.rating, request.comment);

    if !review.has_valid_rating() {
        return Err(StorefrontError::InvalidRequest(format!(
            "rating must be between {} and {}",
            Review::MIN_RATING,
            Review::MAX_RATING
        ))
        .into());
    }

    state.reviews.insert(review.clone()).await?;
    Ok((StatusCode::CREATED, Json(review)))
}

// ----- Payments --------------------------------------------------------------

/// Create a payment intent and return its client secret
#[instrument(skip(state, caller, request), fields(subject = %caller.subject()))]
pub async fn create_payment_intent(
    State(state): State<AppState>,
    caller: Authenticated,
    Json(request): Json<PaymentIntentRequest>,
) -> ApiResult<Json<PaymentIntentResponse>> {
    let amount = request.currency.to_smallest_unit(request.price);
    let provider = state.payments()?;

    let intent = provider
        .create_payment_intent(amount, request.currency)
        .await
        .map_err(ApiError::from)?;

    info!(
        "Created {} payment intent {} for {}",
        provider.provider_name(),
        intent.id,
        Price::from_cents(intent.amount, intent.currency).display()
    );

    Ok(Json(PaymentIntentResponse {
        client_secret: intent.client_secret,
    }))
}
