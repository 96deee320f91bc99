//! # Application State
//!
//! Shared state for the Axum application.
//! Contains the token service, document stores and payment provider.

use orbit_auth::{AuthConfig, Authenticate, GatePipeline, RequireAdmin, TokenService};
use orbit_core::{
    MemoryStore, ProductCatalog, SharedIdentityStore, SharedOrderStore, SharedPaymentProvider,
    SharedProductStore, SharedReviewStore, StorefrontError, StorefrontResult,
};
use orbit_stripe::StripePaymentIntents;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::{info, warn};

/// Application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Host to bind to
    pub host: String,
    /// Port to listen on
    pub port: u16,
    /// Environment (development, staging, production)
    pub environment: String,
    /// Optional seed catalog path
    pub seed_products: Option<String>,
}

impl AppConfig {
    /// Load from environment variables
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        Self {
            host: std::env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port: std::env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(5000),
            environment: std::env::var("ENVIRONMENT")
                .unwrap_or_else(|_| "development".to_string()),
            seed_products: std::env::var("SEED_PRODUCTS").ok(),
        }
    }

    /// Get the socket address to bind to
    pub fn socket_addr(&self) -> anyhow::Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|e| anyhow::anyhow!("Invalid socket address {}:{}: {}", self.host, self.port, e))
    }

    /// Check if running in production
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 5000,
            environment: "development".to_string(),
            seed_products: None,
        }
    }
}

/// Gate pipelines for the guarded route groups
pub struct RouteGates {
    /// Token verification only
    pub authenticated: GatePipeline,
    /// Token verification, then the admin role check
    pub admin: GatePipeline,
}

impl RouteGates {
    pub fn new(tokens: Arc<TokenService>, identities: SharedIdentityStore) -> Self {
        Self {
            authenticated: GatePipeline::new().then(Authenticate::new(tokens.clone())),
            admin: GatePipeline::new()
                .then(Authenticate::new(tokens))
                .then(RequireAdmin::new(identities)),
        }
    }
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Application config
    pub config: AppConfig,
    /// Token issuance and verification
    pub tokens: Arc<TokenService>,
    /// Authorization pipelines used by the middleware
    pub gates: Arc<RouteGates>,
    pub identities: SharedIdentityStore,
    pub products: SharedProductStore,
    pub orders: SharedOrderStore,
    pub reviews: SharedReviewStore,
    /// Payment provider, absent when Stripe is not configured
    pub payments: Option<SharedPaymentProvider>,
}

impl AppState {
    /// Build state from the environment.
    ///
    /// Fails if `ACCESS_TOKEN_SECRET` is missing.
    pub async fn new() -> anyhow::Result<Self> {
        let config = AppConfig::from_env();
        let auth = AuthConfig::from_env()
            .map_err(|e| anyhow::anyhow!("Failed to load auth config: {}", e))?;

        let catalog = load_product_catalog(config.seed_products.as_deref())?;
        let store = Arc::new(MemoryStore::new().with_products(catalog.products).await);

        let payments = match StripePaymentIntents::from_env() {
            Ok(provider) => Some(Arc::new(provider) as SharedPaymentProvider),
            Err(e) => {
                warn!("Payment intents disabled: {}", e);
                None
            }
        };

        Ok(Self::from_parts(config, &auth, store, payments))
    }

    /// Assemble state around a single in-memory store
    pub fn from_parts(
        config: AppConfig,
        auth: &AuthConfig,
        store: Arc<MemoryStore>,
        payments: Option<SharedPaymentProvider>,
    ) -> Self {
        let tokens = Arc::new(TokenService::new(auth));
        let identities: SharedIdentityStore = store.clone();

        Self {
            config,
            gates: Arc::new(RouteGates::new(tokens.clone(), identities.clone())),
            tokens,
            identities,
            products: store.clone(),
            orders: store.clone(),
            reviews: store,
            payments,
        }
    }

    /// The configured payment provider
    pub fn payments(&self) -> StorefrontResult<&SharedPaymentProvider> {
        self.payments.as_ref().ok_or_else(|| {
            StorefrontError::Configuration("payment provider not configured".to_string())
        })
    }
}

/// Load the seed catalog from `path` or the default config locations
fn load_product_catalog(path: Option<&str>) -> anyhow::Result<ProductCatalog> {
    if let Some(path) = path {
        let content = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Failed to read {}: {}", path, e))?;
        return parse_catalog(&content, path);
    }

    let config_paths = [
        "config/products.toml",
        "../config/products.toml",
        "../../config/products.toml",
    ];

    for path in config_paths {
        if let Ok(content) = std::fs::read_to_string(path) {
            return parse_catalog(&content, path);
        }
    }

    warn!("No product catalog found, starting with an empty store");
    Ok(ProductCatalog::default())
}

fn parse_catalog(content: &str, path: &str) -> anyhow::Result<ProductCatalog> {
    let catalog = ProductCatalog::from_toml(content)
        .map_err(|e| anyhow::anyhow!("Failed to parse {}: {}", path, e))?;
    info!("Loaded {} products from {}", catalog.products.len(), path);
    Ok(catalog)
}
