//! # orbit-store
//!
//! Storefront API server.
//!
//! ## Usage
//!
//! ```bash
//! # Required
//! export ACCESS_TOKEN_SECRET=...
//!
//! # Optional
//! export STRIPE_SECRET_KEY=sk_test_...
//! export PORT=5000
//!
//! # Run the server
//! orbit-store
//! ```

use orbit_api::{routes, state::AppState};
use tracing::{info, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(
            EnvFilter::builder()
                .with_default_directive(Level::INFO.into())
                .from_env_lossy(),
        )
        .init();

    print_banner();

    let state = AppState::new().await?;

    let addr = state.config.socket_addr()?;
    let is_prod = state.config.is_production();

    info!("Environment: {}", state.config.environment);
    info!("Products loaded: {}", state.products.list().await?.len());
    match &state.payments {
        Some(provider) => info!("Payment provider: {}", provider.provider_name()),
        None => info!("Payment provider: none"),
    }

    let app = routes::create_router(state);

    info!("orbit-store listening on http://{}", addr);

    if !is_prod {
        info!("Health: http://{}/health", addr);
        info!("Token: PUT http://{}/users/{{email}}", addr);
    }

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

fn print_banner() {
    println!(
        r#"
  orbit-store
  ━━━━━━━━━━━━━━━━━━━━━━━
  Storefront API
  Version: {}

"#,
        env!("CARGO_PKG_VERSION")
    );
}
