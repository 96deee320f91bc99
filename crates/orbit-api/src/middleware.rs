//! # Authorization Middleware
//!
//! Axum adapters that run the [`RouteGates`](crate::state::RouteGates)
//! pipelines held in `AppState`.
//!
//! - [`authenticate`] verifies the bearer token and stores the resulting
//!   [`AuthContext`] in the request extensions. No header is a 401; an
//!   invalid or expired token is a 403. The inner service is not called
//!   on either.
//! - [`require_admin`] authenticates and then looks up the requester. Only
//!   admins get through; a store fault is a 503.
//! - [`Authenticated`] extracts the verified claims in handlers.

use crate::error::ApiError;
use crate::state::AppState;
use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header::AUTHORIZATION, request::Parts},
    middleware::Next,
    response::Response,
};
use orbit_auth::{AuthContext, Claims, GatePipeline};
use orbit_core::StorefrontError;

/// Verify the bearer token and attach the decoded claims.
pub async fn authenticate(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    guard(&state.gates.authenticated, request, next).await
}

/// Authenticate, then let the request through only if the requester is an admin.
pub async fn require_admin(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    guard(&state.gates.admin, request, next).await
}

async fn guard(
    gates: &GatePipeline,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let mut ctx = AuthContext::from_authorization_header(
        request
            .headers()
            .get(AUTHORIZATION)
            .map(|value| value.to_str().unwrap_or_default()),
    );

    gates.evaluate(&mut ctx).await?.into_result()?;

    request.extensions_mut().insert(ctx);
    Ok(next.run(request).await)
}

fn verified_claims(extensions: &axum::http::Extensions) -> Option<Claims> {
    extensions
        .get::<AuthContext>()
        .and_then(|ctx| ctx.claims.clone())
}

/// Verified claims of the current request
#[derive(Debug, Clone)]
pub struct Authenticated(pub Claims);

impl Authenticated {
    pub fn subject(&self) -> &str {
        self.0.subject()
    }
}

impl<S> FromRequestParts<S> for Authenticated
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        verified_claims(&parts.extensions)
            .map(Authenticated)
            .ok_or_else(|| StorefrontError::Unauthorized.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::AppConfig;
    use axum::{
        body::Body,
        http::{Request as HttpRequest, StatusCode},
        middleware::from_fn_with_state,
        routing::get,
        Router,
    };
    use orbit_auth::{AuthConfig, TokenService};
    use orbit_core::{Identity, MemoryStore, Role};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use tower::ServiceExt;

    const SECRET: &str = "middleware-secret";

    async fn state() -> (AppState, Arc<MemoryStore>) {
        let store = Arc::new(
            MemoryStore::new()
                .with_identity(Identity::new("admin@x.com").with_role(Role::Admin))
                .await
                .with_identity(Identity::new("user@x.com"))
                .await,
        );
        let state = AppState::from_parts(
            AppConfig::default(),
            &AuthConfig::new(SECRET).unwrap(),
            store.clone(),
            None,
        );
        (state, store)
    }

    /// Router whose only handler counts its invocations
    fn counting_router(state: AppState, admin: bool, hits: Arc<AtomicUsize>) -> Router {
        let handler = move |Authenticated(claims): Authenticated| {
            let hits = hits.clone();
            async move {
                hits.fetch_add(1, Ordering::SeqCst);
                claims.sub
            }
        };

        let router = Router::new().route("/protected", get(handler));
        let router = if admin {
            router.route_layer(from_fn_with_state(state.clone(), require_admin))
        } else {
            router.route_layer(from_fn_with_state(state.clone(), authenticate))
        };
        router.with_state(state)
    }

    fn request(authorization: Option<String>) -> HttpRequest<Body> {
        let mut builder = HttpRequest::builder().uri("/protected");
        if let Some(value) = authorization {
            builder = builder.header(AUTHORIZATION, value);
        }
        builder.body(Body::empty()).unwrap()
    }

    fn bearer_for(subject: &str, secret: &str) -> Option<String> {
        let token = TokenService::new(&AuthConfig::new(secret).unwrap())
            .issue(subject)
            .unwrap();
        Some(format!("Bearer {}", token.value))
    }

    #[tokio::test]
    async fn test_missing_header_is_401_and_handler_not_called() {
        let (state, _) = state().await;
        let hits = Arc::new(AtomicUsize::new(0));

        let response = counting_router(state, false, hits.clone())
            .oneshot(request(None))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(hits.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_wrong_signature_is_403_and_handler_not_called() {
        let (state, _) = state().await;
        let hits = Arc::new(AtomicUsize::new(0));

        let response = counting_router(state, false, hits.clone())
            .oneshot(request(bearer_for("user@x.com", "someone-elses-secret")))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        assert_eq!(hits.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_valid_token_reaches_handler_once() {
        let (state, _) = state().await;
        let hits = Arc::new(AtomicUsize::new(0));

        let response = counting_router(state, false, hits.clone())
            .oneshot(request(bearer_for("user@x.com", SECRET)))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_admin_layer_denies_non_admin() {
        let (state, _) = state().await;
        let hits = Arc::new(AtomicUsize::new(0));
        let router = counting_router(state, true, hits.clone());

        let response = router
            .clone()
            .oneshot(request(bearer_for("user@x.com", SECRET)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);

        let response = router
            .oneshot(request(bearer_for("ghost@x.com", SECRET)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);

        assert_eq!(hits.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_admin_layer_authenticates_first() {
        let (state, store) = state().await;
        let hits = Arc::new(AtomicUsize::new(0));
        // The identity lookup would fail, but it is never reached.
        store.set_unavailable(true);

        let response = counting_router(state, true, hits.clone())
            .oneshot(request(None))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(hits.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_admin_layer_allows_admin() {
        let (state, _) = state().await;
        let hits = Arc::new(AtomicUsize::new(0));

        let response = counting_router(state, true, hits.clone())
            .oneshot(request(bearer_for("admin@x.com", SECRET)))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_admin_layer_store_outage_is_503() {
        let (state, store) = state().await;
        let hits = Arc::new(AtomicUsize::new(0));
        store.set_unavailable(true);

        let response = counting_router(state, true, hits.clone())
            .oneshot(request(bearer_for("admin@x.com", SECRET)))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(hits.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_extractor_without_middleware_is_401() {
        let (state, _) = state().await;
        let router = Router::new()
            .route(
                "/protected",
                get(|Authenticated(claims): Authenticated| async move { claims.sub }),
            )
            .with_state(state);

        let response = router.oneshot(request(None)).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
}
