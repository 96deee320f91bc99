//! # Gates
//!
//! Request-pipeline stages that compute an allow/deny decision.
//!
//! ```text
//! request ─▶ Authenticate ─▶ RequireAdmin | RequireOwner ─▶ handler
//!              │ 401/403        │ 403           │ 403
//! ```
//!
//! Gates are plain values implementing [`Gate`], composed in a fixed order
//! by a [`GatePipeline`]. The free functions [`authenticate`],
//! [`require_admin`] and [`require_owner`] hold the decision logic the
//! gates delegate to.
//!
//! Only [`require_admin`] suspends (it looks up the requester's identity).
//! A store fault there is returned as `Err`, never folded into a `Deny`.

use crate::context::AuthContext;
use crate::decision::{Decision, DenyReason};
use crate::token::{Claims, TokenService};
use async_trait::async_trait;
use orbit_core::{IdentityStore, Role, SharedIdentityStore, StorefrontResult};
use std::sync::Arc;
use tracing::{error, warn};

/// Verify the context's credential and attach the decoded claims.
pub fn authenticate(tokens: &TokenService, ctx: &mut AuthContext) -> Decision {
    let Some(credential) = ctx.credential.as_deref() else {
        warn!("request without authorization header");
        return Decision::Deny(DenyReason::MissingCredential);
    };

    match tokens.verify(credential) {
        Ok(claims) => {
            ctx.claims = Some(claims);
            Decision::Allow
        }
        Err(e) => {
            warn!(error = %e, "token verification failed");
            Decision::Deny(DenyReason::from(&e))
        }
    }
}

/// Allow only if the requester's identity record has the admin role.
///
/// A missing identity is a plain deny.
pub async fn require_admin(
    identities: &dyn IdentityStore,
    claims: &Claims,
) -> StorefrontResult<Decision> {
    let identity = identities
        .find_by_email(claims.subject())
        .await
        .map_err(|e| {
            error!(subject = %claims.subject(), error = %e, "identity lookup failed");
            e
        })?;

    let is_admin = identity.map(|i| i.role == Role::Admin).unwrap_or(false);
    if !is_admin {
        warn!(subject = %claims.subject(), "admin role required");
    }
    Ok(Decision::allow_if(is_admin, DenyReason::NotAdmin))
}

/// Allow only if `owner` is byte-for-byte the token subject.
///
/// No case folding or trimming: `A@x.com` does not own `a@x.com`'s data.
pub fn require_owner(claims: &Claims, owner: &str) -> Decision {
    let is_owner = claims.subject() == owner;
    if !is_owner {
        warn!(subject = %claims.subject(), owner = %owner, "ownership check failed");
    }
    Decision::allow_if(is_owner, DenyReason::NotOwner)
}

/// A single stage in an authorization pipeline
#[async_trait]
pub trait Gate: Send + Sync {
    /// Decide for this request. May attach state to `ctx`.
    async fn check(&self, ctx: &mut AuthContext) -> StorefrontResult<Decision>;

    /// Gate name (for logging).
    fn name(&self) -> &'static str;
}

/// Token verification gate
pub struct Authenticate {
    tokens: Arc<TokenService>,
}

impl Authenticate {
    pub fn new(tokens: Arc<TokenService>) -> Self {
        Self { tokens }
    }
}

#[async_trait]
impl Gate for Authenticate {
    async fn check(&self, ctx: &mut AuthContext) -> StorefrontResult<Decision> {
        Ok(authenticate(&self.tokens, ctx))
    }

    fn name(&self) -> &'static str {
        "authenticate"
    }
}

/// Admin role gate
pub struct RequireAdmin {
    identities: SharedIdentityStore,
}

impl RequireAdmin {
    pub fn new(identities: SharedIdentityStore) -> Self {
        Self { identities }
    }
}

#[async_trait]
impl Gate for RequireAdmin {
    async fn check(&self, ctx: &mut AuthContext) -> StorefrontResult<Decision> {
        match &ctx.claims {
            Some(claims) => require_admin(self.identities.as_ref(), claims).await,
            None => Ok(Decision::Deny(DenyReason::MissingCredential)),
        }
    }

    fn name(&self) -> &'static str {
        "require_admin"
    }
}

/// Ownership gate for one requested owner
pub struct RequireOwner {
    owner: String,
}

impl RequireOwner {
    pub fn new(owner: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
        }
    }
}

#[async_trait]
impl Gate for RequireOwner {
    async fn check(&self, ctx: &mut AuthContext) -> StorefrontResult<Decision> {
        Ok(match &ctx.claims {
            Some(claims) => require_owner(claims, &self.owner),
            None => Decision::Deny(DenyReason::MissingCredential),
        })
    }

    fn name(&self) -> &'static str {
        "require_owner"
    }
}

/// Ordered gate composition; the first `Deny` or `Err` ends evaluation.
#[derive(Default)]
pub struct GatePipeline {
    gates: Vec<Box<dyn Gate>>,
}

impl GatePipeline {
    pub fn new() -> Self {
        Self { gates: Vec::new() }
    }

    /// Append a gate
    pub fn then(mut self, gate: impl Gate + 'static) -> Self {
        self.gates.push(Box::new(gate));
        self
    }

    /// Gate names in evaluation order
    pub fn names(&self) -> Vec<&'static str> {
        self.gates.iter().map(|g| g.name()).collect()
    }

    pub async fn evaluate(&self, ctx: &mut AuthContext) -> StorefrontResult<Decision> {
        for gate in &self.gates {
            if let Decision::Deny(reason) = gate.check(ctx).await? {
                warn!(gate = gate.name(), reason = %reason, "request denied");
                return Ok(Decision::Deny(reason));
            }
        }
        Ok(Decision::Allow)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AuthConfig;
    use orbit_core::{Identity, MemoryStore, StorefrontError};
    use proptest::prelude::*;
    use std::collections::HashSet;

    fn tokens() -> Arc<TokenService> {
        Arc::new(TokenService::new(&AuthConfig::new("gate-secret").unwrap()))
    }

    fn claims_for(subject: &str) -> Claims {
        tokens().issue(subject).unwrap().claims
    }

    async fn store() -> Arc<MemoryStore> {
        Arc::new(
            MemoryStore::new()
                .with_identity(Identity::new("admin@x.com").with_role(Role::Admin))
                .await
                .with_identity(Identity::new("user@x.com"))
                .await,
        )
    }

    fn bearer(token: &str) -> AuthContext {
        AuthContext::from_authorization_header(Some(&format!("Bearer {}", token)))
    }

    #[test]
    fn test_authenticate_missing_header() {
        let mut ctx = AuthContext::from_authorization_header(None);
        assert_eq!(
            authenticate(&tokens(), &mut ctx),
            Decision::Deny(DenyReason::MissingCredential)
        );
        assert!(ctx.claims.is_none());
    }

    #[test]
    fn test_authenticate_attaches_claims() {
        let tokens = tokens();
        let token = tokens.issue("user@x.com").unwrap();
        let mut ctx = bearer(&token.value);

        assert_eq!(authenticate(&tokens, &mut ctx), Decision::Allow);
        assert_eq!(ctx.subject(), Some("user@x.com"));
    }

    #[test]
    fn test_authenticate_wrong_signature() {
        let foreign = TokenService::new(&AuthConfig::new("other-secret").unwrap())
            .issue("user@x.com")
            .unwrap();
        let mut ctx = bearer(&foreign.value);

        assert_eq!(
            authenticate(&tokens(), &mut ctx),
            Decision::Deny(DenyReason::InvalidToken)
        );
        assert!(ctx.claims.is_none());
    }

    #[test]
    fn test_authenticate_header_without_token() {
        let mut ctx = AuthContext::from_authorization_header(Some("Bearer"));
        assert_eq!(
            authenticate(&tokens(), &mut ctx),
            Decision::Deny(DenyReason::InvalidToken)
        );
    }

    #[tokio::test]
    async fn test_require_admin_allows_admin() {
        let store = store().await;
        let decision = require_admin(store.as_ref(), &claims_for("admin@x.com"))
            .await
            .unwrap();
        assert_eq!(decision, Decision::Allow);
    }

    #[tokio::test]
    async fn test_require_admin_denies_regular_user() {
        let store = store().await;
        let decision = require_admin(store.as_ref(), &claims_for("user@x.com"))
            .await
            .unwrap();
        assert_eq!(decision, Decision::Deny(DenyReason::NotAdmin));
    }

    #[tokio::test]
    async fn test_require_admin_denies_missing_identity() {
        let store = store().await;
        let decision = require_admin(store.as_ref(), &claims_for("ghost@x.com"))
            .await
            .unwrap();
        assert_eq!(decision, Decision::Deny(DenyReason::NotAdmin));
    }

    #[tokio::test]
    async fn test_require_admin_store_fault_is_not_a_denial() {
        let store = store().await;
        store.set_unavailable(true);

        let err = require_admin(store.as_ref(), &claims_for("admin@x.com"))
            .await
            .unwrap_err();
        assert!(matches!(err, StorefrontError::StoreUnavailable(_)));
        assert_eq!(err.status_code(), 503);
    }

    #[test]
    fn test_require_owner_exact_match() {
        let claims = claims_for("a@x.com");
        assert_eq!(require_owner(&claims, "a@x.com"), Decision::Allow);
    }

    #[test]
    fn test_require_owner_is_case_sensitive() {
        let claims = claims_for("a@x.com");
        assert_eq!(
            require_owner(&claims, "A@x.com"),
            Decision::Deny(DenyReason::NotOwner)
        );
        assert_eq!(
            require_owner(&claims, " a@x.com"),
            Decision::Deny(DenyReason::NotOwner)
        );
    }

    #[tokio::test]
    async fn test_pipeline_order_and_short_circuit() {
        let tokens = tokens();
        let store = store().await;
        let pipeline = GatePipeline::new()
            .then(Authenticate::new(tokens.clone()))
            .then(RequireAdmin::new(store.clone()));

        assert_eq!(pipeline.names(), vec!["authenticate", "require_admin"]);

        // Store is offline, but authentication fails first so it is never consulted.
        store.set_unavailable(true);
        let mut ctx = AuthContext::from_authorization_header(None);
        assert_eq!(
            pipeline.evaluate(&mut ctx).await.unwrap(),
            Decision::Deny(DenyReason::MissingCredential)
        );

        store.set_unavailable(false);
        let token = tokens.issue("admin@x.com").unwrap();
        let mut ctx = bearer(&token.value);
        assert_eq!(pipeline.evaluate(&mut ctx).await.unwrap(), Decision::Allow);

        let token = tokens.issue("user@x.com").unwrap();
        let mut ctx = bearer(&token.value);
        assert_eq!(
            pipeline.evaluate(&mut ctx).await.unwrap(),
            Decision::Deny(DenyReason::NotAdmin)
        );
    }

    #[tokio::test]
    async fn test_pipeline_with_owner_gate() {
        let tokens = tokens();
        let token = tokens.issue("a@x.com").unwrap();

        let own = GatePipeline::new()
            .then(Authenticate::new(tokens.clone()))
            .then(RequireOwner::new("a@x.com"));
        let other = GatePipeline::new()
            .then(Authenticate::new(tokens.clone()))
            .then(RequireOwner::new("b@x.com"));

        assert!(own.evaluate(&mut bearer(&token.value)).await.unwrap().is_allowed());
        assert_eq!(
            other.evaluate(&mut bearer(&token.value)).await.unwrap(),
            Decision::Deny(DenyReason::NotOwner)
        );
    }

    #[tokio::test]
    async fn test_gates_without_claims_deny() {
        let store = store().await;
        let mut ctx = AuthContext::default();

        assert_eq!(
            RequireAdmin::new(store).check(&mut ctx).await.unwrap(),
            Decision::Deny(DenyReason::MissingCredential)
        );
        assert_eq!(
            RequireOwner::new("a@x.com").check(&mut ctx).await.unwrap(),
            Decision::Deny(DenyReason::MissingCredential)
        );
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(16))]

        #[test]
        fn prop_concurrent_verification_has_no_cross_talk(
            subjects in prop::collection::hash_set("[a-z]{1,10}@[a-z]{1,8}\\.com", 1..32)
        ) {
            let runtime = tokio::runtime::Builder::new_multi_thread()
                .worker_threads(4)
                .build()
                .unwrap();
            let tokens = tokens();

            let resolved: HashSet<(String, String)> = runtime.block_on(async {
                let handles: Vec<_> = subjects
                    .iter()
                    .map(|subject| {
                        let tokens = tokens.clone();
                        let token = tokens.issue(subject).unwrap();
                        let subject = subject.clone();
                        tokio::spawn(async move {
                            let mut ctx = bearer(&token.value);
                            let decision = authenticate(&tokens, &mut ctx);
                            assert_eq!(decision, Decision::Allow);
                            (subject, ctx.subject().unwrap_or_default().to_string())
                        })
                    })
                    .collect();

                let mut out = HashSet::new();
                for handle in handles {
                    out.insert(handle.await.unwrap());
                }
                out
            });

            prop_assert_eq!(resolved.len(), subjects.len());
            for (expected, actual) in resolved {
                prop_assert_eq!(expected, actual);
            }
        }
    }
}
