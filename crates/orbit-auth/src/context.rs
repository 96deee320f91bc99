//! Request-scoped authorization context.

use crate::token::Claims;

/// What the authorization layer knows about one request.
///
/// Built from the `Authorization` header, filled with claims once the
/// token verifies, and dropped at the end of the request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthContext {
    /// Raw credential. `None` when the header is absent; an empty string
    /// when the header carries no second whitespace-separated token.
    pub credential: Option<String>,
    /// Set only after successful verification
    pub claims: Option<Claims>,
}

impl AuthContext {
    /// Build a context from the raw `Authorization` header value.
    ///
    /// The credential is the second whitespace-separated token; the scheme
    /// prefix itself is not validated.
    pub fn from_authorization_header(header: Option<&str>) -> Self {
        let credential = header.map(|value| {
            value
                .split_whitespace()
                .nth(1)
                .unwrap_or_default()
                .to_string()
        });

        Self {
            credential,
            claims: None,
        }
    }

    /// Context for a caller whose token was already verified
    pub fn authenticated(claims: Claims) -> Self {
        Self {
            credential: None,
            claims: Some(claims),
        }
    }

    pub fn subject(&self) -> Option<&str> {
        self.claims.as_ref().map(Claims::subject)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_header() {
        let ctx = AuthContext::from_authorization_header(None);
        assert_eq!(ctx.credential, None);
        assert!(ctx.claims.is_none());
    }

    #[test]
    fn test_bearer_header() {
        let ctx = AuthContext::from_authorization_header(Some("Bearer abc.def.ghi"));
        assert_eq!(ctx.credential.as_deref(), Some("abc.def.ghi"));
    }

    #[test]
    fn test_scheme_is_not_validated() {
        let ctx = AuthContext::from_authorization_header(Some("Token abc"));
        assert_eq!(ctx.credential.as_deref(), Some("abc"));
    }

    #[test]
    fn test_header_without_credential() {
        let ctx = AuthContext::from_authorization_header(Some("Bearer"));
        assert_eq!(ctx.credential.as_deref(), Some(""));
    }

    #[test]
    fn test_authenticated_context() {
        let claims = crate::token::Claims {
            sub: "a@x.com".into(),
            iat: 0,
            exp: 3600,
        };
        let ctx = AuthContext::authenticated(claims);
        assert_eq!(ctx.subject(), Some("a@x.com"));
        assert_eq!(ctx.credential, None);
    }

    #[test]
    fn test_extra_whitespace() {
        let ctx = AuthContext::from_authorization_header(Some("  Bearer   tok  extra"));
        assert_eq!(ctx.credential.as_deref(), Some("tok"));
    }
}
