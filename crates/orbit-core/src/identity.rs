//! # Identity Types
//!
//! User identities keyed by email. Identities are created and updated
//! through an upsert on email and are never deleted.

use serde::{Deserialize, Serialize};

/// Role attached to an identity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Regular customer
    None,
    /// Store administrator
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::None => "none",
            Role::Admin => "admin",
        }
    }
}

impl Default for Role {
    fn default() -> Self {
        Role::None
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A user identity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    /// Unique natural key
    pub email: String,

    /// Role, `none` unless elevated
    #[serde(default)]
    pub role: Role,

    /// Display name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub education: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub linkedin: Option<String>,
}

impl Identity {
    /// Create a bare identity with no profile fields
    pub fn new(email: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            role: Role::None,
            name: None,
            phone: None,
            address: None,
            education: None,
            linkedin: None,
        }
    }

    /// Builder: set role
    pub fn with_role(mut self, role: Role) -> Self {
        self.role = role;
        self
    }

    /// Builder: set display name
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    /// Apply an update, overwriting only the fields it sets.
    /// Returns true if anything changed.
    pub fn apply(&mut self, update: &IdentityUpdate) -> bool {
        let before = self.clone();

        if let Some(role) = update.role {
            self.role = role;
        }
        merge(&mut self.name, &update.name);
        merge(&mut self.phone, &update.phone);
        merge(&mut self.address, &update.address);
        merge(&mut self.education, &update.education);
        merge(&mut self.linkedin, &update.linkedin);

        *self != before
    }
}

fn merge(field: &mut Option<String>, value: &Option<String>) {
    if let Some(v) = value {
        *field = Some(v.clone());
    }
}

/// Partial identity fields written by an upsert
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityUpdate {
    /// Only the role-elevation endpoint sets this
    #[serde(skip)]
    pub role: Option<Role>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub education: Option<String>,
    #[serde(default)]
    pub linkedin: Option<String>,
}

impl IdentityUpdate {
    /// An update that only grants a role
    pub fn role(role: Role) -> Self {
        Self {
            role: Some(role),
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_defaults_to_none() {
        let identity: Identity = serde_json::from_str(r#"{"email":"a@x.com"}"#).unwrap();
        assert_eq!(identity.role, Role::None);
        assert!(!identity.is_admin());
    }

    #[test]
    fn test_role_serialization() {
        let identity = Identity::new("a@x.com").with_role(Role::Admin);
        let json = serde_json::to_value(&identity).unwrap();
        assert_eq!(json["role"], "admin");
    }

    #[test]
    fn test_apply_update() {
        let mut identity = Identity::new("a@x.com").with_name("Ann");
        let update = IdentityUpdate {
            phone: Some("555".into()),
            ..IdentityUpdate::default()
        };

        assert!(identity.apply(&update));
        assert_eq!(identity.name.as_deref(), Some("Ann"));
        assert_eq!(identity.phone.as_deref(), Some("555"));
        assert!(!identity.apply(&update));
    }

    #[test]
    fn test_role_cannot_be_set_from_request_body() {
        let update: IdentityUpdate =
            serde_json::from_str(r#"{"name":"Eve","role":"admin"}"#).unwrap();
        assert_eq!(update.role, None);
        assert_eq!(update.name.as_deref(), Some("Eve"));
    }
}
