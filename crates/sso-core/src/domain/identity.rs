// ============================================================================
// SSO Core - Identity Entity
// File: crates/sso-core/src/domain/identity.rs
// Description: Uniform view of a user record from any credential store
// ============================================================================

use serde::Serialize;
use std::fmt;

use sso_security::Subject;
use sso_shared::constants::DEFAULT_ROLE;
use sso_shared::SourceStore;

use super::portal::PortalGrant;

/// A user record as resolved from one of the credential stores.
///
/// Owned by its source store; the gateway only ever reads it.
#[derive(Clone, PartialEq, Eq)]
pub struct Identity {
    pub id: String,
    pub display_name: String,
    /// Username, email, admission number... whatever the store lets people log in with
    pub login_identifiers: Vec<String>,
    pub password_hash: String,
    pub role: String,
    pub source_store: SourceStore,
    pub active: bool,
}

impl Identity {
    /// Primary login name: the first identifier, falling back to the id
    pub fn username(&self) -> &str {
        self.login_identifiers
            .iter()
            .find(|i| !i.is_empty())
            .map(String::as_str)
            .unwrap_or(&self.id)
    }

    pub fn matches(&self, identifier: &str) -> bool {
        self.login_identifiers.iter().any(|i| i == identifier)
    }

    /// Stamps the store that produced the record and fills in a missing role.
    pub fn normalized(mut self, source: SourceStore) -> Self {
        self.source_store = source;
        if self.role.trim().is_empty() {
            self.role = DEFAULT_ROLE.to_string();
        }
        if self.display_name.trim().is_empty() {
            self.display_name = self.username().to_string();
        }
        self
    }

    pub fn subject(&self) -> Subject {
        Subject {
            id: self.id.clone(),
            username: self.username().to_string(),
            role: self.role.clone(),
            source: self.source_store,
        }
    }
}

// Keeps the hash out of logs
impl fmt::Debug for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Identity")
            .field("id", &self.id)
            .field("display_name", &self.display_name)
            .field("login_identifiers", &self.login_identifiers)
            .field("password_hash", &"<redacted>")
            .field("role", &self.role)
            .field("source_store", &self.source_store)
            .field("active", &self.active)
            .finish()
    }
}

/// What callers get to see about an authenticated identity
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IdentitySummary {
    pub id: String,
    pub username: String,
    pub display_name: String,
    pub role: String,
    pub source_store: SourceStore,
    pub portals: Vec<PortalGrant>,
}

impl IdentitySummary {
    pub fn new(identity: &Identity, portals: Vec<PortalGrant>) -> Self {
        Self {
            id: identity.id.clone(),
            username: identity.username().to_string(),
            display_name: identity.display_name.clone(),
            role: identity.role.clone(),
            source_store: identity.source_store,
            portals,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn identity() -> Identity {
        Identity {
            id: "S-1001".to_string(),
            display_name: String::new(),
            login_identifiers: vec!["21A91A0501".to_string(), "ravi".to_string()],
            password_hash: "$argon2id$v=19$m=19456,t=2,p=1$abc$def".to_string(),
            role: "  ".to_string(),
            source_store: SourceStore::Staff,
            active: true,
        }
    }

    #[test]
    fn test_normalized_fills_role_and_source() {
        let identity = identity().normalized(SourceStore::Student);
        assert_eq!(identity.role, "user");
        assert_eq!(identity.source_store, SourceStore::Student);
        assert_eq!(identity.display_name, "21A91A0501");
    }

    #[test]
    fn test_matches_any_alias() {
        let identity = identity();
        assert!(identity.matches("ravi"));
        assert!(identity.matches("21A91A0501"));
        assert!(!identity.matches("RAVI"));
    }

    #[test]
    fn test_username_falls_back_to_id() {
        let mut identity = identity();
        identity.login_identifiers.clear();
        assert_eq!(identity.username(), "S-1001");
    }

    #[test]
    fn test_debug_redacts_hash() {
        let rendered = format!("{:?}", identity());
        assert!(rendered.contains("<redacted>"));
        assert!(!rendered.contains("argon2id"));
    }
}
