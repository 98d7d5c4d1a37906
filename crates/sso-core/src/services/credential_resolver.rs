// ============================================================================
// SSO Core - Credential Resolver
// File: crates/sso-core/src/services/credential_resolver.rs
// ============================================================================
//! Ordered lookup of a login identifier across the credential stores

use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

use sso_security::PasswordService;
use sso_shared::utils::mask_identifier;

use crate::domain::Identity;
use crate::error::AuthError;
use crate::repositories::CredentialStore;

/// Queries stores strictly one after another, in the order given.
///
/// The same username may exist in two stores (a staff account and a student
/// login); the earlier store always wins, so the stores must never be raced.
pub struct CredentialResolver {
    stores: Vec<Arc<dyn CredentialStore>>,
    lookup_timeout: Duration,
}

impl CredentialResolver {
    pub fn new(stores: Vec<Arc<dyn CredentialStore>>, lookup_timeout: Duration) -> Self {
        Self {
            stores,
            lookup_timeout,
        }
    }

    /// First active match wins. A store that errors or times out stops the
    /// search with `ResolverUnavailable`; later stores are not tried and
    /// nothing is retried.
    pub async fn resolve(&self, identifier: &str) -> Result<Identity, AuthError> {
        let masked = mask_identifier(identifier);

        for store in &self.stores {
            let source = store.source();
            let lookup = tokio::time::timeout(self.lookup_timeout, store.find_by_identifier(identifier));

            match lookup.await {
                Err(_) => {
                    warn!("{} store timed out after {:?} looking up {}", source, self.lookup_timeout, masked);
                    return Err(AuthError::ResolverUnavailable(format!("{} store timed out", source)));
                }
                Ok(Err(e)) => {
                    warn!("{} store failed looking up {}: {}", source, masked, e);
                    return Err(AuthError::ResolverUnavailable(format!("{} store: {}", source, e)));
                }
                Ok(Ok(Some(identity))) if identity.active => {
                    debug!("Resolved {} in {} store", masked, source);
                    return Ok(identity.normalized(source));
                }
                Ok(Ok(Some(_))) => {
                    debug!("Inactive record for {} in {} store, skipping", masked, source);
                }
                Ok(Ok(None)) => {
                    debug!("No record for {} in {} store", masked, source);
                }
            }
        }

        Err(AuthError::NotFound)
    }

    /// Slow, constant-time check of `plaintext` against the identity's hash.
    /// An unusable stored hash counts as a mismatch.
    pub fn verify_password(identity: &Identity, plaintext: &str) -> bool {
        verify_hash(&identity.password_hash, plaintext)
    }
}

pub(crate) fn verify_hash(hash: &str, plaintext: &str) -> bool {
    match PasswordService::verify(plaintext, hash) {
        Ok(valid) => valid,
        Err(e) => {
            warn!("Stored password hash is unusable: {}", e);
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repositories::{InMemoryCredentialStore, MockCredentialStore, StoreError};
    use sso_shared::SourceStore;

    fn identity(id: &str, identifiers: &[&str], role: &str, active: bool) -> Identity {
        Identity {
            id: id.to_string(),
            display_name: id.to_string(),
            login_identifiers: identifiers.iter().map(|s| s.to_string()).collect(),
            password_hash: String::new(),
            role: role.to_string(),
            source_store: SourceStore::Staff,
            active,
        }
    }

    fn resolver(stores: Vec<Arc<dyn CredentialStore>>) -> CredentialResolver {
        CredentialResolver::new(stores, Duration::from_millis(200))
    }

    fn chain() -> (Arc<InMemoryCredentialStore>, Arc<InMemoryCredentialStore>, Arc<InMemoryCredentialStore>) {
        let staff = Arc::new(InMemoryCredentialStore::new(
            SourceStore::Staff,
            vec![
                identity("1", &["admin", "admin@college.edu"], "super_admin", true),
                identity("2", &["ravi"], "warden", true),
                identity("3", &["retired"], "clerk", false),
            ],
        ));
        let applicants = Arc::new(InMemoryCredentialStore::new(
            SourceStore::Applicant,
            vec![identity("a-9", &["counsellor@college.edu"], "", true)],
        ));
        let students = Arc::new(InMemoryCredentialStore::new(
            SourceStore::Student,
            vec![
                identity("s-1", &["ravi", "21A91A0501"], "student", true),
                identity("s-2", &["retired", "21A91A0502"], "student", true),
            ],
        ));
        (staff, applicants, students)
    }

    fn stores_of(
        chain: &(Arc<InMemoryCredentialStore>, Arc<InMemoryCredentialStore>, Arc<InMemoryCredentialStore>),
    ) -> Vec<Arc<dyn CredentialStore>> {
        let staff: Arc<dyn CredentialStore> = chain.0.clone();
        let applicants: Arc<dyn CredentialStore> = chain.1.clone();
        let students: Arc<dyn CredentialStore> = chain.2.clone();
        vec![staff, applicants, students]
    }

    #[tokio::test]
    async fn test_identity_in_any_single_store_resolves() {
        let chain = chain();
        let resolver = resolver(stores_of(&chain));

        let staff = resolver.resolve("admin@college.edu").await.unwrap();
        assert_eq!((staff.id.as_str(), staff.source_store), ("1", SourceStore::Staff));

        let applicant = resolver.resolve("counsellor@college.edu").await.unwrap();
        assert_eq!(applicant.source_store, SourceStore::Applicant);
        assert_eq!(applicant.role, "user");

        let student = resolver.resolve("21A91A0501").await.unwrap();
        assert_eq!((student.id.as_str(), student.source_store), ("s-1", SourceStore::Student));
    }

    #[tokio::test]
    async fn test_earlier_store_wins_collisions() {
        let chain = chain();
        let resolver = resolver(stores_of(&chain));

        let resolved = resolver.resolve("ravi").await.unwrap();
        assert_eq!(resolved.id, "2");
        assert_eq!(resolved.source_store, SourceStore::Staff);
        // Later stores were never asked
        assert_eq!(chain.1.lookups(), 0);
        assert_eq!(chain.2.lookups(), 0);
    }

    #[tokio::test]
    async fn test_inactive_record_falls_through() {
        let chain = chain();
        let resolver = resolver(stores_of(&chain));

        let resolved = resolver.resolve("retired").await.unwrap();
        assert_eq!(resolved.id, "s-2");
        assert_eq!(resolved.source_store, SourceStore::Student);
    }

    #[tokio::test]
    async fn test_unknown_identifier_is_not_found() {
        let chain = chain();
        let resolver = resolver(stores_of(&chain));

        assert!(matches!(resolver.resolve("nobody").await, Err(AuthError::NotFound)));
        assert_eq!((chain.0.lookups(), chain.1.lookups(), chain.2.lookups()), (1, 1, 1));
    }

    #[tokio::test]
    async fn test_store_outage_stops_the_chain() {
        let chain = chain();
        chain.0.set_available(false);
        let resolver = resolver(stores_of(&chain));

        // Would have matched the student store, but the staff store must answer first
        let result = resolver.resolve("21A91A0501").await;
        assert!(matches!(result, Err(AuthError::ResolverUnavailable(_))));
        assert_eq!(chain.0.lookups(), 1);
        assert_eq!(chain.2.lookups(), 0);
    }

    #[tokio::test]
    async fn test_slow_store_times_out() {
        let slow: Arc<dyn CredentialStore> = Arc::new(
            InMemoryCredentialStore::new(SourceStore::Staff, vec![identity("1", &["admin"], "admin", true)])
                .with_latency(Duration::from_secs(5)),
        );
        let resolver = CredentialResolver::new(vec![slow], Duration::from_millis(20));

        let result = resolver.resolve("admin").await;
        assert!(matches!(result, Err(AuthError::ResolverUnavailable(_))));
    }

    #[tokio::test]
    async fn test_mocked_chain_consults_stores_in_order_only_until_a_match() {
        let mut first = MockCredentialStore::new();
        first.expect_source().return_const(SourceStore::Staff);
        first
            .expect_find_by_identifier()
            .times(1)
            .returning(|_| Ok(None));

        let mut second = MockCredentialStore::new();
        second.expect_source().return_const(SourceStore::Applicant);
        second
            .expect_find_by_identifier()
            .times(1)
            .returning(|_| Ok(Some(identity("a-1", &["x@college.edu"], "counsellor", true))));

        let mut third = MockCredentialStore::new();
        third.expect_source().return_const(SourceStore::Student);
        third.expect_find_by_identifier().never();

        let stores: Vec<Arc<dyn CredentialStore>> = vec![Arc::new(first), Arc::new(second), Arc::new(third)];
        let resolver = resolver(stores);
        let resolved = resolver.resolve("x@college.edu").await.unwrap();
        assert_eq!(resolved.source_store, SourceStore::Applicant);
        assert_eq!(resolved.role, "counsellor");
    }

    #[tokio::test]
    async fn test_mocked_store_error_is_not_retried() {
        let mut first = MockCredentialStore::new();
        first.expect_source().return_const(SourceStore::Staff);
        first
            .expect_find_by_identifier()
            .times(1)
            .returning(|_| Err(StoreError::Unavailable("connection refused".to_string())));

        let mut second = MockCredentialStore::new();
        second.expect_source().return_const(SourceStore::Student);
        second.expect_find_by_identifier().never();

        let stores: Vec<Arc<dyn CredentialStore>> = vec![Arc::new(first), Arc::new(second)];
        let resolver = resolver(stores);
        assert!(matches!(
            resolver.resolve("anyone").await,
            Err(AuthError::ResolverUnavailable(_))
        ));
    }

    #[test]
    fn test_verify_password_roundtrip() {
        let mut id = identity("1", &["admin"], "admin", true);
        id.password_hash = PasswordService::hash("Adm1n@2024").unwrap();

        assert!(CredentialResolver::verify_password(&id, "Adm1n@2024"));
        assert!(!CredentialResolver::verify_password(&id, "adm1n@2024"));
        assert!(!CredentialResolver::verify_password(&id, "Adm1n@202"));
        assert!(!CredentialResolver::verify_password(&id, ""));

        id.password_hash = "not-a-hash".to_string();
        assert!(!CredentialResolver::verify_password(&id, "not-a-hash"));
    }
}
