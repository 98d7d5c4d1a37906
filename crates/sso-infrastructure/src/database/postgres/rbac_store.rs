// ============================================================================
// SSO Infrastructure - Staff (RBAC) Credential Store
// File: crates/sso-infrastructure/src/database/postgres/rbac_store.rs
// ============================================================================

use async_trait::async_trait;
use sqlx::{FromRow, PgPool};

use sso_core::domain::Identity;
use sso_core::repositories::{CredentialStore, StoreError};
use sso_shared::SourceStore;

use super::store_error;

/// Staff accounts, matched by username or email
pub struct PgRbacUserStore {
    pool: PgPool,
}

impl PgRbacUserStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

// Internal row type for SQLx mapping
#[derive(Debug, FromRow)]
struct RbacUserRow {
    pub id: String,
    pub name: Option<String>,
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub role: Option<String>,
    pub is_active: bool,
}

impl From<RbacUserRow> for Identity {
    fn from(row: RbacUserRow) -> Self {
        let login_identifiers = [row.username, row.email]
            .into_iter()
            .flatten()
            .filter(|i| !i.is_empty())
            .collect();

        Identity {
            id: row.id,
            display_name: row.name.unwrap_or_default(),
            login_identifiers,
            password_hash: row.password.unwrap_or_default(),
            role: row.role.unwrap_or_default(),
            source_store: SourceStore::Staff,
            active: row.is_active,
        }
    }
}

#[async_trait]
impl CredentialStore for PgRbacUserStore {
    fn source(&self) -> SourceStore {
        SourceStore::Staff
    }

    // Username matches beat email matches; active rows beat inactive ones
    async fn find_by_identifier(&self, identifier: &str) -> Result<Option<Identity>, StoreError> {
        let row: Option<RbacUserRow> = sqlx::query_as(
            r#"
            SELECT 
                id::text AS id, name, username, email, password, role, is_active
            FROM rbac_users
            WHERE username = $1 OR email = $1
            ORDER BY is_active DESC, (username = $1) DESC NULLS LAST
            LIMIT 1
            "#
        )
        .bind(identifier)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| store_error("staff", e))?;

        Ok(row.map(Identity::from))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_to_identity() {
        let identity: Identity = RbacUserRow {
            id: "12".to_string(),
            name: Some("Hostel Warden".to_string()),
            username: Some("warden1".to_string()),
            email: Some("warden1@college.edu".to_string()),
            password: Some("$2b$10$abcdefghijklmnopqrstuu".to_string()),
            role: Some("warden".to_string()),
            is_active: true,
        }
        .into();

        assert_eq!(identity.login_identifiers, vec!["warden1", "warden1@college.edu"]);
        assert!(identity.matches("warden1@college.edu"));
        assert_eq!(identity.role, "warden");
        assert_eq!(identity.source_store, SourceStore::Staff);
    }

    #[test]
    fn test_row_without_username_uses_email() {
        let identity: Identity = RbacUserRow {
            id: "13".to_string(),
            name: None,
            username: None,
            email: Some("clerk@college.edu".to_string()),
            password: None,
            role: None,
            is_active: false,
        }
        .into();

        assert_eq!(identity.username(), "clerk@college.edu");
        assert!(identity.password_hash.is_empty());
        assert!(!identity.active);
    }
}
