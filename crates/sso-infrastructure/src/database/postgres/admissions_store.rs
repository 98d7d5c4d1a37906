// ============================================================================
// SSO Infrastructure - Admissions Credential Store
// File: crates/sso-infrastructure/src/database/postgres/admissions_store.rs
// ============================================================================

use async_trait::async_trait;
use sqlx::{FromRow, PgPool};

use sso_core::domain::Identity;
use sso_core::repositories::{CredentialStore, StoreError};
use sso_shared::SourceStore;

use super::store_error;

/// Admissions CRM users, matched by email. Lives in its own database.
pub struct PgAdmissionsUserStore {
    pool: PgPool,
}

impl PgAdmissionsUserStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct AdmissionsUserRow {
    pub id: String,
    pub name: Option<String>,
    pub email: String,
    pub password: Option<String>,
    pub role_name: Option<String>,
    pub is_active: bool,
}

impl From<AdmissionsUserRow> for Identity {
    fn from(row: AdmissionsUserRow) -> Self {
        Identity {
            id: row.id,
            display_name: row.name.unwrap_or_default(),
            login_identifiers: vec![row.email],
            password_hash: row.password.unwrap_or_default(),
            role: row.role_name.unwrap_or_default(),
            source_store: SourceStore::Applicant,
            active: row.is_active,
        }
    }
}

#[async_trait]
impl CredentialStore for PgAdmissionsUserStore {
    fn source(&self) -> SourceStore {
        SourceStore::Applicant
    }

    async fn find_by_identifier(&self, identifier: &str) -> Result<Option<Identity>, StoreError> {
        let row: Option<AdmissionsUserRow> = sqlx::query_as(
            r#"
            SELECT 
                id::text AS id, name, email, password, role_name, is_active
            FROM users
            WHERE email = $1
            ORDER BY is_active DESC
            LIMIT 1
            "#
        )
        .bind(identifier)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| store_error("admissions", e))?;

        Ok(row.map(Identity::from))
    }
}
