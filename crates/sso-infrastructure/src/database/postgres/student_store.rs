// ============================================================================
// SSO Infrastructure - Student Credential Store
// File: crates/sso-infrastructure/src/database/postgres/student_store.rs
// ============================================================================

use async_trait::async_trait;
use sqlx::{FromRow, PgPool};

use sso_core::domain::Identity;
use sso_core::repositories::{CredentialStore, StoreError};
use sso_shared::constants::STUDENT_ROLE;
use sso_shared::SourceStore;

use super::store_error;

/// Student logins, matched by username or admission number
pub struct PgStudentCredentialStore {
    pool: PgPool,
}

impl PgStudentCredentialStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct StudentCredentialRow {
    pub id: String,
    pub student_id: Option<String>,
    pub admission_number: String,
    pub username: Option<String>,
    pub password_hash: String,
}

impl From<StudentCredentialRow> for Identity {
    fn from(row: StudentCredentialRow) -> Self {
        let mut login_identifiers = Vec::with_capacity(2);
        if let Some(username) = row.username.filter(|u| !u.is_empty()) {
            login_identifiers.push(username);
        }
        login_identifiers.push(row.admission_number.clone());

        Identity {
            // The student record id is what the portals know students by
            id: row.student_id.unwrap_or(row.id),
            display_name: row.admission_number,
            login_identifiers,
            password_hash: row.password_hash,
            role: STUDENT_ROLE.to_string(),
            source_store: SourceStore::Student,
            active: true,
        }
    }
}

#[async_trait]
impl CredentialStore for PgStudentCredentialStore {
    fn source(&self) -> SourceStore {
        SourceStore::Student
    }

    async fn find_by_identifier(&self, identifier: &str) -> Result<Option<Identity>, StoreError> {
        let row: Option<StudentCredentialRow> = sqlx::query_as(
            r#"
            SELECT 
                id::text AS id, student_id::text AS student_id,
                admission_number, username, password_hash
            FROM student_credentials
            WHERE username = $1 OR admission_number = $1
            ORDER BY id
            LIMIT 1
            "#
        )
        .bind(identifier)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| store_error("student", e))?;

        Ok(row.map(Identity::from))
    }
}
