//! PostgreSQL credential store implementations

pub mod admissions_store;
pub mod rbac_store;
pub mod student_store;

pub use admissions_store::PgAdmissionsUserStore;
pub use rbac_store::PgRbacUserStore;
pub use student_store::PgStudentCredentialStore;

use sso_core::repositories::StoreError;
use tracing::error;

pub(crate) fn store_error(store: &str, e: sqlx::Error) -> StoreError {
    error!("Database error in {} store: {}", store, e);
    match e {
        sqlx::Error::ColumnDecode { .. } | sqlx::Error::ColumnNotFound(_) | sqlx::Error::Decode(_) => {
            StoreError::Malformed(e.to_string())
        }
        _ => StoreError::Unavailable(e.to_string()),
    }
}
