//! Database connection pools and the credential store chain

use sqlx::{postgres::PgPoolOptions, PgPool};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

use sso_core::repositories::CredentialStore;
use sso_shared::config::DatabaseSettings;

use super::postgres::{PgAdmissionsUserStore, PgRbacUserStore, PgStudentCredentialStore};

/// Waiting for a connection counts against the lookup budget too, so the
/// acquire timeout is the lookup timeout.
pub async fn create_pool(url: &str, max_connections: u32, acquire_timeout: Duration) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(max_connections)
        .acquire_timeout(acquire_timeout)
        .connect(url)
        .await
}

/// Builds the stores in priority order: staff, applicants (when an
/// admissions database is configured), students.
pub async fn connect_credential_stores(
    settings: &DatabaseSettings,
) -> Result<Vec<Arc<dyn CredentialStore>>, sqlx::Error> {
    let timeout = Duration::from_millis(settings.lookup_timeout_ms);

    let main_pool = create_pool(&settings.url, settings.max_connections, timeout).await?;
    info!("Connected to credential database");

    let mut stores: Vec<Arc<dyn CredentialStore>> = vec![Arc::new(PgRbacUserStore::new(main_pool.clone()))];

    match settings.admissions_url.as_deref() {
        Some(url) => {
            let admissions_pool = create_pool(url, settings.max_connections, timeout).await?;
            info!("Connected to admissions database");
            stores.push(Arc::new(PgAdmissionsUserStore::new(admissions_pool)));
        }
        None => info!("No admissions database configured, applicant store disabled"),
    }

    stores.push(Arc::new(PgStudentCredentialStore::new(main_pool)));
    Ok(stores)
}
