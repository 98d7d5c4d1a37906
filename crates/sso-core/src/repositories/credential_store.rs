//! Credential store trait (port)

use async_trait::async_trait;
use thiserror::Error;

use sso_shared::SourceStore;

use crate::domain::Identity;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    #[error("Malformed record: {0}")]
    Malformed(String),
}

/// One credential repository, queried by login identifier.
///
/// A store checks all of its own alias fields (username, email, admission
/// number...) within a single call. Inactive records may be returned; the
/// resolver skips them.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CredentialStore: Send + Sync {
    fn source(&self) -> SourceStore;

    async fn find_by_identifier(&self, identifier: &str) -> Result<Option<Identity>, StoreError>;
}
