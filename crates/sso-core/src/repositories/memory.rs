//! In-memory credential store for tests and local development

use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use sso_shared::SourceStore;

use super::credential_store::{CredentialStore, StoreError};
use crate::domain::Identity;

pub struct InMemoryCredentialStore {
    source: SourceStore,
    records: Vec<Identity>,
    available: AtomicBool,
    latency: Option<Duration>,
    lookups: AtomicUsize,
}

impl InMemoryCredentialStore {
    pub fn new(source: SourceStore, records: Vec<Identity>) -> Self {
        Self {
            source,
            records,
            available: AtomicBool::new(true),
            latency: None,
            lookups: AtomicUsize::new(0),
        }
    }

    /// Every lookup sleeps this long first
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Simulates an outage
    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    pub fn lookups(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CredentialStore for InMemoryCredentialStore {
    fn source(&self) -> SourceStore {
        self.source
    }

    async fn find_by_identifier(&self, identifier: &str) -> Result<Option<Identity>, StoreError> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
        if !self.available.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable(format!("{} store is down", self.source)));
        }
        Ok(self.records.iter().find(|r| r.matches(identifier)).cloned())
    }
}
