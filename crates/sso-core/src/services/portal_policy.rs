// ============================================================================
// SSO Core - Portal Access Policy
// File: crates/sso-core/src/services/portal_policy.rs
// Description: Static table deciding which portals an identity may enter
// ============================================================================

use std::collections::{BTreeMap, BTreeSet};
use thiserror::Error;

use sso_shared::config::PortalSettings;
use sso_shared::SourceStore;

use crate::domain::PortalGrant;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum PolicyError {
    #[error("Grant references unknown portal: {0}")]
    UnknownPortal(String),

    #[error("Portal defined twice in catalog: {0}")]
    DuplicatePortal(String),
}

/// One row of the grant table
#[derive(Debug, Clone)]
pub struct GrantRule {
    pub store: SourceStore,
    /// `None` applies to every role of the store
    pub role: Option<String>,
    pub portals: Vec<String>,
}

impl GrantRule {
    pub fn new(store: SourceStore, role: Option<&str>, portals: &[&str]) -> Self {
        Self {
            store,
            role: role.map(str::to_string),
            portals: portals.iter().map(|p| p.to_string()).collect(),
        }
    }

    fn applies_to(&self, store: SourceStore, role: &str) -> bool {
        self.store == store && self.role.as_deref().map_or(true, |r| r == role)
    }
}

#[derive(Debug, Clone)]
pub struct PortalAccessPolicy {
    catalog: BTreeMap<String, PortalGrant>,
    rules: Vec<GrantRule>,
}

impl PortalAccessPolicy {
    /// Every portal a rule names must exist in the catalog.
    pub fn new(catalog: Vec<PortalGrant>, rules: Vec<GrantRule>) -> Result<Self, PolicyError> {
        let mut by_id = BTreeMap::new();
        for portal in catalog {
            if by_id.contains_key(&portal.portal_id) {
                return Err(PolicyError::DuplicatePortal(portal.portal_id));
            }
            by_id.insert(portal.portal_id.clone(), portal);
        }

        for rule in &rules {
            if let Some(unknown) = rule.portals.iter().find(|p| !by_id.contains_key(*p)) {
                return Err(PolicyError::UnknownPortal(unknown.clone()));
            }
        }

        Ok(Self {
            catalog: by_id,
            rules,
        })
    }

    pub fn from_settings(settings: &PortalSettings) -> Result<Self, PolicyError> {
        let catalog = settings.catalog.iter().map(PortalGrant::from).collect();
        let rules = settings
            .grants
            .iter()
            .map(|g| GrantRule {
                store: g.store,
                role: g.role.clone(),
                portals: g.portals.clone(),
            })
            .collect();
        Self::new(catalog, rules)
    }

    /// Union of every rule matching the store and role
    pub fn grants_for(&self, store: SourceStore, role: &str) -> BTreeSet<String> {
        self.rules
            .iter()
            .filter(|rule| rule.applies_to(store, role))
            .flat_map(|rule| rule.portals.iter().cloned())
            .collect()
    }

    /// Same as [`grants_for`](Self::grants_for), with catalog metadata
    pub fn portals_for(&self, store: SourceStore, role: &str) -> Vec<PortalGrant> {
        self.grants_for(store, role)
            .iter()
            .filter_map(|id| self.catalog.get(id).cloned())
            .collect()
    }

    /// Anything not in the table is denied
    pub fn authorize(&self, store: SourceStore, role: &str, portal_id: &str) -> bool {
        self.catalog.contains_key(portal_id)
            && self
                .rules
                .iter()
                .any(|rule| rule.applies_to(store, role) && rule.portals.iter().any(|p| p == portal_id))
    }

    pub fn portal(&self, portal_id: &str) -> Option<&PortalGrant> {
        self.catalog.get(portal_id)
    }
}
