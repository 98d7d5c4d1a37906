// ============================================================================
// SSO Core - Portal Grant
// File: crates/sso-core/src/domain/portal.rs
// ============================================================================

use serde::Serialize;

use sso_shared::config::PortalEntry;

/// A portal identities may receive tokens for, with its display metadata
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PortalGrant {
    pub portal_id: String,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

impl PortalGrant {
    pub fn new(portal_id: &str, title: &str) -> Self {
        Self {
            portal_id: portal_id.to_string(),
            title: title.to_string(),
            color: None,
            url: None,
        }
    }

    pub fn with_url(mut self, url: &str) -> Self {
        self.url = Some(url.to_string());
        self
    }

    /// Landing URL with the sealed token appended as a query parameter
    pub fn redirect_url(&self, param: &str, sealed_token: &str) -> Option<String> {
        self.url.as_ref().map(|url| {
            let separator = if url.contains('?') { '&' } else { '?' };
            format!("{}{}{}={}", url, separator, param, sealed_token)
        })
    }
}

impl From<&PortalEntry> for PortalGrant {
    fn from(entry: &PortalEntry) -> Self {
        Self {
            portal_id: entry.id.clone(),
            title: entry.title.clone(),
            color: entry.color.clone(),
            url: entry.url.clone(),
        }
    }
}
