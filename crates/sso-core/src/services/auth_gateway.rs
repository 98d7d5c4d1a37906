// ============================================================================
// SSO Core - Auth Gateway
// File: crates/sso-core/src/services/auth_gateway.rs
// ============================================================================
//! Login, portal token minting and portal token verification

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use tracing::{info, warn};

use sso_security::{
    Claims, EnvelopeCipher, PasswordService, TokenIssuer, TokenKind, TokenScope, LEGACY_BCRYPT_COST,
};
use sso_shared::constants::PORTAL_TOKEN_QUERY_PARAM;
use sso_shared::utils::mask_identifier;

use super::credential_resolver::{verify_hash, CredentialResolver};
use super::portal_policy::PortalAccessPolicy;
use crate::domain::{Identity, IdentitySummary};
use crate::error::AuthError;

// Verified against when the identifier is unknown, so both failure paths cost
// the same bcrypt check the stores' hashes do
const DUMMY_PASSWORD: &str = "sso-gateway-timing-equalizer";

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResult {
    pub user: IdentitySummary,
    pub access_token: String,
    pub refresh_token: String,
    /// Access token lifetime in seconds
    pub expires_in: i64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshResult {
    pub access_token: String,
    pub expires_in: i64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PortalToken {
    pub sealed_token: String,
    pub portal_id: String,
    pub expires_in: i64,
    pub expires_at: DateTime<Utc>,
    /// Portal landing URL with the sealed token attached, when the portal has one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub redirect_url: Option<String>,
}

/// Claims of a verified access token. Only [`AuthGateway::authenticate`]
/// hands these out.
#[derive(Debug, Clone)]
pub struct VerifiedCaller {
    claims: Claims,
}

impl VerifiedCaller {
    pub fn claims(&self) -> &Claims {
        &self.claims
    }

    pub fn into_claims(self) -> Claims {
        self.claims
    }
}

/// Composes resolver, policy, issuer and cipher. Holds no per-request state.
pub struct AuthGateway {
    resolver: CredentialResolver,
    policy: Arc<PortalAccessPolicy>,
    issuer: Arc<TokenIssuer>,
    cipher: Arc<EnvelopeCipher>,
    dummy_hash: String,
}

impl AuthGateway {
    pub fn new(
        resolver: CredentialResolver,
        policy: Arc<PortalAccessPolicy>,
        issuer: Arc<TokenIssuer>,
        cipher: Arc<EnvelopeCipher>,
    ) -> Result<Self, AuthError> {
        let dummy_hash =
            PasswordService::hash_bcrypt(DUMMY_PASSWORD, LEGACY_BCRYPT_COST)
                .map_err(|e| AuthError::Internal(e.to_string()))?;
        Ok(Self {
            resolver,
            policy,
            issuer,
            cipher,
            dummy_hash,
        })
    }

    /// Resolve + verify, then mint an access/refresh pair
    pub async fn login(&self, identifier: &str, password: &str) -> Result<LoginResult, AuthError> {
        let identity = self.check_credentials(identifier, password).await?;

        let subject = identity.subject();
        let access = self.issuer.mint(&subject, TokenScope::Access)?;
        let refresh = self.issuer.mint(&subject, TokenScope::Refresh)?;

        let portals = self.policy.portals_for(identity.source_store, &identity.role);
        info!(
            "Login succeeded for {} via {} store ({} portals)",
            mask_identifier(identifier),
            identity.source_store,
            portals.len()
        );

        Ok(LoginResult {
            user: IdentitySummary::new(&identity, portals),
            access_token: access.token,
            refresh_token: refresh.token,
            expires_in: self.issuer.ttl(TokenKind::Access).num_seconds(),
        })
    }

    /// Same checks as login, no tokens
    pub async fn validate_credentials(
        &self,
        identifier: &str,
        password: &str,
    ) -> Result<IdentitySummary, AuthError> {
        let identity = self.check_credentials(identifier, password).await?;
        let portals = self.policy.portals_for(identity.source_store, &identity.role);
        Ok(IdentitySummary::new(&identity, portals))
    }

    pub fn authenticate(&self, access_token: &str) -> Result<VerifiedCaller, AuthError> {
        let claims = self.issuer.verify(access_token, TokenKind::Access).map_err(|e| {
            warn!("Access token rejected: {}", e);
            AuthError::from(e)
        })?;
        Ok(VerifiedCaller { claims })
    }

    /// The refresh token is not rotated
    pub fn refresh(&self, refresh_token: &str) -> Result<RefreshResult, AuthError> {
        let claims = self.issuer.verify(refresh_token, TokenKind::Refresh).map_err(|e| {
            warn!("Refresh token rejected: {}", e);
            AuthError::from(e)
        })?;

        let access = self.issuer.mint(&claims.subject(), TokenScope::Access)?;
        Ok(RefreshResult {
            access_token: access.token,
            expires_in: self.issuer.ttl(TokenKind::Access).num_seconds(),
        })
    }

    /// Authorizes against the grant table on every call, then mints and seals
    /// an SSO token scoped to `portal_id`.
    pub fn mint_portal_token(&self, access_token: &str, portal_id: &str) -> Result<PortalToken, AuthError> {
        let caller = self.authenticate(access_token)?;
        self.issue_portal_token(&caller, portal_id)
    }

    /// For callers already authenticated through [`AuthGateway::authenticate`]
    pub fn issue_portal_token(
        &self,
        caller: &VerifiedCaller,
        portal_id: &str,
    ) -> Result<PortalToken, AuthError> {
        let caller = caller.claims();
        if !self.policy.authorize(caller.source, &caller.role, portal_id) {
            warn!(
                "Portal token denied: {} ({} / {}) asked for {}",
                mask_identifier(&caller.username),
                caller.source,
                caller.role,
                portal_id
            );
            return Err(AuthError::Forbidden);
        }

        let issued = self.issuer.mint(
            &caller.subject(),
            TokenScope::Sso {
                portal_id: portal_id.to_string(),
            },
        )?;
        let sealed_token = self.cipher.seal_str(&issued.token)?;
        let expires_at = DateTime::from_timestamp(issued.claims.exp, 0)
            .ok_or_else(|| AuthError::Internal("token expiry out of range".to_string()))?;
        let redirect_url = self
            .policy
            .portal(portal_id)
            .and_then(|portal| portal.redirect_url(PORTAL_TOKEN_QUERY_PARAM, &sealed_token));

        info!("Issued {} token for {}", portal_id, mask_identifier(&caller.username));

        Ok(PortalToken {
            sealed_token,
            portal_id: portal_id.to_string(),
            expires_in: self.issuer.ttl(TokenKind::Sso).num_seconds(),
            expires_at,
            redirect_url,
        })
    }

    /// Open the envelope, then verify the inner token as an SSO token
    pub fn verify_portal_token(&self, sealed_token: &str) -> Result<Claims, AuthError> {
        let token = self.cipher.open_str(sealed_token).map_err(|e| {
            warn!("Sealed token rejected: {}", e);
            AuthError::from(e)
        })?;

        self.issuer.verify(&token, TokenKind::Sso).map_err(|e| {
            warn!("Portal token rejected: {}", e);
            AuthError::from(e)
        })
    }

    async fn check_credentials(&self, identifier: &str, password: &str) -> Result<Identity, AuthError> {
        let masked = mask_identifier(identifier);

        let identity = match self.resolver.resolve(identifier).await {
            Ok(identity) => identity,
            Err(AuthError::NotFound) => {
                let _ = self.verify_off_thread(self.dummy_hash.clone(), password).await;
                warn!("Login failed for {}: no matching identity", masked);
                return Err(AuthError::NotFound);
            }
            Err(e) => {
                warn!("Login failed for {}: {}", masked, e);
                return Err(e);
            }
        };

        if !self.verify_off_thread(identity.password_hash.clone(), password).await? {
            warn!("Login failed for {}: wrong password ({} store)", masked, identity.source_store);
            return Err(AuthError::BadCredentials);
        }
        Ok(identity)
    }

    // Password hashing is deliberately slow; keep it off the async workers
    async fn verify_off_thread(&self, hash: String, password: &str) -> Result<bool, AuthError> {
        let plaintext = password.to_string();
        tokio::task::spawn_blocking(move || verify_hash(&hash, &plaintext))
            .await
            .map_err(|e| AuthError::Internal(format!("password check aborted: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repositories::{CredentialStore, InMemoryCredentialStore};
    use sso_security::{ManualClock, TokenTtls};
    use sso_shared::config::PortalSettings;
    use sso_shared::SourceStore;
    use std::time::Duration;

    struct Fixture {
        gateway: AuthGateway,
        clock: Arc<ManualClock>,
        staff: Arc<InMemoryCredentialStore>,
    }

    fn fixture() -> Fixture {
        let staff = Arc::new(InMemoryCredentialStore::new(
            SourceStore::Staff,
            vec![Identity {
                id: "7".to_string(),
                display_name: "Registrar".to_string(),
                login_identifiers: vec!["registrar".to_string(), "registrar@college.edu".to_string()],
                password_hash: PasswordService::hash("Regi$trar1").unwrap(),
                role: "admin".to_string(),
                source_store: SourceStore::Staff,
                active: true,
            }],
        ));
        let stores: Vec<Arc<dyn CredentialStore>> = vec![staff.clone()];
        let resolver = CredentialResolver::new(stores, Duration::from_millis(500));

        let clock = Arc::new(ManualClock::new(DateTime::from_timestamp(1_700_000_000, 0).unwrap()));
        let issuer = TokenIssuer::new("gateway-unit-secret", "test", TokenTtls::from_seconds(3600, 604800, 900))
            .unwrap()
            .with_clock(clock.clone());
        let policy = PortalAccessPolicy::from_settings(&PortalSettings::default()).unwrap();
        let cipher = EnvelopeCipher::from_key(&[3u8; 32]);

        let gateway =
            AuthGateway::new(resolver, Arc::new(policy), Arc::new(issuer), Arc::new(cipher)).unwrap();
        Fixture { gateway, clock, staff }
    }

    #[tokio::test]
    async fn test_login_returns_summary_and_token_pair() {
        let f = fixture();
        let result = f.gateway.login("registrar@college.edu", "Regi$trar1").await.unwrap();

        assert_eq!(result.user.id, "7");
        assert_eq!(result.user.source_store, SourceStore::Staff);
        assert_eq!(result.user.portals.len(), 4);
        assert_eq!(result.expires_in, 3600);

        let caller = f.gateway.authenticate(&result.access_token).unwrap();
        assert_eq!(caller.claims().sub, "7");
        assert!(f.gateway.authenticate(&result.refresh_token).is_err());
    }

    #[test]
    fn test_dummy_hash_matches_store_hash_cost() {
        let f = fixture();
        assert!(f.gateway.dummy_hash.starts_with("$2b$10$"));
    }

    #[tokio::test]
    async fn test_only_authenticated_callers_get_portal_tokens() {
        let f = fixture();
        let login = f.gateway.login("registrar", "Regi$trar1").await.unwrap();

        assert!(matches!(
            f.gateway.authenticate(&login.refresh_token),
            Err(AuthError::TokenInvalid(_))
        ));

        let caller = f.gateway.authenticate(&login.access_token).unwrap();
        let minted = f.gateway.issue_portal_token(&caller, "hrms").unwrap();
        let claims = f.gateway.verify_portal_token(&minted.sealed_token).unwrap();
        assert_eq!(claims.sub, caller.into_claims().sub);
    }

    #[tokio::test]
    async fn test_wrong_password_and_unknown_user_look_the_same() {
        let f = fixture();
        let wrong = f.gateway.login("registrar", "nope-nope").await.unwrap_err();
        let unknown = f.gateway.login("ghost", "Regi$trar1").await.unwrap_err();

        assert!(matches!(wrong, AuthError::BadCredentials));
        assert!(matches!(unknown, AuthError::NotFound));
        assert_eq!(wrong.outcome(), unknown.outcome());
    }

    #[tokio::test]
    async fn test_store_outage_maps_to_invalid_credentials() {
        let f = fixture();
        f.staff.set_available(false);
        let err = f.gateway.login("registrar", "Regi$trar1").await.unwrap_err();
        assert!(matches!(err, AuthError::ResolverUnavailable(_)));
        assert_eq!(err.outcome(), crate::error::ClientOutcome::InvalidCredentials);
    }

    #[tokio::test]
    async fn test_validate_credentials_mints_nothing() {
        let f = fixture();
        let summary = f.gateway.validate_credentials("registrar", "Regi$trar1").await.unwrap();
        assert_eq!(summary.username, "registrar");
        assert_eq!(summary.role, "admin");
    }

    #[tokio::test]
    async fn test_refresh_issues_new_access_token() {
        let f = fixture();
        let login = f.gateway.login("registrar", "Regi$trar1").await.unwrap();

        f.clock.advance(chrono::Duration::hours(2));
        assert!(matches!(f.gateway.authenticate(&login.access_token), Err(AuthError::TokenExpired)));

        let refreshed = f.gateway.refresh(&login.refresh_token).unwrap();
        let caller = f.gateway.authenticate(&refreshed.access_token).unwrap();
        assert_eq!(caller.claims().sub, "7");

        // An access token is not a refresh token
        assert!(matches!(
            f.gateway.refresh(&refreshed.access_token),
            Err(AuthError::TokenInvalid(_))
        ));
    }

    #[tokio::test]
    async fn test_portal_token_carries_redirect() {
        let f = fixture();
        let login = f.gateway.login("registrar", "Regi$trar1").await.unwrap();
        let minted = f.gateway.mint_portal_token(&login.access_token, "hrms").unwrap();

        assert_eq!(minted.expires_in, 900);
        assert_eq!(minted.expires_at.timestamp(), 1_700_000_000 + 900);
        assert_eq!(
            minted.redirect_url.as_deref(),
            Some(format!("https://hrms.pydahsoft.in?token={}", minted.sealed_token).as_str())
        );
    }

    #[tokio::test]
    async fn test_sso_token_expires_before_access_token() {
        let f = fixture();
        let login = f.gateway.login("registrar", "Regi$trar1").await.unwrap();
        let minted = f.gateway.mint_portal_token(&login.access_token, "hrms").unwrap();

        f.clock.advance(chrono::Duration::seconds(900));
        assert!(matches!(
            f.gateway.verify_portal_token(&minted.sealed_token),
            Err(AuthError::TokenExpired)
        ));
        assert!(f.gateway.authenticate(&login.access_token).is_ok());
    }

    #[tokio::test]
    async fn test_raw_sso_token_is_not_a_sealed_token() {
        let f = fixture();
        let login = f.gateway.login("registrar", "Regi$trar1").await.unwrap();

        // The bare access token is a JWT, not an envelope
        assert!(matches!(
            f.gateway.verify_portal_token(&login.access_token),
            Err(AuthError::DecryptionFailed)
        ));
    }
}
