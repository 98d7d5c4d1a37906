//! JWT token handling
//!
//! Three kinds of token share one signing secret: ACCESS and REFRESH for the
//! gateway session, SSO for a single portal hand-off. The kind travels in the
//! `type` claim and is checked on every verification.

use chrono::Duration;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use thiserror::Error;
use uuid::Uuid;

use sso_shared::constants::{TOKEN_TYPE_ACCESS, TOKEN_TYPE_REFRESH, TOKEN_TYPE_SSO};
use sso_shared::SourceStore;

use crate::clock::{Clock, SystemClock};

#[derive(Error, Debug)]
pub enum JwtError {
    #[error("Token creation failed: {0}")]
    CreationError(String),
    #[error("Token validation failed: {0}")]
    ValidationError(String),
    #[error("Token expired")]
    TokenExpired,
    #[error("Expected {expected} token, got {actual}")]
    KindMismatch { expected: TokenKind, actual: TokenKind },
    #[error("Invalid token configuration: {0}")]
    ConfigError(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    Access,
    Refresh,
    Sso,
}

impl TokenKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TokenKind::Access => TOKEN_TYPE_ACCESS,
            TokenKind::Refresh => TOKEN_TYPE_REFRESH,
            TokenKind::Sso => TOKEN_TYPE_SSO,
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What a token is minted for. Only SSO tokens are bound to a portal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenScope {
    Access,
    Refresh,
    Sso { portal_id: String },
}

impl TokenScope {
    pub fn kind(&self) -> TokenKind {
        match self {
            TokenScope::Access => TokenKind::Access,
            TokenScope::Refresh => TokenKind::Refresh,
            TokenScope::Sso { .. } => TokenKind::Sso,
        }
    }

    fn portal_id(&self) -> Option<String> {
        match self {
            TokenScope::Sso { portal_id } => Some(portal_id.clone()),
            _ => None,
        }
    }
}

/// The identity a token speaks for
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Subject {
    pub id: String,
    pub username: String,
    pub role: String,
    pub source: SourceStore,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub username: String,
    pub role: String,
    pub source: SourceStore,
    #[serde(rename = "type")]
    pub kind: TokenKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub portal_id: Option<String>,
    pub iss: String,
    pub jti: String,
    pub iat: i64,
    pub exp: i64,
}

impl Claims {
    pub fn subject(&self) -> Subject {
        Subject {
            id: self.sub.clone(),
            username: self.username.clone(),
            role: self.role.clone(),
            source: self.source,
        }
    }

    fn check_shape(&self) -> Result<(), JwtError> {
        match (self.kind, self.portal_id.as_deref()) {
            (TokenKind::Sso, Some(portal)) if !portal.is_empty() => Ok(()),
            (TokenKind::Sso, _) => Err(JwtError::ValidationError(
                "sso token without target portal".to_string(),
            )),
            (_, None) => Ok(()),
            (kind, Some(_)) => Err(JwtError::ValidationError(format!(
                "{} token must not carry a portal",
                kind
            ))),
        }
    }
}

/// Per-kind lifetimes
#[derive(Debug, Clone, Copy)]
pub struct TokenTtls {
    pub access: Duration,
    pub refresh: Duration,
    pub sso: Duration,
}

impl TokenTtls {
    pub fn from_seconds(access: i64, refresh: i64, sso: i64) -> Self {
        Self {
            access: Duration::seconds(access),
            refresh: Duration::seconds(refresh),
            sso: Duration::seconds(sso),
        }
    }

    pub fn for_kind(&self, kind: TokenKind) -> Duration {
        match kind {
            TokenKind::Access => self.access,
            TokenKind::Refresh => self.refresh,
            TokenKind::Sso => self.sso,
        }
    }
}

/// A freshly minted token together with the claims it carries
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub claims: Claims,
}

pub struct TokenIssuer {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    issuer: String,
    ttls: TokenTtls,
    clock: Arc<dyn Clock>,
}

impl TokenIssuer {
    pub fn new(secret: &str, issuer: impl Into<String>, ttls: TokenTtls) -> Result<Self, JwtError> {
        if secret.is_empty() {
            return Err(JwtError::ConfigError("signing secret is empty".to_string()));
        }
        for kind in [TokenKind::Access, TokenKind::Refresh, TokenKind::Sso] {
            if ttls.for_kind(kind) <= Duration::zero() {
                return Err(JwtError::ConfigError(format!("{} ttl must be positive", kind)));
            }
        }

        let issuer = issuer.into();

        // Expiry is checked against our own clock after the signature, so the
        // library must not do it with the wall clock.
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.validate_aud = false;
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "iss", "sub"]);
        validation.set_issuer(&[issuer.as_str()]);

        Ok(Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            issuer,
            ttls,
            clock: Arc::new(SystemClock),
        })
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn ttl(&self, kind: TokenKind) -> Duration {
        self.ttls.for_kind(kind)
    }

    pub fn mint(&self, subject: &Subject, scope: TokenScope) -> Result<IssuedToken, JwtError> {
        let kind = scope.kind();
        let iat = self.clock.now().timestamp();
        let claims = Claims {
            sub: subject.id.clone(),
            username: subject.username.clone(),
            role: subject.role.clone(),
            source: subject.source,
            kind,
            portal_id: scope.portal_id(),
            iss: self.issuer.clone(),
            jti: Uuid::new_v4().to_string(),
            iat,
            exp: iat + self.ttls.for_kind(kind).num_seconds(),
        };
        claims.check_shape()?;

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| JwtError::CreationError(e.to_string()))?;
        Ok(IssuedToken { token, claims })
    }

    /// Signature first, then kind and claim shape, then expiry.
    pub fn verify(&self, token: &str, expected: TokenKind) -> Result<Claims, JwtError> {
        let claims = decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| JwtError::ValidationError(e.to_string()))?;

        if claims.kind != expected {
            return Err(JwtError::KindMismatch {
                expected,
                actual: claims.kind,
            });
        }
        claims.check_shape()?;

        if self.clock.now().timestamp() >= claims.exp {
            return Err(JwtError::TokenExpired);
        }
        Ok(claims)
    }
}
