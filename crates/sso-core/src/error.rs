//! Domain errors
//!
//! Internally every failure keeps its precise kind for logging. At the
//! boundary they collapse to [`ClientOutcome`] so callers cannot tell which
//! store or which check rejected them.

use thiserror::Error;

use sso_security::{EnvelopeError, JwtError};

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Identity not found")]
    NotFound,

    #[error("Invalid credentials")]
    BadCredentials,

    #[error("Credential store unavailable: {0}")]
    ResolverUnavailable(String),

    #[error("Portal access denied")]
    Forbidden,

    #[error("Token expired")]
    TokenExpired,

    #[error("Invalid token: {0}")]
    TokenInvalid(String),

    #[error("Failed to decrypt token")]
    DecryptionFailed,

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Client-safe outcome of a failed operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientOutcome {
    InvalidCredentials,
    Forbidden,
    TokenExpired,
    InvalidToken,
    Internal,
}

impl ClientOutcome {
    pub fn code(&self) -> &'static str {
        match self {
            ClientOutcome::InvalidCredentials => "INVALID_CREDENTIALS",
            ClientOutcome::Forbidden => "FORBIDDEN",
            ClientOutcome::TokenExpired => "TOKEN_EXPIRED",
            ClientOutcome::InvalidToken => "INVALID_TOKEN",
            ClientOutcome::Internal => "INTERNAL_ERROR",
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            ClientOutcome::InvalidCredentials => "Invalid username or password",
            ClientOutcome::Forbidden => "You do not have access to this portal",
            ClientOutcome::TokenExpired => "Token has expired",
            ClientOutcome::InvalidToken => "Invalid or expired token",
            ClientOutcome::Internal => "Internal server error",
        }
    }
}

impl AuthError {
    pub fn outcome(&self) -> ClientOutcome {
        match self {
            AuthError::NotFound | AuthError::BadCredentials | AuthError::ResolverUnavailable(_) => {
                ClientOutcome::InvalidCredentials
            }
            AuthError::Forbidden => ClientOutcome::Forbidden,
            AuthError::TokenExpired => ClientOutcome::TokenExpired,
            AuthError::TokenInvalid(_) | AuthError::DecryptionFailed => ClientOutcome::InvalidToken,
            AuthError::Internal(_) => ClientOutcome::Internal,
        }
    }
}

impl From<JwtError> for AuthError {
    fn from(e: JwtError) -> Self {
        match e {
            JwtError::TokenExpired => AuthError::TokenExpired,
            JwtError::ValidationError(_) | JwtError::KindMismatch { .. } => {
                AuthError::TokenInvalid(e.to_string())
            }
            JwtError::CreationError(_) | JwtError::ConfigError(_) => AuthError::Internal(e.to_string()),
        }
    }
}

impl From<EnvelopeError> for AuthError {
    fn from(e: EnvelopeError) -> Self {
        match e {
            EnvelopeError::DecryptionFailed => AuthError::DecryptionFailed,
            EnvelopeError::EncryptionFailed | EnvelopeError::KeyError(_) => {
                AuthError::Internal(e.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sso_security::TokenKind;

    #[test]
    fn test_credential_failures_are_indistinguishable() {
        let outcomes = [
            AuthError::NotFound.outcome(),
            AuthError::BadCredentials.outcome(),
            AuthError::ResolverUnavailable("staff store timed out".into()).outcome(),
        ];
        assert!(outcomes.iter().all(|o| *o == ClientOutcome::InvalidCredentials));
    }

    #[test]
    fn test_token_failures() {
        assert_eq!(AuthError::from(JwtError::TokenExpired).outcome(), ClientOutcome::TokenExpired);
        let mismatch = JwtError::KindMismatch { expected: TokenKind::Sso, actual: TokenKind::Access };
        assert_eq!(AuthError::from(mismatch).outcome(), ClientOutcome::InvalidToken);
        assert_eq!(
            AuthError::from(EnvelopeError::DecryptionFailed).outcome(),
            ClientOutcome::InvalidToken
        );
        assert_eq!(AuthError::Forbidden.outcome(), ClientOutcome::Forbidden);
    }
}
