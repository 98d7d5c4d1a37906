// ============================================================================
// SSO API - Auth Handlers
// File: crates/sso-api/src/handlers/auth.rs
// ============================================================================
//! Login, credential check, portal token minting and verification

use axum::{extract::State, Json};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use sso_core::domain::IdentitySummary;
use sso_shared::SourceStore;

use crate::error::ApiError;
use crate::extract::AuthenticatedUser;
use crate::response::ApiResponse;
use crate::state::AppState;

type ApiResult<T> = Result<Json<ApiResponse<T>>, ApiError>;

/// Login request payload
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(length(min = 1, message = "Username is required"))]
    pub username: String,
    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub password: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CredentialsRequest {
    #[validate(length(min = 1, message = "Username is required"))]
    pub username: String,
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct GenerateTokenRequest {
    #[validate(length(min = 1, message = "Portal ID is required"))]
    pub portal_id: String,
}

// Identifiers are trimmed before validation so blank input fails it
impl LoginRequest {
    fn trimmed(self) -> Self {
        Self {
            username: self.username.trim().to_string(),
            ..self
        }
    }
}

impl CredentialsRequest {
    fn trimmed(self) -> Self {
        Self {
            username: self.username.trim().to_string(),
            ..self
        }
    }
}

impl GenerateTokenRequest {
    fn trimmed(self) -> Self {
        Self {
            portal_id: self.portal_id.trim().to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct VerifyTokenRequest {
    #[validate(length(min = 1, message = "Token is required"))]
    pub encrypted_token: String,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RefreshRequest {
    #[validate(length(min = 1, message = "Refresh token is required"))]
    pub refresh_token: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_in: i64,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub user: IdentitySummary,
    pub tokens: TokenPair,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CredentialsResponse {
    pub valid: bool,
    pub user_id: String,
    pub username: String,
    pub role: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateTokenResponse {
    pub encrypted_token: String,
    pub portal_id: String,
    pub expires_in: i64,
    pub expires_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub redirect_url: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyTokenResponse {
    pub valid: bool,
    pub user_id: String,
    pub username: String,
    pub portal_id: Option<String>,
    pub role: String,
    pub source_store: SourceStore,
    pub expires_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshResponse {
    pub access_token: String,
    pub expires_in: i64,
}

/// Login handler - POST /auth/login
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> ApiResult<LoginResponse> {
    let payload = payload.trimmed();
    payload.validate()?;

    let result = state.gateway.login(&payload.username, &payload.password).await?;
    Ok(Json(ApiResponse::success(LoginResponse {
        user: result.user,
        tokens: TokenPair {
            access_token: result.access_token,
            refresh_token: result.refresh_token,
            expires_in: result.expires_in,
        },
    })))
}

/// Credential check without tokens - POST /auth/validate-credentials
pub async fn validate_credentials(
    State(state): State<AppState>,
    Json(payload): Json<CredentialsRequest>,
) -> ApiResult<CredentialsResponse> {
    let payload = payload.trimmed();
    payload.validate()?;

    let user = state
        .gateway
        .validate_credentials(&payload.username, &payload.password)
        .await?;
    Ok(Json(ApiResponse::success(CredentialsResponse {
        valid: true,
        user_id: user.id,
        username: user.username,
        role: user.role,
    })))
}

/// Portal token for the bearer - POST /auth/generate-token
pub async fn generate_token(
    State(state): State<AppState>,
    AuthenticatedUser(caller): AuthenticatedUser,
    Json(payload): Json<GenerateTokenRequest>,
) -> ApiResult<GenerateTokenResponse> {
    let payload = payload.trimmed();
    payload.validate()?;

    let minted = state.gateway.issue_portal_token(&caller, &payload.portal_id)?;
    Ok(Json(ApiResponse::success(GenerateTokenResponse {
        encrypted_token: minted.sealed_token,
        portal_id: minted.portal_id,
        expires_in: minted.expires_in,
        expires_at: minted.expires_at,
        redirect_url: minted.redirect_url,
    })))
}

/// Called by portals - POST /auth/verify-token
pub async fn verify_token(
    State(state): State<AppState>,
    Json(payload): Json<VerifyTokenRequest>,
) -> ApiResult<VerifyTokenResponse> {
    payload.validate()?;

    let claims = state.gateway.verify_portal_token(&payload.encrypted_token)?;
    Ok(Json(ApiResponse::success(VerifyTokenResponse {
        valid: true,
        expires_at: DateTime::from_timestamp(claims.exp, 0),
        user_id: claims.sub,
        username: claims.username,
        portal_id: claims.portal_id,
        role: claims.role,
        source_store: claims.source,
    })))
}

/// Refresh token handler - POST /auth/refresh
pub async fn refresh_token(
    State(state): State<AppState>,
    Json(payload): Json<RefreshRequest>,
) -> ApiResult<RefreshResponse> {
    payload.validate()?;

    let refreshed = state.gateway.refresh(&payload.refresh_token)?;
    Ok(Json(ApiResponse::success(RefreshResponse {
        access_token: refreshed.access_token,
        expires_in: refreshed.expires_in,
    })))
}
