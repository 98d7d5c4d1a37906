//! Request extractors

use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};

use sso_core::VerifiedCaller;

use crate::error::ApiError;
use crate::state::AppState;

/// Caller behind the `Authorization: Bearer <access token>` header
pub struct AuthenticatedUser(pub VerifiedCaller);

impl FromRequestParts<AppState> for AuthenticatedUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .ok_or(ApiError::MissingToken)?;

        let caller = state.gateway.authenticate(token)?;
        Ok(AuthenticatedUser(caller))
    }
}
