//! HTTP error mapping
//!
//! Only the client-safe outcome reaches the response body; the detail goes to the log.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;
use validator::ValidationErrors;

use sso_core::{AuthError, ClientOutcome};

use crate::response::ApiResponse;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Missing or malformed bearer token")]
    MissingToken,
}

impl From<ValidationErrors> for ApiError {
    fn from(errors: ValidationErrors) -> Self {
        ApiError::Validation(validation_message(&errors))
    }
}

// First message of the first failing field, in field-name order for stable output
fn validation_message(errors: &ValidationErrors) -> String {
    let mut fields: Vec<_> = errors.field_errors().into_iter().collect();
    fields.sort_by(|a, b| a.0.cmp(&b.0));
    fields
        .first()
        .and_then(|(field, errs)| {
            errs.first().map(|e| match &e.message {
                Some(message) => message.to_string(),
                None => format!("{} is invalid", field),
            })
        })
        .unwrap_or_else(|| "Validation failed".to_string())
}

fn status_for(outcome: ClientOutcome) -> StatusCode {
    match outcome {
        ClientOutcome::InvalidCredentials | ClientOutcome::TokenExpired | ClientOutcome::InvalidToken => {
            StatusCode::UNAUTHORIZED
        }
        ClientOutcome::Forbidden => StatusCode::FORBIDDEN,
        ClientOutcome::Internal => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, message) = match self {
            ApiError::Auth(err) => {
                let outcome = err.outcome();
                match outcome {
                    ClientOutcome::Internal => tracing::error!("Internal error: {}", err),
                    _ => tracing::warn!("Request rejected: {}", err),
                }
                (status_for(outcome), outcome.code(), outcome.message().to_string())
            }
            ApiError::Validation(msg) => {
                tracing::warn!("Bad request: {}", msg);
                (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg)
            }
            ApiError::MissingToken => {
                tracing::warn!("Request without bearer token");
                (
                    StatusCode::UNAUTHORIZED,
                    ClientOutcome::InvalidToken.code(),
                    "Access token is required".to_string(),
                )
            }
        };

        (status, Json(ApiResponse::<()>::error(code, &message))).into_response()
    }
}
