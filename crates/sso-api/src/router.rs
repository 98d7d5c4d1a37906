//! Route table and middleware stack

use axum::{
    http::{header, HeaderValue, Method},
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::{DefaultMakeSpan, TraceLayer},
};
use thiserror::Error;

use crate::handlers::{auth, health};
use crate::state::AppState;

#[derive(Error, Debug)]
pub enum RouterError {
    /// Credentialed CORS cannot be combined with a wildcard origin
    #[error("Wildcard CORS origin is not allowed: {0}")]
    WildcardOrigin(String),

    #[error("Invalid CORS origin: {0}")]
    InvalidOrigin(String),
}

pub fn build_router(state: AppState) -> Result<Router, RouterError> {
    let cors = cors_layer(&state.config.cors.allowed_origins)?;

    let auth_routes = Router::new()
        .route("/login", post(auth::login))
        .route("/validate-credentials", post(auth::validate_credentials))
        .route("/generate-token", post(auth::generate_token))
        .route("/verify-token", post(auth::verify_token))
        .route("/refresh", post(auth::refresh_token));

    let router = Router::new()
        .route("/health", get(health::health_check))
        .nest("/auth", auth_routes)
        .with_state(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http().make_span_with(DefaultMakeSpan::default()));
    Ok(router)
}

fn cors_layer(origins: &[String]) -> Result<CorsLayer, RouterError> {
    let allowed = origins
        .iter()
        .map(|origin| {
            if origin.contains('*') {
                return Err(RouterError::WildcardOrigin(origin.clone()));
            }
            HeaderValue::from_str(origin).map_err(|_| RouterError::InvalidOrigin(origin.clone()))
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(CorsLayer::new()
        .allow_origin(AllowOrigin::list(allowed))
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
        .allow_credentials(true))
}
