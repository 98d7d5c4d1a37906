use anyhow::Context;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

use sso_api::{build_router, AppState};
use sso_core::services::{AuthGateway, CredentialResolver, PortalAccessPolicy};
use sso_infrastructure::connect_credential_stores;
use sso_security::{EnvelopeCipher, TokenIssuer, TokenTtls};
use sso_shared::config::AppConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // `sso-server generate-key` prints a fresh envelope key and exits
    if std::env::args().nth(1).as_deref() == Some("generate-key") {
        println!("{}", EnvelopeCipher::generate_key());
        return Ok(());
    }

    let config = AppConfig::load().context("failed to load configuration")?;

    // Initialize telemetry; the guard flushes file logs on drop
    let _log_guard = sso_shared::telemetry::init_telemetry(&config.app)?;

    info!("{} starting ({})", config.app.name, config.app.env);

    let gateway = build_gateway(&config).await?;
    let state = AppState::new(gateway, config.clone());
    let app = build_router(state).context("invalid router settings")?;

    // Bind address
    let host: std::net::IpAddr = config.app.host.parse()?;
    let addr = SocketAddr::from((host, config.app.port));
    info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Shut down cleanly");
    Ok(())
}

async fn build_gateway(config: &AppConfig) -> anyhow::Result<AuthGateway> {
    let stores = connect_credential_stores(&config.database)
        .await
        .context("failed to connect credential databases")?;
    info!("Credential store chain: {} stores", stores.len());

    let resolver = CredentialResolver::new(stores, Duration::from_millis(config.database.lookup_timeout_ms));
    let policy = PortalAccessPolicy::from_settings(&config.portals).context("invalid portal grant table")?;

    let jwt = &config.jwt;
    let issuer = TokenIssuer::new(
        &jwt.secret,
        jwt.issuer.clone(),
        TokenTtls::from_seconds(jwt.access_token_expiry, jwt.refresh_token_expiry, jwt.sso_token_expiry),
    )
    .context("invalid token settings")?;

    let cipher = match config.envelope.key.as_deref() {
        Some(key) => EnvelopeCipher::from_secret(key).context("invalid envelope key")?,
        None => {
            info!("No envelope key configured, deriving one from the signing secret");
            EnvelopeCipher::derive_from_passphrase(&jwt.secret).context("invalid signing secret")?
        }
    };

    let gateway = AuthGateway::new(resolver, Arc::new(policy), Arc::new(issuer), Arc::new(cipher))?;
    Ok(gateway)
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
