use std::sync::Arc;

use sso_core::AuthGateway;
use sso_shared::config::AppConfig;

#[derive(Clone)]
pub struct AppState {
    pub gateway: Arc<AuthGateway>,
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub fn new(gateway: AuthGateway, config: AppConfig) -> Self {
        Self {
            gateway: Arc::new(gateway),
            config: Arc::new(config),
        }
    }
}
