//! Configuration management

use config::{builder::DefaultState, Config, ConfigBuilder, ConfigError, Environment, File};
use serde::Deserialize;

use crate::constants::{
    DEFAULT_ACCESS_TOKEN_EXPIRY, DEFAULT_LOOKUP_TIMEOUT_MS, DEFAULT_REFRESH_TOKEN_EXPIRY,
    DEFAULT_SSO_TOKEN_EXPIRY, DEFAULT_TOKEN_ISSUER, PORTAL_ADMISSIONS_CRM, PORTAL_HOSTEL_AUTOMATION,
    PORTAL_HRMS, PORTAL_PHARMACY, PORTAL_STUDENT,
};
use crate::types::SourceStore;

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub app: AppSettings,
    pub database: DatabaseSettings,
    pub jwt: JwtSettings,
    #[serde(default)]
    pub envelope: EnvelopeSettings,
    #[serde(default)]
    pub cors: CorsSettings,
    #[serde(default)]
    pub portals: PortalSettings,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppSettings {
    pub env: String,
    pub host: String,
    pub port: u16,
    pub name: String,
    /// `json` or `pretty`
    pub log_format: String,
    /// Daily rolling log files go here when set
    #[serde(default)]
    pub log_dir: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseSettings {
    /// Holds the staff (RBAC) and student credential tables
    pub url: String,
    /// Admissions database; the applicant store is skipped when unset
    #[serde(default)]
    pub admissions_url: Option<String>,
    pub max_connections: u32,
    pub lookup_timeout_ms: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct JwtSettings {
    pub secret: String,
    pub issuer: String,
    pub access_token_expiry: i64,
    pub refresh_token_expiry: i64,
    pub sso_token_expiry: i64,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct EnvelopeSettings {
    /// 32-byte key (raw or base64) or a passphrase to derive one from.
    /// Falls back to `jwt.secret` when unset.
    #[serde(default)]
    pub key: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct CorsSettings {
    pub allowed_origins: Vec<String>,
}

impl Default for CorsSettings {
    fn default() -> Self {
        Self {
            allowed_origins: vec![
                "http://localhost:5173".to_string(),
                "http://localhost:3000".to_string(),
                "http://localhost:3001".to_string(),
            ],
        }
    }
}

/// Portal catalog and the grant table that decides who may get a token for what
#[derive(Debug, Deserialize, Clone)]
pub struct PortalSettings {
    #[serde(default = "default_catalog")]
    pub catalog: Vec<PortalEntry>,
    #[serde(default = "default_grants")]
    pub grants: Vec<GrantEntry>,
}

impl Default for PortalSettings {
    fn default() -> Self {
        Self {
            catalog: default_catalog(),
            grants: default_grants(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct PortalEntry {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct GrantEntry {
    pub store: SourceStore,
    /// Narrows the rule to one role; applies to every role of the store when unset
    #[serde(default)]
    pub role: Option<String>,
    pub portals: Vec<String>,
}

fn portal(id: &str, title: &str, color: &str, url: Option<&str>) -> PortalEntry {
    PortalEntry {
        id: id.to_string(),
        title: title.to_string(),
        color: Some(color.to_string()),
        url: url.map(str::to_string),
    }
}

fn default_catalog() -> Vec<PortalEntry> {
    vec![
        portal(PORTAL_ADMISSIONS_CRM, "Admissions CRM", "#0ea5e9", Some("https://admissions.pydahsoft.in")),
        portal(PORTAL_STUDENT, "Student Academic Portal", "#f59e0b", Some("https://pydahsdms.vercel.app")),
        portal(PORTAL_HOSTEL_AUTOMATION, "Hostel Automation", "#6366f1", Some("https://hms.pydahsoft.in")),
        portal(PORTAL_HRMS, "HRMS & Payroll", "#ec4899", Some("https://hrms.pydahsoft.in")),
        portal(PORTAL_PHARMACY, "Pharmacy", "#10b981", None),
    ]
}

fn default_grants() -> Vec<GrantEntry> {
    let grant = |store, portals: &[&str]| GrantEntry {
        store,
        role: None,
        portals: portals.iter().map(|p| p.to_string()).collect(),
    };
    vec![
        grant(
            SourceStore::Staff,
            &[PORTAL_ADMISSIONS_CRM, PORTAL_HOSTEL_AUTOMATION, PORTAL_HRMS, PORTAL_STUDENT],
        ),
        grant(SourceStore::Applicant, &[PORTAL_ADMISSIONS_CRM]),
        grant(SourceStore::Student, &[PORTAL_STUDENT]),
    ]
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let env = std::env::var("APP_ENV").unwrap_or_else(|_| "development".into());
        let config = Self::with_defaults(Config::builder())?
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", env)).required(false))
            .add_source(Environment::default().separator("__").try_parsing(true))
            .build()?;
        config.try_deserialize()
    }

    fn with_defaults(
        builder: ConfigBuilder<DefaultState>,
    ) -> Result<ConfigBuilder<DefaultState>, ConfigError> {
        builder
            .set_default("app.env", "development")?
            .set_default("app.host", "127.0.0.1")?
            .set_default("app.port", 3000)?
            .set_default("app.name", "sso-server")?
            .set_default("app.log_format", "json")?
            .set_default("database.max_connections", 10)?
            .set_default("database.lookup_timeout_ms", DEFAULT_LOOKUP_TIMEOUT_MS)?
            .set_default("jwt.issuer", DEFAULT_TOKEN_ISSUER)?
            .set_default("jwt.access_token_expiry", DEFAULT_ACCESS_TOKEN_EXPIRY)?
            .set_default("jwt.refresh_token_expiry", DEFAULT_REFRESH_TOKEN_EXPIRY)?
            .set_default("jwt.sso_token_expiry", DEFAULT_SSO_TOKEN_EXPIRY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use config::FileFormat;

    fn from_toml(toml: &str) -> Result<AppConfig, ConfigError> {
        AppConfig::with_defaults(Config::builder())?
            .add_source(File::from_str(toml, FileFormat::Toml))
            .build()?
            .try_deserialize()
    }

    #[test]
    fn test_defaults_fill_everything_but_secrets() {
        let config = from_toml(
            r#"
            [database]
            url = "postgres://localhost/student_database"

            [jwt]
            secret = "s3cret"
            "#,
        )
        .unwrap();

        assert_eq!(config.app.port, 3000);
        assert_eq!(config.jwt.access_token_expiry, 3600);
        assert_eq!(config.jwt.refresh_token_expiry, 604800);
        assert_eq!(config.jwt.sso_token_expiry, 900);
        assert_eq!(config.jwt.issuer, "crm-auth-gateway");
        assert!(config.database.admissions_url.is_none());
        assert!(config.envelope.key.is_none());
        assert_eq!(config.portals.catalog.len(), 5);
        assert_eq!(config.portals.grants.len(), 3);
    }

    #[test]
    fn test_missing_jwt_secret_is_an_error() {
        let result = from_toml(
            r#"
            [database]
            url = "postgres://localhost/student_database"
            "#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_custom_grant_table() {
        let config = from_toml(
            r#"
            [database]
            url = "postgres://localhost/student_database"

            [jwt]
            secret = "s3cret"

            [[portals.grants]]
            store = "staff"
            role = "warden"
            portals = ["hostel-automation"]
            "#,
        )
        .unwrap();

        assert_eq!(config.portals.grants.len(), 1);
        assert_eq!(config.portals.grants[0].store, SourceStore::Staff);
        assert_eq!(config.portals.grants[0].role.as_deref(), Some("warden"));
        // catalog still comes from the defaults
        assert_eq!(config.portals.catalog.len(), 5);
    }
}
