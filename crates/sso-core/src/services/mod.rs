//! Domain services (business logic)

pub mod auth_gateway;
pub mod credential_resolver;
pub mod portal_policy;

pub use auth_gateway::{AuthGateway, LoginResult, PortalToken, RefreshResult, VerifiedCaller};
pub use credential_resolver::CredentialResolver;
pub use portal_policy::{GrantRule, PolicyError, PortalAccessPolicy};
