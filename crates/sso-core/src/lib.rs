//! # SSO Core
//! 
//! Identity resolution across the credential stores, the portal grant table,
//! and the gateway operations built on top of them.

pub mod domain;
pub mod services;
pub mod repositories;
pub mod error;

// Re-export domain entities
pub use domain::*;
pub use error::{AuthError, ClientOutcome};
pub use services::{AuthGateway, CredentialResolver, PortalAccessPolicy, VerifiedCaller};
