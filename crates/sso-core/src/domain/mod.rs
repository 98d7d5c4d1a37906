//! # SSO Core - Domain Module
//! 
//! Domain entities for the SSO gateway.

pub mod identity;
pub mod portal;

pub use identity::{Identity, IdentitySummary};
pub use portal::PortalGrant;
