//! # SSO API
//! 
//! HTTP surface of the gateway: handlers, extractors, error mapping, router.

pub mod error;
pub mod extract;
pub mod handlers;
pub mod response;
pub mod router;
pub mod state;

pub use router::{build_router, RouterError};
pub use state::AppState;
