//! # SSO Infrastructure
//! 
//! PostgreSQL-backed credential stores (adapters for the `CredentialStore` port).

pub mod database;

pub use database::{
    connect_credential_stores, create_pool, PgAdmissionsUserStore, PgRbacUserStore,
    PgStudentCredentialStore,
};
