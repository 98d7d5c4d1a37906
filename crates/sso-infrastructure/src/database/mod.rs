//! Database module (PostgreSQL adapters)

pub mod connection;
pub mod postgres;

pub use connection::{connect_credential_stores, create_pool};
pub use postgres::{PgAdmissionsUserStore, PgRbacUserStore, PgStudentCredentialStore};
