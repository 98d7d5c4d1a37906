//! Repository traits (ports)

pub mod credential_store;
pub mod memory;

pub use credential_store::{CredentialStore, StoreError};
pub use memory::InMemoryCredentialStore;

#[cfg(test)]
pub use credential_store::MockCredentialStore;
