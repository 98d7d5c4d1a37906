//! Password hashing with Argon2, verification of Argon2 and bcrypt hashes
//!
//! The credential stores still hold bcrypt hashes written by the previous
//! gateway, so verification dispatches on the hash prefix. New hashes are
//! always Argon2id.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PasswordError {
    #[error("Hash error: {0}")]
    HashError(String),
    #[error("Unsupported hash format")]
    UnsupportedFormat,
}

/// Cost the legacy stores wrote their bcrypt hashes with
pub const LEGACY_BCRYPT_COST: u32 = 10;

pub struct PasswordService;

impl PasswordService {
    pub fn hash(password: &str) -> Result<String, PasswordError> {
        let salt = SaltString::generate(&mut OsRng);
        let argon2 = Argon2::default();
        argon2
            .hash_password(password.as_bytes(), &salt)
            .map(|h| h.to_string())
            .map_err(|e| PasswordError::HashError(e.to_string()))
    }

    /// Bcrypt hash in the legacy stores' format, used where timing has to
    /// match a lookup against those stores.
    pub fn hash_bcrypt(password: &str, cost: u32) -> Result<String, PasswordError> {
        bcrypt::hash(password, cost).map_err(|e| PasswordError::HashError(e.to_string()))
    }

    /// Returns `Ok(false)` on mismatch; `Err` only when the stored hash is unusable.
    pub fn verify(password: &str, hash: &str) -> Result<bool, PasswordError> {
        if is_bcrypt(hash) {
            return bcrypt::verify(password, hash)
                .map_err(|e| PasswordError::HashError(e.to_string()));
        }
        if !hash.starts_with("$argon2") {
            return Err(PasswordError::UnsupportedFormat);
        }
        let parsed_hash = PasswordHash::new(hash)
            .map_err(|e| PasswordError::HashError(e.to_string()))?;
        Ok(Argon2::default()
            .verify_password(password.as_bytes(), &parsed_hash)
            .is_ok())
    }
}

fn is_bcrypt(hash: &str) -> bool {
    ["$2a$", "$2b$", "$2x$", "$2y$"]
        .iter()
        .any(|prefix| hash.starts_with(prefix))
}
