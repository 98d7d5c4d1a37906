//! Authenticated encryption of tokens that travel through the browser
//!
//! Sealed layout, URL-safe base64 without padding:
//! `nonce (12 bytes) || tag (16 bytes) || ciphertext`.
//! The box knows nothing about what it carries.

use argon2::Argon2;
use base64::{
    engine::general_purpose::{STANDARD, URL_SAFE_NO_PAD},
    Engine as _,
};
use chacha20poly1305::{
    aead::{AeadCore, AeadInPlace, KeyInit, OsRng},
    ChaCha20Poly1305, Key, Nonce, Tag,
};
use rand::Rng;
use sha2::{Digest, Sha256};
use thiserror::Error;

const KEY_LENGTH: usize = 32;
const NONCE_LENGTH: usize = 12;
const TAG_LENGTH: usize = 16;
const ENVELOPE_AAD: &[u8] = b"sso-envelope:v1";

#[derive(Error, Debug)]
pub enum EnvelopeError {
    #[error("Invalid key material: {0}")]
    KeyError(String),
    #[error("Failed to encrypt token")]
    EncryptionFailed,
    /// Deliberately carries no detail
    #[error("Failed to decrypt token")]
    DecryptionFailed,
}

pub struct EnvelopeCipher {
    cipher: ChaCha20Poly1305,
}

impl EnvelopeCipher {
    pub fn from_key(key: &[u8; KEY_LENGTH]) -> Self {
        Self {
            cipher: ChaCha20Poly1305::new(Key::from_slice(key)),
        }
    }

    /// Accepts a full-length key (32 raw bytes, or base64 of 32 bytes) as is;
    /// any other non-empty secret is stretched with Argon2id.
    pub fn from_secret(secret: &str) -> Result<Self, EnvelopeError> {
        let key = derive_key(secret)?;
        Ok(Self::from_key(&key))
    }

    /// Always stretches, whatever the length or encoding of `secret`. For
    /// secrets that already serve another purpose, such as the signing key.
    pub fn derive_from_passphrase(secret: &str) -> Result<Self, EnvelopeError> {
        let key = stretch_key(secret)?;
        Ok(Self::from_key(&key))
    }

    pub fn seal(&self, plaintext: &[u8]) -> Result<String, EnvelopeError> {
        let nonce = ChaCha20Poly1305::generate_nonce(&mut OsRng);
        let mut buffer = plaintext.to_vec();
        let tag = self
            .cipher
            .encrypt_in_place_detached(&nonce, ENVELOPE_AAD, &mut buffer)
            .map_err(|_| EnvelopeError::EncryptionFailed)?;

        let mut sealed = Vec::with_capacity(NONCE_LENGTH + TAG_LENGTH + buffer.len());
        sealed.extend_from_slice(&nonce);
        sealed.extend_from_slice(&tag);
        sealed.extend_from_slice(&buffer);
        Ok(URL_SAFE_NO_PAD.encode(sealed))
    }

    pub fn open(&self, sealed: &str) -> Result<Vec<u8>, EnvelopeError> {
        let bytes = URL_SAFE_NO_PAD
            .decode(sealed.trim())
            .map_err(|_| EnvelopeError::DecryptionFailed)?;
        if bytes.len() < NONCE_LENGTH + TAG_LENGTH {
            return Err(EnvelopeError::DecryptionFailed);
        }

        let (nonce, rest) = bytes.split_at(NONCE_LENGTH);
        let (tag, ciphertext) = rest.split_at(TAG_LENGTH);
        let mut buffer = ciphertext.to_vec();
        self.cipher
            .decrypt_in_place_detached(
                Nonce::from_slice(nonce),
                ENVELOPE_AAD,
                &mut buffer,
                Tag::from_slice(tag),
            )
            .map_err(|_| EnvelopeError::DecryptionFailed)?;
        Ok(buffer)
    }

    pub fn seal_str(&self, plaintext: &str) -> Result<String, EnvelopeError> {
        self.seal(plaintext.as_bytes())
    }

    pub fn open_str(&self, sealed: &str) -> Result<String, EnvelopeError> {
        String::from_utf8(self.open(sealed)?).map_err(|_| EnvelopeError::DecryptionFailed)
    }

    /// Fresh random key, base64 encoded, for `envelope.key`
    pub fn generate_key() -> String {
        let mut key = [0u8; KEY_LENGTH];
        rand::rng().fill(&mut key);
        STANDARD.encode(key)
    }
}

fn derive_key(secret: &str) -> Result<[u8; KEY_LENGTH], EnvelopeError> {
    if secret.is_empty() {
        return Err(EnvelopeError::KeyError("secret is empty".to_string()));
    }

    let mut key = [0u8; KEY_LENGTH];
    if secret.len() == KEY_LENGTH {
        key.copy_from_slice(secret.as_bytes());
        return Ok(key);
    }
    if let Ok(decoded) = STANDARD.decode(secret) {
        if decoded.len() == KEY_LENGTH {
            key.copy_from_slice(&decoded);
            return Ok(key);
        }
    }

    stretch_key(secret)
}

fn stretch_key(secret: &str) -> Result<[u8; KEY_LENGTH], EnvelopeError> {
    if secret.is_empty() {
        return Err(EnvelopeError::KeyError("secret is empty".to_string()));
    }

    let mut key = [0u8; KEY_LENGTH];
    let salt = Sha256::digest(secret.as_bytes());
    Argon2::default()
        .hash_password_into(secret.as_bytes(), &salt, &mut key)
        .map_err(|e| EnvelopeError::KeyError(e.to_string()))?;
    Ok(key)
}
