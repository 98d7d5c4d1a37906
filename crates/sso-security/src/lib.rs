//! # SSO Security
//! 
//! Security primitives: signed tokens, the token envelope, password hashing.

pub mod clock;
pub mod envelope;
pub mod jwt;
pub mod password;

pub use clock::{Clock, ManualClock, SystemClock};
pub use envelope::{EnvelopeCipher, EnvelopeError};
pub use jwt::{Claims, IssuedToken, JwtError, Subject, TokenIssuer, TokenKind, TokenScope, TokenTtls};
pub use password::{PasswordError, PasswordService, LEGACY_BCRYPT_COST};
