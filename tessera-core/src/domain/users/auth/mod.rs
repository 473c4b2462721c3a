//! Authentication primitives: password hashing and session tokens.

pub mod crypto;
pub mod token;

pub use crypto::{PasswordCrypto, PasswordCryptoError};
pub use token::{TokenError, TokenService};
