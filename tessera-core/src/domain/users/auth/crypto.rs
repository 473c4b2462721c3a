use std::fmt;

use argon2::{
    Algorithm, Argon2, Params, ParamsBuilder, Version,
    password_hash::{
        Error as PasswordHashError, PasswordHash, PasswordHasher,
        PasswordVerifier, Salt, SaltString,
    },
};
use rand::{TryRngCore, rngs::OsRng};
use thiserror::Error;
use zeroize::Zeroizing;

/// Argon2id password hashing with a server-side pepper.
///
/// Stored hashes are PHC strings; the pepper never leaves process memory and
/// is appended to the password before hashing and verification.
pub struct PasswordCrypto {
    argon2: Argon2<'static>,
    password_pepper: Zeroizing<Vec<u8>>,
}

impl fmt::Debug for PasswordCrypto {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PasswordCrypto")
            .field("params", self.argon2.params())
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Error)]
pub enum PasswordCryptoError {
    #[error("password pepper must not be empty")]
    EmptyPasswordPepper,
    #[error("invalid Argon2 parameters: {0}")]
    InvalidArgon2Params(String),
    #[error("password hashing error: {0}")]
    PasswordHash(String),
}

impl From<PasswordHashError> for PasswordCryptoError {
    fn from(err: PasswordHashError) -> Self {
        PasswordCryptoError::PasswordHash(err.to_string())
    }
}

impl PasswordCrypto {
    /// ~64 MiB memory and 3 iterations.
    const DEFAULT_MEMORY_KIB: u32 = 64 * 1024;
    const DEFAULT_ITERATIONS: u32 = 3;
    const DEFAULT_PARALLELISM: u32 = 1;
    const SALT_LENGTH: usize = Salt::RECOMMENDED_LENGTH;

    /// Build a helper with default Argon2id parameters.
    pub fn new(
        password_pepper: impl AsRef<[u8]>,
    ) -> Result<Self, PasswordCryptoError> {
        Self::with_params(
            password_pepper,
            ParamsBuilder::new()
                .m_cost(Self::DEFAULT_MEMORY_KIB)
                .t_cost(Self::DEFAULT_ITERATIONS)
                .p_cost(Self::DEFAULT_PARALLELISM)
                .output_len(32)
                .build()
                .map_err(|err| {
                    PasswordCryptoError::InvalidArgon2Params(err.to_string())
                })?,
        )
    }

    /// Build a helper with caller-specified Argon2 parameters (integration
    /// tests use cheap parameters).
    pub fn with_params(
        password_pepper: impl AsRef<[u8]>,
        params: Params,
    ) -> Result<Self, PasswordCryptoError> {
        let pepper = password_pepper.as_ref();
        if pepper.is_empty() {
            return Err(PasswordCryptoError::EmptyPasswordPepper);
        }

        let argon2 =
            Argon2::new(Algorithm::Argon2id, Version::default(), params);

        Ok(Self {
            argon2,
            password_pepper: Zeroizing::new(pepper.to_vec()),
        })
    }

    /// Lightweight parameters for tests and local development.
    pub fn insecure_fast(
        password_pepper: impl AsRef<[u8]>,
    ) -> Result<Self, PasswordCryptoError> {
        let params = Params::new(1024, 1, 1, Some(32)).map_err(|err| {
            PasswordCryptoError::InvalidArgon2Params(err.to_string())
        })?;
        Self::with_params(password_pepper, params)
    }

    /// Hash a password with a random salt and the shared pepper.
    pub fn hash_password(
        &self,
        password: &str,
    ) -> Result<String, PasswordCryptoError> {
        let material = self.peppered(password);

        let mut salt_bytes = [0u8; Self::SALT_LENGTH];
        OsRng
            .try_fill_bytes(&mut salt_bytes)
            .map_err(|err| PasswordCryptoError::PasswordHash(err.to_string()))?;
        let salt = SaltString::encode_b64(&salt_bytes)?;
        let hash = self.argon2.hash_password(&material, &salt)?.to_string();
        Ok(hash)
    }

    /// Verify a password against a stored hash. A malformed stored hash is an
    /// error, a mismatch is `Ok(false)`.
    pub fn verify_password(
        &self,
        password: &str,
        password_hash: &str,
    ) -> Result<bool, PasswordCryptoError> {
        let parsed = PasswordHash::new(password_hash)?;
        let material = self.peppered(password);
        Ok(self.argon2.verify_password(&material, &parsed).is_ok())
    }

    fn peppered(&self, password: &str) -> Zeroizing<Vec<u8>> {
        let mut material = Zeroizing::new(Vec::with_capacity(
            password.len() + self.password_pepper.len(),
        ));
        material.extend_from_slice(password.as_bytes());
        material.extend_from_slice(&self.password_pepper);
        material
    }
}
