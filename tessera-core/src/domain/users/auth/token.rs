use std::fmt;

use chrono::{Duration, Utc};
use jsonwebtoken::{
    Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::users::user::PublicProfile;

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("token secret must not be empty")]
    EmptySecret,
    #[error("failed to sign token: {0}")]
    Signing(#[source] jsonwebtoken::errors::Error),
    #[error("invalid or expired token: {0}")]
    Invalid(#[source] jsonwebtoken::errors::Error),
}

/// Claims carried by a session token: the profile snapshot plus the standard
/// issued-at and expiry timestamps.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct SessionClaims {
    #[serde(flatten)]
    profile: PublicProfile,
    iat: i64,
    exp: i64,
}

/// Issues and verifies HS256 bearer tokens that embed a [`PublicProfile`].
///
/// Tokens are self-contained; there is no revocation list, expiry is purely
/// time based.
#[derive(Clone)]
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    ttl: Duration,
}

impl fmt::Debug for TokenService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenService")
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}

impl TokenService {
    pub fn new(
        secret: impl AsRef<[u8]>,
        ttl: Duration,
    ) -> Result<Self, TokenError> {
        let secret = secret.as_ref();
        if secret.is_empty() {
            return Err(TokenError::EmptySecret);
        }

        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;

        Ok(Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            validation,
            ttl,
        })
    }

    /// Sign a token for the given profile snapshot.
    pub fn issue(&self, profile: &PublicProfile) -> Result<String, TokenError> {
        let now = Utc::now();
        let claims = SessionClaims {
            profile: profile.clone(),
            iat: now.timestamp(),
            exp: (now + self.ttl).timestamp(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(TokenError::Signing)
    }

    /// Verify signature and expiry, returning the embedded snapshot.
    pub fn verify(&self, token: &str) -> Result<PublicProfile, TokenError> {
        decode::<SessionClaims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims.profile)
            .map_err(TokenError::Invalid)
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use uuid::Uuid;

    use super::*;

    fn snapshot() -> PublicProfile {
        PublicProfile {
            id: Uuid::new_v4(),
            email: "a@x.com".into(),
            name: "Alice".into(),
            profile_picture_path: Some("uploads/pic.png".into()),
            age: Some(30),
            gender: None,
            date_of_birth: NaiveDate::from_ymd_opt(1994, 3, 9),
            mobile_number: Some("+15550001111".into()),
        }
    }

    #[test]
    fn issue_then_verify_round_trips_snapshot() {
        let service = TokenService::new("secret", Duration::hours(1)).unwrap();
        let profile = snapshot();

        let token = service.issue(&profile).unwrap();
        assert_eq!(service.verify(&token).unwrap(), profile);
    }

    #[test]
    fn rejects_token_signed_with_other_secret() {
        let issuer = TokenService::new("secret-1", Duration::hours(1)).unwrap();
        let verifier =
            TokenService::new("secret-2", Duration::hours(1)).unwrap();

        let token = issuer.issue(&snapshot()).unwrap();
        assert!(matches!(verifier.verify(&token), Err(TokenError::Invalid(_))));
    }

    #[test]
    fn rejects_expired_token() {
        let service =
            TokenService::new("secret", Duration::hours(-2)).unwrap();
        let token = service.issue(&snapshot()).unwrap();
        assert!(matches!(service.verify(&token), Err(TokenError::Invalid(_))));
    }

    #[test]
    fn rejects_token_expired_seconds_ago() {
        let service =
            TokenService::new("secret", Duration::seconds(-5)).unwrap();
        let token = service.issue(&snapshot()).unwrap();
        assert!(matches!(service.verify(&token), Err(TokenError::Invalid(_))));
    }

    #[test]
    fn rejects_garbage() {
        let service = TokenService::new("secret", Duration::hours(1)).unwrap();
        assert!(service.verify("not.a.token").is_err());
        assert!(service.verify("").is_err());
    }

    #[test]
    fn rejects_empty_secret() {
        assert!(matches!(
            TokenService::new("", Duration::hours(1)),
            Err(TokenError::EmptySecret)
        ));
    }
}
