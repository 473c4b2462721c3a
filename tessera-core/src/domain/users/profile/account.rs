use std::sync::Arc;

use tracing::info;

use crate::database::ports::users::UsersRepository;
use crate::domain::users::{
    auth::{PasswordCrypto, TokenService},
    profile::{AuthenticatedProfile, ProfileError, non_empty},
    user::{LoginRequest, RegisterRequest, UserRecord},
    validation::{validate_new_password, validate_profile_update},
};

/// Account creation and password login.
#[derive(Debug, Clone)]
pub struct AccountService {
    users: Arc<dyn UsersRepository>,
    tokens: Arc<TokenService>,
    crypto: Arc<PasswordCrypto>,
}

impl AccountService {
    pub fn new(
        users: Arc<dyn UsersRepository>,
        tokens: Arc<TokenService>,
        crypto: Arc<PasswordCrypto>,
    ) -> Self {
        Self {
            users,
            tokens,
            crypto,
        }
    }

    pub async fn register(
        &self,
        request: RegisterRequest,
    ) -> Result<AuthenticatedProfile, ProfileError> {
        let mut errors =
            validate_profile_update(Some(&request.name), Some(&request.email))
                .errors;
        if let Err(password_errors) = validate_new_password(&request.password) {
            errors.extend(password_errors);
        }
        if !errors.is_empty() {
            return Err(ProfileError::ValidationFailed(errors));
        }

        let email = request.email.trim();
        if self.users.get_user_by_email(email).await?.is_some() {
            return Err(ProfileError::EmailTaken);
        }

        let password_hash = self.crypto.hash_password(&request.password)?;
        let mut record =
            UserRecord::new(email, request.name.trim(), Some(password_hash));
        record.username = non_empty(request.username.as_deref()).map(str::to_string);

        self.users.create_user(&record).await?;
        info!(user_id = %record.id, "registered user");

        self.grant(&record)
    }

    pub async fn login(
        &self,
        request: LoginRequest,
    ) -> Result<AuthenticatedProfile, ProfileError> {
        let record = self
            .users
            .get_user_by_email(request.email.trim())
            .await?
            .ok_or(ProfileError::InvalidCredentials)?;

        let matches = match record.password_hash.as_deref() {
            Some(hash) => self.crypto.verify_password(&request.password, hash)?,
            None => false,
        };
        if !matches {
            return Err(ProfileError::InvalidCredentials);
        }

        info!(user_id = %record.id, "user logged in");
        self.grant(&record)
    }

    fn grant(&self, record: &UserRecord) -> Result<AuthenticatedProfile, ProfileError> {
        let user = record.public_profile();
        let token = self
            .tokens
            .issue(&user)
            .map_err(|err| ProfileError::Storage(err.to_string()))?;
        Ok(AuthenticatedProfile { user, token })
    }
}
