//! The profile update workflow.
//!
//! One call runs a fixed sequence of gates and stops at the first failure:
//!
//! 1. upload intake (type allow-list, at most one file)
//! 2. bearer token present and valid
//! 3. target id present, record exists, token belongs to it
//! 4. picture resolution (new upload, else keep the stored path)
//! 5. field validation
//! 6. optional password change (old password must match, new one meets the
//!    length policy)
//! 7. single record replace
//! 8. token re-issue from the persisted record
//!
//! The upload is written in step 1 and removed again if any later step fails,
//! so a rejected request leaves neither a changed record nor an orphaned file.

use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use tracing::info;

use crate::database::ports::users::UsersRepository;
use crate::domain::users::{
    auth::{PasswordCrypto, TokenService},
    profile::{
        AuthenticatedProfile, ProfileError, non_empty,
        read::{ensure_owner, load_user, verify_token},
        upload::{IncomingUpload, UploadIntake},
    },
    user::UserRecord,
    validation::{
        ProfileExtrasInput, validate_new_password, validate_profile_extras,
        validate_profile_update,
    },
};

/// One profile update call. Every field is optional on the wire; which ones
/// are required is decided by the workflow.
#[derive(Debug, Clone, Default)]
pub struct UpdateRequest {
    pub id: Option<String>,
    pub token: Option<String>,
    /// Current password, required only when changing the password
    pub password: Option<String>,
    pub new_password: Option<String>,
    pub email: Option<String>,
    pub name: Option<String>,
    pub age: Option<String>,
    pub gender: Option<String>,
    pub dob: Option<String>,
    pub mobile: Option<String>,
    pub uploads: Vec<IncomingUpload>,
}

#[derive(Debug, Clone)]
pub struct ProfileUpdateWorkflow {
    users: Arc<dyn UsersRepository>,
    tokens: Arc<TokenService>,
    crypto: Arc<PasswordCrypto>,
    intake: UploadIntake,
}

impl ProfileUpdateWorkflow {
    pub fn new(
        users: Arc<dyn UsersRepository>,
        tokens: Arc<TokenService>,
        crypto: Arc<PasswordCrypto>,
        intake: UploadIntake,
    ) -> Self {
        Self {
            users,
            tokens,
            crypto,
            intake,
        }
    }

    pub async fn update_profile(
        &self,
        mut request: UpdateRequest,
    ) -> Result<AuthenticatedProfile, ProfileError> {
        let uploaded = self
            .intake
            .accept(std::mem::take(&mut request.uploads))
            .await?;

        let today = Utc::now().date_naive();
        let result = self.apply(&request, uploaded.clone(), today).await;

        if result.is_err()
            && let Some(path) = uploaded.as_deref()
        {
            self.intake.discard(path).await;
        }

        result
    }

    async fn apply(
        &self,
        request: &UpdateRequest,
        uploaded: Option<String>,
        today: NaiveDate,
    ) -> Result<AuthenticatedProfile, ProfileError> {
        let token = non_empty(request.token.as_deref())
            .ok_or(ProfileError::MissingToken)?;
        let caller = verify_token(&self.tokens, Some(token))?;

        let id = non_empty(request.id.as_deref())
            .ok_or(ProfileError::MissingUserId)?;
        let mut record = load_user(self.users.as_ref(), Some(id)).await?;
        ensure_owner(&caller, &record)?;

        if let Some(path) = uploaded {
            record.profile_picture_path = Some(path);
        }

        self.apply_fields(&mut record, request, today)?;
        self.apply_password_change(&mut record, request)?;

        let persisted = self
            .users
            .replace_user(&record)
            .await?
            .ok_or(ProfileError::UserNotFound)?;

        let user = persisted.public_profile();
        let token = self
            .tokens
            .issue(&user)
            .map_err(|err| ProfileError::Storage(err.to_string()))?;

        info!(user_id = %user.id, "profile updated");
        Ok(AuthenticatedProfile { user, token })
    }

    /// Validate every incoming field and copy the accepted values onto the
    /// record. Nothing is copied unless all fields pass.
    fn apply_fields(
        &self,
        record: &mut UserRecord,
        request: &UpdateRequest,
        today: NaiveDate,
    ) -> Result<(), ProfileError> {
        let name = request.name.as_deref();
        let email = request.email.as_deref();

        let mut errors = validate_profile_update(name, email).errors;
        let extras = validate_profile_extras(
            &ProfileExtrasInput {
                age: request.age.as_deref(),
                gender: request.gender.as_deref(),
                dob: request.dob.as_deref(),
                mobile: request.mobile.as_deref(),
            },
            today,
        );

        let extras = match extras {
            Ok(extras) if errors.is_empty() => extras,
            Ok(_) => return Err(ProfileError::ValidationFailed(errors)),
            Err(extra_errors) => {
                errors.extend(extra_errors);
                return Err(ProfileError::ValidationFailed(errors));
            }
        };

        // Both are present and non-blank once validation passed.
        record.name = name.unwrap_or_default().trim().to_string();
        record.email = email.unwrap_or_default().trim().to_string();

        if let Some(age) = extras.age {
            record.age = age;
        }
        if let Some(gender) = extras.gender {
            record.gender = gender;
        }
        if let Some(date_of_birth) = extras.date_of_birth {
            record.date_of_birth = date_of_birth;
        }
        if let Some(mobile_number) = extras.mobile_number {
            record.mobile_number = mobile_number;
        }

        Ok(())
    }

    /// Entered only when either password field is non-empty. Passwords are
    /// compared verbatim, never trimmed.
    fn apply_password_change(
        &self,
        record: &mut UserRecord,
        request: &UpdateRequest,
    ) -> Result<(), ProfileError> {
        let current = request.password.as_deref().unwrap_or_default();
        let new_password = request.new_password.as_deref().unwrap_or_default();

        if current.is_empty() && new_password.is_empty() {
            return Ok(());
        }

        let matches = match record.password_hash.as_deref() {
            Some(hash) => self.crypto.verify_password(current, hash)?,
            None => false,
        };
        if !matches {
            return Err(ProfileError::WrongOldPassword);
        }

        if new_password.is_empty() {
            return Err(ProfileError::EmptyNewPassword);
        }
        validate_new_password(new_password).map_err(|errors| {
            ProfileError::ValidationFailed(
                errors
                    .into_values()
                    .map(|message| ("newPassword".to_string(), message))
                    .collect(),
            )
        })?;

        record.password_hash = Some(self.crypto.hash_password(new_password)?);
        Ok(())
    }
}
