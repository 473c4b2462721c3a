use thiserror::Error;

use crate::domain::users::auth::PasswordCryptoError;
use crate::domain::users::validation::FieldErrors;
use crate::error::CoreError;

/// Every way a profile or account operation can fail.
///
/// The display strings are the client-facing messages; [`Self::field_errors`]
/// keys them by the form field they concern.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProfileError {
    #[error("Request Parameters are missing")]
    MissingParameters,

    #[error("Authentication Token is missing, Login again")]
    MissingToken,

    #[error("Token Expired, Login again")]
    InvalidToken,

    #[error("User not found")]
    UserNotFound,

    #[error("Only .png, .jpg and .jpeg format allowed!")]
    UnsupportedFileType { content_type: Option<String> },

    #[error("Unexpected file field")]
    UnexpectedFile { field: String },

    #[error("User ID missing")]
    MissingUserId,

    #[error("Validation failed")]
    ValidationFailed(FieldErrors),

    #[error("Old password is incorrect")]
    WrongOldPassword,

    #[error("New password is empty")]
    EmptyNewPassword,

    #[error("Email is already registered")]
    EmailTaken,

    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("Storage failure: {0}")]
    Storage(String),
}

impl ProfileError {
    /// Form field (or pseudo-field) the error is reported under.
    pub fn field(&self) -> &'static str {
        match self {
            Self::MissingParameters | Self::MissingToken => "request",
            Self::InvalidToken => "token",
            Self::UserNotFound => "userNotFound",
            Self::UnsupportedFileType { .. } | Self::UnexpectedFile { .. } => {
                "file"
            }
            Self::MissingUserId => "userId",
            Self::ValidationFailed(_) => "validation",
            Self::WrongOldPassword => "oldPassword",
            Self::EmptyNewPassword => "newPassword",
            Self::EmailTaken => "email",
            Self::InvalidCredentials => "credentials",
            Self::Storage(_) => "serverError",
        }
    }

    /// Render the error as a field → message map. Storage details stay in the
    /// logs; clients get a generic message.
    pub fn field_errors(&self) -> FieldErrors {
        match self {
            Self::ValidationFailed(errors) => errors.clone(),
            Self::Storage(_) => FieldErrors::from([(
                self.field().to_string(),
                "Internal server error".to_string(),
            )]),
            other => {
                FieldErrors::from([(other.field().to_string(), other.to_string())])
            }
        }
    }

    pub fn is_storage(&self) -> bool {
        matches!(self, Self::Storage(_))
    }
}

impl From<CoreError> for ProfileError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Conflict(_) => Self::EmailTaken,
            other => Self::Storage(other.to_string()),
        }
    }
}

impl From<PasswordCryptoError> for ProfileError {
    fn from(err: PasswordCryptoError) -> Self {
        Self::Storage(err.to_string())
    }
}
