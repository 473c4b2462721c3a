//! Profile workflows: token-gated reads, the multi-step profile update and
//! account registration/login.

pub mod account;
pub mod errors;
pub mod read;
pub mod update;
pub mod upload;

use crate::domain::users::user::PublicProfile;

pub use account::AccountService;
pub use errors::ProfileError;
pub use read::ProfileReadService;
pub use update::{ProfileUpdateWorkflow, UpdateRequest};
pub use upload::{IncomingUpload, UploadIntake, UploadStore};

/// A user's public profile together with a freshly issued token for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedProfile {
    pub user: PublicProfile,
    pub token: String,
}

/// Trimmed value, or `None` when absent or blank.
pub(crate) fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}
