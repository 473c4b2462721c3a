use std::sync::Arc;

use tracing::debug;
use uuid::Uuid;

use crate::database::ports::users::UsersRepository;
use crate::domain::users::{
    auth::TokenService,
    profile::{ProfileError, non_empty},
    user::{PublicProfile, UserRecord},
};

/// Token-gated lookup of a user's public profile.
#[derive(Debug, Clone)]
pub struct ProfileReadService {
    users: Arc<dyn UsersRepository>,
    tokens: Arc<TokenService>,
}

impl ProfileReadService {
    pub fn new(users: Arc<dyn UsersRepository>, tokens: Arc<TokenService>) -> Self {
        Self { users, tokens }
    }

    pub async fn get_profile(
        &self,
        user_id: Option<&str>,
        token: Option<&str>,
    ) -> Result<PublicProfile, ProfileError> {
        let user_id = non_empty(user_id);
        let token = non_empty(token);

        if user_id.is_none() && token.is_none() {
            return Err(ProfileError::MissingParameters);
        }

        let caller = verify_token(&self.tokens, token)?;
        let record = load_user(self.users.as_ref(), user_id).await?;
        ensure_owner(&caller, &record)?;

        Ok(record.public_profile())
    }
}

/// Verify a bearer token; an absent token counts as invalid.
pub(crate) fn verify_token(
    tokens: &TokenService,
    token: Option<&str>,
) -> Result<PublicProfile, ProfileError> {
    let token = token.ok_or(ProfileError::InvalidToken)?;
    tokens.verify(token).map_err(|err| {
        debug!(error = %err, "rejected bearer token");
        ProfileError::InvalidToken
    })
}

/// Load a record by its textual id. Ids that are absent or not UUIDs match
/// no record.
pub(crate) async fn load_user(
    users: &dyn UsersRepository,
    user_id: Option<&str>,
) -> Result<UserRecord, ProfileError> {
    let id = user_id
        .and_then(|raw| Uuid::parse_str(raw).ok())
        .ok_or(ProfileError::UserNotFound)?;

    users
        .get_user_by_id(id)
        .await?
        .ok_or(ProfileError::UserNotFound)
}

/// A token only authorizes acting as the user it was issued for.
pub(crate) fn ensure_owner(
    caller: &PublicProfile,
    record: &UserRecord,
) -> Result<(), ProfileError> {
    if caller.id != record.id {
        debug!(caller = %caller.id, target = %record.id, "token issued for another user");
        return Err(ProfileError::InvalidToken);
    }
    Ok(())
}
