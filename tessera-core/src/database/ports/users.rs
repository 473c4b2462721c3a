use std::fmt;

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::users::user::UserRecord;
use crate::error::Result;

/// Credential store port.
///
/// Email addresses are unique case-insensitively; adapters report a clash as
/// [`crate::CoreError::Conflict`]. Updates are whole-record replaces with
/// last-writer-wins semantics.
#[async_trait]
pub trait UsersRepository: Send + Sync + fmt::Debug {
    async fn create_user(&self, user: &UserRecord) -> Result<()>;
    async fn get_user_by_id(&self, id: Uuid) -> Result<Option<UserRecord>>;
    async fn get_user_by_email(&self, email: &str) -> Result<Option<UserRecord>>;

    /// Replace every mutable column of the record with `user.id`, returning
    /// the persisted row, or `None` when the record no longer exists.
    async fn replace_user(&self, user: &UserRecord) -> Result<Option<UserRecord>>;
}
