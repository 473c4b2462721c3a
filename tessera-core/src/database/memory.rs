use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::database::ports::users::UsersRepository;
use crate::domain::users::user::UserRecord;
use crate::error::{CoreError, Result};

/// Process-local credential store used when no database is configured and
/// by the test suites.
#[derive(Debug, Default)]
pub struct InMemoryUsersRepository {
    users: RwLock<HashMap<Uuid, UserRecord>>,
}

impl InMemoryUsersRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Case-folds the way PostgreSQL's `LOWER()` does for the unique index.
    fn same_email(stored: &str, candidate: &str) -> bool {
        stored.to_lowercase() == candidate.to_lowercase()
    }

    fn email_taken(
        users: &HashMap<Uuid, UserRecord>,
        email: &str,
        except: Uuid,
    ) -> bool {
        users
            .values()
            .any(|u| u.id != except && Self::same_email(&u.email, email))
    }
}

#[async_trait]
impl UsersRepository for InMemoryUsersRepository {
    async fn create_user(&self, user: &UserRecord) -> Result<()> {
        let mut users = self.users.write().await;
        if users.contains_key(&user.id) {
            return Err(CoreError::Conflict(format!(
                "User {} already exists",
                user.id
            )));
        }
        if Self::email_taken(&users, &user.email, user.id) {
            return Err(CoreError::Conflict("Email already exists".into()));
        }
        users.insert(user.id, user.clone());
        Ok(())
    }

    async fn get_user_by_id(&self, id: Uuid) -> Result<Option<UserRecord>> {
        Ok(self.users.read().await.get(&id).cloned())
    }

    async fn get_user_by_email(&self, email: &str) -> Result<Option<UserRecord>> {
        Ok(self
            .users
            .read()
            .await
            .values()
            .find(|u| Self::same_email(&u.email, email))
            .cloned())
    }

    async fn replace_user(&self, user: &UserRecord) -> Result<Option<UserRecord>> {
        let mut users = self.users.write().await;
        if Self::email_taken(&users, &user.email, user.id) {
            return Err(CoreError::Conflict("Email already exists".into()));
        }

        let Some(existing) = users.get_mut(&user.id) else {
            return Ok(None);
        };

        let created_at = existing.created_at;
        *existing = user.clone();
        existing.created_at = created_at;
        existing.updated_at = Utc::now();
        Ok(Some(existing.clone()))
    }
}
