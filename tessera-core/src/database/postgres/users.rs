use async_trait::async_trait;
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::database::ports::users::UsersRepository;
use crate::{
    domain::users::user::UserRecord,
    error::{CoreError, Result},
};

const EMAIL_UNIQUE_INDEX: &str = "idx_users_email_lower";

const USER_COLUMNS: &str = r#"
    id, username, password_hash, email, name, profile_picture_path,
    age, gender, date_of_birth, mobile_number, created_at, updated_at
"#;

/// PostgreSQL-backed implementation of the `UsersRepository` port.
#[derive(Clone, Debug)]
pub struct PostgresUsersRepository {
    pool: PgPool,
}

impl PostgresUsersRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn pool(&self) -> &PgPool {
        &self.pool
    }
}

fn map_write_error(err: sqlx::Error, action: &str) -> CoreError {
    if let Some(db_err) = err.as_database_error()
        && db_err.constraint() == Some(EMAIL_UNIQUE_INDEX)
    {
        return CoreError::Conflict("Email already exists".to_string());
    }
    CoreError::Internal(format!("Failed to {action}: {err}"))
}

#[async_trait]
impl UsersRepository for PostgresUsersRepository {
    async fn create_user(&self, user: &UserRecord) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO users (
                id, username, password_hash, email, name, profile_picture_path,
                age, gender, date_of_birth, mobile_number, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            "#,
        )
        .bind(user.id)
        .bind(&user.username)
        .bind(&user.password_hash)
        .bind(&user.email)
        .bind(&user.name)
        .bind(&user.profile_picture_path)
        .bind(user.age)
        .bind(&user.gender)
        .bind(user.date_of_birth)
        .bind(&user.mobile_number)
        .bind(user.created_at)
        .bind(user.updated_at)
        .execute(self.pool())
        .await
        .map_err(|e| map_write_error(e, "create user"))?;

        info!("Created user {}", user.id);
        Ok(())
    }

    async fn get_user_by_id(&self, id: Uuid) -> Result<Option<UserRecord>> {
        let query = format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1");
        sqlx::query_as::<_, UserRecord>(&query)
            .bind(id)
            .fetch_optional(self.pool())
            .await
            .map_err(|e| {
                CoreError::Internal(format!("Failed to get user by id: {}", e))
            })
    }

    async fn get_user_by_email(&self, email: &str) -> Result<Option<UserRecord>> {
        let query = format!(
            "SELECT {USER_COLUMNS} FROM users WHERE LOWER(email) = LOWER($1)"
        );
        sqlx::query_as::<_, UserRecord>(&query)
            .bind(email)
            .fetch_optional(self.pool())
            .await
            .map_err(|e| {
                CoreError::Internal(format!(
                    "Failed to get user by email: {}",
                    e
                ))
            })
    }

    async fn replace_user(&self, user: &UserRecord) -> Result<Option<UserRecord>> {
        let query = format!(
            r#"
            UPDATE users
            SET username = $2, password_hash = $3, email = $4, name = $5,
                profile_picture_path = $6, age = $7, gender = $8,
                date_of_birth = $9, mobile_number = $10, updated_at = NOW()
            WHERE id = $1
            RETURNING {USER_COLUMNS}
            "#
        );
        sqlx::query_as::<_, UserRecord>(&query)
            .bind(user.id)
            .bind(&user.username)
            .bind(&user.password_hash)
            .bind(&user.email)
            .bind(&user.name)
            .bind(&user.profile_picture_path)
            .bind(user.age)
            .bind(&user.gender)
            .bind(user.date_of_birth)
            .bind(&user.mobile_number)
            .fetch_optional(self.pool())
            .await
            .map_err(|e| map_write_error(e, "update user"))
    }
}
