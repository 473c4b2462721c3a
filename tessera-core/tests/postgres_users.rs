#![cfg(feature = "database")]

use anyhow::Result;
use chrono::NaiveDate;
use sqlx::PgPool;
use tessera_core::{
    CoreError,
    database::{PostgresUsersRepository, ports::users::UsersRepository},
    domain::users::user::UserRecord,
};
use uuid::Uuid;

fn alice() -> UserRecord {
    let mut user = UserRecord::new("Alice@x.com", "Alice", Some("$argon2id$stub".into()));
    user.username = Some("alice".into());
    user.age = Some(30);
    user.gender = Some("female".into());
    user.date_of_birth = NaiveDate::from_ymd_opt(1994, 3, 9);
    user
}

#[sqlx::test(migrator = "tessera_core::MIGRATOR")]
async fn create_then_lookup_by_id_and_email(pool: PgPool) -> Result<()> {
    let repo = PostgresUsersRepository::new(pool);
    let user = alice();
    repo.create_user(&user).await?;

    let by_id = repo.get_user_by_id(user.id).await?.expect("user inserted");
    assert_eq!(by_id.public_profile(), user.public_profile());
    assert_eq!(by_id.username.as_deref(), Some("alice"));
    assert_eq!(by_id.password_hash, user.password_hash);

    let by_email = repo
        .get_user_by_email("alice@X.COM")
        .await?
        .expect("lookup ignores case");
    assert_eq!(by_email.id, user.id);

    assert!(repo.get_user_by_id(Uuid::new_v4()).await?.is_none());
    assert!(repo.get_user_by_email("nobody@x.com").await?.is_none());
    Ok(())
}

#[sqlx::test(migrator = "tessera_core::MIGRATOR")]
async fn replace_returns_the_stored_row(pool: PgPool) -> Result<()> {
    let repo = PostgresUsersRepository::new(pool);
    let user = alice();
    repo.create_user(&user).await?;

    let mut changed = user.clone();
    changed.name = "Bob".into();
    changed.email = "bob@x.com".into();
    changed.gender = None;
    changed.mobile_number = Some("+15550001111".into());
    changed.profile_picture_path = Some("uploads/new.png".into());

    let stored = repo.replace_user(&changed).await?.expect("row updated");
    assert_eq!(stored.public_profile(), changed.public_profile());
    assert!(stored.updated_at >= stored.created_at);

    let reloaded = repo.get_user_by_id(user.id).await?.expect("row present");
    assert_eq!(reloaded.public_profile(), changed.public_profile());
    Ok(())
}

#[sqlx::test(migrator = "tessera_core::MIGRATOR")]
async fn duplicate_email_on_create_is_a_conflict(pool: PgPool) -> Result<()> {
    let repo = PostgresUsersRepository::new(pool);
    repo.create_user(&alice()).await?;

    let clash = UserRecord::new("ALICE@x.com", "Other", None);
    let err = repo.create_user(&clash).await.unwrap_err();
    assert!(matches!(err, CoreError::Conflict(_)), "got {err:?}");
    assert!(repo.get_user_by_id(clash.id).await?.is_none());
    Ok(())
}

#[sqlx::test(migrator = "tessera_core::MIGRATOR")]
async fn duplicate_email_on_replace_is_a_conflict(pool: PgPool) -> Result<()> {
    let repo = PostgresUsersRepository::new(pool);
    let user = alice();
    let bob = UserRecord::new("bob@x.com", "Bob", None);
    repo.create_user(&user).await?;
    repo.create_user(&bob).await?;

    let mut changed = bob.clone();
    changed.email = "alice@x.com".into();
    let err = repo.replace_user(&changed).await.unwrap_err();
    assert!(matches!(err, CoreError::Conflict(_)), "got {err:?}");

    let stored = repo.get_user_by_id(bob.id).await?.expect("bob present");
    assert_eq!(stored.email, "bob@x.com");
    Ok(())
}

#[sqlx::test(migrator = "tessera_core::MIGRATOR")]
async fn replace_of_missing_id_returns_none(pool: PgPool) -> Result<()> {
    let repo = PostgresUsersRepository::new(pool);
    let ghost = UserRecord::new("ghost@x.com", "Ghost", None);

    assert!(repo.replace_user(&ghost).await?.is_none());
    assert!(repo.get_user_by_email("ghost@x.com").await?.is_none());
    Ok(())
}
