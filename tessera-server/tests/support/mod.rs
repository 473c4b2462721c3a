#![allow(dead_code)]

use std::{net::SocketAddr, sync::Arc};

use anyhow::{Context, Result, anyhow};
use axum_test::TestServer;
use tempfile::TempDir;
use tessera_core::{
    database::{InMemoryUsersRepository, ports::users::UsersRepository},
    domain::users::{auth::PasswordCrypto, user::UserRecord},
};
use tessera_server::{AppState, infra::config::Config, routes::create_app};

pub const TOKEN_SECRET: &str = "integration-token-secret";
pub const PASSWORD_PEPPER: &str = "integration-pepper";
pub const PASSWORD: &str = "correct horse";

/// Smallest valid PNG header plus a few bytes of IHDR.
pub const PNG_BYTES: &[u8] = &[
    0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0x00, 0x00, 0x00, 0x0D,
    0x49, 0x48, 0x44, 0x52,
];

pub struct TestApp {
    pub server: TestServer,
    pub state: AppState,
    pub crypto: Arc<PasswordCrypto>,
    tempdir: TempDir,
}

impl TestApp {
    pub fn uploads_dir(&self) -> &std::path::Path {
        &self.state.config.uploads_dir
    }

    /// Number of files currently stored in the uploads directory.
    pub fn stored_uploads(&self) -> usize {
        std::fs::read_dir(self.uploads_dir())
            .map(|entries| entries.count())
            .unwrap_or(0)
    }

    pub async fn seed_user(&self, email: &str, name: &str) -> Result<UserRecord> {
        let hash = self
            .crypto
            .hash_password(PASSWORD)
            .map_err(|err| anyhow!(err.to_string()))?;
        let record = UserRecord::new(email, name, Some(hash));
        self.state.users.create_user(&record).await?;
        Ok(record)
    }

    pub fn token_for(&self, record: &UserRecord) -> Result<String> {
        self.state
            .tokens
            .issue(&record.public_profile())
            .map_err(|err| anyhow!(err.to_string()))
    }

    pub async fn stored(&self, record: &UserRecord) -> Result<UserRecord> {
        self.state
            .users
            .get_user_by_id(record.id)
            .await?
            .context("seeded user missing")
    }
}

pub fn test_config(tempdir: &TempDir) -> Config {
    Config {
        server_host: "127.0.0.1".into(),
        server_port: 0,
        database_url: None,
        uploads_dir: tempdir.path().join("uploads"),
        cors_allowed_origins: Vec::new(),
        dev_mode: true,
        auth_password_pepper: PASSWORD_PEPPER.into(),
        auth_token_secret: TOKEN_SECRET.into(),
        auth_token_ttl_secs: 3600,
    }
}

pub async fn build_test_app() -> Result<TestApp> {
    let tempdir = tempfile::tempdir().context("failed to create temporary directory")?;
    let config = test_config(&tempdir);
    config.ensure_directories()?;

    let users: Arc<dyn UsersRepository> = Arc::new(InMemoryUsersRepository::new());
    let crypto = PasswordCrypto::insecure_fast(PASSWORD_PEPPER)
        .map_err(|err| anyhow!(err.to_string()))?;
    let state = AppState::with_crypto(Arc::new(config), users, crypto)?;

    // A second handle with identical parameters for seeding and assertions.
    let crypto = Arc::new(
        PasswordCrypto::insecure_fast(PASSWORD_PEPPER)
            .map_err(|err| anyhow!(err.to_string()))?,
    );

    let make_service = create_app(state.clone())
        .into_make_service_with_connect_info::<SocketAddr>();
    let server = TestServer::builder()
        .http_transport()
        .build(make_service)
        .map_err(|err| anyhow!(err.to_string()))?;

    Ok(TestApp {
        server,
        state,
        crypto,
        tempdir,
    })
}
