use std::{fmt, sync::Arc};

use anyhow::Context;
use tessera_core::{
    database::ports::users::UsersRepository,
    domain::users::{
        auth::{PasswordCrypto, TokenService},
        profile::{
            AccountService, ProfileReadService, ProfileUpdateWorkflow, UploadIntake,
        },
    },
    infra::DiskUploadStore,
};

use crate::infra::config::Config;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub users: Arc<dyn UsersRepository>,
    pub tokens: Arc<TokenService>,
    pub profile_reader: Arc<ProfileReadService>,
    pub profile_updates: Arc<ProfileUpdateWorkflow>,
    pub accounts: Arc<AccountService>,
}

impl fmt::Debug for AppState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppState").finish_non_exhaustive()
    }
}

impl AppState {
    /// Wire the services over an already-connected credential store, hashing
    /// passwords with the production Argon2 parameters.
    pub fn build(
        config: Arc<Config>,
        users: Arc<dyn UsersRepository>,
    ) -> anyhow::Result<Self> {
        let crypto = PasswordCrypto::new(config.auth_password_pepper.as_bytes())
            .context("failed to initialize password hashing")?;
        Self::with_crypto(config, users, crypto)
    }

    /// Like [`Self::build`] but with caller-chosen hashing parameters.
    pub fn with_crypto(
        config: Arc<Config>,
        users: Arc<dyn UsersRepository>,
        crypto: PasswordCrypto,
    ) -> anyhow::Result<Self> {
        let tokens = Arc::new(
            TokenService::new(config.auth_token_secret.as_bytes(), config.token_ttl())
                .context("failed to initialize token service")?,
        );
        let crypto = Arc::new(crypto);
        let intake = UploadIntake::new(Arc::new(DiskUploadStore::new(
            config.uploads_dir.clone(),
        )));

        let profile_reader =
            Arc::new(ProfileReadService::new(users.clone(), tokens.clone()));
        let profile_updates = Arc::new(ProfileUpdateWorkflow::new(
            users.clone(),
            tokens.clone(),
            crypto.clone(),
            intake,
        ));
        let accounts = Arc::new(AccountService::new(
            users.clone(),
            tokens.clone(),
            crypto,
        ));

        Ok(Self {
            config,
            users,
            tokens,
            profile_reader,
            profile_updates,
            accounts,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }
}
