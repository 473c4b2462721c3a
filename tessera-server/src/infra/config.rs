use std::{env, path::PathBuf};

use anyhow::{Context, bail};

const DEFAULT_TOKEN_TTL_SECS: i64 = 3600;

/// Server configuration loaded from environment variables (and `.env`).
#[derive(Clone)]
pub struct Config {
    // Server settings
    pub server_host: String,
    pub server_port: u16,

    // Database settings; the in-memory store is used when unset
    pub database_url: Option<String>,

    // Upload storage
    pub uploads_dir: PathBuf,

    // CORS settings; empty means any origin
    pub cors_allowed_origins: Vec<String>,

    // Development settings
    pub dev_mode: bool,

    // Authentication secrets (pepper for Argon2 + HMAC key for tokens)
    pub auth_password_pepper: String,
    pub auth_token_secret: String,
    pub auth_token_ttl_secs: i64,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("server_host", &self.server_host)
            .field("server_port", &self.server_port)
            .field("database_configured", &self.database_url.is_some())
            .field("uploads_dir", &self.uploads_dir)
            .field("cors_allowed_origins", &self.cors_allowed_origins)
            .field("dev_mode", &self.dev_mode)
            .field("auth_token_ttl_secs", &self.auth_token_ttl_secs)
            .finish_non_exhaustive()
    }
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        // Load .env file if present
        dotenvy::dotenv().ok();

        let server_port = match env::var("SERVER_PORT") {
            Ok(raw) => raw
                .parse()
                .with_context(|| format!("SERVER_PORT is not a valid port: {raw}"))?,
            Err(_) => 4000,
        };

        let auth_token_ttl_secs = match env::var("AUTH_TOKEN_TTL_SECS") {
            Ok(raw) => raw.parse().with_context(|| {
                format!("AUTH_TOKEN_TTL_SECS is not a number: {raw}")
            })?,
            Err(_) => DEFAULT_TOKEN_TTL_SECS,
        };

        let config = Self {
            server_host: env::var("SERVER_HOST")
                .unwrap_or_else(|_| "0.0.0.0".to_string()),
            server_port,

            database_url: env::var("DATABASE_URL")
                .ok()
                .filter(|url| !url.trim().is_empty()),

            uploads_dir: env::var("UPLOADS_DIR")
                .unwrap_or_else(|_| "uploads".to_string())
                .into(),

            cors_allowed_origins: parse_origins(
                &env::var("CORS_ALLOWED_ORIGINS").unwrap_or_default(),
            ),

            dev_mode: env::var("DEV_MODE")
                .unwrap_or_else(|_| "false".to_string())
                .parse()
                .unwrap_or(false),

            auth_password_pepper: env::var("AUTH_PASSWORD_PEPPER")
                .unwrap_or_else(|_| "change-me-password-pepper".to_string()),
            auth_token_secret: env::var("AUTH_TOKEN_SECRET")
                .unwrap_or_else(|_| "change-me-token-secret".to_string()),
            auth_token_ttl_secs,
        };

        config.validate()?;
        Ok(config)
    }

    /// Reject settings that would leave the server unable to issue tokens.
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.auth_token_ttl_secs <= 0 {
            bail!("AUTH_TOKEN_TTL_SECS must be positive");
        }
        if self.auth_token_secret.is_empty() {
            bail!("AUTH_TOKEN_SECRET must not be empty");
        }
        if self.auth_password_pepper.is_empty() {
            bail!("AUTH_PASSWORD_PEPPER must not be empty");
        }
        Ok(())
    }

    /// True while either secret still carries its placeholder value.
    pub fn uses_default_secrets(&self) -> bool {
        self.auth_token_secret == "change-me-token-secret"
            || self.auth_password_pepper == "change-me-password-pepper"
    }

    pub fn ensure_directories(&self) -> anyhow::Result<()> {
        std::fs::create_dir_all(&self.uploads_dir).with_context(|| {
            format!(
                "failed to create uploads directory {}",
                self.uploads_dir.display()
            )
        })?;
        Ok(())
    }

    pub fn token_ttl(&self) -> chrono::Duration {
        chrono::Duration::seconds(self.auth_token_ttl_secs)
    }
}

fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|origin| !origin.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Config {
        Config {
            server_host: "127.0.0.1".into(),
            server_port: 0,
            database_url: None,
            uploads_dir: "uploads".into(),
            cors_allowed_origins: Vec::new(),
            dev_mode: true,
            auth_password_pepper: "pepper".into(),
            auth_token_secret: "secret".into(),
            auth_token_ttl_secs: 3600,
        }
    }

    #[test]
    fn parses_origin_lists() {
        assert!(parse_origins("").is_empty());
        assert_eq!(
            parse_origins(" http://a.test , ,http://b.test"),
            vec!["http://a.test".to_string(), "http://b.test".to_string()]
        );
    }

    #[test]
    fn rejects_non_positive_ttl() {
        let mut config = sample();
        assert!(config.validate().is_ok());
        config.auth_token_ttl_secs = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn debug_hides_secrets() {
        let rendered = format!("{:?}", sample());
        assert!(!rendered.contains("pepper"));
        assert!(!rendered.contains("secret"));
    }
}
