//! # Tessera Core
//!
//! Core library for the Tessera account backend: user records, password
//! hashing, bearer token issuance, field validation, profile-picture intake
//! and the profile read/update workflows.
//!
//! ## Overview
//!
//! - **User Records**: [`domain::users::user::UserRecord`] and its public
//!   projection [`domain::users::user::PublicProfile`]
//! - **Authentication**: Argon2id password hashing and HS256 session tokens
//!   that embed a snapshot of the public profile
//! - **Profile Workflows**: token-gated profile reads and the multi-step
//!   profile update (upload intake, validation, password change, token
//!   re-issue)
//! - **Storage Abstraction**: the [`database::ports::users::UsersRepository`]
//!   port with PostgreSQL and in-memory adapters
//!
//! ## Feature Flags
//!
//! - `database`: Enables the PostgreSQL adapter and the embedded migrations
//!
//! ## Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use chrono::Duration;
//! use tessera_core::{
//!     database::memory::InMemoryUsersRepository,
//!     domain::users::{
//!         auth::{PasswordCrypto, TokenService},
//!         profile::AccountService,
//!         user::RegisterRequest,
//!     },
//! };
//!
//! async fn register() -> Result<(), Box<dyn std::error::Error>> {
//!     let users = Arc::new(InMemoryUsersRepository::new());
//!     let tokens = Arc::new(TokenService::new("secret", Duration::hours(1))?);
//!     let crypto = Arc::new(PasswordCrypto::new("pepper")?);
//!     let accounts = AccountService::new(users, tokens, crypto);
//!
//!     let session = accounts
//!         .register(RegisterRequest {
//!             email: "alice@example.com".to_string(),
//!             password: "hunter22".to_string(),
//!             name: "Alice".to_string(),
//!             username: None,
//!         })
//!         .await?;
//!     println!("registered {}", session.user.id);
//!     Ok(())
//! }
//! ```

#![cfg_attr(docsrs, feature(doc_cfg))]
#![allow(missing_docs)]

/// Storage ports and their adapters
pub mod database;

/// Domain types and services
pub mod domain;

/// Error types shared by the storage adapters
pub mod error;

/// Filesystem-backed infrastructure
pub mod infra;

pub use error::{CoreError, Result};

/// Embedded migrations for the PostgreSQL credential store.
#[cfg(feature = "database")]
pub static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("./migrations");
