//! # Tessera Server
//!
//! HTTP front end for the Tessera account backend: token-gated profile reads,
//! multipart profile updates with an optional picture, registration and
//! login. Every profile and account endpoint answers with the same
//! `{status, user?, token?, errors}` envelope.

pub mod infra;
pub mod routes;
pub mod users;

pub use infra::app_state::AppState;
