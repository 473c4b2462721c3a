//! User accounts: records, validation, authentication primitives and the
//! profile workflows built on top of them.

pub mod auth;
pub mod profile;
pub mod user;
pub mod validation;
