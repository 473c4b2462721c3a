//! User records and their public projection
//!
//! A [`UserRecord`] is the persisted shape owned by the credential store. It
//! carries the Argon2id password hash, which must never leave the server: every
//! externally visible view of a user goes through [`PublicProfile`].
//!
//! ## Example
//!
//! ```
//! use tessera_core::domain::users::user::UserRecord;
//!
//! let record = UserRecord::new("alice@example.com", "Alice", None);
//! let profile = record.public_profile();
//! assert_eq!(profile.email, "alice@example.com");
//! assert!(profile.profile_picture_path.is_none());
//! ```

use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Persisted user account.
///
/// The password hash is excluded from `Debug` output and has no serde
/// representation, so a record can be logged without leaking credentials.
#[derive(Clone)]
#[cfg_attr(feature = "database", derive(sqlx::FromRow))]
pub struct UserRecord {
    /// Unique user identifier, assigned at creation
    pub id: Uuid,
    /// Legacy handle; stored when supplied at registration but never
    /// validated, projected or used for lookup
    pub username: Option<String>,
    /// Argon2id PHC string
    pub password_hash: Option<String>,
    pub email: String,
    pub name: String,
    /// Relative path into upload storage, e.g. `uploads/<uuid>.png`
    pub profile_picture_path: Option<String>,
    pub age: Option<i32>,
    pub gender: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub mobile_number: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl fmt::Debug for UserRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UserRecord")
            .field("id", &self.id)
            .field("email", &self.email)
            .field("name", &self.name)
            .field("has_password", &self.password_hash.is_some())
            .finish_non_exhaustive()
    }
}

impl UserRecord {
    /// Build a fresh record with a new id and no optional profile fields.
    pub fn new(
        email: impl Into<String>,
        name: impl Into<String>,
        password_hash: Option<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            username: None,
            password_hash,
            email: email.into(),
            name: name.into(),
            profile_picture_path: None,
            age: None,
            gender: None,
            date_of_birth: None,
            mobile_number: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Project the record onto the fields that are safe to expose.
    pub fn public_profile(&self) -> PublicProfile {
        PublicProfile {
            id: self.id,
            email: self.email.clone(),
            name: self.name.clone(),
            profile_picture_path: self.profile_picture_path.clone(),
            age: self.age,
            gender: self.gender.clone(),
            date_of_birth: self.date_of_birth,
            mobile_number: self.mobile_number.clone(),
        }
    }
}

/// Public projection of a [`UserRecord`].
///
/// This is both the `user` object returned by the HTTP API and the snapshot
/// embedded in session tokens.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicProfile {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub profile_picture_path: Option<String>,
    pub age: Option<i32>,
    pub gender: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub mobile_number: Option<String>,
}

/// Registration request payload
///
/// # Example
///
/// ```json
/// {
///   "email": "alice@example.com",
///   "password": "hunter22",
///   "name": "Alice"
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    /// Plain text password (hashed before it is stored)
    pub password: String,
    pub name: String,
    #[serde(default)]
    pub username: Option<String>,
}

/// Login request payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    /// Email address (case-insensitive)
    pub email: String,
    pub password: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn public_profile_omits_credentials() {
        let mut record =
            UserRecord::new("a@x.com", "Alice", Some("$argon2id$hash".into()));
        record.username = Some("alice".into());

        let json = serde_json::to_value(record.public_profile()).unwrap();
        let object = json.as_object().unwrap();

        assert!(!object.contains_key("password"));
        assert!(!object.contains_key("passwordHash"));
        assert!(!object.contains_key("username"));
        assert_eq!(object["email"], "a@x.com");
        assert!(object.contains_key("profilePicturePath"));
        assert!(object.contains_key("dateOfBirth"));
        assert!(object.contains_key("mobileNumber"));
    }

    #[test]
    fn debug_output_redacts_password_hash() {
        let record =
            UserRecord::new("a@x.com", "Alice", Some("$argon2id$secret".into()));
        let rendered = format!("{record:?}");
        assert!(!rendered.contains("secret"));
        assert!(rendered.contains("has_password: true"));
    }
}
