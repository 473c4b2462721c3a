//! The `{status, user?, token?, errors}` body shared by every profile and
//! account endpoint.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use tessera_core::domain::users::{
    profile::{AuthenticatedProfile, ProfileError},
    user::PublicProfile,
    validation::FieldErrors,
};
use tracing::error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EnvelopeStatus {
    Success,
    Failure,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileEnvelope {
    pub status: EnvelopeStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<PublicProfile>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    pub errors: FieldErrors,
}

impl ProfileEnvelope {
    pub fn profile(user: PublicProfile) -> Self {
        Self {
            status: EnvelopeStatus::Success,
            user: Some(user),
            token: None,
            errors: FieldErrors::new(),
        }
    }

    pub fn authenticated(session: AuthenticatedProfile) -> Self {
        Self {
            status: EnvelopeStatus::Success,
            user: Some(session.user),
            token: Some(session.token),
            errors: FieldErrors::new(),
        }
    }

    pub fn failure(err: &ProfileError) -> Self {
        Self {
            status: EnvelopeStatus::Failure,
            user: None,
            token: None,
            errors: err.field_errors(),
        }
    }
}

/// Response wrapper that renders a workflow outcome as an envelope.
///
/// Domain failures are reported with HTTP 200 and `status: "failure"`; only
/// storage faults change the HTTP status.
#[derive(Debug)]
pub struct EnvelopeReply(pub Result<ProfileEnvelope, ProfileError>);

impl From<Result<PublicProfile, ProfileError>> for EnvelopeReply {
    fn from(result: Result<PublicProfile, ProfileError>) -> Self {
        Self(result.map(ProfileEnvelope::profile))
    }
}

impl From<Result<AuthenticatedProfile, ProfileError>> for EnvelopeReply {
    fn from(result: Result<AuthenticatedProfile, ProfileError>) -> Self {
        Self(result.map(ProfileEnvelope::authenticated))
    }
}

impl IntoResponse for EnvelopeReply {
    fn into_response(self) -> Response {
        match self.0 {
            Ok(envelope) => (StatusCode::OK, Json(envelope)).into_response(),
            Err(err) => {
                let status = if err.is_storage() {
                    error!(error = %err, "profile request failed on storage");
                    StatusCode::INTERNAL_SERVER_ERROR
                } else {
                    StatusCode::OK
                };
                (status, Json(ProfileEnvelope::failure(&err))).into_response()
            }
        }
    }
}
