use axum::{Json, extract::State};
use tessera_core::domain::users::user::{LoginRequest, RegisterRequest};

use crate::{AppState, users::envelope::EnvelopeReply};

/// Create an account and return it with a session token.
pub async fn register_handler(
    State(state): State<AppState>,
    Json(request): Json<RegisterRequest>,
) -> EnvelopeReply {
    state.accounts.register(request).await.into()
}

pub async fn login_handler(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> EnvelopeReply {
    state.accounts.login(request).await.into()
}
