use axum::{
    body::Bytes,
    extract::{Multipart, Path, State},
    http::{HeaderMap, header},
};
use serde::Deserialize;
use tessera_core::domain::users::profile::{IncomingUpload, UpdateRequest};
use tracing::debug;

use crate::{
    AppState,
    infra::errors::{AppError, AppResult},
    users::envelope::EnvelopeReply,
};

#[derive(Debug, Default, Deserialize)]
struct TokenBody {
    token: Option<String>,
}

/// `GET /user/{userId}` with the token in a JSON body, or as a bearer header.
pub async fn get_profile_handler(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    headers: HeaderMap,
    body: Bytes,
) -> AppResult<EnvelopeReply> {
    let body_token = if body.iter().all(u8::is_ascii_whitespace) {
        None
    } else {
        serde_json::from_slice::<TokenBody>(&body)
            .map_err(|err| AppError::bad_request(format!("Invalid JSON body: {err}")))?
            .token
    };
    let token = body_token.or_else(|| bearer_token(&headers));

    let result = state
        .profile_reader
        .get_profile(Some(&user_id), token.as_deref())
        .await;
    Ok(result.into())
}

/// `PUT /user` and `POST /user`: multipart form with an optional picture.
pub async fn update_profile_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    multipart: Multipart,
) -> AppResult<EnvelopeReply> {
    let mut request = read_update_form(multipart).await?;
    if request.token.as_deref().is_none_or(|t| t.trim().is_empty()) {
        request.token = bearer_token(&headers);
    }

    let result = state.profile_updates.update_profile(request).await;
    Ok(result.into())
}

/// Collect text fields into an [`UpdateRequest`] and every file part into
/// its upload list. Unknown text fields are ignored.
async fn read_update_form(mut multipart: Multipart) -> AppResult<UpdateRequest> {
    let mut request = UpdateRequest::default();

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().unwrap_or_default().to_string();

        if let Some(file_name) = field.file_name().map(str::to_string) {
            let content_type = field.content_type().map(str::to_string);
            let bytes = field.bytes().await?;
            request.uploads.push(IncomingUpload {
                field_name: name,
                file_name: Some(file_name),
                content_type,
                bytes: bytes.to_vec(),
            });
            continue;
        }

        let value = field.text().await?;
        let slot = match name.as_str() {
            "id" => &mut request.id,
            "token" => &mut request.token,
            "password" => &mut request.password,
            "newPassword" => &mut request.new_password,
            "email" => &mut request.email,
            "name" => &mut request.name,
            "age" => &mut request.age,
            "gender" => &mut request.gender,
            "dob" => &mut request.dob,
            "mobile" => &mut request.mobile,
            other => {
                debug!(field = %other, "ignoring unknown form field");
                continue;
            }
        };
        *slot = Some(value);
    }

    Ok(request)
}

/// Token from an `Authorization: Bearer <token>` header, if any.
pub(crate) fn bearer_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(str::to_string)
}
