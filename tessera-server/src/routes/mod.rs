use axum::{
    Router,
    extract::DefaultBodyLimit,
    http::{HeaderValue, Method, header},
    routing::{get, post},
};
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    services::ServeDir,
    trace::TraceLayer,
};

use crate::{
    AppState,
    users::{account_handlers, profile_handlers},
};

/// Request paths served by [`create_app`].
pub mod paths {
    pub const ROOT: &str = "/";
    pub const USER: &str = "/user";
    pub const USER_BY_ID: &str = "/user/{userId}";
    pub const UPLOADS: &str = "/uploads";

    pub mod auth {
        pub const REGISTER: &str = "/auth/register";
        pub const LOGIN: &str = "/auth/login";
    }

    /// Concrete path for one user's profile.
    pub fn user(id: impl std::fmt::Display) -> String {
        format!("{USER}/{id}")
    }
}

/// Upper bound on a profile update body, picture included.
pub const MAX_UPDATE_BODY_BYTES: usize = 10 * 1024 * 1024;

/// Build the complete application router with state applied.
pub fn create_app(state: AppState) -> Router {
    let uploads = ServeDir::new(state.config().uploads_dir.clone());
    let cors = cors_layer(&state);

    Router::new()
        .route(paths::ROOT, get(liveness_handler))
        .route(
            paths::USER_BY_ID,
            get(profile_handlers::get_profile_handler),
        )
        .route(
            paths::USER,
            post(profile_handlers::update_profile_handler)
                .put(profile_handlers::update_profile_handler)
                .layer(DefaultBodyLimit::max(MAX_UPDATE_BODY_BYTES)),
        )
        .route(paths::auth::REGISTER, post(account_handlers::register_handler))
        .route(paths::auth::LOGIN, post(account_handlers::login_handler))
        .nest_service(paths::UPLOADS, uploads)
        // Outer to inner: CORS, then tracing
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Permissive in dev mode or without an allow-list, otherwise limited to the
/// configured origins.
fn cors_layer(state: &AppState) -> CorsLayer {
    if state.config().dev_mode {
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = state
        .config()
        .cors_allowed_origins
        .iter()
        .filter_map(|origin| HeaderValue::from_str(origin).ok())
        .collect();
    let allow_origin = if origins.is_empty() {
        AllowOrigin::any()
    } else {
        AllowOrigin::list(origins)
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
}

async fn liveness_handler() -> &'static str {
    "Tessera account service is running"
}
