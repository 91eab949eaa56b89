//! Authentication routes

use axum::{
    routing::{get, post},
    Router,
};

use super::handlers;

/// Creates and returns the authentication router
///
/// # Routes
/// - `GET /api/auth/google/init` - Start the Google OAuth flow
/// - `POST /api/auth/google/callback` - Exchange code + state for a token
/// - `POST /api/auth/token/verify` - Check token validity
/// - `POST /api/auth/token/refresh` - Re-issue a token
/// - `GET /check` - Health check
pub fn auth_routes() -> Router {
    Router::new()
        .route("/api/auth/google/init", get(handlers::google_init))
        .route("/api/auth/google/callback", post(handlers::google_callback))
        .route("/api/auth/token/verify", post(handlers::verify_token))
        .route("/api/auth/token/refresh", post(handlers::refresh_token))
        .route("/check", get(handlers::health_check))
}
