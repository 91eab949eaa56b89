//! Authentication handlers

use axum::extract::{Extension, Json, Query};
use axum::http::StatusCode;
use serde_json::json;
use sqlx::SqlitePool;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{error, info, warn};

use super::models::{CallbackRequest, InitParams, TokenRequest, User};
use crate::common::{generate_user_id, safe_email_log, ApiError, AppState};
use crate::common::helpers::safe_token_log;

/// GET /api/auth/google/init?redirect_uri=...
///
/// Validates the redirect URI against the allow-list, records a single-use
/// anti-forgery state and returns the Google authorization URL.
pub async fn google_init(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    Query(params): Query<InitParams>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let state = state_lock.read().await.clone();

    let redirect_uri = params
        .redirect_uri
        .ok_or_else(|| ApiError::BadRequest("redirect_uri is required".to_string()))?;

    let auth_url = state.google_service.init(&redirect_uri).await?;

    Ok(Json(json!({ "auth_url": auth_url })))
}

/// POST /api/auth/google/callback
///
/// # Request Body
/// ```json
/// {
///   "code": "AUTH_CODE_FROM_GOOGLE",
///   "state": "STATE_FROM_INIT",
///   "redirect_uri": "myapp://auth/callback"
/// }
/// ```
///
/// Consumes the recorded state, exchanges the code with Google, upserts the
/// user by email and returns a fresh bearer token plus the user.
pub async fn google_callback(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    Json(payload): Json<CallbackRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let state = state_lock.read().await.clone();

    let code = payload
        .code
        .ok_or_else(|| ApiError::BadRequest("Authorization code is required".to_string()))?;
    let oauth_state = payload
        .state
        .ok_or_else(|| ApiError::BadRequest("state is required".to_string()))?;
    let redirect_uri = payload
        .redirect_uri
        .ok_or_else(|| ApiError::BadRequest("redirect_uri is required".to_string()))?;

    info!("Received Google OAuth callback");

    let profile = state
        .google_service
        .exchange(&code, &oauth_state, &redirect_uri)
        .await?;

    let user = upsert_user(&state.db, &profile.email, profile.name.as_deref(), profile.picture.as_deref()).await?;

    let token = state.token_codec.issue(&user.id, &user.email).map_err(|e| {
        error!(error = %e, user_id = %user.id, "JWT encoding error during authentication");
        ApiError::InternalServer("jwt error".to_string())
    })?;

    info!(
        user_id = %user.id,
        email = %safe_email_log(&user.email),
        provider = "google",
        "User authentication successful via Google OAuth"
    );

    Ok(Json(json!({
        "success": true,
        "token": token,
        "user": user,
    })))
}

/// POST /api/auth/token/verify
///
/// Accepts `{token}` in the body (or a bearer header) and reports validity
/// along with the decoded payload.
pub async fn verify_token(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    headers: axum::http::HeaderMap,
    Json(payload): Json<TokenRequest>,
) -> Result<(StatusCode, Json<serde_json::Value>), ApiError> {
    let state = state_lock.read().await.clone();

    let token = match payload.token.or_else(|| bearer_from_headers(&headers)) {
        Some(t) => t,
        None => return Err(ApiError::BadRequest("Token is required".to_string())),
    };

    match state.token_codec.verify(&token) {
        Some(claims) => Ok((
            StatusCode::OK,
            Json(json!({
                "valid": true,
                "payload": {
                    "user_id": claims.sub,
                    "email": claims.email,
                    "iat": claims.iat,
                    "exp": claims.exp,
                },
            })),
        )),
        None => {
            warn!(token = %safe_token_log(&token), "Token verification failed");
            Ok((
                StatusCode::UNAUTHORIZED,
                Json(json!({
                    "valid": false,
                    "error": "Token is invalid or expired",
                })),
            ))
        }
    }
}

/// POST /api/auth/token/refresh
///
/// Re-issues a token with a fresh expiry. The presented token may already be
/// expired; only its signature must be valid.
pub async fn refresh_token(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    Json(payload): Json<TokenRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let state = state_lock.read().await.clone();

    let token = payload
        .token
        .ok_or_else(|| ApiError::BadRequest("Token is required".to_string()))?;

    match state.token_codec.refresh(&token) {
        Some(new_token) => Ok(Json(json!({ "token": new_token }))),
        None => {
            warn!(token = %safe_token_log(&token), "Token refresh rejected");
            Err(ApiError::Unauthorized("Token is invalid".to_string()))
        }
    }
}

/// GET /check - health check
pub async fn health_check() -> Json<serde_json::Value> {
    Json(json!({
        "status": "healthy",
        "message": "Savezy API is running",
    }))
}

// ---- Helper Functions ----

fn bearer_from_headers(headers: &axum::http::HeaderMap) -> Option<String> {
    headers
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(|s| s.to_string())
}

/// Create or update a user keyed by email, returning the stored row.
async fn upsert_user(
    pool: &SqlitePool,
    email: &str,
    name: Option<&str>,
    picture: Option<&str>,
) -> Result<User, ApiError> {
    let existing: Option<User> = sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = ?")
        .bind(email)
        .fetch_optional(pool)
        .await
        .map_err(ApiError::DatabaseError)?;

    if existing.is_none() {
        let id = generate_user_id();
        info!(
            user_id = %id,
            email = %safe_email_log(email),
            provider = "google",
            "Creating new user account via Google OAuth"
        );

        sqlx::query("INSERT OR IGNORE INTO users (id, email, name, picture) VALUES (?, ?, ?, ?)")
            .bind(&id)
            .bind(email)
            .bind(name)
            .bind(picture)
            .execute(pool)
            .await
            .map_err(|e| {
                error!(
                    error = %e,
                    email = %safe_email_log(email),
                    "Database error inserting new user during OAuth flow"
                );
                ApiError::DatabaseError(e)
            })?;
    } else {
        sqlx::query("UPDATE users SET name = ?, picture = ? WHERE email = ?")
            .bind(name)
            .bind(picture)
            .bind(email)
            .execute(pool)
            .await
            .map_err(ApiError::DatabaseError)?;
    }

    sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = ?")
        .bind(email)
        .fetch_one(pool)
        .await
        .map_err(ApiError::DatabaseError)
}
