//! Authentication extractors for Axum

use async_trait::async_trait;
use axum::{
    extract::{Extension, FromRequestParts},
    http::{header::AUTHORIZATION, request::Parts},
};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, warn};

use super::token::TokenCodec;
use crate::common::auth_mode::AuthMode;
use crate::common::{safe_email_log, ApiError, AppState};

/// Authenticated user extractor
///
/// Every protected handler receives its request through this gate: the bearer
/// credential is extracted, verified against the token codec, and the
/// resolved identity is handed to the handler. The struct is immutable for
/// the life of the request.
#[derive(Debug, Clone)]
pub struct AuthedUser {
    pub id: String,
    pub email: String,
}

/// Parse the structured plaintext test credential (`user_id|email|name`).
///
/// Only consulted when the process runs in test auth mode; in production the
/// gate never calls this, so the shape is inert there.
pub(crate) fn parse_test_credential(raw: &str) -> Option<AuthedUser> {
    let mut parts = raw.splitn(3, '|');
    let id = parts.next()?.trim();
    let email = parts.next()?.trim();
    let _name = parts.next()?;

    if id.is_empty() || email.is_empty() || !email.contains('@') {
        return None;
    }

    Some(AuthedUser {
        id: id.to_string(),
        email: email.to_string(),
    })
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthedUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Extension(state_lock): Extension<Arc<RwLock<AppState>>> =
            Extension::from_request_parts(parts, state)
                .await
                .map_err(|_| ApiError::InternalServer("missing app state".to_string()))?;

        let app_state = state_lock.read().await.clone();

        // Extract credential from the Authorization header
        let token = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|h| h.to_str().ok())
            .map(|s| s.to_string());

        let token = match token {
            Some(t) => t,
            None => {
                warn!("Authentication failed: missing Authorization header");
                return Err(ApiError::Unauthorized("Token is missing".into()));
            }
        };

        // Handle "Bearer <token>" format or raw token
        let bare_token = token.strip_prefix("Bearer ").unwrap_or(&token).to_string();

        match resolve_credential(app_state.auth_mode, &app_state.token_codec, &bare_token) {
            Some(user) => {
                debug!(
                    user_id = %user.id,
                    email = %safe_email_log(&user.email),
                    "Request authenticated"
                );
                Ok(user)
            }
            None => Err(ApiError::Unauthorized("Token is invalid or expired".into())),
        }
    }
}

/// The gate's credential decision, kept pure so the mode contract is testable
/// in isolation. The plaintext path is only ever consulted in test mode.
pub(crate) fn resolve_credential(
    mode: AuthMode,
    codec: &TokenCodec,
    bare_token: &str,
) -> Option<AuthedUser> {
    if mode.is_test() {
        if let Some(user) = parse_test_credential(bare_token) {
            debug!(user_id = %user.id, "TEST MODE: plaintext credential accepted");
            return Some(user);
        }
    }

    codec.verify(bare_token).map(|claims| AuthedUser {
        id: claims.sub,
        email: claims.email,
    })
}
