// Application state shared across all modules

use reqwest::Client;
use sqlx::SqlitePool;
use std::sync::Arc;

use crate::auth::oauth::GoogleOAuthService;
use crate::auth::token::TokenCodec;
use crate::common::auth_mode::AuthMode;
use crate::services::RateLimitService;

/// Application state containing the database pool, services, and configuration
#[derive(Clone)]
pub struct AppState {
    pub db: SqlitePool,
    pub http: Client,
    pub token_codec: Arc<TokenCodec>,
    pub google_service: Arc<GoogleOAuthService>,
    pub rate_limit_service: Arc<RateLimitService>,
    pub auth_mode: AuthMode,
}
