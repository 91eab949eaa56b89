// src/main.rs
use axum::{extract::Extension, middleware, Router};
use dotenv::dotenv;
use reqwest::Client;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use std::env;
use std::path::PathBuf;
use std::time::Duration;
use std::{net::SocketAddr, str::FromStr, sync::Arc};
use tokio::{net::TcpListener, sync::RwLock};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::EnvFilter;

// ============================================================================
// MODULE IMPORTS
// ============================================================================

mod auth;
mod cards;
mod categories;
mod common;
mod expenses;
mod logging_middleware;
mod rate_limit_middleware;
mod services;

// ============================================================================
// COMMON IMPORTS
// ============================================================================

use auth::oauth::{GoogleOAuthConfig, GoogleOAuthService};
use auth::token::TokenCodec;
use common::auth_mode::{print_auth_mode_status, AuthMode};
use common::AppState;
use rate_limit_middleware::rate_limit_middleware;
use services::{RateLimitConfig, RateLimitService};

// ============================================================================
// MAIN APPLICATION ENTRY POINT
// ============================================================================

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    // ========================================================================
    // ENVIRONMENT CONFIGURATION
    // ========================================================================

    let database_url =
        env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite://savezy.db".to_string());
    let jwt_secret = env::var("JWT_SECRET_KEY")
        .unwrap_or_else(|_| "replace_with_strong_secret".to_string());
    let jwt_expiration_hours = env::var("JWT_EXPIRATION_HOURS")
        .ok()
        .and_then(|v| v.parse::<i64>().ok())
        .unwrap_or(24);
    let google_client_id = env::var("GOOGLE_CLIENT_ID").unwrap_or_default();
    let google_client_secret = env::var("GOOGLE_CLIENT_SECRET").unwrap_or_default();
    let google_redirect_uri = env::var("GOOGLE_REDIRECT_URI").unwrap_or_default();
    let state_ttl_seconds = env::var("OAUTH_STATE_TTL_SECONDS")
        .ok()
        .and_then(|v| v.parse::<u64>().ok())
        .unwrap_or(600);

    // Parse allowed redirect URIs from comma-separated env var
    let allowed_redirect_uris: Vec<String> = env::var("ALLOWED_MOBILE_REDIRECT_URIS")
        .unwrap_or_default()
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect();

    info!("Loaded allowed redirect URIs: {:?}", allowed_redirect_uris);

    // ========================================================================
    // AUTH MODE CONFIGURATION
    // ========================================================================

    let auth_mode = AuthMode::parse(&env::var("AUTH_MODE").unwrap_or_default());
    print_auth_mode_status(auth_mode);

    // ========================================================================
    // DATABASE SETUP
    // ========================================================================

    if let Some(path_part) = database_url.strip_prefix("sqlite://") {
        let path_without_params = path_part.split('?').next().unwrap_or("");
        if !path_without_params.is_empty() && !path_without_params.starts_with(':') {
            let db_path = PathBuf::from(path_without_params);
            if let Some(parent) = db_path.parent() {
                if !parent.as_os_str().is_empty() {
                    tokio::fs::create_dir_all(parent).await?;
                }
            }
        }
    }

    let connect_options = SqliteConnectOptions::from_str(&database_url)?.create_if_missing(true);
    let pool = SqlitePoolOptions::new()
        .connect_with(connect_options)
        .await?;

    // Run database migrations
    common::migrations::run_migrations(&pool).await?;

    // ========================================================================
    // SERVICE INITIALIZATION
    // ========================================================================

    let http_client = Client::builder()
        .timeout(Duration::from_secs(30))
        .no_proxy()
        .build()?;

    let token_codec = Arc::new(TokenCodec::new(jwt_secret, jwt_expiration_hours));
    info!("TokenCodec initialized");

    let google_service = Arc::new(GoogleOAuthService::new(
        http_client.clone(),
        GoogleOAuthConfig {
            client_id: google_client_id,
            client_secret: google_client_secret,
            redirect_uri: google_redirect_uri,
            allowed_redirect_uris,
            state_ttl: Duration::from_secs(state_ttl_seconds),
        },
    ));
    info!("GoogleOAuthService initialized");

    let rate_limit_service = Arc::new(RateLimitService::new(RateLimitConfig::from_env()));
    RateLimitService::start_cleanup_task(rate_limit_service.clone());
    info!("RateLimitService initialized");

    // ========================================================================
    // APPLICATION STATE
    // ========================================================================

    let app_state = AppState {
        db: pool,
        http: http_client,
        token_codec,
        google_service,
        rate_limit_service: rate_limit_service.clone(),
        auth_mode,
    };

    let shared = Arc::new(RwLock::new(app_state));

    // ========================================================================
    // ROUTER COMPOSITION
    // ========================================================================

    let app = Router::new()
        // ====================================================================
        // AUTHENTICATION ROUTES
        // ====================================================================
        .merge(auth::auth_routes())
        // ====================================================================
        // CARD ROUTES
        // ====================================================================
        .merge(cards::cards_routes())
        // ====================================================================
        // CATEGORY ROUTES
        // ====================================================================
        .merge(categories::categories_routes())
        // ====================================================================
        // EXPENSE ROUTES
        // ====================================================================
        .merge(expenses::expenses_routes())
        // ====================================================================
        // MIDDLEWARE AND LAYERS
        // ====================================================================
        // Add request/response body logging in debug mode
        .layer(middleware::from_fn(logging_middleware::log_request_response))
        .layer(middleware::from_fn(rate_limit_middleware))
        .layer(Extension(rate_limit_service))
        .layer(Extension(shared.clone()))
        .layer({
            // Get CORS origins from environment variable
            let cors_origins = std::env::var("CORS_ORIGINS")
                .unwrap_or_else(|_| "http://localhost:3000,http://localhost:5173".to_string());

            let origins: Vec<axum::http::HeaderValue> = cors_origins
                .split(',')
                .filter_map(|origin| origin.trim().parse().ok())
                .collect();

            CorsLayer::new()
                .allow_origin(origins)
                .allow_methods([
                    axum::http::Method::GET,
                    axum::http::Method::POST,
                    axum::http::Method::PUT,
                    axum::http::Method::DELETE,
                    axum::http::Method::PATCH,
                    axum::http::Method::OPTIONS,
                ])
                .allow_headers([
                    axum::http::header::CONTENT_TYPE,
                    axum::http::header::AUTHORIZATION,
                ])
                .allow_credentials(true)
        })
        .layer(TraceLayer::new_for_http());

    // ========================================================================
    // SERVER STARTUP
    // ========================================================================

    let port = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse::<u16>().ok())
        .unwrap_or(8080);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    info!("Listening on {}", addr);
    let listener = TcpListener::bind(addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}
