// src/auth/oauth.rs
//! Google OAuth exchange adapter
//!
//! Owns the anti-forgery state table and the two network calls of the
//! authorization-code flow: code-for-token exchange and the userinfo fetch.
//! State entries are single use and expire after a bounded window.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use rand::RngCore;
use reqwest::Client;
use serde::Deserialize;
use std::collections::HashMap;
use std::time::{Duration, Instant};
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::{debug, error, warn};

use crate::common::ApiError;

#[derive(Debug, Error)]
pub enum OAuthError {
    #[error("Invalid redirect_uri")]
    InvalidRedirectUri,

    #[error("State is invalid or expired")]
    InvalidOrExpiredState,

    #[error("redirect_uri does not match the one supplied at init")]
    RedirectMismatch,

    #[error("Failed to exchange authorization code: {0}")]
    ExchangeFailed(String),

    #[error("Invalid user information from Google")]
    InvalidUserInfo,

    #[error("HTTP request to identity provider failed: {0}")]
    RequestFailed(String),
}

impl From<OAuthError> for ApiError {
    fn from(e: OAuthError) -> Self {
        match e {
            OAuthError::InvalidRedirectUri => ApiError::BadRequest("Invalid redirect_uri".to_string()),
            OAuthError::InvalidOrExpiredState => {
                ApiError::Unauthorized("State is invalid or expired".to_string())
            }
            OAuthError::RedirectMismatch => {
                ApiError::Unauthorized("redirect_uri does not match".to_string())
            }
            OAuthError::ExchangeFailed(msg) => {
                ApiError::BadRequest(format!("Failed to exchange authorization code: {}", msg))
            }
            OAuthError::InvalidUserInfo => {
                ApiError::BadRequest("Invalid user information from Google".to_string())
            }
            OAuthError::RequestFailed(msg) => {
                ApiError::Upstream(format!("Identity provider unavailable: {}", msg))
            }
        }
    }
}

/// Profile fields returned by Google's userinfo endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct GoogleProfile {
    pub id: String,
    pub email: String,
    pub name: Option<String>,
    pub picture: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TokenExchangeResponse {
    access_token: Option<String>,
}

#[derive(Debug, Clone)]
struct StateEntry {
    redirect_uri: String,
    created_at: Instant,
}

/// Pending-state table for the authorization flow.
///
/// Entries are burned on first lookup, so a replayed state always fails even
/// when the first attempt was rejected for a redirect mismatch.
#[derive(Debug)]
pub struct OAuthStateStore {
    entries: RwLock<HashMap<String, StateEntry>>,
    ttl: Duration,
}

impl OAuthStateStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            ttl,
        }
    }

    /// Mint an opaque single-use state value bound to `redirect_uri`.
    pub async fn issue(&self, redirect_uri: &str) -> String {
        let mut bytes = [0u8; 32];
        rand::thread_rng().fill_bytes(&mut bytes);
        let state = URL_SAFE_NO_PAD.encode(bytes);

        let mut entries = self.entries.write().await;
        // Opportunistic cleanup keeps the table bounded without a sweeper.
        let ttl = self.ttl;
        entries.retain(|_, entry| entry.created_at.elapsed() <= ttl);
        entries.insert(
            state.clone(),
            StateEntry {
                redirect_uri: redirect_uri.to_string(),
                created_at: Instant::now(),
            },
        );
        state
    }

    /// Consume a state value, verifying freshness and the bound redirect URI.
    pub async fn consume(&self, state: &str, redirect_uri: &str) -> Result<(), OAuthError> {
        let entry = {
            let mut entries = self.entries.write().await;
            entries.remove(state)
        };

        let entry = entry.ok_or(OAuthError::InvalidOrExpiredState)?;

        if entry.created_at.elapsed() > self.ttl {
            warn!("OAuth state expired before callback");
            return Err(OAuthError::InvalidOrExpiredState);
        }

        if entry.redirect_uri != redirect_uri {
            warn!("OAuth callback redirect_uri does not match the recorded one");
            return Err(OAuthError::RedirectMismatch);
        }

        Ok(())
    }
}

/// Configuration for the Google OAuth flow, read once at startup.
#[derive(Debug, Clone)]
pub struct GoogleOAuthConfig {
    pub client_id: String,
    pub client_secret: String,
    /// Backend callback registered with Google.
    pub redirect_uri: String,
    /// Allow-listed mobile/web redirect URIs.
    pub allowed_redirect_uris: Vec<String>,
    pub state_ttl: Duration,
}

/// Turns an authorization code plus anti-forgery state into a verified
/// Google profile.
#[derive(Debug)]
pub struct GoogleOAuthService {
    client: Client,
    config: GoogleOAuthConfig,
    state_store: OAuthStateStore,
}

impl GoogleOAuthService {
    pub fn new(client: Client, config: GoogleOAuthConfig) -> Self {
        let state_store = OAuthStateStore::new(config.state_ttl);
        Self {
            client,
            config,
            state_store,
        }
    }

    fn is_allowed_redirect(&self, redirect_uri: &str) -> bool {
        self.config
            .allowed_redirect_uris
            .iter()
            .any(|uri| uri == redirect_uri)
    }

    /// Build the Google authorization URL for an allow-listed redirect URI.
    pub async fn init(&self, redirect_uri: &str) -> Result<String, OAuthError> {
        if !self.is_allowed_redirect(redirect_uri) {
            warn!("Rejected OAuth init for non-allow-listed redirect_uri");
            return Err(OAuthError::InvalidRedirectUri);
        }

        let state = self.state_store.issue(redirect_uri).await;

        let auth_url = format!(
            "https://accounts.google.com/o/oauth2/v2/auth?client_id={}&redirect_uri={}&response_type=code&scope={}&access_type=offline&state={}",
            urlencoding::encode(&self.config.client_id),
            urlencoding::encode(&self.config.redirect_uri),
            urlencoding::encode("openid email profile"),
            urlencoding::encode(&state),
        );

        debug!("Generated Google OAuth authorization URL");
        Ok(auth_url)
    }

    /// Exchange a callback's code and state for a verified profile.
    pub async fn exchange(
        &self,
        code: &str,
        state: &str,
        redirect_uri: &str,
    ) -> Result<GoogleProfile, OAuthError> {
        if !self.is_allowed_redirect(redirect_uri) {
            return Err(OAuthError::InvalidRedirectUri);
        }

        self.state_store.consume(state, redirect_uri).await?;

        let access_token = self.exchange_code(code).await?;
        self.fetch_profile(&access_token).await
    }

    async fn exchange_code(&self, code: &str) -> Result<String, OAuthError> {
        let params = [
            ("code", code),
            ("client_id", self.config.client_id.as_str()),
            ("client_secret", self.config.client_secret.as_str()),
            ("redirect_uri", self.config.redirect_uri.as_str()),
            ("grant_type", "authorization_code"),
        ];

        debug!("Exchanging authorization code for tokens");

        let response = self
            .client
            .post("https://oauth2.googleapis.com/token")
            .form(&params)
            .send()
            .await
            .map_err(|e| OAuthError::RequestFailed(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            error!(status = %status, error = %error_text, "Token exchange failed");
            return Err(OAuthError::ExchangeFailed(format!("HTTP {}", status)));
        }

        let body: TokenExchangeResponse = response
            .json()
            .await
            .map_err(|e| OAuthError::RequestFailed(e.to_string()))?;

        body.access_token
            .ok_or_else(|| OAuthError::ExchangeFailed("No access token received".to_string()))
    }

    async fn fetch_profile(&self, access_token: &str) -> Result<GoogleProfile, OAuthError> {
        let response = self
            .client
            .get("https://www.googleapis.com/oauth2/v2/userinfo")
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|e| OAuthError::RequestFailed(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            error!(status = %status, "Userinfo fetch failed");
            return Err(OAuthError::ExchangeFailed(format!("HTTP {}", status)));
        }

        let profile: GoogleProfile = response
            .json()
            .await
            .map_err(|_| OAuthError::InvalidUserInfo)?;

        if profile.id.is_empty() || profile.email.is_empty() {
            return Err(OAuthError::InvalidUserInfo);
        }

        Ok(profile)
    }
}
