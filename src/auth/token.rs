//! Signed bearer token lifecycle
//!
//! The codec is a pure function of its signing secret: nothing is persisted
//! and expiry is checked lazily at verification time. `main` builds one codec
//! from configuration; tests build isolated instances per case.

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use tracing::warn;

use super::models::Claims;

/// Issues, verifies and refreshes HS256-signed bearer tokens.
#[derive(Debug, Clone)]
pub struct TokenCodec {
    secret: String,
    ttl_hours: i64,
}

impl TokenCodec {
    pub fn new(secret: impl Into<String>, ttl_hours: i64) -> Self {
        Self {
            secret: secret.into(),
            ttl_hours,
        }
    }

    /// Issue a token for the given identity using the configured TTL.
    pub fn issue(&self, user_id: &str, email: &str) -> Result<String, jsonwebtoken::errors::Error> {
        self.issue_with_ttl(user_id, email, Duration::hours(self.ttl_hours))
    }

    /// Issue a token with an explicit TTL.
    pub fn issue_with_ttl(
        &self,
        user_id: &str,
        email: &str,
        ttl: Duration,
    ) -> Result<String, jsonwebtoken::errors::Error> {
        let now = Utc::now();
        let claims = Claims {
            sub: user_id.to_string(),
            email: email.to_string(),
            iat: now.timestamp() as usize,
            exp: (now + ttl).timestamp() as usize,
        };
        encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )
    }

    /// Verify a token, returning its claims when the structure, signature and
    /// expiry all check out. Returns `None` rather than an error so callers
    /// decide how a rejection surfaces.
    pub fn verify(&self, token: &str) -> Option<Claims> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;

        match decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &validation,
        ) {
            Ok(data) => Some(data.claims),
            Err(e) => {
                warn!(error = %e, "Token verification failed");
                None
            }
        }
    }

    /// Re-issue a token with the same identity claims and a fresh expiry.
    ///
    /// An expired token may still be refreshed as long as its signature is
    /// valid; only a tampered or malformed token is rejected.
    pub fn refresh(&self, token: &str) -> Option<String> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.validate_exp = false;

        let claims = match decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &validation,
        ) {
            Ok(data) => data.claims,
            Err(e) => {
                warn!(error = %e, "Token refresh rejected: invalid signature or structure");
                return None;
            }
        };

        self.issue(&claims.sub, &claims.email).ok()
    }
}
