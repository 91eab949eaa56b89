//! Tests for auth module
//!
//! These tests verify core authentication functionality including:
//! - Token issue / verify / refresh lifecycle
//! - OAuth state single-use and redirect binding
//! - The test-mode credential bypass contract

#[cfg(test)]
mod tests {
    use super::super::*;
    use crate::auth::extractors::{parse_test_credential, resolve_credential};
    use crate::auth::oauth::{OAuthError, OAuthStateStore};
    use crate::auth::token::TokenCodec;
    use crate::common::auth_mode::AuthMode;
    use chrono::Duration;

    fn codec() -> TokenCodec {
        TokenCodec::new("test_secret_key", 24)
    }

    #[test]
    fn test_issue_then_verify_round_trips_claims() {
        let codec = codec();
        let token = codec.issue("U_TEST01", "user@example.com").unwrap();

        let claims = codec.verify(&token).expect("fresh token should verify");
        assert_eq!(claims.sub, "U_TEST01");
        assert_eq!(claims.email, "user@example.com");
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn test_verify_fails_after_expiry() {
        let codec = codec();
        let token = codec
            .issue_with_ttl("U_TEST01", "user@example.com", Duration::seconds(-10))
            .unwrap();

        assert!(codec.verify(&token).is_none());
    }

    #[test]
    fn test_verify_fails_with_wrong_secret() {
        let token = codec().issue("U_TEST01", "user@example.com").unwrap();

        let other = TokenCodec::new("wrong_secret_key", 24);
        assert!(other.verify(&token).is_none());
    }

    #[test]
    fn test_verify_fails_on_malformed_token() {
        assert!(codec().verify("not.a.token").is_none());
        assert!(codec().verify("").is_none());
    }

    #[test]
    fn test_refresh_accepts_expired_token() {
        // Pinned contract: an expired token with a valid signature may still
        // be refreshed.
        let codec = codec();
        let expired = codec
            .issue_with_ttl("U_TEST01", "user@example.com", Duration::seconds(-10))
            .unwrap();
        assert!(codec.verify(&expired).is_none());

        let refreshed = codec.refresh(&expired).expect("expired token should refresh");
        let claims = codec.verify(&refreshed).expect("refreshed token should verify");
        assert_eq!(claims.sub, "U_TEST01");
        assert_eq!(claims.email, "user@example.com");
    }

    #[test]
    fn test_refresh_rejects_bad_signature() {
        let codec = codec();
        let token = codec.issue("U_TEST01", "user@example.com").unwrap();

        // Tamper with the signature segment
        let mut tampered = token.clone();
        tampered.pop();
        tampered.push(if token.ends_with('A') { 'B' } else { 'A' });

        assert!(codec.refresh(&tampered).is_none());

        let other = TokenCodec::new("wrong_secret_key", 24);
        assert!(other.refresh(&token).is_none());
    }

    #[tokio::test]
    async fn test_oauth_state_is_single_use() {
        let store = OAuthStateStore::new(std::time::Duration::from_secs(600));
        let state = store.issue("myapp://auth/callback").await;

        assert!(store.consume(&state, "myapp://auth/callback").await.is_ok());

        // Replay must fail
        let replay = store.consume(&state, "myapp://auth/callback").await;
        assert!(matches!(replay, Err(OAuthError::InvalidOrExpiredState)));
    }

    #[tokio::test]
    async fn test_oauth_state_unknown_value_fails() {
        let store = OAuthStateStore::new(std::time::Duration::from_secs(600));
        let result = store.consume("never-issued", "myapp://auth/callback").await;
        assert!(matches!(result, Err(OAuthError::InvalidOrExpiredState)));
    }

    #[tokio::test]
    async fn test_oauth_state_redirect_mismatch_fails() {
        let store = OAuthStateStore::new(std::time::Duration::from_secs(600));
        let state = store.issue("myapp://auth/callback").await;

        let result = store.consume(&state, "evil://elsewhere").await;
        assert!(matches!(result, Err(OAuthError::RedirectMismatch)));
    }

    #[tokio::test]
    async fn test_oauth_state_expires() {
        let store = OAuthStateStore::new(std::time::Duration::from_millis(10));
        let state = store.issue("myapp://auth/callback").await;

        tokio::time::sleep(std::time::Duration::from_millis(30)).await;

        let result = store.consume(&state, "myapp://auth/callback").await;
        assert!(matches!(result, Err(OAuthError::InvalidOrExpiredState)));
    }

    #[test]
    fn test_parse_test_credential() {
        let user = parse_test_credential("U_TEST01|dev@test.com|Dev User").unwrap();
        assert_eq!(user.id, "U_TEST01");
        assert_eq!(user.email, "dev@test.com");

        assert!(parse_test_credential("just-a-token").is_none());
        assert!(parse_test_credential("|dev@test.com|Dev").is_none());
        assert!(parse_test_credential("U_TEST01|not-an-email|Dev").is_none());
    }

    #[test]
    fn test_plaintext_credential_accepted_in_test_mode() {
        let codec = codec();
        let user = resolve_credential(AuthMode::Test, &codec, "U_TEST01|dev@test.com|Dev User")
            .expect("test mode should accept the plaintext credential");
        assert_eq!(user.id, "U_TEST01");
    }

    #[test]
    fn test_plaintext_credential_inert_in_production_mode() {
        // The bypass must never be reachable under a production configuration.
        let codec = codec();
        let result =
            resolve_credential(AuthMode::Production, &codec, "U_TEST01|dev@test.com|Dev User");
        assert!(result.is_none());
    }

    #[test]
    fn test_signed_token_still_works_in_test_mode() {
        let codec = codec();
        let token = codec.issue("U_TEST02", "real@example.com").unwrap();

        let user = resolve_credential(AuthMode::Test, &codec, &token).unwrap();
        assert_eq!(user.id, "U_TEST02");
        assert_eq!(user.email, "real@example.com");
    }
}
