// src/common/auth_mode.rs
//! Authentication mode selection
//!
//! The gate accepts a structured plaintext credential (`user_id|email|name`)
//! only when the process was explicitly started in test mode. The mode is an
//! enum carried in `AppState`, never re-read from the environment at request
//! time, so a misconfigured deployment cannot silently enable the bypass.

use tracing::warn;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthMode {
    /// Signed bearer tokens only.
    Production,
    /// Additionally accepts the `user_id|email|name` plaintext credential.
    Test,
}

impl AuthMode {
    /// Parse the AUTH_MODE configuration value. Anything other than the
    /// literal "test" resolves to production.
    pub fn parse(value: &str) -> Self {
        match value.trim().to_lowercase().as_str() {
            "test" => AuthMode::Test,
            "production" | "" => AuthMode::Production,
            other => {
                warn!(value = %other, "Unrecognized AUTH_MODE value, defaulting to production");
                AuthMode::Production
            }
        }
    }

    pub fn is_test(&self) -> bool {
        matches!(self, AuthMode::Test)
    }
}

/// Log the selected mode on startup so a test deployment is visible.
pub fn print_auth_mode_status(mode: AuthMode) {
    match mode {
        AuthMode::Test => {
            warn!("AUTH_MODE=test - plaintext test credentials accepted, do not use in production");
        }
        AuthMode::Production => {
            tracing::info!("Production auth mode - signed tokens required");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_defaults_to_production() {
        assert_eq!(AuthMode::parse(""), AuthMode::Production);
        assert_eq!(AuthMode::parse("production"), AuthMode::Production);
        assert_eq!(AuthMode::parse("banana"), AuthMode::Production);
    }

    #[test]
    fn test_parse_test_mode() {
        assert_eq!(AuthMode::parse("test"), AuthMode::Test);
        assert_eq!(AuthMode::parse(" TEST "), AuthMode::Test);
        assert!(AuthMode::parse("test").is_test());
    }
}
