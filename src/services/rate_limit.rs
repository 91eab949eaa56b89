// src/services/rate_limit.rs
//! Fixed-window request rate limiting
//!
//! Counters live in process memory only and reset as windows roll over (and
//! on restart, a deliberate limitation). Each endpoint class carries its own
//! limit so the OAuth and token endpoints can be throttled harder than
//! general CRUD traffic.

use std::collections::HashMap;
use std::env;
use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

/// Endpoint classes with distinct rate limits
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndpointClass {
    OAuthInit,
    OAuthCallback,
    TokenOps,
    General,
}

impl EndpointClass {
    /// Classify a request path.
    pub fn from_path(path: &str) -> Self {
        match path {
            "/api/auth/google/init" => EndpointClass::OAuthInit,
            "/api/auth/google/callback" => EndpointClass::OAuthCallback,
            p if p.starts_with("/api/auth/token/") => EndpointClass::TokenOps,
            _ => EndpointClass::General,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            EndpointClass::OAuthInit => "oauth_init",
            EndpointClass::OAuthCallback => "oauth_callback",
            EndpointClass::TokenOps => "token_ops",
            EndpointClass::General => "general",
        }
    }
}

impl fmt::Display for EndpointClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone)]
pub struct RateLimitConfig {
    pub enabled: bool,
    pub oauth_init_limit: u32,
    pub oauth_callback_limit: u32,
    pub token_ops_limit: u32,
    pub general_limit: u32,
    pub per_ip_limit: u32,
    pub window_seconds: u32,
    pub whitelist_ips: Vec<String>,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            oauth_init_limit: 10,     // 10 OAuth starts per window per client
            oauth_callback_limit: 10, // callbacks bounded like init
            token_ops_limit: 30,      // verify/refresh per window per client
            general_limit: 100,       // CRUD traffic per window per client
            per_ip_limit: 120,        // ceiling per IP across classes
            window_seconds: 60,
            whitelist_ips: vec!["127.0.0.1".to_string(), "::1".to_string()],
        }
    }
}

impl RateLimitConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(enabled) = env::var("RATE_LIMIT_ENABLED") {
            config.enabled = enabled.to_lowercase() != "false";
        }

        if let Ok(limit) = env::var("RATE_LIMIT_OAUTH_INIT") {
            if let Ok(val) = limit.parse::<u32>() {
                config.oauth_init_limit = val;
            }
        }

        if let Ok(limit) = env::var("RATE_LIMIT_OAUTH_CALLBACK") {
            if let Ok(val) = limit.parse::<u32>() {
                config.oauth_callback_limit = val;
            }
        }

        if let Ok(limit) = env::var("RATE_LIMIT_TOKEN_OPS") {
            if let Ok(val) = limit.parse::<u32>() {
                config.token_ops_limit = val;
            }
        }

        if let Ok(limit) = env::var("RATE_LIMIT_GENERAL") {
            if let Ok(val) = limit.parse::<u32>() {
                config.general_limit = val;
            }
        }

        if let Ok(limit) = env::var("RATE_LIMIT_PER_IP") {
            if let Ok(val) = limit.parse::<u32>() {
                config.per_ip_limit = val;
            }
        }

        if let Ok(window) = env::var("RATE_LIMIT_WINDOW_SECONDS") {
            if let Ok(val) = window.parse::<u32>() {
                config.window_seconds = val;
            }
        }

        if let Ok(whitelist) = env::var("RATE_LIMIT_WHITELIST_IPS") {
            config.whitelist_ips = whitelist
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
        }

        config
    }

    fn limit_for(&self, class: EndpointClass) -> u32 {
        match class {
            EndpointClass::OAuthInit => self.oauth_init_limit,
            EndpointClass::OAuthCallback => self.oauth_callback_limit,
            EndpointClass::TokenOps => self.token_ops_limit,
            EndpointClass::General => self.general_limit,
        }
    }
}

#[derive(Debug, Clone)]
struct WindowState {
    count: u32,
    window_start: Instant,
}

impl WindowState {
    // Starts at zero; the caller increments once the check passes.
    fn new() -> Self {
        Self {
            count: 0,
            window_start: Instant::now(),
        }
    }

    fn increment(&mut self) {
        self.count += 1;
    }

    fn reset(&mut self) {
        self.count = 1;
        self.window_start = Instant::now();
    }

    fn is_expired(&self, window_duration: Duration) -> bool {
        self.window_start.elapsed() > window_duration
    }
}

#[derive(Debug)]
pub enum RateLimitResult {
    Allowed,
    Limited { retry_after: u32 },
}

#[derive(Debug, Clone)]
pub struct RateLimitService {
    config: RateLimitConfig,
    counters: Arc<RwLock<HashMap<String, WindowState>>>,
}

impl RateLimitService {
    pub fn new(config: RateLimitConfig) -> Self {
        info!(
            enabled = config.enabled,
            oauth_init_limit = config.oauth_init_limit,
            oauth_callback_limit = config.oauth_callback_limit,
            token_ops_limit = config.token_ops_limit,
            general_limit = config.general_limit,
            per_ip_limit = config.per_ip_limit,
            window_seconds = config.window_seconds,
            whitelist_ips = ?config.whitelist_ips,
            "Initializing RateLimitService"
        );
        Self {
            config,
            counters: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    fn is_whitelisted(&self, ip: &str) -> bool {
        self.config
            .whitelist_ips
            .iter()
            .any(|whitelisted_ip| whitelisted_ip == ip)
    }

    /// Check whether a request may proceed.
    ///
    /// Counts are kept per `(class, client)` key plus a per-IP ceiling that
    /// spans classes.
    pub async fn allow(
        &self,
        client_id: &str,
        ip_address: Option<&str>,
        class: EndpointClass,
    ) -> RateLimitResult {
        if !self.config.enabled {
            return RateLimitResult::Allowed;
        }

        if let Some(ip) = ip_address {
            if self.is_whitelisted(ip) {
                return RateLimitResult::Allowed;
            }
        }

        let limit = self.config.limit_for(class);
        let window_duration = Duration::from_secs(self.config.window_seconds as u64);

        let class_key = format!("{}:{}", class, client_id);
        if let RateLimitResult::Limited { retry_after } = self
            .check_limit_for_key(&class_key, limit, window_duration)
            .await
        {
            return RateLimitResult::Limited { retry_after };
        }

        if let Some(ip) = ip_address {
            let ip_key = format!("ip:{}", ip);
            if let RateLimitResult::Limited { retry_after } = self
                .check_limit_for_key(&ip_key, self.config.per_ip_limit, window_duration)
                .await
            {
                return RateLimitResult::Limited { retry_after };
            }
        }

        RateLimitResult::Allowed
    }

    /// Internal method to check the window for a specific key
    async fn check_limit_for_key(
        &self,
        key: &str,
        limit: u32,
        window_duration: Duration,
    ) -> RateLimitResult {
        let mut counters = self.counters.write().await;

        let state = counters
            .entry(key.to_string())
            .or_insert_with(WindowState::new);

        if state.is_expired(window_duration) {
            state.reset();
            return RateLimitResult::Allowed;
        }

        if state.count >= limit {
            let elapsed = state.window_start.elapsed().as_secs() as u32;
            let retry_after = window_duration.as_secs() as u32 - elapsed.min(window_duration.as_secs() as u32);
            return RateLimitResult::Limited { retry_after };
        }

        state.increment();
        RateLimitResult::Allowed
    }

    /// Log a rate limit violation
    pub fn log_violation(&self, client_id: &str, ip_address: Option<&str>, endpoint: &str) {
        warn!(
            client_id = %client_id,
            ip_address = ?ip_address,
            endpoint = %endpoint,
            "Rate limit violation detected"
        );
    }

    /// Drop expired windows so the table stays bounded. Returns how many
    /// entries were removed.
    pub async fn cleanup_expired(&self) -> usize {
        let window_duration = Duration::from_secs(self.config.window_seconds as u64);
        let mut counters = self.counters.write().await;
        let before = counters.len();
        counters.retain(|_, state| !state.is_expired(window_duration));
        before - counters.len()
    }

    /// Spawn the background sweeper that prunes expired windows, so the
    /// counter table cannot grow without bound under varied client IDs.
    pub fn start_cleanup_task(service: Arc<Self>) {
        let interval = Duration::from_secs((service.config.window_seconds as u64).max(60));
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.tick().await; // first tick fires immediately
            loop {
                ticker.tick().await;
                let removed = service.cleanup_expired().await;
                if removed > 0 {
                    debug!(removed = removed, "Rate limit windows pruned");
                }
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_config() -> RateLimitConfig {
        RateLimitConfig {
            enabled: true,
            oauth_init_limit: 3,
            oauth_callback_limit: 3,
            token_ops_limit: 5,
            general_limit: 10,
            per_ip_limit: 100,
            window_seconds: 60,
            whitelist_ips: vec!["127.0.0.1".to_string()],
        }
    }

    #[test]
    fn test_endpoint_classification() {
        assert_eq!(
            EndpointClass::from_path("/api/auth/google/init"),
            EndpointClass::OAuthInit
        );
        assert_eq!(
            EndpointClass::from_path("/api/auth/google/callback"),
            EndpointClass::OAuthCallback
        );
        assert_eq!(
            EndpointClass::from_path("/api/auth/token/verify"),
            EndpointClass::TokenOps
        );
        assert_eq!(
            EndpointClass::from_path("/api/auth/token/refresh"),
            EndpointClass::TokenOps
        );
        assert_eq!(
            EndpointClass::from_path("/api/expenses"),
            EndpointClass::General
        );
    }

    #[tokio::test]
    async fn test_allows_within_limit() {
        let service = RateLimitService::new(small_config());

        let result = service
            .allow("user123", Some("192.168.1.1"), EndpointClass::General)
            .await;
        assert!(matches!(result, RateLimitResult::Allowed));
    }

    #[tokio::test]
    async fn test_blocks_when_class_limit_exceeded() {
        let service = RateLimitService::new(small_config());

        for _ in 0..3 {
            let result = service
                .allow("client-a", Some("10.0.0.1"), EndpointClass::OAuthInit)
                .await;
            assert!(matches!(result, RateLimitResult::Allowed));
        }

        let result = service
            .allow("client-a", Some("10.0.0.1"), EndpointClass::OAuthInit)
            .await;
        assert!(matches!(result, RateLimitResult::Limited { .. }));
    }

    #[tokio::test]
    async fn test_classes_have_separate_counters() {
        let service = RateLimitService::new(small_config());

        // Exhaust the OAuth init class
        for _ in 0..4 {
            service
                .allow("client-a", Some("10.0.0.2"), EndpointClass::OAuthInit)
                .await;
        }

        // Token ops for the same client are still allowed
        let result = service
            .allow("client-a", Some("10.0.0.2"), EndpointClass::TokenOps)
            .await;
        assert!(matches!(result, RateLimitResult::Allowed));
    }

    #[tokio::test]
    async fn test_different_clients_have_separate_limits() {
        let service = RateLimitService::new(small_config());

        for _ in 0..4 {
            service
                .allow("client-a", Some("10.0.0.3"), EndpointClass::OAuthInit)
                .await;
        }

        let result = service
            .allow("client-b", Some("10.0.0.4"), EndpointClass::OAuthInit)
            .await;
        assert!(matches!(result, RateLimitResult::Allowed));
    }

    #[tokio::test]
    async fn test_per_ip_ceiling_spans_classes() {
        let mut config = small_config();
        config.per_ip_limit = 4;
        let service = RateLimitService::new(config);

        for i in 0..4 {
            service
                .allow(&format!("client-{}", i), Some("10.1.0.1"), EndpointClass::General)
                .await;
        }

        let result = service
            .allow("client-z", Some("10.1.0.1"), EndpointClass::TokenOps)
            .await;
        assert!(matches!(result, RateLimitResult::Limited { .. }));
    }

    #[tokio::test]
    async fn test_whitelist_bypasses_rate_limit() {
        let service = RateLimitService::new(small_config());

        for _ in 0..20 {
            let result = service
                .allow("user123", Some("127.0.0.1"), EndpointClass::OAuthInit)
                .await;
            assert!(matches!(result, RateLimitResult::Allowed));
        }
    }

    #[tokio::test]
    async fn test_cleanup_drops_expired_windows() {
        let mut config = small_config();
        config.window_seconds = 0; // every window expires immediately
        let service = RateLimitService::new(config);

        for i in 0..5 {
            service
                .allow(&format!("client-{}", i), Some("10.3.0.1"), EndpointClass::General)
                .await;
        }

        tokio::time::sleep(Duration::from_millis(10)).await;

        // 5 class windows plus the shared IP window
        assert_eq!(service.cleanup_expired().await, 6);
        // A second sweep finds nothing left to drop
        assert_eq!(service.cleanup_expired().await, 0);
    }

    #[tokio::test]
    async fn test_disabled_limiter_allows_everything() {
        let mut config = small_config();
        config.enabled = false;
        let service = RateLimitService::new(config);

        for _ in 0..50 {
            let result = service
                .allow("user123", Some("10.2.0.1"), EndpointClass::OAuthInit)
                .await;
            assert!(matches!(result, RateLimitResult::Allowed));
        }
    }
}
