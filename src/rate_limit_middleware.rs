// rate_limit_middleware.rs
use crate::services::{EndpointClass, RateLimitResult, RateLimitService};
use axum::{
    extract::{ConnectInfo, Extension, Request},
    http::{HeaderMap, HeaderValue, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::{debug, warn};

#[derive(Serialize)]
struct RateLimitErrorResponse {
    error: String,
    code: String,
    retry_after: u32,
}

/// Extract IP address from request
fn extract_ip_address(
    headers: &HeaderMap,
    connect_info: Option<&ConnectInfo<SocketAddr>>,
) -> Option<String> {
    // Try X-Forwarded-For header first (for proxied requests)
    if let Some(forwarded) = headers.get("x-forwarded-for") {
        if let Ok(forwarded_str) = forwarded.to_str() {
            // Take the first IP in the chain
            if let Some(first_ip) = forwarded_str.split(',').next() {
                return Some(first_ip.trim().to_string());
            }
        }
    }

    // Try X-Real-IP header
    if let Some(real_ip) = headers.get("x-real-ip") {
        if let Ok(ip_str) = real_ip.to_str() {
            return Some(ip_str.to_string());
        }
    }

    // Fall back to connection info
    connect_info.map(|info| info.0.ip().to_string())
}

/// Extract a client identifier from the bearer credential, if any
fn extract_client_identifier(headers: &HeaderMap) -> Option<String> {
    headers
        .get("authorization")
        .and_then(|h| h.to_str().ok())
        .and_then(|auth| {
            // A token prefix is identifying enough for counting purposes and
            // avoids a verify per request in the limiter.
            auth.strip_prefix("Bearer ")
                .map(|token| format!("token:{}", &token[..token.len().min(20)]))
        })
}

/// Rate limiting middleware
pub async fn rate_limit_middleware(
    Extension(rate_limit_service): Extension<Arc<RateLimitService>>,
    connect_info: Option<ConnectInfo<SocketAddr>>,
    request: Request,
    next: Next,
) -> Result<Response, Response> {
    let headers = request.headers().clone();

    let ip_address = extract_ip_address(&headers, connect_info.as_ref());
    let client_identifier = extract_client_identifier(&headers);

    // Use IP as identifier if no bearer credential is present
    let client_id = client_identifier
        .or_else(|| ip_address.clone().map(|ip| format!("anon:{}", ip)))
        .unwrap_or_else(|| "unknown".to_string());

    let path = request.uri().path().to_string();
    let class = EndpointClass::from_path(&path);

    match rate_limit_service
        .allow(&client_id, ip_address.as_deref(), class)
        .await
    {
        RateLimitResult::Allowed => {
            debug!(
                client_id = %client_id,
                ip = ?ip_address,
                path = %path,
                class = %class,
                "Request allowed by rate limiter"
            );
            Ok(next.run(request).await)
        }
        RateLimitResult::Limited { retry_after } => {
            warn!(
                client_id = %client_id,
                ip = ?ip_address,
                path = %path,
                class = %class,
                retry_after = retry_after,
                "Request blocked by rate limiter"
            );

            rate_limit_service.log_violation(&client_id, ip_address.as_deref(), &path);

            // Return 429 Too Many Requests with retry-after header
            let error_response = RateLimitErrorResponse {
                error: "Rate limit exceeded. Please try again later.".to_string(),
                code: "RATE_LIMIT_EXCEEDED".to_string(),
                retry_after,
            };

            let mut response =
                (StatusCode::TOO_MANY_REQUESTS, Json(error_response)).into_response();

            if let Ok(retry_header) = HeaderValue::from_str(&retry_after.to_string()) {
                response.headers_mut().insert("retry-after", retry_header);
            }

            Err(response)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderMap;

    #[test]
    fn test_extract_ip_from_x_forwarded_for() {
        let mut headers = HeaderMap::new();
        headers.insert(
            "x-forwarded-for",
            "203.0.113.1, 198.51.100.1".parse().unwrap(),
        );

        let ip = extract_ip_address(&headers, None);
        assert_eq!(ip, Some("203.0.113.1".to_string()));
    }

    #[test]
    fn test_extract_ip_from_x_real_ip() {
        let mut headers = HeaderMap::new();
        headers.insert("x-real-ip", "203.0.113.1".parse().unwrap());

        let ip = extract_ip_address(&headers, None);
        assert_eq!(ip, Some("203.0.113.1".to_string()));
    }

    #[test]
    fn test_extract_client_identifier_from_bearer_token() {
        let mut headers = HeaderMap::new();
        headers.insert(
            "authorization",
            "Bearer eyJhbGciOiJIUzI1NiIsInR5cCI6IkpXVCJ9"
                .parse()
                .unwrap(),
        );

        let identifier = extract_client_identifier(&headers);
        assert!(identifier.is_some());
        assert!(identifier.unwrap().starts_with("token:"));
    }

    #[test]
    fn test_extract_client_identifier_no_token() {
        let headers = HeaderMap::new();
        let identifier = extract_client_identifier(&headers);
        assert!(identifier.is_none());
    }
}
