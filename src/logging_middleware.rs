// src/logging_middleware.rs
//! Middleware for logging request and response bodies in debug mode

use axum::body::to_bytes;
use axum::{
    body::Body,
    extract::Request,
    http::StatusCode,
    middleware::Next,
    response::Response,
};
use tracing::debug;

/// JSON keys whose values must never appear in logs
const SENSITIVE_KEYS: [&str; 4] = ["token", "code", "state", "client_secret"];

fn redact_sensitive(value: &mut serde_json::Value) {
    match value {
        serde_json::Value::Object(map) => {
            for (key, entry) in map.iter_mut() {
                if SENSITIVE_KEYS.contains(&key.as_str()) {
                    *entry = serde_json::Value::String("<redacted>".to_string());
                } else {
                    redact_sensitive(entry);
                }
            }
        }
        serde_json::Value::Array(items) => {
            for item in items.iter_mut() {
                redact_sensitive(item);
            }
        }
        _ => {}
    }
}

fn loggable_body(body_str: &str) -> String {
    match serde_json::from_str::<serde_json::Value>(body_str) {
        Ok(mut json) => {
            redact_sensitive(&mut json);
            serde_json::to_string_pretty(&json).unwrap_or_else(|_| body_str.to_string())
        }
        Err(_) => body_str.to_string(),
    }
}

/// Middleware to log request and response bodies in debug mode.
/// Token-bearing fields are redacted before anything hits the log.
pub async fn log_request_response(request: Request, next: Next) -> Result<Response, StatusCode> {
    let (parts, body) = request.into_parts();

    let bytes = to_bytes(body, usize::MAX)
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;

    if !bytes.is_empty() {
        if let Ok(body_str) = std::str::from_utf8(&bytes) {
            debug!(
                method = %parts.method,
                uri = %parts.uri,
                request_body = %loggable_body(body_str),
                "📥 Request"
            );
        }
    }

    let request = Request::from_parts(parts, Body::from(bytes));

    let response = next.run(request).await;

    let (parts, body) = response.into_parts();

    let bytes = to_bytes(body, usize::MAX)
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;

    if !bytes.is_empty() {
        if let Ok(body_str) = std::str::from_utf8(&bytes) {
            debug!(
                status = %parts.status,
                response_body = %loggable_body(body_str),
                "📤 Response"
            );
        }
    }

    let response = Response::from_parts(parts, Body::from(bytes));

    Ok(response)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_sensitive_fields_redacted() {
        let logged = loggable_body(
            &json!({
                "token": "eyJhbGciOiJIUzI1NiJ9.secret.sig",
                "user": { "email": "a@test.com", "code": "4/0AX" },
            })
            .to_string(),
        );
        assert!(!logged.contains("secret"));
        assert!(!logged.contains("4/0AX"));
        assert!(logged.contains("<redacted>"));
        assert!(logged.contains("a@test.com"));
    }

    #[test]
    fn test_non_json_body_passed_through() {
        assert_eq!(loggable_body("plain text"), "plain text");
    }
}
