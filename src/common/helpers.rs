// Helper functions for safe logging and response envelopes

use axum::Json;
use serde_json::{json, Value};

/// Masks email addresses for safe logging
/// Prevents sensitive data exposure while preserving debugging utility
///
/// # Example
/// ```
/// let masked = safe_email_log("user@example.com");
/// // Returns: "u***@example.com"
/// ```
pub fn safe_email_log(email: &str) -> String {
    if email.len() > 3 {
        let parts: Vec<&str> = email.split('@').collect();
        if parts.len() == 2 {
            format!("{}***@{}", &parts[0][..1.min(parts[0].len())], parts[1])
        } else {
            "***@***.***".to_string()
        }
    } else {
        "***@***.***".to_string()
    }
}

/// Masks tokens for safe logging
/// Shows only first and last 4 characters
///
/// Counts characters, not bytes: the value comes straight from the request
/// body, so it may contain arbitrary multibyte input.
pub fn safe_token_log(token: &str) -> String {
    let chars: Vec<char> = token.chars().collect();
    if chars.len() > 8 {
        let head: String = chars[..4].iter().collect();
        let tail: String = chars[chars.len() - 4..].iter().collect();
        format!("{}...{}", head, tail)
    } else {
        "***".to_string()
    }
}

/// Standard success envelope: `{"message": ..., "data": {...}}`
pub fn json_message(message: &str, data: Value) -> Json<Value> {
    Json(json!({
        "message": message,
        "data": data,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_safe_email_log_masks_local_part() {
        assert_eq!(safe_email_log("user@example.com"), "u***@example.com");
        assert_eq!(safe_email_log("ab"), "***@***.***");
        assert_eq!(safe_email_log("not-an-email"), "***@***.***");
    }

    #[test]
    fn test_safe_token_log() {
        assert_eq!(safe_token_log("abcdefghij"), "abcd...ghij");
        assert_eq!(safe_token_log("short"), "***");
    }

    #[test]
    fn test_safe_token_log_handles_multibyte_input() {
        // Client-supplied "tokens" are arbitrary strings; masking must not
        // split a multibyte character.
        assert_eq!(
            safe_token_log("ありがとうございます"),
            "ありがと...ざいます"
        );
        assert_eq!(safe_token_log("日本語です"), "***");
    }
}
