//! Token-error classification and response normalization.
//!
//! The backend reports expired credentials in several shapes:
//!
//! ```json
//! {"code": "token_not_valid"}
//! {"detail": "Given token not valid for any token type"}
//! {"messages": [{"message": "Token is expired"}]}
//! ```
//!
//! possibly nested under `response.data`, or simply as HTTP 401.

use reqwest::StatusCode;
use serde_json::Value;

use crate::error::ApiError;

/// `code` value the backend uses for rejected JWTs.
pub const TOKEN_NOT_VALID: &str = "token_not_valid";

/// First `messages[].message` value for an expired access token.
pub const TOKEN_EXPIRED_MESSAGE: &str = "Token is expired";

/// Whether a loosely shaped error value describes an authentication failure.
///
/// Checks the value itself and an interceptor-style `response` wrapper
/// (`response.status`, `response.data`).
pub fn is_token_error(value: &Value) -> bool {
    body_signals_token_error(value)
        || value.pointer("/response/status").and_then(Value::as_u64) == Some(401)
        || value
            .pointer("/response/data")
            .is_some_and(body_signals_token_error)
}

fn body_signals_token_error(body: &Value) -> bool {
    body.get("code").and_then(Value::as_str) == Some(TOKEN_NOT_VALID)
        || body.pointer("/messages/0/message").and_then(Value::as_str)
            == Some(TOKEN_EXPIRED_MESSAGE)
        || body
            .get("detail")
            .and_then(Value::as_str)
            .is_some_and(|detail| detail.contains("token"))
}

/// Best human-readable message in an error body.
///
/// Looks at `detail`, then `message`, then the first field error
/// (`{"phone_number": ["Enter a valid phone number."]}`).
pub fn response_message(body: &Value) -> Option<String> {
    for key in ["detail", "message"] {
        if let Some(text) = body.get(key).and_then(Value::as_str) {
            return Some(text.to_string());
        }
    }

    body.as_object()?.values().find_map(|value| match value {
        Value::String(text) => Some(text.clone()),
        Value::Array(items) => items.first().and_then(Value::as_str).map(String::from),
        _ => None,
    })
}

impl ApiError {
    /// Normalize a non-success HTTP response into an [`ApiError`].
    pub fn from_response(status: StatusCode, body: &str) -> Self {
        let value: Value = serde_json::from_str(body).unwrap_or(Value::Null);
        let message = response_message(&value).or_else(|| {
            let trimmed = body.trim();
            (!trimmed.is_empty() && value.is_null() && trimmed.len() <= 200)
                .then(|| trimmed.to_string())
        });
        let code = status.as_u16();

        if status == StatusCode::UNAUTHORIZED || is_token_error(&value) {
            ApiError::Unauthorized {
                status: code,
                detail: message,
            }
        } else if status.is_client_error() {
            ApiError::Validation {
                status: code,
                message,
            }
        } else {
            ApiError::Server {
                status: code,
                message,
            }
        }
    }
}
