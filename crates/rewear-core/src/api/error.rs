use reqwest::StatusCode;
use serde_json::Value;
use thiserror::Error;

pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Error, Debug)]
pub enum ApiError {
    /// A 401 on a request sent with `token`
    #[error("Session expired - please log in again")]
    SessionExpired { token: String },

    #[error("{message}")]
    Api { status: StatusCode, message: String },

    #[error("Invalid server response")]
    InvalidResponse(#[source] serde_json::Error),

    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Token storage error: {0:#}")]
    Storage(anyhow::Error),
}

/// Maximum length for serialized field errors in error messages
const MAX_ERROR_BODY_LENGTH: usize = 500;

impl ApiError {
    /// Truncate a serialized body to avoid surfacing excessive data
    fn truncate_body(body: &str) -> String {
        let total = body.chars().count();
        if total <= MAX_ERROR_BODY_LENGTH {
            body.to_string()
        } else {
            let head: String = body.chars().take(MAX_ERROR_BODY_LENGTH).collect();
            format!("{}... (truncated, {} total chars)", head, total)
        }
    }

    /// Build an error from a decoded failure body.
    pub fn from_body(status: StatusCode, body: &Value, fallback: &str) -> Self {
        ApiError::Api {
            status,
            message: ErrorMessage::from_body(body).into_text(fallback),
        }
    }

    /// HTTP status of a backend rejection, if this error is one.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ApiError::Api { status, .. } => Some(*status),
            ApiError::SessionExpired { .. } => Some(StatusCode::UNAUTHORIZED),
            _ => None,
        }
    }

    pub fn is_session_expired(&self) -> bool {
        matches!(self, ApiError::SessionExpired { .. })
    }
}

/// Human-readable message carried by a failure body.
///
/// The backend reports failures in one of several shapes. They are tried in
/// priority order `message`, `detail`, `errors`; blank strings and `null`
/// count as absent. Numbers and booleans are rendered as text.
#[derive(Debug, Clone, PartialEq)]
pub enum ErrorMessage {
    Message(String),
    Detail(String),
    FieldErrors(Value),
    Unknown,
}

impl ErrorMessage {
    pub fn from_body(body: &Value) -> Self {
        if let Some(message) = Self::non_blank(body.get("message")) {
            return ErrorMessage::Message(message);
        }
        if let Some(detail) = Self::non_blank(body.get("detail")) {
            return ErrorMessage::Detail(detail);
        }
        match body.get("errors") {
            Some(Value::Null) | None => ErrorMessage::Unknown,
            Some(errors) => ErrorMessage::FieldErrors(errors.clone()),
        }
    }

    fn non_blank(value: Option<&Value>) -> Option<String> {
        match value {
            Some(Value::String(s)) if !s.trim().is_empty() => Some(s.clone()),
            Some(scalar @ (Value::Number(_) | Value::Bool(_))) => Some(scalar.to_string()),
            _ => None,
        }
    }

    /// Render the message, using `fallback` when the body carried nothing usable.
    pub fn into_text(self, fallback: &str) -> String {
        match self {
            ErrorMessage::Message(text) | ErrorMessage::Detail(text) => text,
            ErrorMessage::FieldErrors(errors) => match serde_json::to_string(&errors) {
                Ok(serialized) => ApiError::truncate_body(&serialized),
                Err(_) => fallback.to_string(),
            },
            ErrorMessage::Unknown => fallback.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_message_takes_priority() {
        let body = json!({
            "success": false,
            "message": "Login failed",
            "detail": "ignored",
            "errors": {"email": ["required"]}
        });
        assert_eq!(
            ErrorMessage::from_body(&body),
            ErrorMessage::Message("Login failed".to_string())
        );
    }

    #[test]
    fn test_detail_used_without_message() {
        let body = json!({"detail": "Authentication credentials were not provided."});
        let text = ErrorMessage::from_body(&body).into_text("Request failed");
        assert_eq!(text, "Authentication credentials were not provided.");
    }

    #[test]
    fn test_blank_message_falls_through() {
        let body = json!({"message": "  ", "detail": null, "errors": {"title": ["This field is required."]}});
        let text = ErrorMessage::from_body(&body).into_text("Request failed");
        assert_eq!(text, r#"{"title":["This field is required."]}"#);
    }

    #[test]
    fn test_scalar_message_keeps_priority() {
        let body = json!({"message": 42, "detail": "Not found."});
        assert_eq!(
            ErrorMessage::from_body(&body),
            ErrorMessage::Message("42".to_string())
        );
    }

    #[test]
    fn test_structured_message_is_skipped() {
        let body = json!({"message": {"code": 7}, "detail": "Not found."});
        assert_eq!(
            ErrorMessage::from_body(&body),
            ErrorMessage::Detail("Not found.".to_string())
        );
    }

    #[test]
    fn test_fallback_when_nothing_usable() {
        let body = json!({"title": ["This field is required."]});
        assert_eq!(ErrorMessage::from_body(&body), ErrorMessage::Unknown);
        assert_eq!(ErrorMessage::Unknown.into_text("Upload failed"), "Upload failed");

        let body = json!({"errors": null});
        assert_eq!(ErrorMessage::from_body(&body).into_text("Request failed"), "Request failed");
    }

    #[test]
    fn test_from_body_sets_status_and_message() {
        let err = ApiError::from_body(
            StatusCode::BAD_REQUEST,
            &json!({"message": "Insufficient points balance"}),
            "Request failed",
        );
        assert_eq!(err.status(), Some(StatusCode::BAD_REQUEST));
        assert_eq!(err.to_string(), "Insufficient points balance");
    }

    #[test]
    fn test_long_field_errors_are_truncated() {
        let long = "x".repeat(MAX_ERROR_BODY_LENGTH * 2);
        let body = json!({"errors": {"description": [long]}});
        let text = ErrorMessage::from_body(&body).into_text("Request failed");
        assert!(text.contains("truncated"));
        assert!(text.chars().count() < MAX_ERROR_BODY_LENGTH + 60);
    }

    #[test]
    fn test_session_expired_reports_401() {
        let expired = ApiError::SessionExpired {
            token: "t1".to_string(),
        };
        assert!(expired.is_session_expired());
        assert_eq!(expired.status(), Some(StatusCode::UNAUTHORIZED));
        assert!(!ApiError::InvalidRequest("x".into()).is_session_expired());
    }
}
