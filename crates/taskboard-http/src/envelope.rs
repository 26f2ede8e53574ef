//! Success and error response envelopes.
//!
//! Every handler result passes through these two shapes. Domain errors
//! carry their own status and code; the boundary here only renders them.
//! Internal detail is logged server-side and never leaked verbatim.

use axum::Json;
use axum::http::StatusCode;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;

use taskboard_core::ServiceError;

/// Uniform success envelope: `{"success": true, "data": …}` plus optional
/// `count` (list responses) and `message` (mutations).
#[derive(Debug, Serialize)]
pub struct ApiSuccess<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub count: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl<T> ApiSuccess<T> {
    pub fn new(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            count: None,
            message: None,
        }
    }

    /// A data-less envelope carrying only a confirmation message.
    pub fn message_only(message: impl Into<String>) -> Self {
        Self {
            success: true,
            data: None,
            count: None,
            message: Some(message.into()),
        }
    }

    pub fn with_count(mut self, count: usize) -> Self {
        self.count = Some(count);
        self
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}

/// The `error` object inside the error envelope.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ErrorBody {
    pub message: String,
    #[schema(example = "TODO_NOT_FOUND")]
    pub code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
}

/// Error envelope: `{"error": {…}, "timestamp": …, "path": …}`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ApiError {
    pub error: ErrorBody,
    pub timestamp: DateTime<Utc>,
    pub path: String,
}

impl ApiError {
    pub fn new(code: impl Into<String>, message: impl Into<String>, path: &str) -> Self {
        Self {
            error: ErrorBody {
                message: message.into(),
                code: code.into(),
                details: None,
            },
            timestamp: Utc::now(),
            path: path.to_string(),
        }
    }

    pub fn with_details(mut self, details: Value) -> Self {
        self.error.details = Some(details);
        self
    }
}

/// Handler error type: status plus rendered envelope.
pub type Rejection = (StatusCode, Json<ApiError>);

/// Result alias used by every handler.
pub type ApiResult<T> = Result<T, Rejection>;

/// The single boundary from a typed service error to the wire envelope.
///
/// Client errors (4xx) log at warn with their code; anything 5xx logs the
/// full detail at error level and sends only the generic user message.
pub fn reject(err: &ServiceError, path: &str) -> Rejection {
    let status =
        StatusCode::from_u16(err.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

    if status.is_server_error() {
        tracing::error!(code = err.code(), path, detail = %err, "request failed");
    } else {
        tracing::warn!(code = err.code(), path, "request rejected");
    }

    (status, Json(ApiError::new(err.code(), err.user_message(), path)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use taskboard_core::{StoreError, TaskId, ValidationError};

    #[test]
    fn test_success_envelope_shape() {
        let body = serde_json::to_value(ApiSuccess::new(vec![1, 2]).with_count(2)).unwrap();
        assert_eq!(body["success"], true);
        assert_eq!(body["count"], 2);
        assert_eq!(body["data"], serde_json::json!([1, 2]));
        assert!(body.get("message").is_none());
    }

    #[test]
    fn test_message_only_envelope_omits_data() {
        let body = serde_json::to_value(ApiSuccess::<()>::message_only("Todo deleted")).unwrap();
        assert_eq!(body["success"], true);
        assert_eq!(body["message"], "Todo deleted");
        assert!(body.get("data").is_none());
    }

    #[test]
    fn test_reject_maps_validation_to_400() {
        let err = ServiceError::from(ValidationError::EmptyDescription);
        let (status, Json(envelope)) = reject(&err, "/todos");
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(envelope.error.code, "EMPTY_DESCRIPTION");
        assert_eq!(envelope.path, "/todos");
    }

    #[test]
    fn test_reject_withholds_internal_detail() {
        let err = ServiceError::from(StoreError::Internal {
            detail: "secret-internal-path".into(),
        });
        let (status, Json(envelope)) = reject(&err, "/todos/1");
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(envelope.error.code, "INTERNAL_ERROR");
        assert!(!envelope.error.message.contains("secret-internal-path"));
    }

    #[test]
    fn test_reject_maps_not_found_to_404() {
        let err = ServiceError::NotFound {
            id: TaskId::new(9),
        };
        let (status, Json(envelope)) = reject(&err, "/todos/9");
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(envelope.error.code, "TODO_NOT_FOUND");
    }
}
