//! Client-side error types.

use thiserror::Error;

use taskboard_core::TaskId;

/// Errors surfaced by the API client and the optimistic controller.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The server answered with its error envelope. The code is the
    /// server's stable machine-readable code (e.g. `TODO_NOT_FOUND`),
    /// preserved end-to-end.
    #[error("server rejected the request: {message} ({code})")]
    Api {
        status: u16,
        code: String,
        message: String,
    },

    /// Transport-level failure before any envelope arrived.
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The response body could not be decoded into the expected shape.
    #[error("response decoding failed: {0}")]
    Decode(#[from] serde_json::Error),

    /// The task already has its own request outstanding; the action was
    /// not applied.
    #[error("task {id} already has a request in flight")]
    ActionInFlight { id: TaskId },

    /// The action referenced a task that is not in local state.
    #[error("task {id} is not present in local state")]
    UnknownTask { id: TaskId },
}

impl ClientError {
    /// Build an error from the server's `{error: {message, code}}`
    /// envelope, falling back to a generic code when the body does not
    /// carry one.
    pub(crate) fn from_envelope(status: u16, body: &serde_json::Value) -> Self {
        let error = body.get("error");
        Self::Api {
            status,
            code: error
                .and_then(|e| e.get("code"))
                .and_then(|c| c.as_str())
                .unwrap_or("HTTP_ERROR")
                .to_string(),
            message: error
                .and_then(|e| e.get("message"))
                .and_then(|m| m.as_str())
                .map(str::to_string)
                .unwrap_or_else(|| format!("HTTP {status}")),
        }
    }

    /// Whether retrying the same request could plausibly succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Http(err) => err.is_timeout() || err.is_connect(),
            Self::Api { status, .. } => *status >= 500,
            _ => false,
        }
    }
}
