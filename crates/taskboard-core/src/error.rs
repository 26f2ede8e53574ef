//! Typed error taxonomy.
//!
//! Every failure carries a stable machine-readable code that survives from
//! the point of failure to the client, so callers never have to sniff error
//! message strings to classify a failure.

use thiserror::Error;

use crate::task::TaskId;

/// A request payload broke one of the validation rules.
///
/// Raised before any storage access. Each variant maps to exactly one error
/// code and all of them surface as HTTP 400.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("description is required")]
    MissingDescription,

    #[error("description must be a string, got {actual}")]
    InvalidDescriptionType { actual: &'static str },

    #[error("description must contain at least one non-whitespace character")]
    EmptyDescription,

    #[error("description must not exceed {max} characters (got {length})")]
    DescriptionTooLong { length: usize, max: usize },

    #[error("completed must be a boolean, got {actual}")]
    InvalidCompletedType { actual: &'static str },

    #[error("at least one of description or completed must be provided")]
    NoUpdateFields,

    #[error("todo id is missing")]
    MissingTodoId,

    #[error("todo id must be a positive integer, got '{raw}'")]
    InvalidTodoId { raw: String },
}

impl ValidationError {
    /// Stable code for this rule, preserved end-to-end for client consumption.
    pub fn code(&self) -> &'static str {
        match self {
            Self::MissingDescription => "MISSING_DESCRIPTION",
            Self::InvalidDescriptionType { .. } => "INVALID_DESCRIPTION_TYPE",
            Self::EmptyDescription => "EMPTY_DESCRIPTION",
            Self::DescriptionTooLong { .. } => "DESCRIPTION_TOO_LONG",
            Self::InvalidCompletedType { .. } => "INVALID_COMPLETED_TYPE",
            Self::NoUpdateFields => "NO_UPDATE_FIELDS",
            Self::MissingTodoId => "MISSING_TODO_ID",
            Self::InvalidTodoId { .. } => "INVALID_TODO_ID",
        }
    }
}

/// A failure inside the persistence gateway, typed at the point of failure.
///
/// The gateway classifies driver errors into these kinds itself instead of
/// leaving callers to match on message substrings.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A uniqueness constraint rejected the write.
    #[error("uniqueness violation: {detail}")]
    Duplicate { detail: String },

    /// The connection pool could not hand out a connection.
    #[error("connection pool unavailable: {detail}")]
    Pool { detail: String },

    /// Disk or database file level failure.
    #[error("storage I/O failed: {detail}")]
    Io { detail: String },

    /// Anything the gateway could not classify further.
    #[error("storage backend failed: {detail}")]
    Internal { detail: String },
}

/// Failures surfaced by [`crate::service::TaskService`] operations.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("todo {id} was not found")]
    NotFound { id: TaskId },

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl ServiceError {
    /// HTTP status this error maps to. Kept as a bare `u16` so the core
    /// crate stays transport-free.
    pub fn http_status(&self) -> u16 {
        match self {
            Self::Validation(_) => 400,
            Self::NotFound { .. } => 404,
            Self::Store(StoreError::Duplicate { .. }) => 409,
            Self::Store(_) => 500,
        }
    }

    /// Stable machine-readable code for the response envelope.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Validation(err) => err.code(),
            Self::NotFound { .. } => "TODO_NOT_FOUND",
            Self::Store(StoreError::Duplicate { .. }) => "DUPLICATE_ERROR",
            Self::Store(_) => "INTERNAL_ERROR",
        }
    }

    /// Message safe to show to clients.
    ///
    /// Storage detail stays server-side: the boundary logs it and sends a
    /// generic message instead.
    pub fn user_message(&self) -> String {
        match self {
            Self::Validation(err) => err.to_string(),
            Self::NotFound { id } => format!("Todo {id} was not found"),
            Self::Store(StoreError::Duplicate { .. }) => "The record already exists".to_string(),
            Self::Store(_) => "An internal error occurred. Please try again later.".to_string(),
        }
    }
}

/// Result type alias for service operations.
pub type ServiceResult<T> = Result<T, ServiceError>;
