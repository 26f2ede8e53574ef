//! Request payload validation.
//!
//! Validation operates on raw [`serde_json::Value`] payloads instead of
//! typed request structs so that type mismatches keep their own error codes
//! (`INVALID_DESCRIPTION_TYPE`, `INVALID_COMPLETED_TYPE`) rather than being
//! swallowed by deserialization. On success the sanitized values (trimmed
//! description) replace the raw ones — documented normalization, not a
//! hidden effect.

use serde_json::Value;

use crate::error::ValidationError;
use crate::task::{TaskId, TaskPatch};

/// Maximum description length in characters, measured after trimming.
pub const MAX_DESCRIPTION_CHARS: usize = 500;

/// Validate a create payload and return the trimmed description.
///
/// `description` is required, must be a JSON string, must contain at least
/// one non-whitespace character, and must not exceed
/// [`MAX_DESCRIPTION_CHARS`] after trimming.
pub fn validate_create(payload: &Value) -> Result<String, ValidationError> {
    match payload.get("description") {
        Some(raw) => validate_description(raw),
        None => Err(ValidationError::MissingDescription),
    }
}

/// Validate an update payload into an explicit-presence [`TaskPatch`].
///
/// At least one of `description` / `completed` must be present. Description
/// rules are the same as for create; `completed` must be a JSON boolean.
pub fn validate_update(payload: &Value) -> Result<TaskPatch, ValidationError> {
    let description = payload.get("description");
    let completed = payload.get("completed");

    if description.is_none() && completed.is_none() {
        return Err(ValidationError::NoUpdateFields);
    }

    let mut patch = TaskPatch::default();

    if let Some(raw) = description {
        patch.description = Some(validate_description(raw)?);
    }

    if let Some(raw) = completed {
        patch.completed = Some(raw.as_bool().ok_or(ValidationError::InvalidCompletedType {
            actual: json_type_name(raw),
        })?);
    }

    Ok(patch)
}

/// Parse a path parameter into a [`TaskId`].
///
/// Non-numeric input and values ≤ 0 are rejected.
pub fn parse_task_id(raw: &str) -> Result<TaskId, ValidationError> {
    if raw.is_empty() {
        return Err(ValidationError::MissingTodoId);
    }

    let parsed: i64 = raw
        .parse()
        .map_err(|_| ValidationError::InvalidTodoId { raw: raw.to_string() })?;

    if parsed <= 0 {
        return Err(ValidationError::InvalidTodoId { raw: raw.to_string() });
    }

    Ok(TaskId::new(parsed))
}

fn validate_description(raw: &Value) -> Result<String, ValidationError> {
    let text = raw.as_str().ok_or(ValidationError::InvalidDescriptionType {
        actual: json_type_name(raw),
    })?;

    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::EmptyDescription);
    }

    let length = trimmed.chars().count();
    if length > MAX_DESCRIPTION_CHARS {
        return Err(ValidationError::DescriptionTooLong {
            length,
            max: MAX_DESCRIPTION_CHARS,
        });
    }

    Ok(trimmed.to_string())
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
