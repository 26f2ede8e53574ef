//! Task domain types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Identifier of a task record.
///
/// Server-assigned ids are always positive. The client crate uses negative
/// values as provisional placeholders for optimistic creates, so the newtype
/// itself does not enforce positivity; boundary validation does
/// (see [`crate::validate::parse_task_id`]).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ToSchema,
)]
#[serde(transparent)]
pub struct TaskId(i64);

impl TaskId {
    pub const fn new(raw: i64) -> Self {
        Self(raw)
    }

    pub const fn get(self) -> i64 {
        self.0
    }

    /// Whether this id could have been assigned by the server.
    pub const fn is_persistent(self) -> bool {
        self.0 > 0
    }
}

impl std::fmt::Display for TaskId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A persisted task record.
///
/// Records are immutable snapshots: the server never mutates a `Task` in
/// place. Every mutation re-reads the row, so `updated_at` always reflects
/// the storage-side refresh trigger.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Task {
    /// Server-assigned identifier, immutable for the record's lifetime.
    pub id: TaskId,
    /// What needs to be done. Trimmed, non-empty, at most 500 characters.
    #[schema(example = "Buy milk")]
    pub description: String,
    /// Completion flag, `false` on creation.
    pub completed: bool,
    /// Set once at insert.
    pub created_at: DateTime<Utc>,
    /// Refreshed by the store on every mutation. Invariant: `updated_at >= created_at`.
    pub updated_at: DateTime<Utc>,
}

/// Partial update with explicit field presence.
///
/// Absent fields leave the stored value untouched; the store consumes this
/// with a fixed-shape update statement rather than assembling SQL per call.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct TaskPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed: Option<bool>,
}

impl TaskPatch {
    /// A patch that only rewrites the description.
    pub fn description(description: impl Into<String>) -> Self {
        Self {
            description: Some(description.into()),
            completed: None,
        }
    }

    /// A patch that only sets the completion flag.
    pub fn completed(completed: bool) -> Self {
        Self {
            description: None,
            completed: Some(completed),
        }
    }

    /// True when no field is present; such a patch is equivalent to a read.
    pub fn is_empty(&self) -> bool {
        self.description.is_none() && self.completed.is_none()
    }
}

/// Aggregate counts over the task set, derived at query time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct TaskStats {
    #[schema(example = 3)]
    pub total: u64,
    #[schema(example = 1)]
    pub completed: u64,
    #[schema(example = 2)]
    pub pending: u64,
}
