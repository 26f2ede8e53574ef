//! Task service and the persistence seam it orchestrates.

use crate::error::{ServiceError, ServiceResult, StoreError};
use crate::task::{Task, TaskId, TaskPatch, TaskStats};

/// Persistence seam for task records.
///
/// Backends own the table and all timestamp bookkeeping; callers get back
/// freshly read records, never mutated-in-place ones. `toggle` must flip
/// the flag in a single conditional statement so that concurrent togglers
/// of the same id cannot lose updates — statement-level atomicity is the
/// only concurrency guarantee this trait relies on.
pub trait TaskGateway: Send + Sync {
    /// Insert a new record with `completed = false` and return it.
    fn insert(&self, description: &str) -> Result<Task, StoreError>;

    /// All records, most recently created first.
    fn fetch_all(&self) -> Result<Vec<Task>, StoreError>;

    /// One record by id.
    fn fetch(&self, id: TaskId) -> Result<Option<Task>, StoreError>;

    /// Apply a fixed-shape partial update and return the refreshed record,
    /// or `None` if the id does not exist at update time.
    fn update(&self, id: TaskId, patch: &TaskPatch) -> Result<Option<Task>, StoreError>;

    /// Remove by id. Returns whether a row was actually removed.
    fn remove(&self, id: TaskId) -> Result<bool, StoreError>;

    /// Atomically flip `completed` and return the refreshed record.
    fn toggle(&self, id: TaskId) -> Result<Option<Task>, StoreError>;

    /// Aggregate counts over the whole table.
    fn count(&self) -> Result<TaskStats, StoreError>;
}

/// CRUD + toggle + stats over task records.
///
/// A thin, request-scoped orchestration: no operation holds state between
/// calls, and the gateway is injected at construction rather than reached
/// through a global handle.
pub struct TaskService<G> {
    gateway: G,
}

impl<G: TaskGateway> TaskService<G> {
    pub fn new(gateway: G) -> Self {
        Self { gateway }
    }

    /// All tasks ordered by creation time, most recent first.
    pub fn list(&self) -> ServiceResult<Vec<Task>> {
        Ok(self.gateway.fetch_all()?)
    }

    pub fn get(&self, id: TaskId) -> ServiceResult<Task> {
        self.gateway
            .fetch(id)?
            .ok_or(ServiceError::NotFound { id })
    }

    /// Insert a task with a pre-validated description.
    pub fn create(&self, description: &str) -> ServiceResult<Task> {
        Ok(self.gateway.insert(description)?)
    }

    /// Partial update. An empty patch is equivalent to a read.
    pub fn update(&self, id: TaskId, patch: &TaskPatch) -> ServiceResult<Task> {
        if patch.is_empty() {
            return self.get(id);
        }
        self.gateway
            .update(id, patch)?
            .ok_or(ServiceError::NotFound { id })
    }

    /// Hard delete. Deleting an id that no longer exists surfaces as
    /// not-found, so a second delete of the same id yields 404 at the API.
    pub fn delete(&self, id: TaskId) -> ServiceResult<()> {
        if self.gateway.remove(id)? {
            Ok(())
        } else {
            Err(ServiceError::NotFound { id })
        }
    }

    pub fn toggle(&self, id: TaskId) -> ServiceResult<Task> {
        self.gateway
            .toggle(id)?
            .ok_or(ServiceError::NotFound { id })
    }

    pub fn stats(&self) -> ServiceResult<TaskStats> {
        Ok(self.gateway.count()?)
    }
}
