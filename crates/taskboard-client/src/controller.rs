//! Optimistic update controller.
//!
//! Every mutating action runs the same protocol, a per-action state
//! machine `Idle → Applying → {Confirmed | RolledBack}`:
//!
//! 1. snapshot the store and apply the tentative change in one transition,
//!    so the renderer only ever sees the action either fully applied or
//!    fully absent;
//! 2. issue the HTTP call;
//! 3. on success, splice in the server's canonical record — the server is
//!    authoritative for ids and timestamps;
//! 4. on failure, restore the snapshot, emit an error notification, and —
//!    for toggle, edit, and delete — reload the full list from the server,
//!    because a partial server-side effect may have occurred before the
//!    error was raised and a local rollback alone is not trusted.
//!
//! While a task's own request is outstanding its id is held in an
//! in-flight set and further actions on it are rejected with
//! [`ClientError::ActionInFlight`]. Actions on *different* tasks may be in
//! flight concurrently; two different action types racing on one task is
//! out of scope (last response wins, the reload is the divergence guard).

use std::collections::HashSet;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::{Mutex, MutexGuard};

use chrono::Utc;

use taskboard_core::{Task, TaskId, TaskPatch, TaskStats};

use crate::api::TaskApi;
use crate::error::ClientError;
use crate::notify::Notifier;
use crate::state::{ClientState, StateStore, TaskSnapshot};

/// Terminal state of one mutating action.
#[derive(Debug)]
pub enum ActionOutcome {
    /// The server confirmed; the canonical record (if any) is in the store.
    Confirmed { task: Option<Task> },
    /// The server call failed; the store was restored to its pre-action
    /// state. The triggering error is carried for inspection.
    RolledBack { error: ClientError },
}

impl ActionOutcome {
    pub fn is_confirmed(&self) -> bool {
        matches!(self, Self::Confirmed { .. })
    }
}

/// Drives optimistic mutations against a [`TaskApi`], keeping a
/// [`StateStore`] as the single source of truth for rendering.
pub struct Controller<A, N> {
    api: A,
    notifier: N,
    store: Mutex<StateStore>,
    in_flight: Mutex<HashSet<TaskId>>,
    next_provisional: AtomicI64,
}

/// Recover the guard even from a poisoned lock; state transitions are
/// whole-state swaps, so a panic mid-hold cannot leave a torn value.
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl<A: TaskApi, N: Notifier> Controller<A, N> {
    pub fn new(api: A, notifier: N) -> Self {
        Self {
            api,
            notifier,
            store: Mutex::new(StateStore::new()),
            in_flight: Mutex::new(HashSet::new()),
            next_provisional: AtomicI64::new(-1),
        }
    }

    /// Clone of the current view state.
    pub fn current_state(&self) -> ClientState {
        lock(&self.store).state().clone()
    }

    /// The store's transition counter; a renderer diffs against this.
    pub fn generation(&self) -> u64 {
        lock(&self.store).generation()
    }

    /// Run a closure against the store without cloning the whole state.
    pub fn with_store<R>(&self, f: impl FnOnce(&StateStore) -> R) -> R {
        f(&lock(&self.store))
    }

    /// Stats derived from local state, without a server round trip.
    pub fn local_stats(&self) -> TaskStats {
        lock(&self.store).local_stats()
    }

    /// Flip a task's inline-edit flag. Returns false for unknown ids.
    pub fn set_editing(&self, id: TaskId, editing: bool) -> bool {
        lock(&self.store).modify_task(id, |snapshot| snapshot.editing = editing)
    }

    /// Load the full task list from the server, replacing local state.
    pub async fn load(&self) -> Result<(), ClientError> {
        {
            let mut store = lock(&self.store);
            store.set_loading(true);
            store.set_error(None);
        }

        match self.api.list().await {
            Ok(tasks) => {
                let mut store = lock(&self.store);
                store.replace_tasks(tasks);
                store.set_loading(false);
                Ok(())
            }
            Err(err) => {
                let mut store = lock(&self.store);
                store.set_loading(false);
                store.set_error(Some(err.to_string()));
                Err(err)
            }
        }
    }

    /// Optimistically create a task.
    ///
    /// The tentative entry carries a provisional negative id (never a valid
    /// server id) and is replaced wholesale by the canonical record. A
    /// failed create rolls back without a reload — nothing existed
    /// server-side to diverge from.
    pub async fn create(&self, description: &str) -> Result<ActionOutcome, ClientError> {
        let description = description.trim().to_string();
        let provisional = TaskId::new(self.next_provisional.fetch_sub(1, Ordering::Relaxed));

        let before = lock(&self.store).snapshot_tasks();
        lock(&self.in_flight).insert(provisional);

        let now = Utc::now();
        let mut tentative = TaskSnapshot::new(Task {
            id: provisional,
            description: description.clone(),
            completed: false,
            created_at: now,
            updated_at: now,
        });
        tentative.loading = true;
        lock(&self.store).insert_front(tentative);

        match self.api.create(&description).await {
            Ok(canonical) => {
                lock(&self.store).confirm_task(provisional, canonical.clone());
                self.finish(provisional);
                self.notifier.success(
                    "Task created",
                    &format!("\"{}\" added to the list", canonical.description),
                );
                Ok(ActionOutcome::Confirmed {
                    task: Some(canonical),
                })
            }
            Err(error) => {
                lock(&self.store).restore_tasks(before);
                self.finish(provisional);
                self.notifier.error("Create failed", &error.to_string());
                Ok(ActionOutcome::RolledBack { error })
            }
        }
    }

    /// Optimistically flip a task's completion flag.
    pub async fn toggle(&self, id: TaskId) -> Result<ActionOutcome, ClientError> {
        let before = self.begin(id)?;

        lock(&self.store).modify_task(id, |snapshot| {
            snapshot.task.completed = !snapshot.task.completed;
            snapshot.loading = true;
        });

        match self.api.toggle(id).await {
            Ok(canonical) => {
                lock(&self.store).confirm_task(id, canonical.clone());
                self.finish(id);
                let title = if canonical.completed {
                    "Task completed"
                } else {
                    "Task reopened"
                };
                self.notifier.success(title, &canonical.description);
                Ok(ActionOutcome::Confirmed {
                    task: Some(canonical),
                })
            }
            Err(error) => {
                self.rollback(id, before, "Toggle failed", &error).await;
                Ok(ActionOutcome::RolledBack { error })
            }
        }
    }

    /// Optimistically rewrite a task's description.
    pub async fn edit(&self, id: TaskId, description: &str) -> Result<ActionOutcome, ClientError> {
        let description = description.trim().to_string();
        let before = self.begin(id)?;

        lock(&self.store).modify_task(id, |snapshot| {
            snapshot.task.description = description.clone();
            snapshot.editing = false;
            snapshot.loading = true;
        });

        let patch = TaskPatch::description(description);
        match self.api.update(id, &patch).await {
            Ok(canonical) => {
                lock(&self.store).confirm_task(id, canonical.clone());
                self.finish(id);
                self.notifier.success(
                    "Task updated",
                    &format!("Description changed to \"{}\"", canonical.description),
                );
                Ok(ActionOutcome::Confirmed {
                    task: Some(canonical),
                })
            }
            Err(error) => {
                self.rollback(id, before, "Edit failed", &error).await;
                Ok(ActionOutcome::RolledBack { error })
            }
        }
    }

    /// Optimistically remove a task.
    pub async fn delete(&self, id: TaskId) -> Result<ActionOutcome, ClientError> {
        let before = self.begin(id)?;

        let description = {
            let mut store = lock(&self.store);
            let description = store
                .find(id)
                .map(|snapshot| snapshot.task.description.clone())
                .unwrap_or_default();
            store.remove_task(id);
            description
        };

        match self.api.delete(id).await {
            Ok(()) => {
                self.finish(id);
                self.notifier.success(
                    "Task deleted",
                    &format!("\"{description}\" removed from the list"),
                );
                Ok(ActionOutcome::Confirmed { task: None })
            }
            Err(error) => {
                self.rollback(id, before, "Delete failed", &error).await;
                Ok(ActionOutcome::RolledBack { error })
            }
        }
    }

    /// Pre-flight checks and the pre-action snapshot. The snapshot is taken
    /// before any mutation (including the loading flag), so a rollback
    /// restores exactly the state the action started from.
    fn begin(&self, id: TaskId) -> Result<Vec<TaskSnapshot>, ClientError> {
        let before = {
            let store = lock(&self.store);
            if store.find(id).is_none() {
                return Err(ClientError::UnknownTask { id });
            }
            store.snapshot_tasks()
        };

        if !lock(&self.in_flight).insert(id) {
            return Err(ClientError::ActionInFlight { id });
        }

        Ok(before)
    }

    fn finish(&self, id: TaskId) {
        lock(&self.in_flight).remove(&id);
    }

    /// Shared failure path for toggle/edit/delete: restore, notify, and
    /// reload the list as the divergence guard.
    async fn rollback(
        &self,
        id: TaskId,
        before: Vec<TaskSnapshot>,
        title: &str,
        error: &ClientError,
    ) {
        lock(&self.store).restore_tasks(before);
        self.finish(id);
        self.notifier.error(title, &error.to_string());

        if let Err(reload_err) = self.load().await {
            tracing::warn!(
                error = %reload_err,
                "post-failure reload failed; keeping rolled-back local state"
            );
        }
    }
}
