//! Client state store.
//!
//! The store is the single source of truth for rendering. Every mutation
//! builds the next state and commits it in one step, bumping a generation
//! counter; a renderer that diffs on the generation can never observe a
//! torn intermediate state.

use taskboard_core::{Task, TaskId, TaskStats};

/// A client-local copy of a server task plus transient UI flags that do
/// not exist server-side.
#[derive(Debug, Clone, PartialEq)]
pub struct TaskSnapshot {
    pub task: Task,
    /// The item is in inline-edit mode.
    pub editing: bool,
    /// The item's own request is outstanding; its actions are disabled.
    pub loading: bool,
}

impl TaskSnapshot {
    pub fn new(task: Task) -> Self {
        Self {
            task,
            editing: false,
            loading: false,
        }
    }

    pub fn id(&self) -> TaskId {
        self.task.id
    }
}

/// The full client-side view state.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClientState {
    /// One snapshot per visible task, in server order (newest first).
    pub tasks: Vec<TaskSnapshot>,
    /// A full list load is in progress.
    pub loading: bool,
    /// Last load failure, shown until the next successful load.
    pub error: Option<String>,
}

/// Holder of [`ClientState`] with single-transition replacement semantics.
#[derive(Debug, Default)]
pub struct StateStore {
    state: ClientState,
    generation: u64,
}

impl StateStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &ClientState {
        &self.state
    }

    /// Monotonic counter bumped on every committed transition.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    fn commit(&mut self, next: ClientState) {
        self.state = next;
        self.generation += 1;
    }

    pub fn set_loading(&mut self, loading: bool) {
        let mut next = self.state.clone();
        next.loading = loading;
        self.commit(next);
    }

    pub fn set_error(&mut self, error: Option<String>) {
        let mut next = self.state.clone();
        next.error = error;
        self.commit(next);
    }

    /// Replace the task collection with fresh server records.
    pub fn replace_tasks(&mut self, tasks: Vec<Task>) {
        let mut next = self.state.clone();
        next.tasks = tasks.into_iter().map(TaskSnapshot::new).collect();
        next.error = None;
        self.commit(next);
    }

    /// Clone the current task collection — the rollback primitive.
    pub fn snapshot_tasks(&self) -> Vec<TaskSnapshot> {
        self.state.tasks.clone()
    }

    /// Swap a previously taken snapshot back in.
    pub fn restore_tasks(&mut self, tasks: Vec<TaskSnapshot>) {
        let mut next = self.state.clone();
        next.tasks = tasks;
        self.commit(next);
    }

    pub fn find(&self, id: TaskId) -> Option<&TaskSnapshot> {
        self.state.tasks.iter().find(|s| s.id() == id)
    }

    /// Prepend a snapshot (optimistic create).
    pub fn insert_front(&mut self, snapshot: TaskSnapshot) {
        let mut next = self.state.clone();
        next.tasks.insert(0, snapshot);
        self.commit(next);
    }

    /// Drop a task by id (optimistic delete).
    pub fn remove_task(&mut self, id: TaskId) {
        let mut next = self.state.clone();
        next.tasks.retain(|s| s.id() != id);
        self.commit(next);
    }

    /// Apply one closure to one snapshot in a single transition.
    /// Returns false when the id is unknown.
    pub fn modify_task(&mut self, id: TaskId, f: impl FnOnce(&mut TaskSnapshot)) -> bool {
        let mut next = self.state.clone();
        let Some(snapshot) = next.tasks.iter_mut().find(|s| s.id() == id) else {
            return false;
        };
        f(snapshot);
        self.commit(next);
        true
    }

    /// Replace a tentative entry with the server's canonical record and
    /// clear its transient flags.
    pub fn confirm_task(&mut self, id: TaskId, canonical: Task) {
        self.modify_task(id, |snapshot| {
            snapshot.task = canonical;
            snapshot.editing = false;
            snapshot.loading = false;
        });
    }

    /// Stats derived from local state, for display between server fetches.
    pub fn local_stats(&self) -> TaskStats {
        let total = self.state.tasks.len() as u64;
        let completed = self
            .state
            .tasks
            .iter()
            .filter(|s| s.task.completed)
            .count() as u64;
        TaskStats {
            total,
            completed,
            pending: total - completed,
        }
    }

    /// Display order: pending tasks first, then completed, newest first
    /// within each group. The canonical server order in `state().tasks` is
    /// left untouched.
    pub fn sorted_for_display(&self) -> Vec<TaskSnapshot> {
        let mut sorted = self.state.tasks.clone();
        sorted.sort_by(|a, b| {
            a.task
                .completed
                .cmp(&b.task.completed)
                .then(b.task.created_at.cmp(&a.task.created_at))
        });
        sorted
    }
}
