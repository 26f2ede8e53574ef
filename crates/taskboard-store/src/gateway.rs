//! SQLite implementation of the task persistence seam.

use std::path::Path;
use std::sync::Arc;

use rusqlite::{Connection, OptionalExtension, ffi, params};

use taskboard_core::{StoreError, Task, TaskGateway, TaskId, TaskPatch, TaskStats};

use crate::migrate::MigrationEngine;
use crate::pool::SqlitePool;

const TASK_COLUMNS: &str = "id, description, completed, created_at, updated_at";

/// Task gateway backed by a pooled SQLite database.
///
/// Owns the `todos` table exclusively. Timestamps are managed entirely by
/// column defaults and the `updated_at` trigger, so every mutating
/// operation re-reads the row before returning it.
pub struct SqliteGateway {
    pool: Arc<SqlitePool>,
}

impl SqliteGateway {
    /// Open (or create) the database at `path` and bring the schema up to
    /// date.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        Self::open_with_pool_size(path, 4)
    }

    pub fn open_with_pool_size(
        path: impl AsRef<Path>,
        pool_size: usize,
    ) -> Result<Self, StoreError> {
        let pool = Arc::new(SqlitePool::new(path, pool_size)?);

        let conn = pool.acquire()?;
        MigrationEngine::new().migrate(conn.as_ref(), None)?;
        drop(conn);

        Ok(Self { pool })
    }

    fn fetch_on(&self, conn: &Connection, id: TaskId) -> Result<Option<Task>, StoreError> {
        conn.query_row(
            &format!("SELECT {TASK_COLUMNS} FROM todos WHERE id = ?1"),
            params![id.get()],
            row_to_task,
        )
        .optional()
        .map_err(classify)
    }
}

impl TaskGateway for SqliteGateway {
    fn insert(&self, description: &str) -> Result<Task, StoreError> {
        let conn = self.pool.acquire()?;

        conn.as_ref()
            .execute(
                "INSERT INTO todos (description, completed) VALUES (?1, 0)",
                params![description],
            )
            .map_err(classify)?;

        let id = TaskId::new(conn.as_ref().last_insert_rowid());
        self.fetch_on(conn.as_ref(), id)?
            .ok_or_else(|| StoreError::Internal {
                detail: format!("inserted row {id} could not be read back"),
            })
    }

    fn fetch_all(&self) -> Result<Vec<Task>, StoreError> {
        let conn = self.pool.acquire()?;

        let mut stmt = conn
            .as_ref()
            .prepare(&format!(
                "SELECT {TASK_COLUMNS} FROM todos ORDER BY created_at DESC, id DESC"
            ))
            .map_err(classify)?;

        let rows = stmt.query_map([], row_to_task).map_err(classify)?;
        rows.collect::<Result<Vec<_>, _>>().map_err(classify)
    }

    fn fetch(&self, id: TaskId) -> Result<Option<Task>, StoreError> {
        let conn = self.pool.acquire()?;
        self.fetch_on(conn.as_ref(), id)
    }

    fn update(&self, id: TaskId, patch: &TaskPatch) -> Result<Option<Task>, StoreError> {
        let conn = self.pool.acquire()?;

        // Fixed-shape statement: absent patch fields bind NULL and COALESCE
        // keeps the stored value. The trigger refreshes updated_at.
        let changed = conn
            .as_ref()
            .execute(
                "UPDATE todos
                 SET description = COALESCE(?1, description),
                     completed = COALESCE(?2, completed)
                 WHERE id = ?3",
                params![patch.description.as_deref(), patch.completed, id.get()],
            )
            .map_err(classify)?;

        if changed == 0 {
            return Ok(None);
        }
        self.fetch_on(conn.as_ref(), id)
    }

    fn remove(&self, id: TaskId) -> Result<bool, StoreError> {
        let conn = self.pool.acquire()?;

        let removed = conn
            .as_ref()
            .execute("DELETE FROM todos WHERE id = ?1", params![id.get()])
            .map_err(classify)?;

        Ok(removed > 0)
    }

    fn toggle(&self, id: TaskId) -> Result<Option<Task>, StoreError> {
        let conn = self.pool.acquire()?;

        // A single conditional update: concurrent togglers of the same id
        // cannot lose a flip to a read-modify-write race.
        let changed = conn
            .as_ref()
            .execute(
                "UPDATE todos SET completed = NOT completed WHERE id = ?1",
                params![id.get()],
            )
            .map_err(classify)?;

        if changed == 0 {
            return Ok(None);
        }
        self.fetch_on(conn.as_ref(), id)
    }

    fn count(&self) -> Result<TaskStats, StoreError> {
        let conn = self.pool.acquire()?;

        conn.as_ref()
            .query_row(
                "SELECT COUNT(*),
                        COUNT(*) FILTER (WHERE completed = 1),
                        COUNT(*) FILTER (WHERE completed = 0)
                 FROM todos",
                [],
                |row| {
                    Ok(TaskStats {
                        total: row.get::<_, i64>(0)? as u64,
                        completed: row.get::<_, i64>(1)? as u64,
                        pending: row.get::<_, i64>(2)? as u64,
                    })
                },
            )
            .map_err(classify)
    }
}

fn row_to_task(row: &rusqlite::Row<'_>) -> rusqlite::Result<Task> {
    Ok(Task {
        id: TaskId::new(row.get(0)?),
        description: row.get(1)?,
        completed: row.get(2)?,
        created_at: row.get(3)?,
        updated_at: row.get(4)?,
    })
}

/// Classify a driver error into a typed [`StoreError`] kind.
fn classify(err: rusqlite::Error) -> StoreError {
    match &err {
        rusqlite::Error::SqliteFailure(code, message) => {
            let detail = message
                .clone()
                .unwrap_or_else(|| format!("sqlite error code {}", code.extended_code));
            match code.extended_code {
                ffi::SQLITE_CONSTRAINT_UNIQUE | ffi::SQLITE_CONSTRAINT_PRIMARYKEY => {
                    StoreError::Duplicate { detail }
                }
                _ => match code.code {
                    rusqlite::ErrorCode::DiskFull
                    | rusqlite::ErrorCode::CannotOpen
                    | rusqlite::ErrorCode::ReadOnly
                    | rusqlite::ErrorCode::SystemIoFailure => StoreError::Io { detail },
                    _ => StoreError::Internal { detail },
                },
            }
        }
        other => StoreError::Internal {
            detail: other.to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn gateway(dir: &tempfile::TempDir) -> SqliteGateway {
        SqliteGateway::open(dir.path().join("tasks.db")).unwrap()
    }

    #[test]
    fn test_insert_sets_defaults_and_equal_timestamps() {
        let dir = tempdir().unwrap();
        let gateway = gateway(&dir);

        let task = gateway.insert("Buy milk").unwrap();
        assert!(task.id.is_persistent());
        assert_eq!(task.description, "Buy milk");
        assert!(!task.completed);
        assert_eq!(task.created_at, task.updated_at);
    }

    #[test]
    fn test_fetch_all_orders_newest_first() {
        let dir = tempdir().unwrap();
        let gateway = gateway(&dir);

        let first = gateway.insert("first").unwrap();
        let second = gateway.insert("second").unwrap();
        let third = gateway.insert("third").unwrap();

        let all = gateway.fetch_all().unwrap();
        assert_eq!(
            all.iter().map(|t| t.id).collect::<Vec<_>>(),
            vec![third.id, second.id, first.id]
        );
    }

    #[test]
    fn test_update_refreshes_updated_at_via_trigger() {
        let dir = tempdir().unwrap();
        let gateway = gateway(&dir);

        let task = gateway.insert("draft").unwrap();
        std::thread::sleep(std::time::Duration::from_millis(5));

        let updated = gateway
            .update(task.id, &TaskPatch::description("final"))
            .unwrap()
            .unwrap();
        assert_eq!(updated.description, "final");
        assert_eq!(updated.created_at, task.created_at);
        assert!(updated.updated_at > task.updated_at);
    }

    #[test]
    fn test_update_with_both_fields() {
        let dir = tempdir().unwrap();
        let gateway = gateway(&dir);

        let task = gateway.insert("draft").unwrap();
        let patch = TaskPatch {
            description: Some("done deal".into()),
            completed: Some(true),
        };
        let updated = gateway.update(task.id, &patch).unwrap().unwrap();
        assert_eq!(updated.description, "done deal");
        assert!(updated.completed);
    }

    #[test]
    fn test_update_missing_row_returns_none() {
        let dir = tempdir().unwrap();
        let gateway = gateway(&dir);

        let missing = gateway
            .update(TaskId::new(999), &TaskPatch::completed(true))
            .unwrap();
        assert!(missing.is_none());
    }

    #[test]
    fn test_toggle_flips_and_is_involutive() {
        let dir = tempdir().unwrap();
        let gateway = gateway(&dir);

        let task = gateway.insert("flip me").unwrap();

        let once = gateway.toggle(task.id).unwrap().unwrap();
        assert!(once.completed);
        assert!(once.updated_at >= once.created_at);

        let twice = gateway.toggle(task.id).unwrap().unwrap();
        assert!(!twice.completed);
        assert_eq!(twice.description, task.description);
    }

    #[test]
    fn test_remove_reports_idempotency() {
        let dir = tempdir().unwrap();
        let gateway = gateway(&dir);

        let task = gateway.insert("delete me").unwrap();
        assert!(gateway.remove(task.id).unwrap());
        assert!(!gateway.remove(task.id).unwrap());
        assert!(gateway.fetch(task.id).unwrap().is_none());
    }

    #[test]
    fn test_count_totals_add_up() {
        let dir = tempdir().unwrap();
        let gateway = gateway(&dir);

        assert_eq!(gateway.count().unwrap(), TaskStats::default());

        let a = gateway.insert("a").unwrap();
        gateway.insert("b").unwrap();
        gateway.insert("c").unwrap();
        gateway.toggle(a.id).unwrap();

        let stats = gateway.count().unwrap();
        assert_eq!(stats.total, 3);
        assert_eq!(stats.completed, 1);
        assert_eq!(stats.pending, 2);
        assert_eq!(stats.total, stats.completed + stats.pending);
    }

    #[test]
    fn test_concurrent_toggles_never_lose_an_update() {
        let dir = tempdir().unwrap();
        let gateway = Arc::new(gateway(&dir));
        let task = gateway.insert("contended").unwrap();

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let gateway = Arc::clone(&gateway);
                let id = task.id;
                std::thread::spawn(move || {
                    gateway.toggle(id).unwrap().unwrap();
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        // An even number of flips lands back on the original value.
        let settled = gateway.fetch(task.id).unwrap().unwrap();
        assert!(!settled.completed);
    }
}
