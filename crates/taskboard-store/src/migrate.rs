//! Versioned schema migrations.

use rusqlite::{Connection, params};

use taskboard_core::StoreError;

/// A single schema migration with an optional rollback script.
pub struct Migration {
    pub version: u32,
    pub description: &'static str,
    pub up: &'static str,
    pub down: Option<&'static str>,
}

/// Applies pending migrations in order and records them in a tracking table.
pub struct MigrationEngine {
    migrations: Vec<Migration>,
}

impl Default for MigrationEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl MigrationEngine {
    pub fn new() -> Self {
        Self {
            migrations: default_migrations(),
        }
    }

    /// Run all migrations up to `target_version` (latest when `None`).
    pub fn migrate(
        &self,
        conn: &Connection,
        target_version: Option<u32>,
    ) -> Result<(), StoreError> {
        conn.execute(
            "CREATE TABLE IF NOT EXISTS schema_migrations (
                version INTEGER PRIMARY KEY,
                description TEXT NOT NULL,
                applied_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ','now'))
            )",
            [],
        )
        .map_err(|e| StoreError::Internal {
            detail: format!("failed to create migrations table: {e}"),
        })?;

        let current = self.current_version(conn)?;
        let target = target_version.unwrap_or_else(|| {
            self.migrations
                .iter()
                .map(|m| m.version)
                .max()
                .unwrap_or(0)
        });

        for migration in &self.migrations {
            if migration.version > current && migration.version <= target {
                self.apply(conn, migration)?;
            }
        }

        Ok(())
    }

    /// Roll back every migration above `target_version`, newest first.
    pub fn rollback(&self, conn: &Connection, target_version: u32) -> Result<(), StoreError> {
        let current = self.current_version(conn)?;

        let mut pending: Vec<_> = self
            .migrations
            .iter()
            .filter(|m| m.version > target_version && m.version <= current)
            .collect();
        pending.sort_by(|a, b| b.version.cmp(&a.version));

        for migration in pending {
            let down = migration.down.ok_or_else(|| StoreError::Internal {
                detail: format!("migration {} has no down script", migration.version),
            })?;

            let tx = conn
                .unchecked_transaction()
                .map_err(|e| StoreError::Internal {
                    detail: format!("failed to start rollback transaction: {e}"),
                })?;
            tx.execute_batch(down).map_err(|e| StoreError::Internal {
                detail: format!("rollback of migration {} failed: {e}", migration.version),
            })?;
            tx.execute(
                "DELETE FROM schema_migrations WHERE version = ?1",
                params![migration.version],
            )
            .map_err(|e| StoreError::Internal {
                detail: format!(
                    "failed to remove migration record {}: {e}",
                    migration.version
                ),
            })?;
            tx.commit().map_err(|e| StoreError::Internal {
                detail: format!("failed to commit rollback {}: {e}", migration.version),
            })?;
        }

        Ok(())
    }

    /// The highest applied migration version, 0 on a fresh database.
    pub fn current_version(&self, conn: &Connection) -> Result<u32, StoreError> {
        Ok(conn
            .query_row(
                "SELECT COALESCE(MAX(version), 0) FROM schema_migrations",
                [],
                |row| row.get(0),
            )
            .unwrap_or(0))
    }

    fn apply(&self, conn: &Connection, migration: &Migration) -> Result<(), StoreError> {
        tracing::debug!(
            version = migration.version,
            description = migration.description,
            "applying schema migration"
        );

        let tx = conn
            .unchecked_transaction()
            .map_err(|e| StoreError::Internal {
                detail: format!("failed to start migration transaction: {e}"),
            })?;
        tx.execute_batch(migration.up)
            .map_err(|e| StoreError::Internal {
                detail: format!("migration {} failed: {e}", migration.version),
            })?;
        tx.execute(
            "INSERT INTO schema_migrations (version, description) VALUES (?1, ?2)",
            params![migration.version, migration.description],
        )
        .map_err(|e| StoreError::Internal {
            detail: format!("failed to record migration {}: {e}", migration.version),
        })?;
        tx.commit().map_err(|e| StoreError::Internal {
            detail: format!("failed to commit migration {}: {e}", migration.version),
        })?;

        Ok(())
    }
}

/// The todos table plus the trigger that refreshes `updated_at` on every
/// row update. The trigger is the mechanism the service layer relies on —
/// no Rust code ever writes a timestamp.
fn default_migrations() -> Vec<Migration> {
    vec![Migration {
        version: 1,
        description: "create todos table, updated_at trigger, and creation-time index",
        up: r#"
            CREATE TABLE IF NOT EXISTS todos (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                description TEXT NOT NULL CHECK (length(description) <= 500),
                completed INTEGER NOT NULL DEFAULT 0,
                created_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ','now')),
                updated_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ','now'))
            );

            CREATE TRIGGER IF NOT EXISTS todos_touch_updated_at
            AFTER UPDATE OF description, completed ON todos
            FOR EACH ROW
            BEGIN
                UPDATE todos
                SET updated_at = strftime('%Y-%m-%dT%H:%M:%fZ','now')
                WHERE id = NEW.id;
            END;

            CREATE INDEX IF NOT EXISTS idx_todos_created_at ON todos(created_at);
        "#,
        down: Some(
            "DROP TRIGGER IF EXISTS todos_touch_updated_at;
             DROP INDEX IF EXISTS idx_todos_created_at;
             DROP TABLE IF EXISTS todos;",
        ),
    }]
}
