//! Thread-safe SQLite connection pool.

use rusqlite::Connection;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use taskboard_core::StoreError;

/// Fixed-size pool of SQLite connections to one database file.
///
/// Connections are configured for WAL mode with a busy timeout, so
/// request-parallel readers and a writer can coexist; statement-level
/// atomicity is the only concurrency guarantee callers rely on.
pub struct SqlitePool {
    available: Arc<Mutex<Vec<Connection>>>,
    path: PathBuf,
    size: usize,
}

impl SqlitePool {
    /// Open a pool of `size` connections against `path`, creating the
    /// database file if needed.
    pub fn new(path: impl AsRef<Path>, size: usize) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();

        let mut available = Vec::with_capacity(size);
        for _ in 0..size {
            available.push(Self::open_connection(&path)?);
        }

        Ok(Self {
            available: Arc::new(Mutex::new(available)),
            path,
            size,
        })
    }

    fn open_connection(path: &Path) -> Result<Connection, StoreError> {
        let conn = Connection::open(path).map_err(|e| StoreError::Io {
            detail: format!("failed to open database at {}: {e}", path.display()),
        })?;

        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA synchronous = NORMAL;
             PRAGMA busy_timeout = 5000;
             PRAGMA foreign_keys = ON;",
        )
        .map_err(|e| StoreError::Io {
            detail: format!("failed to configure connection: {e}"),
        })?;

        Ok(conn)
    }

    /// Take a connection from the pool, opening a fresh one when the pool
    /// has been drained by concurrent holders.
    pub fn acquire(&self) -> Result<PooledConnection, StoreError> {
        let mut available = self.available.lock().map_err(|e| StoreError::Pool {
            detail: format!("pool lock poisoned: {e}"),
        })?;

        let conn = match available.pop() {
            Some(conn) => conn,
            None => Self::open_connection(&self.path)?,
        };

        Ok(PooledConnection {
            connection: Some(conn),
            pool: Arc::clone(&self.available),
            size: self.size,
        })
    }
}

/// RAII wrapper that returns its connection to the pool on drop.
pub struct PooledConnection {
    connection: Option<Connection>,
    pool: Arc<Mutex<Vec<Connection>>>,
    size: usize,
}

impl PooledConnection {
    pub fn as_ref(&self) -> &Connection {
        self.connection
            .as_ref()
            .expect("connection present until drop")
    }
}

impl Drop for PooledConnection {
    fn drop(&mut self) {
        if let Some(conn) = self.connection.take()
            && let Ok(mut available) = self.pool.lock()
            && available.len() < self.size
        {
            available.push(conn);
        }
        // A full pool or a poisoned lock just lets the connection close.
    }
}
